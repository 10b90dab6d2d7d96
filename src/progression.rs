//! Experience and player level
//!
//! The exp needed for the next level grows by 15% per level:
//! `floor(30 × 1.15^(level - 1))`. Any exp past the threshold carries over.

const BASE_EXP: f64 = 30.0;
const GROWTH: f64 = 1.15;

pub fn exp_required(level: u32) -> u32 {
    let level = level.max(1);
    (BASE_EXP * GROWTH.powi(level as i32 - 1)).floor() as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    pub level: u32,
    pub exp: u32,
    pub total_exp: u64,
}

impl Progression {
    pub fn new() -> Self {
        Progression {
            level: 1,
            exp: 0,
            total_exp: 0,
        }
    }

    pub fn required(&self) -> u32 {
        exp_required(self.level)
    }

    /// Fraction toward the next level, for the HUD bar
    pub fn progress(&self) -> f32 {
        self.exp as f32 / self.required().max(1) as f32
    }

    /// Adds exp and returns how many levels were gained. Non-positive amounts
    /// are ignored.
    pub fn add_exp(&mut self, amount: i64) -> u32 {
        if amount <= 0 {
            return 0;
        }
        self.total_exp += amount as u64;
        let mut exp = self.exp as u64 + amount as u64;
        let mut gained = 0;
        while exp >= self.required() as u64 {
            exp -= self.required() as u64;
            self.level += 1;
            gained += 1;
        }
        self.exp = exp as u32;
        gained
    }

    pub fn reset(&mut self) {
        *self = Progression::new();
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}
