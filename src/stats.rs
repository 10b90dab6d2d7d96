//! Health and stat modifier system
//!
//! This module provides:
//! - Health management with damage and healing
//! - Timed and permanent stat modifiers applied by pickups
//!
//! # Formula
//!
//! Effective stats combine every active modifier for that stat:
//!
//! ```text
//! effective = (base + Σ add) × Π multiply
//! ```
//!
//! A modifier created with a negative duration ([`PERMANENT`]) never expires.

/// Duration value marking a modifier as permanent in item files
pub const PERMANENT: f32 = -1.0;

/// Represents a character's health points
///
/// # Example
///
/// ```ignore
/// let mut health = Health::new(3.0);
/// health.take_damage(1.0);
/// assert_eq!(health.current(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    /// Creates a new Health instance with full health
    pub fn new(max: f32) -> Self {
        Health { current: max, max }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Returns health as a percentage (0.0 to 1.0)
    pub fn percentage(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Applies damage to health
    ///
    /// Returns how much damage was actually dealt and whether it was fatal.
    /// A target that is already dead takes nothing.
    pub fn take_damage(&mut self, amount: f32) -> DamageResult {
        if !self.is_alive() || amount <= 0.0 {
            return DamageResult::no_damage();
        }
        let old_health = self.current;
        self.current = (self.current - amount).max(0.0);

        DamageResult {
            damage_dealt: old_health - self.current,
            is_fatal: self.current <= 0.0,
        }
    }

    /// Heals health, capped at max health. Returns the amount healed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let old_health = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - old_health
    }

    pub fn fill(&mut self) {
        self.current = self.max;
    }

    /// Sets the maximum health, capping current health to the new max
    pub fn set_max(&mut self, new_max: f32) {
        self.max = new_max.max(0.0);
        if self.current > self.max {
            self.current = self.max;
        }
    }
}

/// Result of a damage operation
#[derive(Debug, Clone, PartialEq)]
pub struct DamageResult {
    /// Actual damage dealt (may be less than requested if target had less health)
    pub damage_dealt: f32,
    /// Whether this damage killed the target
    pub is_fatal: bool,
}

impl DamageResult {
    pub fn no_damage() -> Self {
        DamageResult {
            damage_dealt: 0.0,
            is_fatal: false,
        }
    }
}

/// Stats that pickups can modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatType {
    MoveSpeed,
    FireRate,
    Damage,
}

impl StatType {
    pub fn label(&self) -> &'static str {
        match self {
            StatType::MoveSpeed => "SPD",
            StatType::FireRate => "ROF",
            StatType::Damage => "DMG",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    /// Added to the base before multipliers
    Add,
    /// Multiplies the summed value
    Multiply,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatModifier {
    pub stat: StatType,
    pub kind: ModifierKind,
    pub value: f32,
    /// Seconds left, `None` when permanent
    pub remaining: Option<f32>,
    pub source: String,
}

impl StatModifier {
    pub fn new(stat: StatType, kind: ModifierKind, value: f32, duration: f32, source: &str) -> Self {
        StatModifier {
            stat,
            kind,
            value,
            remaining: (duration >= 0.0).then_some(duration),
            source: source.to_string(),
        }
    }
}

/// Active modifiers for one entity
#[derive(Debug, Clone, Default)]
pub struct StatBlock {
    modifiers: Vec<StatModifier>,
}

impl StatBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, modifier: StatModifier) {
        self.modifiers.push(modifier);
    }

    /// Counts down timed modifiers and drops the expired ones
    pub fn update(&mut self, dt: f32) {
        for remaining in self.modifiers.iter_mut().filter_map(|m| m.remaining.as_mut()) {
            *remaining -= dt;
        }
        self.modifiers.retain(|m| m.remaining.is_none_or(|t| t > 0.0));
    }

    pub fn effective(&self, stat: StatType, base: f32) -> f32 {
        let mut add = 0.0;
        let mut multiply = 1.0;
        for modifier in self.modifiers.iter().filter(|m| m.stat == stat) {
            match modifier.kind {
                ModifierKind::Add => add += modifier.value,
                ModifierKind::Multiply => multiply *= modifier.value,
            }
        }
        (base + add) * multiply
    }

    /// Timed modifiers with their seconds left, for the buff display
    pub fn timed(&self) -> impl Iterator<Item = (&StatModifier, f32)> {
        self.modifiers
            .iter()
            .filter_map(|m| m.remaining.map(|t| (m, t)))
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn clear(&mut self) {
        self.modifiers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(3.0);
        let result = health.take_damage(1.0);

        assert_eq!(result.damage_dealt, 1.0);
        assert_eq!(health.current(), 2.0);
        assert!(!result.is_fatal);
    }

    #[test]
    fn test_health_fatal_damage() {
        let mut health = Health::new(3.0);
        let result = health.take_damage(15.0);

        assert_eq!(result.damage_dealt, 3.0);
        assert_eq!(health.current(), 0.0);
        assert!(result.is_fatal);
    }

    #[test]
    fn test_health_overheal_caps() {
        let mut health = Health::new(4.0);
        health.take_damage(2.0);

        let healed = health.heal(10.0);
        assert_eq!(healed, 2.0);
        assert_eq!(health.current(), 4.0);
    }

    #[test]
    fn test_set_max_caps_current() {
        let mut health = Health::new(5.0);
        health.set_max(3.0);
        assert_eq!(health.current(), 3.0);
        assert_eq!(health.percentage(), 1.0);
    }

    #[test]
    fn test_effective_combines_add_then_multiply() {
        let mut stats = StatBlock::new();
        stats.add(StatModifier::new(StatType::Damage, ModifierKind::Add, 1.0, PERMANENT, "core"));
        stats.add(StatModifier::new(StatType::Damage, ModifierKind::Multiply, 2.0, 5.0, "rage"));
        stats.add(StatModifier::new(StatType::Damage, ModifierKind::Multiply, 1.5, 5.0, "rage"));

        // (1 + 1) * 2 * 1.5
        assert_eq!(stats.effective(StatType::Damage, 1.0), 6.0);
        assert_eq!(stats.effective(StatType::MoveSpeed, 300.0), 300.0);
    }

    #[test]
    fn test_timed_modifiers_expire() {
        let mut stats = StatBlock::new();
        stats.add(StatModifier::new(StatType::MoveSpeed, ModifierKind::Multiply, 1.5, 2.0, "boots"));
        stats.add(StatModifier::new(StatType::Damage, ModifierKind::Add, 1.0, PERMANENT, "core"));

        stats.update(1.0);
        assert_eq!(stats.len(), 2);
        stats.update(1.5);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats.effective(StatType::MoveSpeed, 300.0), 300.0);
        assert_eq!(stats.timed().count(), 0);
    }

    #[test]
    fn test_fixed_steps_past_zero_still_expire() {
        let mut stats = StatBlock::new();
        stats.add(StatModifier::new(StatType::MoveSpeed, ModifierKind::Multiply, 2.0, 1.0, "boots"));

        // 1/60 steps never land exactly on zero
        for _ in 0..61 {
            stats.update(1.0 / 60.0);
        }
        assert!(stats.is_empty());
        assert_eq!(stats.effective(StatType::MoveSpeed, 300.0), 300.0);
    }

    #[test]
    fn test_dead_target_takes_no_further_damage() {
        let mut health = Health::new(2.0);
        assert!(health.take_damage(5.0).is_fatal);
        assert_eq!(health.take_damage(1.0), DamageResult::no_damage());
        assert_eq!(Health::new(2.0).take_damage(-1.0).damage_dealt, 0.0);
    }

    #[test]
    fn test_negative_duration_is_permanent() {
        let modifier = StatModifier::new(StatType::Damage, ModifierKind::Add, 1.0, PERMANENT, "core");
        assert!(modifier.remaining.is_none());
        assert_eq!(StatModifier::new(StatType::Damage, ModifierKind::Add, 1.0, 0.5, "x").remaining, Some(0.5));
    }
}
