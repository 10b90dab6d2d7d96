//! Per-run statistics and game state
//!
//! [`SessionStats`] collects what the HUD and the game over screen show.
//! [`GameState`] tracks lives and the pause, game over and victory flags.

use log::info;
use std::collections::HashMap;

pub const DEFAULT_LIVES: u32 = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub score: u32,
    pub high_score: u32,
    /// Score across every run since launch
    pub total_score: u64,
    pub enemies_killed: u32,
    pub items_collected: u32,
    pub run_time: f32,
    pub max_level_reached: u32,
    pub total_exp_gained: u64,
    /// Free-form counters, e.g. kills per enemy type
    pub custom: HashMap<String, i64>,
}

impl SessionStats {
    pub fn new() -> Self {
        SessionStats::default()
    }

    /// Starts with a high score carried over from the saved profile
    pub fn with_high_score(high_score: u32) -> Self {
        SessionStats {
            high_score,
            ..SessionStats::default()
        }
    }

    /// Adds score and lifts the high score along with it. Returns true when a
    /// new high score was set.
    pub fn add_score(&mut self, amount: u32) -> bool {
        self.score = self.score.saturating_add(amount);
        self.total_score += amount as u64;
        if self.score > self.high_score {
            self.high_score = self.score;
            return true;
        }
        false
    }

    pub fn record_kill(&mut self, type_tag: &str) {
        self.enemies_killed += 1;
        self.increment(&format!("kills_{}", type_tag), 1);
    }

    pub fn record_item(&mut self) {
        self.items_collected += 1;
    }

    pub fn record_exp(&mut self, amount: u32) {
        self.total_exp_gained += amount as u64;
    }

    pub fn record_level(&mut self, level: u32) {
        self.max_level_reached = self.max_level_reached.max(level);
    }

    pub fn tick(&mut self, dt: f32) {
        self.run_time += dt;
    }

    pub fn increment(&mut self, key: &str, amount: i64) {
        *self.custom.entry(key.to_string()).or_insert(0) += amount;
    }

    pub fn custom(&self, key: &str) -> i64 {
        self.custom.get(key).copied().unwrap_or(0)
    }

    /// Clears the run, keeping the high score and the lifetime total
    pub fn reset(&mut self) {
        let high_score = self.high_score;
        let total_score = self.total_score;
        *self = SessionStats {
            high_score,
            total_score,
            ..SessionStats::default()
        };
    }

    /// `mm:ss` for the game over screen
    pub fn formatted_time(&self) -> String {
        let secs = self.run_time.max(0.0) as u32;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub paused: bool,
    pub game_over: bool,
    pub victory: bool,
    start_lives: u32,
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(DEFAULT_LIVES)
    }
}

impl GameState {
    pub fn new(start_lives: u32) -> Self {
        GameState {
            score: 0,
            lives: start_lives,
            level: 1,
            paused: false,
            game_over: false,
            victory: false,
            start_lives,
        }
    }

    /// Takes a life. Returns true when none are left.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            info!("Out of lives");
            self.game_over = true;
        }
        self.game_over
    }

    pub fn add_lives(&mut self, amount: u32) {
        self.lives = self.lives.saturating_add(amount);
    }

    pub fn reset(&mut self) {
        *self = GameState::new(self.start_lives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_score_tracks_high_score() {
        let mut stats = SessionStats::with_high_score(150);
        assert!(!stats.add_score(100));
        assert_eq!(stats.high_score, 150);
        assert!(stats.add_score(100));
        assert_eq!(stats.score, 200);
        assert_eq!(stats.high_score, 200);
    }

    #[test]
    fn test_reset_keeps_high_score() {
        let mut stats = SessionStats::new();
        stats.add_score(500);
        stats.record_kill("basic");
        stats.record_item();
        stats.tick(12.0);
        stats.reset();

        assert_eq!(stats.score, 0);
        assert_eq!(stats.enemies_killed, 0);
        assert_eq!(stats.high_score, 500);
        assert_eq!(stats.total_score, 500);
        assert_eq!(stats.custom("kills_basic"), 0);
    }

    #[test]
    fn test_kill_counters() {
        let mut stats = SessionStats::new();
        stats.record_kill("basic");
        stats.record_kill("basic");
        stats.record_kill("shooter");
        assert_eq!(stats.enemies_killed, 3);
        assert_eq!(stats.custom("kills_basic"), 2);
        assert_eq!(stats.custom("kills_shooter"), 1);
    }

    #[test]
    fn test_record_level_keeps_max() {
        let mut stats = SessionStats::new();
        stats.record_level(4);
        stats.record_level(2);
        assert_eq!(stats.max_level_reached, 4);
    }

    #[test]
    fn test_formatted_time() {
        let mut stats = SessionStats::new();
        stats.tick(125.5);
        assert_eq!(stats.formatted_time(), "02:05");
    }

    #[test]
    fn test_lose_life_until_game_over() {
        let mut state = GameState::default();
        assert!(!state.lose_life());
        assert!(!state.lose_life());
        assert!(state.lose_life());
        assert!(state.game_over);
        // Stays at zero
        assert!(state.lose_life());
        assert_eq!(state.lives, 0);

        state.reset();
        assert_eq!(state.lives, 3);
        assert!(!state.game_over);
    }
}
