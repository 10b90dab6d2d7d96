//! Save data types
//!
//! Serialized with Serde. Unknown or missing fields fall back to defaults so
//! older profiles keep loading.

use crate::session::SessionStats;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current save file version
pub const CURRENT_SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub version: u32,
    pub timestamp: SystemTime,
    pub high_score: u32,
    pub unlocked_levels: Vec<String>,
    pub last_campaign: Option<String>,
    pub games_played: u32,
    pub total_score: u64,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            version: CURRENT_SAVE_VERSION,
            timestamp: UNIX_EPOCH,
            high_score: 0,
            unlocked_levels: Vec::new(),
            last_campaign: None,
            games_played: 0,
            total_score: 0,
        }
    }
}

impl Profile {
    /// Folds a finished run into the profile
    pub fn record_run(&mut self, stats: &SessionStats) {
        self.high_score = self.high_score.max(stats.high_score).max(stats.score);
        self.total_score += stats.score as u64;
        self.games_played += 1;
    }

    /// Adds `ids` to the unlocked list, skipping ones already there
    pub fn merge_unlocked(&mut self, ids: impl IntoIterator<Item = String>) {
        for id in ids {
            if !self.unlocked_levels.contains(&id) {
                self.unlocked_levels.push(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let profile: Profile = serde_json::from_str(r#"{"high_score": 900}"#).unwrap();
        assert_eq!(profile.high_score, 900);
        assert_eq!(profile.version, CURRENT_SAVE_VERSION);
        assert!(profile.unlocked_levels.is_empty());
    }

    #[test]
    fn test_record_run() {
        let mut profile = Profile {
            high_score: 300,
            ..Profile::default()
        };
        let mut stats = SessionStats::new();
        stats.add_score(200);
        profile.record_run(&stats);
        assert_eq!(profile.high_score, 300);
        assert_eq!(profile.total_score, 200);

        stats.add_score(400);
        profile.record_run(&stats);
        assert_eq!(profile.high_score, 600);
        assert_eq!(profile.games_played, 2);
    }

    #[test]
    fn test_merge_unlocked_skips_duplicates() {
        let mut profile = Profile::default();
        profile.merge_unlocked(vec!["one".to_string(), "two".to_string()]);
        profile.merge_unlocked(vec!["two".to_string(), "three".to_string()]);
        assert_eq!(profile.unlocked_levels, vec!["one", "two", "three"]);
    }
}
