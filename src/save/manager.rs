//! Save manager for the player profile
//!
//! This module provides the SaveManager struct which handles:
//! - Writing the profile to `profile.json`
//! - Timestamped backups next to it
//! - Loading with a version check

use super::types::*;
use crate::error::GameError;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const PROFILE_FILE: &str = "profile.json";
const BACKUP_PREFIX: &str = "profile_backup_";
const DEFAULT_BACKUPS_KEPT: usize = 5;

/// `~/.shooter202x/saves`, or `./saves` without a home directory
pub fn default_save_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".shooter202x").join("saves"),
        None => PathBuf::from("saves"),
    }
}

pub struct SaveManager {
    save_directory: PathBuf,
    backups_kept: usize,
}

impl SaveManager {
    /// Creates a new SaveManager with the given save directory
    ///
    /// The save directory will be created if it doesn't exist.
    pub fn new(save_directory: impl AsRef<Path>) -> Result<Self, GameError> {
        let save_dir = save_directory.as_ref().to_path_buf();
        if !save_dir.exists() {
            fs::create_dir_all(&save_dir)?;
        }
        Ok(SaveManager {
            save_directory: save_dir,
            backups_kept: DEFAULT_BACKUPS_KEPT,
        })
    }

    pub fn profile_path(&self) -> PathBuf {
        self.save_directory.join(PROFILE_FILE)
    }

    /// Writes the profile and a timestamped backup, then prunes old backups
    ///
    /// Stamps the profile with the current time and save version.
    pub fn save_profile(&self, profile: &mut Profile) -> Result<PathBuf, GameError> {
        profile.version = CURRENT_SAVE_VERSION;
        profile.timestamp = SystemTime::now();

        // Pretty format for readability/debugging
        let json = serde_json::to_string_pretty(profile)?;
        let filepath = self.profile_path();
        fs::write(&filepath, &json)?;

        let backup = self.save_directory.join(Self::backup_filename());
        fs::write(&backup, &json)?;
        self.cleanup_backups(self.backups_kept)?;

        info!("Profile saved to: {}", filepath.display());
        Ok(filepath)
    }

    /// Loads the profile, or a fresh one when none was saved yet
    pub fn load_profile(&self) -> Result<Profile, GameError> {
        let filepath = self.profile_path();
        if !filepath.exists() {
            info!("No profile at {}, starting fresh", filepath.display());
            return Ok(Profile::default());
        }

        let json = fs::read_to_string(&filepath)?;
        let profile: Profile = serde_json::from_str(&json)?;

        // Version check
        if profile.version > CURRENT_SAVE_VERSION {
            return Err(GameError::InvalidSaveVersion(profile.version));
        }
        Ok(profile)
    }

    /// Loads the profile, falling back to the newest readable backup and then
    /// to a fresh profile
    pub fn load_or_recover(&self) -> Profile {
        match self.load_profile() {
            Ok(profile) => return profile,
            Err(e) => warn!("Failed to load profile: {}", e),
        }
        for backup in self.list_backups().iter().rev() {
            let loaded = fs::read_to_string(backup)
                .map_err(GameError::from)
                .and_then(|json| serde_json::from_str::<Profile>(&json).map_err(GameError::from));
            match loaded {
                Ok(profile) if profile.version <= CURRENT_SAVE_VERSION => {
                    info!("Recovered profile from {}", backup.display());
                    return profile;
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping backup {}: {}", backup.display(), e),
            }
        }
        Profile::default()
    }

    /// Backup files, oldest first
    pub fn list_backups(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.save_directory) else {
            return Vec::new();
        };
        let mut backups: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|f| f.to_str())
                    .is_some_and(|name| name.starts_with(BACKUP_PREFIX) && name.ends_with(".json"))
            })
            .collect();
        // The timestamp format sorts the same as time
        backups.sort();
        backups
    }

    /// Delete old backups, keeping only the N most recent
    pub fn cleanup_backups(&self, keep_count: usize) -> Result<usize, GameError> {
        let backups = self.list_backups();
        let excess = backups.len().saturating_sub(keep_count);
        for path in backups.iter().take(excess) {
            fs::remove_file(path)?;
        }
        Ok(excess)
    }

    fn backup_filename() -> String {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
        format!("{}{}.json", BACKUP_PREFIX, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("saves");
        let saves = SaveManager::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(saves.save_directory, nested);
    }

    #[test]
    fn test_missing_profile_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveManager::new(dir.path()).unwrap();
        assert!(!saves.profile_path().exists());
        assert_eq!(saves.load_profile().unwrap(), Profile::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveManager::new(dir.path()).unwrap();
        let mut profile = Profile {
            high_score: 4200,
            unlocked_levels: vec!["stage_1".to_string(), "stage_2".to_string()],
            last_campaign: Some("main".to_string()),
            ..Profile::default()
        };
        saves.save_profile(&mut profile).unwrap();

        let loaded = saves.load_profile().unwrap();
        assert_eq!(loaded.high_score, 4200);
        assert_eq!(loaded.unlocked_levels, profile.unlocked_levels);
        assert_eq!(loaded.last_campaign.as_deref(), Some("main"));
        assert!(loaded.timestamp > std::time::UNIX_EPOCH);
        assert_eq!(saves.list_backups().len(), 1);
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveManager::new(dir.path()).unwrap();
        fs::write(saves.profile_path(), r#"{"version": 99, "high_score": 1}"#).unwrap();

        assert!(matches!(saves.load_profile(), Err(GameError::InvalidSaveVersion(99))));
    }

    #[test]
    fn test_cleanup_keeps_newest_backups() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveManager::new(dir.path()).unwrap();
        for stamp in ["20260101_000000_000", "20260102_000000_000", "20260103_000000_000"] {
            let path = dir.path().join(format!("{}{}.json", BACKUP_PREFIX, stamp));
            fs::write(path, "{}").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(saves.cleanup_backups(2).unwrap(), 1);
        let names: Vec<String> = saves
            .list_backups()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["profile_backup_20260102_000000_000.json", "profile_backup_20260103_000000_000.json"]
        );
    }

    #[test]
    fn test_corrupt_profile_recovers_from_backup() {
        let dir = tempfile::tempdir().unwrap();
        let saves = SaveManager::new(dir.path()).unwrap();
        let mut profile = Profile {
            high_score: 777,
            ..Profile::default()
        };
        saves.save_profile(&mut profile).unwrap();
        fs::write(saves.profile_path(), "not json").unwrap();

        assert!(saves.load_profile().is_err());
        assert_eq!(saves.load_or_recover().high_score, 777);
    }
}
