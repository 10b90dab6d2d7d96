//! Game-wide constants and JSON settings loading
//!
//! Constants cover the display, the fixed-step physics, the offscreen margins
//! used by each entity kind and the render layers. Tunable values live in JSON
//! files under `assets/config/` and are read through [`load_json`].

use crate::error::GameError;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const SCREEN_WIDTH: u32 = 1280;
pub const SCREEN_HEIGHT: u32 = 720;
pub const FPS: u32 = 60;
pub const CAPTION: &str = "202X";

pub const FIXED_DT: f32 = 1.0 / 60.0;
pub const MAX_FRAME_TIME: f32 = 0.1;

/// Offscreen margins in pixels, per entity kind
pub mod bounds {
    pub const ENEMY_DAMAGE_MARGIN: f32 = 50.0;
    pub const ENEMY_CLEANUP_MARGIN: f32 = 200.0;
    pub const BULLET_PLAYER_MARGIN: f32 = 50.0;
    pub const BULLET_ENEMY_MARGIN: f32 = 100.0;
    pub const ITEM_CLEANUP_MARGIN: f32 = 50.0;
    pub const ENV_CLEANUP_MARGIN: f32 = 300.0;
    pub const COLLISION_CULL_MARGIN: f32 = 150.0;
    pub const SPAWN_WARN_DISTANCE: f32 = 1000.0;
}

/// Render layers, drawn low to high
pub mod layers {
    pub const ENEMIES: i32 = 1;
    pub const PICKUPS: i32 = 2;
    pub const BULLETS: i32 = 3;
    pub const PLAYER: i32 = 4;
}

pub const ASSETS_ROOT: &str = "assets";
pub const SETTINGS_PATH: &str = "assets/config/settings.json";
pub const PLAYER_CONFIG_PATH: &str = "assets/config/player.json";
pub const ENEMIES_PATH: &str = "assets/config/enemies.json";
pub const ITEMS_PATH: &str = "assets/config/items.json";
pub const CAMPAIGNS_PATH: &str = "assets/config/campaigns.json";

/// Reads and deserializes a JSON file
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, GameError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let value = serde_json::from_str(&text)?;
    Ok(value)
}

/// User-tunable settings from `settings.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameSettings {
    pub screen_width: u32,
    pub screen_height: u32,
    pub fps: u32,
    pub debug_hitboxes: bool,
    pub start_lives: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            fps: FPS,
            debug_hitboxes: false,
            start_lives: 3,
        }
    }
}

impl GameSettings {
    /// Loads settings, falling back to defaults when the file is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match load_json::<GameSettings>(path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(GameError::Io(_)) => GameSettings::default(),
            Err(e) => {
                warn!("Ignoring settings file {}: {}", path.display(), e);
                GameSettings::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GameError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_settings_use_defaults() {
        let settings = GameSettings::load_or_default("does/not/exist.json");
        assert_eq!(settings, GameSettings::default());
        assert_eq!(settings.screen_width, 1280);
        assert_eq!(settings.start_lives, 3);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"debug_hitboxes": true}}"#).unwrap();

        let settings = GameSettings::load_or_default(&path);
        assert!(settings.debug_hitboxes);
        assert_eq!(settings.fps, 60);
    }

    #[test]
    fn test_settings_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("settings.json");
        let settings = GameSettings {
            start_lives: 5,
            ..GameSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(GameSettings::load_or_default(&path), settings);
    }

    #[test]
    fn test_load_json_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<GameSettings, GameError> = load_json(&path);
        assert!(matches!(result, Err(GameError::Json(_))));
    }
}
