//! Player tuning from `player.json`
//!
//! Every field has a default, so a partial or missing file still yields a
//! playable ship.

use crate::config::load_json;
use crate::error::GameError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub accel: f32,
    pub friction: f32,
    /// Top speed as a multiple of the base speed
    pub max_speed_mult: f32,
    /// Lerp factor toward the desired velocity per update
    pub smoothing: f32,
    /// Below this speed friction stops the ship outright
    pub stop_threshold: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        MovementTuning {
            accel: 3000.0,
            friction: 500.0,
            max_speed_mult: 1.8,
            smoothing: 0.25,
            stop_threshold: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingConfig {
    pub cooldown: f32,
    /// Bullet velocity when fired straight up
    pub bullet_velocity: [f32; 2],
    pub damage: f32,
    pub bullet_radius: f32,
    pub bullet_color: (u8, u8, u8),
}

impl Default for ShootingConfig {
    fn default() -> Self {
        ShootingConfig {
            cooldown: 0.1,
            bullet_velocity: [0.0, -900.0],
            damage: 1.0,
            bullet_radius: 4.0,
            bullet_color: (255, 255, 100),
        }
    }
}

/// One charge threshold of the spread shot. `angle` is the full fan width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeLevel {
    pub time: f32,
    pub count: u32,
    pub angle: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    pub cooldown: f32,
    pub speed: f32,
    pub damage: f32,
    pub levels: Vec<ChargeLevel>,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        SpreadConfig {
            cooldown: 1.0,
            speed: 700.0,
            damage: 1.0,
            levels: vec![
                ChargeLevel {
                    time: 0.0,
                    count: 3,
                    angle: 30.0,
                },
                ChargeLevel {
                    time: 0.5,
                    count: 5,
                    angle: 50.0,
                },
                ChargeLevel {
                    time: 1.0,
                    count: 7,
                    angle: 70.0,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvincibilityConfig {
    pub duration: f32,
    pub blink_interval: f32,
}

impl Default for InvincibilityConfig {
    fn default() -> Self {
        InvincibilityConfig {
            duration: 1.5,
            blink_interval: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f32,
    pub health: f32,
    pub size: [f32; 2],
    pub hitbox_scale: f32,
    pub color: (u8, u8, u8),
    pub movement: MovementTuning,
    pub shooting: ShootingConfig,
    pub spread: SpreadConfig,
    pub invincibility: InvincibilityConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            speed: 300.0,
            health: 3.0,
            size: [64.0, 64.0],
            hitbox_scale: 0.85,
            color: (255, 80, 80),
            movement: MovementTuning::default(),
            shooting: ShootingConfig::default(),
            spread: SpreadConfig::default(),
            invincibility: InvincibilityConfig::default(),
        }
    }
}

impl PlayerConfig {
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match load_json::<PlayerConfig>(path) {
            Ok(mut config) => {
                info!("Loaded player config from {}", path.display());
                if config.spread.levels.is_empty() {
                    warn!("Player config has no spread levels, using defaults");
                    config.spread.levels = SpreadConfig::default().levels;
                }
                config
            }
            Err(GameError::Io(_)) => PlayerConfig::default(),
            Err(e) => {
                warn!("Ignoring player config {}: {}", path.display(), e);
                PlayerConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: PlayerConfig =
            serde_json::from_str(r#"{"speed": 250, "shooting": {"cooldown": 0.2}}"#).unwrap();
        assert_eq!(config.speed, 250.0);
        assert_eq!(config.shooting.cooldown, 0.2);
        assert_eq!(config.shooting.bullet_velocity, [0.0, -900.0]);
        assert_eq!(config.movement.accel, 3000.0);
        assert_eq!(config.invincibility.duration, 1.5);
    }

    #[test]
    fn test_empty_spread_levels_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.json");
        std::fs::write(&path, r#"{"spread": {"levels": []}}"#).unwrap();

        let config = PlayerConfig::load_or_default(&path);
        assert_eq!(config.spread.levels.len(), 3);
    }
}
