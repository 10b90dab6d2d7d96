//! Effects a pickup applies to the player

use crate::stats::PERMANENT;
use serde::{Deserialize, Serialize};

const DEFAULT_BUFF_DURATION: f32 = 10.0;

fn default_buff_duration() -> f32 {
    DEFAULT_BUFF_DURATION
}

fn permanent() -> f32 {
    PERMANENT
}

/// One effect of an item, tagged by `type` in JSON
///
/// ```json
/// {"type": "MULTIPLY_SPEED", "value": 1.3, "duration": 8.0}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemEffect {
    /// Heals, capped at max health
    AddHealth { value: f32 },
    AddMaxHealth { value: f32 },
    FullHeal,
    MultiplySpeed {
        value: f32,
        #[serde(default = "default_buff_duration")]
        duration: f32,
    },
    MultiplyFireRate {
        value: f32,
        #[serde(default = "default_buff_duration")]
        duration: f32,
    },
    AddDamage {
        value: f32,
        #[serde(default = "permanent")]
        duration: f32,
    },
    /// Absorbs the next hit
    GrantShield,
    AddScore { value: u32 },
    AddLives { value: u32 },
}

impl ItemEffect {
    /// Rejects values that would break the player
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ItemEffect::AddHealth { value } | ItemEffect::AddMaxHealth { value }
                if *value <= 0.0 =>
            {
                Err(format!("health value must be positive, got {}", value))
            }
            ItemEffect::MultiplySpeed { value, .. } | ItemEffect::MultiplyFireRate { value, .. }
                if *value <= 0.0 =>
            {
                Err(format!("multiplier must be positive, got {}", value))
            }
            ItemEffect::MultiplySpeed { duration, .. }
            | ItemEffect::MultiplyFireRate { duration, .. }
            | ItemEffect::AddDamage { duration, .. }
                if *duration == 0.0 =>
            {
                Err("duration must be positive or -1".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effects_parse_from_tagged_json() {
        let effects: Vec<ItemEffect> = serde_json::from_str(
            r#"[
                {"type": "ADD_HEALTH", "value": 1},
                {"type": "FULL_HEAL"},
                {"type": "MULTIPLY_FIRE_RATE", "value": 2.0},
                {"type": "ADD_DAMAGE", "value": 1}
            ]"#,
        )
        .unwrap();

        assert_eq!(effects[0], ItemEffect::AddHealth { value: 1.0 });
        assert_eq!(effects[1], ItemEffect::FullHeal);
        assert_eq!(
            effects[2],
            ItemEffect::MultiplyFireRate {
                value: 2.0,
                duration: 10.0
            }
        );
        assert_eq!(
            effects[3],
            ItemEffect::AddDamage {
                value: 1.0,
                duration: PERMANENT
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ItemEffect::AddHealth { value: 0.0 }.validate().is_err());
        assert!(ItemEffect::MultiplySpeed { value: -1.0, duration: 5.0 }.validate().is_err());
        assert!(ItemEffect::AddDamage { value: 1.0, duration: 0.0 }.validate().is_err());
        assert!(ItemEffect::GrantShield.validate().is_ok());
    }
}
