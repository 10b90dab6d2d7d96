//! Item definitions loaded from `items.json`
//!
//! ```json
//! {"items": [{"id": "repair_kit", "name": "Repair Kit", "color": [80, 220, 120],
//!             "drop_weight": 5, "effects": [{"type": "ADD_HEALTH", "value": 1}]}]}
//! ```

use super::effects::ItemEffect;
use crate::error::GameError;
use serde::{Deserialize, Serialize};

fn default_color() -> (u8, u8, u8) {
    (255, 220, 80)
}

fn default_weight() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: (u8, u8, u8),
    /// Relative chance in the loot table. 0 keeps it out of random drops.
    #[serde(default = "default_weight")]
    pub drop_weight: f32,
    pub effects: Vec<ItemEffect>,
}

impl ItemDefinition {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.id.trim().is_empty() {
            return Err(GameError::Config("item id is empty".to_string()));
        }
        if !(self.drop_weight >= 0.0) {
            return Err(GameError::Config(format!(
                "item {}: drop_weight must be >= 0",
                self.id
            )));
        }
        if self.effects.is_empty() {
            return Err(GameError::Config(format!("item {} has no effects", self.id)));
        }
        for effect in &self.effects {
            effect
                .validate()
                .map_err(|e| GameError::Config(format!("item {}: {}", self.id, e)))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFile {
    pub items: Vec<ItemDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(json: &str) -> ItemDefinition {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_fill_optional_fields() {
        let item = definition(r#"{"id": "x", "name": "X", "effects": [{"type": "FULL_HEAL"}]}"#);
        assert_eq!(item.drop_weight, 1.0);
        assert_eq!(item.color, (255, 220, 80));
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let no_effects = definition(r#"{"id": "x", "name": "X", "effects": []}"#);
        assert!(no_effects.validate().is_err());

        let negative = definition(
            r#"{"id": "x", "name": "X", "drop_weight": -2, "effects": [{"type": "FULL_HEAL"}]}"#,
        );
        assert!(negative.validate().is_err());

        let bad_effect = definition(
            r#"{"id": "x", "name": "X", "effects": [{"type": "ADD_HEALTH", "value": -1}]}"#,
        );
        assert!(bad_effect.validate().is_err());
    }
}
