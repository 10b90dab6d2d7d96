//! Loosely typed spawn parameters
//!
//! Level files pass arbitrary per-wave keys to entity constructors
//! (`speed`, `waypoints`, `shoot_interval`, ...). `SpawnParams` wraps the JSON
//! object and offers typed getters with defaults.

use crate::error::GameError;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpawnParams(Map<String, Value>);

impl SpawnParams {
    pub fn new() -> Self {
        SpawnParams(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        SpawnParams(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn f32_or(&self, key: &str, default: f32) -> f32 {
        self.0
            .get(key)
            .and_then(Value::as_f64)
            .map(|v| v as f32)
            .unwrap_or(default)
    }

    /// Fails when `key` is present but not a positive, finite number
    pub fn require_positive(&self, key: &str) -> Result<(), GameError> {
        let Some(value) = self.get(key) else {
            return Ok(());
        };
        match value.as_f64() {
            Some(v) if v.is_finite() && v > 0.0 => Ok(()),
            _ => Err(GameError::Config(format!("{} must be positive, got {}", key, value))),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Reads `[x, y]` or `{"x": .., "y": ..}`
    pub fn vec2(&self, key: &str) -> Option<Vec2> {
        self.0.get(key).and_then(value_to_vec2)
    }

    /// Reads a list of points
    pub fn points(&self, key: &str) -> Vec<Vec2> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(value_to_vec2).collect(),
            _ => Vec::new(),
        }
    }

    /// Keeps only the listed keys
    pub fn filtered(&self, allowed: &[&str]) -> SpawnParams {
        let map = self
            .0
            .iter()
            .filter(|(k, _)| allowed.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        SpawnParams(map)
    }

    /// Copies every key of `other` over this one
    pub fn merge(&mut self, other: &SpawnParams) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }
}

pub fn value_to_vec2(value: &Value) -> Option<Vec2> {
    match value {
        Value::Array(items) if items.len() >= 2 => {
            let x = items[0].as_f64()?;
            let y = items[1].as_f64()?;
            Some(Vec2::new(x as f32, y as f32))
        }
        Value::Object(map) => {
            let x = map.get("x")?.as_f64()?;
            let y = map.get("y")?.as_f64()?;
            Some(Vec2::new(x as f32, y as f32))
        }
        _ => None,
    }
}

pub fn vec2_to_value(v: Vec2) -> Value {
    Value::Array(vec![Value::from(v.x as f64), Value::from(v.y as f64)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> SpawnParams {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_typed_getters_with_defaults() {
        let p = params(json!({"speed": 120, "aim_at_player": false}));
        assert_eq!(p.f32_or("speed", 100.0), 120.0);
        assert_eq!(p.f32_or("missing", 7.5), 7.5);
        assert!(!p.bool_or("aim_at_player", true));
    }

    #[test]
    fn test_vec2_accepts_both_forms() {
        let p = params(json!({"a": [1.0, 2.0], "b": {"x": 3, "y": 4}, "c": "nope"}));
        assert_eq!(p.vec2("a"), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(p.vec2("b"), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(p.vec2("c"), None);
    }

    #[test]
    fn test_points_skip_bad_entries() {
        let p = params(json!({"waypoints": [[0, 0], "bad", [10, 20]]}));
        assert_eq!(p.points("waypoints"), vec![Vec2::ZERO, Vec2::new(10.0, 20.0)]);
    }

    #[test]
    fn test_require_positive() {
        let p = params(json!({"health": 3, "zero": 0, "neg": -2.5, "word": "lots"}));
        assert!(p.require_positive("health").is_ok());
        assert!(p.require_positive("missing").is_ok());
        assert!(p.require_positive("zero").is_err());
        assert!(p.require_positive("neg").is_err());
        assert!(p.require_positive("word").is_err());
    }

    #[test]
    fn test_filtered_keeps_allowed_keys() {
        let p = params(json!({"speed": 1, "evil": 2}));
        let f = p.filtered(&["speed"]);
        assert!(f.contains("speed"));
        assert!(!f.contains("evil"));
    }
}
