//! Maps `(category, type name)` to entity constructors

use crate::enemy::{Boss, Enemy};
use crate::entity::{EntityCategory, GameEntity, SpawnParams};
use crate::config::load_json;
use crate::error::GameError;
use crate::hazard::Mine;
use crate::item::Pickup;
use glam::Vec2;
use log::{info, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

pub type Constructor = fn(Vec2, &SpawnParams) -> Box<dyn GameEntity>;

type Key = (EntityCategory, String);

#[derive(Clone, Default)]
pub struct EntityRegistry {
    constructors: HashMap<Key, Constructor>,
    /// Per-type parameters that spawn parameters are laid over
    defaults: HashMap<Key, SpawnParams>,
}

fn straight(pos: Vec2, params: &SpawnParams) -> Box<dyn GameEntity> {
    Box::new(Enemy::straight(pos, params))
}

fn homing(pos: Vec2, params: &SpawnParams) -> Box<dyn GameEntity> {
    Box::new(Enemy::homing(pos, params))
}

fn shooter(pos: Vec2, params: &SpawnParams) -> Box<dyn GameEntity> {
    Box::new(Enemy::shooter(pos, params))
}

fn waypoint(pos: Vec2, params: &SpawnParams) -> Box<dyn GameEntity> {
    Box::new(Enemy::waypoint(pos, params))
}

fn boss(pos: Vec2, params: &SpawnParams) -> Box<dyn GameEntity> {
    Box::new(Boss::new(pos, params))
}

fn pickup(pos: Vec2, params: &SpawnParams) -> Box<dyn GameEntity> {
    Box::new(Pickup::from_params(pos, params))
}

fn mine(pos: Vec2, params: &SpawnParams) -> Box<dyn GameEntity> {
    Box::new(Mine::new(pos, params))
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in entity type
    pub fn with_defaults() -> Self {
        let mut registry = EntityRegistry::new();
        registry.register(EntityCategory::Enemy, "straight", straight);
        registry.register(EntityCategory::Enemy, "homing", homing);
        registry.register(EntityCategory::Enemy, "shooter", shooter);
        registry.register(EntityCategory::Enemy, "waypoint", waypoint);
        registry.register(EntityCategory::Enemy, "boss", boss);
        registry.register(EntityCategory::Pickup, "item", pickup);
        registry.register(EntityCategory::Hazard, "mine", mine);
        registry
    }

    pub fn register(&mut self, category: EntityCategory, type_name: &str, constructor: Constructor) {
        self.constructors
            .insert((category, type_name.to_string()), constructor);
    }

    pub fn has(&self, category: EntityCategory, type_name: &str) -> bool {
        self.constructors
            .contains_key(&(category, type_name.to_string()))
    }

    pub fn create(
        &self,
        category: EntityCategory,
        type_name: &str,
        pos: Vec2,
        params: &SpawnParams,
    ) -> Result<Box<dyn GameEntity>, GameError> {
        let constructor = self
            .constructors
            .get(&(category, type_name.to_string()))
            .ok_or_else(|| GameError::UnknownEntity {
                category,
                type_name: type_name.to_string(),
            })?;
        Ok(constructor(pos, &self.resolve_params(category, type_name, params)))
    }

    pub fn set_defaults(&mut self, category: EntityCategory, type_name: &str, params: SpawnParams) {
        self.defaults.insert((category, type_name.to_string()), params);
    }

    /// Reads enemy defaults from `enemies.json`, a map of type name to params
    ///
    /// Entries for unregistered types, and entries whose `health` or
    /// `part_health` is not positive, are skipped with a warning. Returns how
    /// many entries were applied.
    pub fn load_enemy_defaults(&mut self, path: impl AsRef<Path>) -> Result<usize, GameError> {
        let path = path.as_ref();
        let data: Map<String, Value> = load_json(path)?;
        let mut applied = 0;
        for (type_name, value) in data {
            let Value::Object(params) = value else {
                warn!("Enemy defaults for {} are not an object", type_name);
                continue;
            };
            if !self.has(EntityCategory::Enemy, &type_name) {
                warn!("Enemy defaults for unknown type {}", type_name);
                continue;
            }
            let params = SpawnParams::from_map(params);
            if let Err(e) = params
                .require_positive("health")
                .and_then(|_| params.require_positive("part_health"))
            {
                warn!("Skipping enemy defaults for {}: {}", type_name, e);
                continue;
            }
            self.set_defaults(EntityCategory::Enemy, &type_name, params);
            applied += 1;
        }
        info!("Loaded defaults for {} enemy types from {}", applied, path.display());
        Ok(applied)
    }

    /// `params` laid over the type's defaults
    pub fn resolve_params(&self, category: EntityCategory, type_name: &str, params: &SpawnParams) -> SpawnParams {
        match self.defaults.get(&(category, type_name.to_string())) {
            Some(defaults) => {
                let mut merged = defaults.clone();
                merged.merge(params);
                merged
            }
            None => params.clone(),
        }
    }

    /// Registered type names in a category, sorted
    pub fn names(&self, category: EntityCategory) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .constructors
            .keys()
            .filter(|(c, _)| *c == category)
            .map(|(_, name)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
