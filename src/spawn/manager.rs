//! Owns every spawned enemy, pickup and hazard
//!
//! Bullets are handled separately by `BulletManager`.
//! Types can opt into pooling: dead instances are kept and revived through
//! `GameEntity::reset_from` on the next spawn of that type.

use super::registry::EntityRegistry;
use crate::config::bounds::SPAWN_WARN_DISTANCE;
use crate::entity::{EntityCategory, EntityId, GameEntity, SpawnParams, UpdateContext};
use crate::error::GameError;
use glam::Vec2;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

pub const DEFAULT_PREWARM: usize = 20;

type Key = (EntityCategory, String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnStats {
    pub total_spawned: u64,
    pub total_failed: u64,
    pub pooled_spawns: u64,
    pub new_spawns: u64,
}

pub type DestroyedHook = Box<dyn FnMut(&dyn GameEntity)>;

pub struct SpawnManager {
    registry: EntityRegistry,
    entities: Vec<Box<dyn GameEntity>>,
    pools: HashMap<Key, Vec<Box<dyn GameEntity>>>,
    pooled_types: HashSet<Key>,
    validated: HashMap<Key, bool>,
    stats: SpawnStats,
    screen: Vec2,
    on_entity_destroyed: Option<DestroyedHook>,
}

impl SpawnManager {
    pub fn new(registry: EntityRegistry, screen: Vec2) -> Self {
        SpawnManager {
            registry,
            entities: Vec::new(),
            pools: HashMap::new(),
            pooled_types: HashSet::new(),
            validated: HashMap::new(),
            stats: SpawnStats::default(),
            screen,
            on_entity_destroyed: None,
        }
    }

    pub fn set_on_entity_destroyed(&mut self, hook: DestroyedHook) {
        self.on_entity_destroyed = Some(hook);
    }

    fn validate(&mut self, category: EntityCategory, type_name: &str) -> bool {
        let key = (category, type_name.to_string());
        if let Some(valid) = self.validated.get(&key) {
            return *valid;
        }
        let valid = self.registry.has(category, type_name);
        if !valid {
            warn!("Unknown entity type {}/{}", category.as_str(), type_name);
        }
        self.validated.insert(key, valid);
        valid
    }

    fn is_far_offscreen(&self, pos: Vec2) -> bool {
        pos.x < -SPAWN_WARN_DISTANCE
            || pos.y < -SPAWN_WARN_DISTANCE
            || pos.x > self.screen.x + SPAWN_WARN_DISTANCE
            || pos.y > self.screen.y + SPAWN_WARN_DISTANCE
    }

    /// Spawns an entity at `pos` (top-left) and returns its id
    pub fn spawn(
        &mut self,
        category: EntityCategory,
        type_name: &str,
        pos: Vec2,
        params: &SpawnParams,
    ) -> Result<EntityId, GameError> {
        if !self.validate(category, type_name) {
            self.stats.total_failed += 1;
            return Err(GameError::UnknownEntity {
                category,
                type_name: type_name.to_string(),
            });
        }
        if self.is_far_offscreen(pos) {
            warn!(
                "Spawning {}/{} far outside the screen at ({:.0}, {:.0})",
                category.as_str(),
                type_name,
                pos.x,
                pos.y
            );
        }

        let key = (category, type_name.to_string());
        let reused = self.pools.get_mut(&key).and_then(Vec::pop);
        let entity = match reused {
            Some(mut entity) => {
                entity.reset_from(pos, &self.registry.resolve_params(category, type_name, params));
                self.stats.pooled_spawns += 1;
                entity
            }
            None => {
                let entity = self.registry.create(category, type_name, pos, params)?;
                self.stats.new_spawns += 1;
                entity
            }
        };

        self.stats.total_spawned += 1;
        let id = entity.core().id;
        debug!("Spawned {}/{} #{}", category.as_str(), type_name, id);
        self.entities.push(entity);
        Ok(id)
    }

    /// Turns on pooling for a type and fills its pool
    pub fn enable_pooling(
        &mut self,
        category: EntityCategory,
        type_name: &str,
        prewarm: usize,
    ) -> Result<(), GameError> {
        let key = (category, type_name.to_string());
        let offscreen = Vec2::new(-SPAWN_WARN_DISTANCE / 2.0, -SPAWN_WARN_DISTANCE / 2.0);
        let pool = self.pools.entry(key.clone()).or_default();
        for _ in 0..prewarm {
            let mut entity = self
                .registry
                .create(category, type_name, offscreen, &SpawnParams::new())?;
            entity.core_mut().mark_dead(true);
            pool.push(entity);
        }
        self.pooled_types.insert(key);
        info!(
            "Pooling enabled for {}/{} ({} prewarmed)",
            category.as_str(),
            type_name,
            prewarm
        );
        Ok(())
    }

    /// Updates every entity that is not yet `Dead`
    pub fn update(&mut self, dt: f32, ctx: &mut UpdateContext) {
        for entity in &mut self.entities {
            if !entity.core().lifecycle.is_dead() {
                entity.update(dt, ctx);
            }
        }
    }

    /// Spawns an entity and moves it so its center sits on `center`
    pub fn spawn_centered(
        &mut self,
        category: EntityCategory,
        type_name: &str,
        center: Vec2,
        params: &SpawnParams,
    ) -> Result<EntityId, GameError> {
        let id = self.spawn(category, type_name, center, params)?;
        if let Some(entity) = self.entities.last_mut() {
            let core = entity.core_mut();
            core.set_center(center);
            core.sync_hitbox();
        }
        Ok(id)
    }

    /// Removes dead entities, returning their ids and categories
    pub fn cleanup(&mut self) -> Vec<(EntityId, EntityCategory)> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.entities.len());
        for entity in self.entities.drain(..) {
            if !entity.core().lifecycle.is_dead() {
                kept.push(entity);
                continue;
            }
            if let Some(hook) = self.on_entity_destroyed.as_mut() {
                hook(entity.as_ref());
            }
            removed.push((entity.core().id, entity.core().category));
            let key = (entity.core().category, entity.type_name().to_string());
            if self.pooled_types.contains(&key) {
                self.pools.entry(key).or_default().push(entity);
            }
        }
        self.entities = kept;
        removed
    }

    /// Removes every entity of `category` regardless of state
    pub fn cleanup_by_category(&mut self, category: EntityCategory) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| e.core().category != category);
        before - self.entities.len()
    }

    pub fn entities_by_category(&self, category: EntityCategory) -> Vec<&dyn GameEntity> {
        self.entities
            .iter()
            .filter(|e| e.core().category == category)
            .map(|e| e.as_ref())
            .collect()
    }

    pub fn count_alive(&self, category: EntityCategory) -> usize {
        self.entities
            .iter()
            .filter(|e| e.core().category == category && e.core().is_alive())
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn GameEntity> {
        self.entities.iter().map(|e| e.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn GameEntity>> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn stats(&self) -> SpawnStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SpawnStats::default();
    }

    /// Drops all live entities and statistics. Pools stay warm.
    pub fn reset(&mut self) {
        self.entities.clear();
        self.reset_stats();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn manager() -> SpawnManager {
        SpawnManager::new(EntityRegistry::with_defaults(), Vec2::new(1280.0, 720.0))
    }

    fn pooled(manager: &SpawnManager) -> usize {
        manager
            .pools
            .get(&(EntityCategory::Enemy, "straight".to_string()))
            .map_or(0, Vec::len)
    }

    fn find(manager: &SpawnManager, id: EntityId) -> &dyn GameEntity {
        manager.iter().find(|e| e.core().id == id).unwrap()
    }

    fn spawn_straight(manager: &mut SpawnManager) -> EntityId {
        manager
            .spawn(EntityCategory::Enemy, "straight", Vec2::new(100.0, 100.0), &SpawnParams::new())
            .unwrap()
    }

    #[test]
    fn test_unknown_type_counts_failure() {
        let mut manager = manager();
        let params = SpawnParams::new();
        assert!(manager.spawn(EntityCategory::Enemy, "ghost", Vec2::ZERO, &params).is_err());
        assert!(manager.spawn(EntityCategory::Enemy, "ghost", Vec2::ZERO, &params).is_err());

        let stats = manager.stats();
        assert_eq!(stats.total_failed, 2);
        assert_eq!(stats.total_spawned, 0);
    }

    #[test]
    fn test_cleanup_removes_dead_and_calls_hook() {
        let mut manager = manager();
        let destroyed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&destroyed);
        manager.set_on_entity_destroyed(Box::new(move |_| counter.set(counter.get() + 1)));

        let first = spawn_straight(&mut manager);
        spawn_straight(&mut manager);
        for entity in manager.iter_mut() {
            if entity.core().id == first {
                entity.core_mut().mark_dead(true);
            }
        }

        assert_eq!(manager.cleanup(), vec![(first, EntityCategory::Enemy)]);
        assert_eq!(manager.len(), 1);
        assert_eq!(destroyed.get(), 1);
    }

    #[test]
    fn test_dying_entities_survive_cleanup() {
        let mut manager = manager();
        spawn_straight(&mut manager);
        for entity in manager.iter_mut() {
            entity.core_mut().mark_dead(false);
        }
        assert!(manager.cleanup().is_empty());
        assert_eq!(manager.count_alive(EntityCategory::Enemy), 0);
    }

    #[test]
    fn test_pooled_types_are_reused() {
        let mut manager = manager();
        manager
            .enable_pooling(EntityCategory::Enemy, "straight", 2)
            .unwrap();
        assert_eq!(pooled(&manager), 2);

        spawn_straight(&mut manager);
        assert_eq!(pooled(&manager), 1);
        assert_eq!(manager.stats().pooled_spawns, 1);

        for entity in manager.iter_mut() {
            entity.core_mut().mark_dead(true);
        }
        manager.cleanup();
        assert_eq!(pooled(&manager), 2);

        let id = spawn_straight(&mut manager);
        let revived = find(&manager, id);
        assert!(revived.core().is_alive());
        assert_eq!(revived.core().pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_spawn_centered_moves_entity() {
        let mut manager = manager();
        let center = Vec2::new(640.0, -100.0);
        let id = manager
            .spawn_centered(EntityCategory::Enemy, "straight", center, &SpawnParams::new())
            .unwrap();
        assert_eq!(find(&manager, id).core().center(), center);
    }

    #[test]
    fn test_category_queries() {
        let mut manager = manager();
        spawn_straight(&mut manager);
        manager
            .spawn(EntityCategory::Hazard, "mine", Vec2::new(200.0, 0.0), &SpawnParams::new())
            .unwrap();

        assert_eq!(manager.entities_by_category(EntityCategory::Hazard).len(), 1);
        assert_eq!(manager.cleanup_by_category(EntityCategory::Enemy), 1);
        assert_eq!(manager.len(), 1);

        manager.reset();
        assert!(manager.is_empty());
        assert_eq!(manager.stats(), SpawnStats::default());
    }
}
