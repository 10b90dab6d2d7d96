//! Item catalogue, loot rolls and pickup spawning

use super::definition::{ItemDefinition, ItemFile};
use super::pickup::PICKUP_SIZE;
use crate::config::load_json;
use crate::entity::{EntityCategory, EntityId, SpawnParams};
use crate::error::GameError;
use crate::spawn::SpawnManager;
use glam::Vec2;
use log::{info, warn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_DROP_CHANCE: f32 = 0.15;

pub struct ItemManager {
    definitions: HashMap<String, ItemDefinition>,
    loot_ids: Vec<String>,
    loot_table: Option<WeightedIndex<f32>>,
    pub drop_chance: f32,
}

impl ItemManager {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let file: ItemFile = load_json(path)?;
        let manager = ItemManager::from_definitions(file.items);
        info!("Loaded {} items from {}", manager.len(), path.display());
        Ok(manager)
    }

    /// Keeps the valid definitions, warning about the rest
    pub fn from_definitions(items: Vec<ItemDefinition>) -> Self {
        let mut definitions = HashMap::new();
        let mut loot_ids = Vec::new();
        let mut weights = Vec::new();

        for item in items {
            if let Err(e) = item.validate() {
                warn!("Skipping item: {}", e);
                continue;
            }
            if definitions.contains_key(&item.id) {
                warn!("Duplicate item id {}, keeping the first", item.id);
                continue;
            }
            if item.drop_weight > 0.0 {
                loot_ids.push(item.id.clone());
                weights.push(item.drop_weight);
            }
            definitions.insert(item.id.clone(), item);
        }

        let loot_table = WeightedIndex::new(&weights).ok();
        ItemManager {
            definitions,
            loot_ids,
            loot_table,
            drop_chance: DEFAULT_DROP_CHANCE,
        }
    }

    pub fn empty() -> Self {
        ItemManager::from_definitions(Vec::new())
    }

    pub fn definition(&self, id: &str) -> Option<&ItemDefinition> {
        self.definitions.get(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Parameters the pickup constructor reads
    pub fn spawn_params(&self, id: &str) -> Option<SpawnParams> {
        let def = self.definitions.get(id)?;
        let effects = serde_json::to_value(&def.effects).ok()?;
        Some(
            SpawnParams::new()
                .with("item_id", json!(def.id))
                .with("effects", effects)
                .with("color", json!([def.color.0, def.color.1, def.color.2])),
        )
    }

    /// Spawns a pickup centered on `center`. Unknown ids are rejected.
    pub fn spawn_item(&self, id: &str, center: Vec2, spawner: &mut SpawnManager) -> Option<EntityId> {
        let Some(params) = self.spawn_params(id) else {
            warn!("Unknown item id: {}", id);
            return None;
        };
        let pos = center - Vec2::splat(PICKUP_SIZE / 2.0);
        match spawner.spawn(EntityCategory::Pickup, "item", pos, &params) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!("Failed to spawn item {}: {}", id, e);
                None
            }
        }
    }

    /// Picks an item id by drop weight
    pub fn roll(&self, rng: &mut impl Rng) -> Option<&str> {
        let table = self.loot_table.as_ref()?;
        self.loot_ids.get(table.sample(rng)).map(String::as_str)
    }

    /// Rolls against `drop_chance` and spawns a weighted random item on success
    pub fn try_spawn_random(
        &self,
        center: Vec2,
        rng: &mut impl Rng,
        spawner: &mut SpawnManager,
    ) -> Option<EntityId> {
        if !rng.gen_bool(self.drop_chance.clamp(0.0, 1.0) as f64) {
            return None;
        }
        let id = self.roll(rng)?.to_string();
        self.spawn_item(&id, center, spawner)
    }

    /// Resolves the `item_params` of a level wave (`item_id` or `id`)
    pub fn wave_params(&self, item_params: &SpawnParams) -> Option<SpawnParams> {
        let id = item_params.str("item_id").or_else(|| item_params.str("id"))?;
        self.spawn_params(id)
    }
}
