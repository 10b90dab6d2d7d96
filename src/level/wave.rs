//! Wave scheduling
//!
//! The scheduler walks a stage's sorted waves and fires every wave whose time
//! has passed. A wave names what to spawn (`enemy`, `pickup` or `hazard`), how
//! many (`count`), where (`spawn_edge`, `formation` or `pattern`) and, for
//! enemies, how it moves (`movement`).
//!
//! Waves with more than [`SPAWNS_PER_FRAME`] positions are queued and drained
//! over several frames.

use super::pattern::{PatternRegistry, DEFAULT_OFFSET_Y};
use super::stage::Wave;
use crate::entity::params::vec2_to_value;
use crate::entity::{EntityCategory, SpawnEdge, SpawnParams};
use crate::error::GameError;
use crate::events::{EventManager, GameEvent};
use crate::item::ItemManager;
use crate::spawn::SpawnManager;
use glam::Vec2;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::collections::VecDeque;

pub const SPAWNS_PER_FRAME: usize = 15;
const QUEUE_WARN_SIZE: usize = 100;
const QUEUE_DRAIN_ALL_SIZE: usize = 500;

/// Level files may only override these enemy keys
pub const ALLOWED_ENEMY_PARAMS: &[&str] = &[
    "waypoints",
    "direction",
    "player_ref",
    "spawn_edge",
    "shoot_interval",
    "bullet_speed",
    "waypoint_speed",
    "speed",
    "aim_at_player",
    "health",
];

/// What the scheduler knows about the world when it spawns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveContext {
    pub screen: Vec2,
    pub player_center: Option<Vec2>,
}

/// Straight-line aim resolved per spawn position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AimTarget {
    Center,
    Player,
}

#[derive(Debug, Clone, PartialEq)]
struct WavePlan {
    category: EntityCategory,
    type_name: String,
    params: SpawnParams,
    aim: Option<AimTarget>,
    positions: Vec<Vec2>,
}

#[derive(Debug, Clone, PartialEq)]
struct PendingSpawn {
    category: EntityCategory,
    type_name: String,
    center: Vec2,
    params: SpawnParams,
}

pub struct WaveScheduler {
    waves: Vec<Wave>,
    index: usize,
    deferred: VecDeque<PendingSpawn>,
    remaining_enemies: i64,
    paused: bool,
    patterns: PatternRegistry,
    rng: StdRng,
}

impl Default for WaveScheduler {
    fn default() -> Self {
        WaveScheduler::with_rng(StdRng::from_entropy())
    }
}

impl WaveScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_seed(seed: u64) -> Self {
        WaveScheduler::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        WaveScheduler {
            waves: Vec::new(),
            index: 0,
            deferred: VecDeque::new(),
            remaining_enemies: 0,
            paused: false,
            patterns: PatternRegistry::default(),
            rng,
        }
    }

    /// Replaces the schedule with a stage's waves and resets the enemy count
    pub fn load_waves(&mut self, waves: Vec<Wave>) {
        debug!("Loaded {} wave(s)", waves.len());
        self.waves = waves;
        self.index = 0;
        self.deferred.clear();
        self.remaining_enemies = 0;
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            info!("Spawning {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Every wave fired and nothing left in the deferred queue
    pub fn waves_complete(&self) -> bool {
        self.index >= self.waves.len() && self.deferred.is_empty()
    }

    /// Enemies spawned by this schedule that have not been removed yet
    pub fn remaining_enemies(&self) -> i64 {
        self.remaining_enemies
    }

    pub fn on_enemy_destroyed(&mut self) {
        self.remaining_enemies -= 1;
    }

    pub fn update(
        &mut self,
        stage_timer: f32,
        spawner: &mut SpawnManager,
        items: &ItemManager,
        ctx: WaveContext,
        events: &mut EventManager,
    ) {
        if self.paused {
            return;
        }
        self.drain_deferred(spawner, events);

        while self.index < self.waves.len() && stage_timer >= self.waves[self.index].time {
            let entry = self.waves[self.index].entry.clone();
            self.index += 1;
            match self.plan(&entry, items, ctx) {
                Ok(plan) => self.trigger(plan, spawner, ctx, events),
                Err(e) => warn!("Skipping wave: {}", e),
            }
        }
    }

    fn plan(&mut self, entry: &SpawnParams, items: &ItemManager, ctx: WaveContext) -> Result<WavePlan, GameError> {
        let (category, type_name, mut params) = if let Some(enemy) = entry.str("enemy") {
            let params = nested(entry, "enemy_params").filtered(ALLOWED_ENEMY_PARAMS);
            params
                .require_positive("health")
                .map_err(|e| GameError::InvalidWave(e.to_string()))?;
            (EntityCategory::Enemy, enemy.to_string(), params)
        } else if let Some(item_id) = entry.str("pickup") {
            let mut item_params = nested(entry, "item_params");
            item_params.insert("item_id", json!(item_id));
            let resolved = items
                .wave_params(&item_params)
                .ok_or_else(|| GameError::InvalidWave(format!("unknown item '{}'", item_id)))?;
            item_params.merge(&resolved);
            (EntityCategory::Pickup, "item".to_string(), item_params)
        } else if let Some(hazard) = entry.str("hazard") {
            (EntityCategory::Hazard, hazard.to_string(), nested(entry, "hazard_params"))
        } else {
            return Err(GameError::InvalidWave(
                "missing 'enemy', 'pickup' or 'hazard' key".to_string(),
            ));
        };
        if type_name.is_empty() {
            return Err(GameError::InvalidWave("empty entity type".to_string()));
        }

        let count = entry.get("count").and_then(Value::as_i64).unwrap_or(1);
        if count <= 0 {
            return Err(GameError::InvalidWave(format!(
                "count must be positive, got {} for {}",
                count, type_name
            )));
        }

        let aim = if category == EntityCategory::Enemy {
            apply_movement(entry, &mut params)
        } else {
            None
        };
        if let Some(edge) = entry.str("spawn_edge") {
            params.insert("spawn_edge", json!(edge));
        }

        let positions = self.positions(entry, count as usize, ctx.screen);
        if positions.is_empty() {
            return Err(GameError::InvalidWave(format!("no valid positions for {}", type_name)));
        }

        Ok(WavePlan {
            category,
            type_name,
            params,
            aim,
            positions,
        })
    }

    fn trigger(&mut self, plan: WavePlan, spawner: &mut SpawnManager, ctx: WaveContext, events: &mut EventManager) {
        let WavePlan {
            category,
            type_name,
            params,
            aim,
            positions,
        } = plan;
        let total = positions.len();
        let deferred = total > SPAWNS_PER_FRAME;

        let mut spawned = 0;
        for center in positions {
            let mut spawn_params = params.clone();
            if let Some(aim) = aim {
                let direction = aim_direction(aim, center, ctx);
                spawn_params.insert("direction", vec2_to_value(direction));
            }
            let pending = PendingSpawn {
                category,
                type_name: type_name.clone(),
                center,
                params: spawn_params,
            };
            if deferred {
                self.deferred.push_back(pending);
            } else if self.spawn(pending, spawner, events) {
                spawned += 1;
            }
        }

        if deferred {
            debug!("Queued {} deferred spawns of {}", total, type_name);
        } else {
            if spawned < total {
                warn!("Wave spawn incomplete: {}/{} {}", spawned, total, type_name);
            }
            debug!("Wave: {} x{}", type_name, spawned);
        }
    }

    fn spawn(&mut self, pending: PendingSpawn, spawner: &mut SpawnManager, events: &mut EventManager) -> bool {
        match spawner.spawn_centered(pending.category, &pending.type_name, pending.center, &pending.params) {
            Ok(_) => {
                if pending.category == EntityCategory::Enemy {
                    self.remaining_enemies += 1;
                    if pending.type_name == "boss" {
                        info!("Boss spawned");
                        events.publish(GameEvent::BossSpawned);
                    }
                }
                true
            }
            Err(e) => {
                warn!("Wave spawn failed: {}", e);
                false
            }
        }
    }

    fn drain_deferred(&mut self, spawner: &mut SpawnManager, events: &mut EventManager) {
        let queued = self.deferred.len();
        if queued == 0 {
            return;
        }
        let batch = if queued > QUEUE_DRAIN_ALL_SIZE {
            warn!("Deferred spawn queue at {}, draining all", queued);
            queued
        } else {
            if queued > QUEUE_WARN_SIZE {
                warn!("Deferred spawn queue: {} pending", queued);
            }
            queued.min(SPAWNS_PER_FRAME)
        };

        let mut failed = 0;
        for _ in 0..batch {
            let Some(pending) = self.deferred.pop_front() else {
                break;
            };
            if !self.spawn(pending, spawner, events) {
                failed += 1;
            }
        }
        if failed > 0 {
            warn!("{}/{} deferred spawns failed this frame", failed, batch);
        }
    }

    fn positions(&mut self, entry: &SpawnParams, count: usize, screen: Vec2) -> Vec<Vec2> {
        let has_edge = entry.contains("spawn_edge");
        if let Some(formation) = entry.str("formation") {
            return self.formation_positions(entry, formation, count, screen);
        }
        if let Some(pattern) = entry.str("pattern") {
            let config = nested(entry, "pattern_config");
            return self.patterns.positions(pattern, count, screen.x, screen.y, &config);
        }
        if has_edge {
            return self.edge_positions(entry, count, screen);
        }
        warn!("Wave has no position config (spawn_edge, formation or pattern)");
        vec![Vec2::new(screen.x / 2.0, DEFAULT_OFFSET_Y); count]
    }

    fn edge_positions(&mut self, entry: &SpawnParams, count: usize, screen: Vec2) -> Vec<Vec2> {
        let edge = entry.str("spawn_edge").and_then(SpawnEdge::parse);
        let position = entry.f32_or("spawn_position", 0.5);
        let random = entry.get("spawn_position_random");
        let offset = Vec2::new(
            entry.f32_or("spawn_offset_x", 0.0),
            entry.f32_or("spawn_offset_y", DEFAULT_OFFSET_Y),
        );

        (0..count)
            .map(|_| {
                let t = match random {
                    Some(Value::Bool(true)) => self.rng.gen_range(0.0..=1.0),
                    Some(range) => {
                        let range = range.as_f64().unwrap_or(0.0).abs() as f32;
                        if range > 0.0 {
                            position + self.rng.gen_range(-range..=range)
                        } else {
                            position
                        }
                    }
                    None => position,
                }
                .clamp(0.0, 1.0);
                match edge {
                    Some(SpawnEdge::Top) => Vec2::new(t * screen.x + offset.x, offset.y),
                    Some(SpawnEdge::Bottom) => Vec2::new(t * screen.x + offset.x, screen.y + offset.y),
                    Some(SpawnEdge::Left) => Vec2::new(offset.x, t * screen.y + offset.y),
                    Some(SpawnEdge::Right) => Vec2::new(screen.x + offset.x, t * screen.y + offset.y),
                    None => Vec2::new(screen.x / 2.0, DEFAULT_OFFSET_Y),
                }
            })
            .collect()
    }

    fn formation_positions(&self, entry: &SpawnParams, formation: &str, count: usize, screen: Vec2) -> Vec<Vec2> {
        let Some(edge_name) = entry.str("spawn_edge") else {
            warn!("Formation '{}' requires 'spawn_edge'", formation);
            return Vec::new();
        };
        let mut config = nested(entry, "formation_config");
        config.insert("edge", json!(edge_name));

        // A single wave-level offset moves the formation away from its edge
        let vertical = SpawnEdge::parse(edge_name).is_none_or(|e| e.is_vertical());
        let (axis_key, legacy_key) = if vertical {
            ("offset_y", "spawn_offset_y")
        } else {
            ("offset_x", "spawn_offset_x")
        };
        let offset = entry.get("spawn_offset").or_else(|| entry.get(legacy_key));
        if let Some(offset) = offset {
            if !config.contains(axis_key) {
                config.insert(axis_key, offset.clone());
            }
        }
        self.patterns.positions(formation, count, screen.x, screen.y, &config)
    }
}

/// A nested object of the wave entry, empty when missing
fn nested(entry: &SpawnParams, key: &str) -> SpawnParams {
    entry
        .get(key)
        .and_then(Value::as_object)
        .map(|map| SpawnParams::from_map(map.clone()))
        .unwrap_or_default()
}

/// Translates `movement` into enemy params. An explicit `direction` from
/// `enemy_params` wins over the movement's own.
fn apply_movement(entry: &SpawnParams, params: &mut SpawnParams) -> Option<AimTarget> {
    let movement = nested(entry, "movement");
    let tuning = nested(&movement, "params");
    let move_type = movement.str("type").unwrap_or("straight");

    let explicit_direction = params.contains("direction");
    let mut set = |key: &str, value: Value| {
        if key != "direction" || !explicit_direction {
            params.insert(key, value);
        }
    };

    match move_type {
        "homing_continuous" => {
            set("homing", json!(true));
            set("turn_rate", json!(tuning.f32_or("turn_rate", 180.0)));
        }
        "homing_snapshot" | "homing_snapshot_axis" => {
            let mode = if move_type == "homing_snapshot" {
                "snapshot"
            } else {
                "snapshot_axis"
            };
            set("homing", json!(mode));
            set("lock_delay", json!(tuning.f32_or("lock_delay", 0.5)));
        }
        "straight" => match movement.str("target").unwrap_or("auto") {
            "auto" => {}
            "center" if !explicit_direction => return Some(AimTarget::Center),
            "player" if !explicit_direction => return Some(AimTarget::Player),
            "center" | "player" => {}
            other => {
                warn!("Unknown movement target '{}', moving down", other);
                set("direction", vec2_to_value(Vec2::Y));
            }
        },
        "stationary" => set("direction", vec2_to_value(Vec2::ZERO)),
        other => {
            warn!("Unknown movement type '{}', moving down", other);
            set("direction", vec2_to_value(Vec2::Y));
        }
    }
    None
}

/// Normalized direction from `from` toward the aim target. Player aim falls
/// back to the screen center when the player is gone.
fn aim_direction(aim: AimTarget, from: Vec2, ctx: WaveContext) -> Vec2 {
    let center = ctx.screen / 2.0;
    let target = match aim {
        AimTarget::Center => center,
        AimTarget::Player => ctx.player_center.unwrap_or(center),
    };
    (target - from).try_normalize().unwrap_or(Vec2::Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::definition::ItemDefinition;
    use crate::item::ItemEffect;
    use crate::spawn::EntityRegistry;

    const SCREEN: Vec2 = Vec2::new(1280.0, 720.0);
    const CTX: WaveContext = WaveContext {
        screen: SCREEN,
        player_center: None,
    };

    struct Harness {
        scheduler: WaveScheduler,
        spawner: SpawnManager,
        items: ItemManager,
        events: EventManager,
    }

    impl Harness {
        fn new(waves: Vec<(f32, Value)>) -> Self {
            let mut scheduler = WaveScheduler::with_seed(11);
            scheduler.load_waves(
                waves
                    .into_iter()
                    .map(|(time, entry)| Wave {
                        time,
                        entry: serde_json::from_value(entry).unwrap(),
                    })
                    .collect(),
            );
            Harness {
                scheduler,
                spawner: SpawnManager::new(EntityRegistry::with_defaults(), SCREEN),
                items: ItemManager::from_definitions(vec![ItemDefinition {
                    id: "medkit".to_string(),
                    name: "Medkit".to_string(),
                    color: (0, 255, 0),
                    drop_weight: 1.0,
                    effects: vec![ItemEffect::FullHeal],
                }]),
                events: EventManager::new(),
            }
        }

        fn tick(&mut self, stage_timer: f32) {
            self.scheduler
                .update(stage_timer, &mut self.spawner, &self.items, CTX, &mut self.events);
        }

        fn centers(&self) -> Vec<Vec2> {
            self.spawner.iter().map(|e| e.core().center()).collect()
        }
    }

    #[test]
    fn test_waves_fire_when_their_time_passes() {
        let mut h = Harness::new(vec![
            (0.0, json!({"enemy": "straight", "count": 2, "pattern": "line"})),
            (5.0, json!({"enemy": "homing", "spawn_edge": "top"})),
        ]);
        h.tick(0.0);
        assert_eq!(h.spawner.len(), 2);
        assert!(!h.scheduler.waves_complete());

        h.tick(4.9);
        assert_eq!(h.spawner.len(), 2);

        h.tick(5.0);
        assert_eq!(h.spawner.len(), 3);
        assert_eq!(h.scheduler.remaining_enemies(), 3);
        assert!(h.scheduler.waves_complete());

        h.scheduler.on_enemy_destroyed();
        assert_eq!(h.scheduler.remaining_enemies(), 2);
    }

    #[test]
    fn test_non_positive_count_is_skipped() {
        let mut h = Harness::new(vec![(0.0, json!({"enemy": "straight", "count": 0}))]);
        h.tick(1.0);
        assert!(h.spawner.is_empty());
        assert!(h.scheduler.waves_complete());
    }

    #[test]
    fn test_non_positive_enemy_health_is_skipped() {
        let mut h = Harness::new(vec![
            (0.0, json!({"enemy": "straight", "enemy_params": {"health": 0}})),
            (0.0, json!({"enemy": "straight", "enemy_params": {"health": 2}})),
        ]);
        h.tick(0.0);
        assert_eq!(h.spawner.len(), 1);
        assert_eq!(h.spawner.iter().next().unwrap().health_fraction(), Some(1.0));
    }

    #[test]
    fn test_large_waves_are_deferred() {
        let mut h = Harness::new(vec![(0.0, json!({"enemy": "straight", "count": 20, "pattern": "grid"}))]);
        h.tick(0.0);
        assert_eq!(h.spawner.len(), 0);
        assert_eq!(h.scheduler.deferred.len(), 20);
        assert!(!h.scheduler.waves_complete());

        h.tick(0.1);
        assert_eq!(h.spawner.len(), SPAWNS_PER_FRAME);
        h.tick(0.2);
        assert_eq!(h.spawner.len(), 20);
        assert!(h.scheduler.waves_complete());
        assert_eq!(h.scheduler.remaining_enemies(), 20);
    }

    #[test]
    fn test_edge_position_with_offsets() {
        let mut h = Harness::new(vec![(
            0.0,
            json!({"enemy": "straight", "spawn_edge": "left", "spawn_offset_x": -50, "spawn_offset_y": 0}),
        )]);
        h.tick(0.0);
        assert_eq!(h.centers(), vec![Vec2::new(-50.0, 360.0)]);
    }

    #[test]
    fn test_random_edge_position_stays_on_screen_span() {
        let mut h = Harness::new(vec![(
            0.0,
            json!({"enemy": "straight", "count": 10, "spawn_edge": "top", "spawn_position_random": true}),
        )]);
        h.tick(0.0);
        for center in h.centers() {
            assert!((0.0..=SCREEN.x).contains(&center.x));
            assert_eq!(center.y, DEFAULT_OFFSET_Y);
        }
    }

    #[test]
    fn test_formation_requires_edge() {
        let mut h = Harness::new(vec![(0.0, json!({"enemy": "straight", "formation": "line"}))]);
        h.tick(0.0);
        assert!(h.spawner.is_empty());
    }

    #[test]
    fn test_formation_offset_moves_away_from_edge() {
        let mut h = Harness::new(vec![(
            0.0,
            json!({"enemy": "straight", "count": 1, "formation": "line", "spawn_edge": "top", "spawn_offset": -40}),
        )]);
        h.tick(0.0);
        assert_eq!(h.centers(), vec![Vec2::new(640.0, -40.0)]);
    }

    #[test]
    fn test_missing_position_config_uses_default() {
        let mut h = Harness::new(vec![(0.0, json!({"enemy": "straight"}))]);
        h.tick(0.0);
        assert_eq!(h.centers(), vec![Vec2::new(640.0, DEFAULT_OFFSET_Y)]);
    }

    #[test]
    fn test_pause_stops_spawning() {
        let mut h = Harness::new(vec![(0.0, json!({"enemy": "straight"}))]);
        h.scheduler.set_paused(true);
        h.tick(1.0);
        assert!(h.spawner.is_empty());
        h.scheduler.set_paused(false);
        h.tick(1.0);
        assert_eq!(h.spawner.len(), 1);
    }

    #[test]
    fn test_pickup_waves_resolve_items() {
        let mut h = Harness::new(vec![
            (0.0, json!({"pickup": "medkit", "spawn_edge": "top"})),
            (0.0, json!({"pickup": "mystery", "spawn_edge": "top"})),
        ]);
        h.tick(0.0);
        assert_eq!(h.spawner.count_alive(EntityCategory::Pickup), 1);
        assert_eq!(h.scheduler.remaining_enemies(), 0);
    }

    #[test]
    fn test_boss_wave_publishes_spawn_event() {
        let mut h = Harness::new(vec![(0.0, json!({"enemy": "boss", "spawn_edge": "top"}))]);
        h.tick(0.0);
        assert_eq!(h.events.dispatch(), vec![GameEvent::BossSpawned]);
    }

    #[test]
    fn test_unknown_enemy_type_fails_quietly() {
        let mut h = Harness::new(vec![(0.0, json!({"enemy": "dragon", "spawn_edge": "top"}))]);
        h.tick(0.0);
        assert!(h.spawner.is_empty());
        assert_eq!(h.scheduler.remaining_enemies(), 0);
        assert_eq!(h.spawner.stats().total_failed, 1);
    }

    #[test]
    fn test_enemy_params_are_filtered() {
        let mut scheduler = WaveScheduler::with_seed(1);
        let entry: SpawnParams = serde_json::from_value(json!({
            "enemy": "shooter",
            "enemy_params": {"speed": 80, "exp": 9999, "shoot_interval": 2.0}
        }))
        .unwrap();
        let plan = scheduler.plan(&entry, &ItemManager::empty(), CTX).unwrap();
        assert!(plan.params.contains("speed"));
        assert!(plan.params.contains("shoot_interval"));
        assert!(!plan.params.contains("exp"));
    }

    #[test]
    fn test_movement_translation() {
        let entry = |movement: Value| -> SpawnParams {
            serde_json::from_value(json!({"enemy": "straight", "movement": movement})).unwrap()
        };

        let mut params = SpawnParams::new();
        let aim = apply_movement(&entry(json!({"type": "homing_continuous"})), &mut params);
        assert_eq!(aim, None);
        assert_eq!(params.get("homing"), Some(&json!(true)));
        assert_eq!(params.f32_or("turn_rate", 0.0), 180.0);

        let mut params = SpawnParams::new();
        apply_movement(&entry(json!({"type": "homing_snapshot_axis", "params": {"lock_delay": 1.0}})), &mut params);
        assert_eq!(params.str("homing"), Some("snapshot_axis"));
        assert_eq!(params.f32_or("lock_delay", 0.0), 1.0);

        let mut params = SpawnParams::new();
        apply_movement(&entry(json!({"type": "stationary"})), &mut params);
        assert_eq!(params.vec2("direction"), Some(Vec2::ZERO));

        let mut params = SpawnParams::new();
        let aim = apply_movement(&entry(json!({"type": "straight", "target": "player"})), &mut params);
        assert_eq!(aim, Some(AimTarget::Player));

        // Explicit direction wins
        let mut params = SpawnParams::new().with("direction", json!([1, 0]));
        let aim = apply_movement(&entry(json!({"type": "stationary"})), &mut params);
        assert_eq!(aim, None);
        assert_eq!(params.vec2("direction"), Some(Vec2::X));
    }

    #[test]
    fn test_aim_direction_fallbacks() {
        let from = Vec2::new(640.0, 0.0);
        assert_eq!(aim_direction(AimTarget::Center, from, CTX), Vec2::Y);

        let with_player = WaveContext {
            player_center: Some(Vec2::new(740.0, 0.0)),
            ..CTX
        };
        assert_eq!(aim_direction(AimTarget::Player, from, with_player), Vec2::X);

        // Player missing: aim at the center
        assert_eq!(aim_direction(AimTarget::Player, from, CTX), Vec2::Y);

        // Standing on the target
        assert_eq!(aim_direction(AimTarget::Center, SCREEN / 2.0, CTX), Vec2::Y);
    }
}
