// GameWorld struct and the per-tick update pipeline
//
// This module contains the GameWorld struct which owns the player, every
// spawned entity, the bullets and the level. It has no SDL dependency; the
// main loop feeds it input and draws what it holds.

use super::types::{Outcome, ScorePopup};
use crate::bullet::{BulletManager, BulletStyle};
use crate::collision::shapes::segment_circle_intersect;
use crate::collision::CollisionManager;
use crate::entity::{BulletOwner, EntityCategory, EntityId, GameEntity, UpdateContext};
use crate::events::{EventKind, EventManager, GameEvent};
use crate::input_system::PlayerInput;
use crate::item::ItemManager;
use crate::level::{LevelManager, WaveContext};
use crate::player::{Player, PlayerConfig};
use crate::session::{GameState, SessionStats};
use crate::spawn::manager::DEFAULT_PREWARM;
use crate::spawn::{EntityRegistry, SpawnManager};
use glam::Vec2;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

/// Score awarded per point of enemy exp
pub const SCORE_PER_EXP: u32 = 10;

/// Distance of the ship's spawn point above the bottom edge
const PLAYER_START_OFFSET: f32 = 100.0;

const BULLET_PREWARM: usize = 200;

/// Short-lived types worth recycling
const POOLED_TYPES: &[(EntityCategory, &str)] = &[
    (EntityCategory::Enemy, "straight"),
    (EntityCategory::Enemy, "homing"),
    (EntityCategory::Pickup, "item"),
];

/// GameWorld encapsulates all game entities and world state
pub struct GameWorld {
    pub player: Player,
    pub bullets: BulletManager,
    pub spawner: SpawnManager,
    pub collision: CollisionManager,
    pub level: LevelManager,
    pub items: ItemManager,
    pub events: EventManager,
    pub stats: SessionStats,
    pub state: GameState,
    screen: Vec2,
    rng: StdRng,
    popups: Vec<ScorePopup>,
}

impl GameWorld {
    pub fn new(
        screen: Vec2,
        player_config: PlayerConfig,
        level: LevelManager,
        items: ItemManager,
        start_lives: u32,
    ) -> Self {
        let mut bullets = BulletManager::new(screen);
        bullets.prewarm_pool(BULLET_PREWARM);
        let shooting = &player_config.shooting;
        bullets.set_style(
            BulletOwner::Player,
            BulletStyle {
                color: shooting.bullet_color,
                radius: shooting.bullet_radius,
                damage: shooting.damage,
            },
        );

        let mut events = EventManager::new();
        events.subscribe(
            EventKind::PlayerHealthChanged,
            Box::new(|event| {
                if let GameEvent::PlayerHealthChanged { current, max } = event {
                    debug!("Player health {}/{}", current, max);
                }
            }),
        );

        GameWorld {
            player: Player::new(Self::player_start(screen), player_config),
            bullets,
            spawner: Self::build_spawner(EntityRegistry::with_defaults(), screen),
            collision: CollisionManager::new(screen.x, screen.y),
            level,
            items,
            events,
            stats: SessionStats::new(),
            state: GameState::new(start_lives),
            screen,
            rng: StdRng::from_entropy(),
            popups: Vec::new(),
        }
    }

    /// Replaces the built-in entity registry, e.g. one carrying enemy defaults
    pub fn with_entity_registry(mut self, registry: EntityRegistry) -> Self {
        self.spawner = Self::build_spawner(registry, self.screen);
        self
    }

    fn build_spawner(registry: EntityRegistry, screen: Vec2) -> SpawnManager {
        let mut spawner = SpawnManager::new(registry, screen);
        for &(category, type_name) in POOLED_TYPES {
            if let Err(e) = spawner.enable_pooling(category, type_name, DEFAULT_PREWARM) {
                warn!("Pooling disabled for {}: {}", type_name, e);
            }
        }
        spawner.set_on_entity_destroyed(Box::new(|entity| {
            debug!("Removed {} #{}", entity.type_name(), entity.core().id);
        }));
        spawner
    }

    #[cfg(test)]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn player_start(screen: Vec2) -> Vec2 {
        Vec2::new(screen.x / 2.0, screen.y - PLAYER_START_OFFSET)
    }

    pub fn screen(&self) -> Vec2 {
        self.screen
    }

    /// Score pop-ups gathered since the last call
    pub fn take_popups(&mut self) -> Vec<ScorePopup> {
        std::mem::take(&mut self.popups)
    }

    /// Advances the world by one fixed tick
    pub fn update(&mut self, dt: f32, input: &PlayerInput) -> Outcome {
        if self.state.game_over {
            return Outcome::GameOver;
        }
        if self.state.victory {
            return Outcome::Victory;
        }
        if self.state.paused {
            return Outcome::Running;
        }
        self.stats.tick(dt);

        // 1. Player
        self.player.set_input(*input);
        let player_center = self.player.is_alive().then(|| self.player.center());
        let mut ctx = UpdateContext::new(self.screen, player_center);
        self.player.update(dt, &mut ctx);

        // 2. Level and waves
        let wave_ctx = WaveContext {
            screen: self.screen,
            player_center,
        };
        self.level
            .update(dt, &mut self.spawner, &self.items, wave_ctx, &mut self.events);

        // 3. Spawned entities
        self.spawner.update(dt, &mut ctx);
        self.events.extend(ctx.events.drain(..));

        // 4-5. Bullets
        for request in ctx.bullets.drain(..) {
            self.bullets.spawn(request);
        }
        self.bullets.update(dt);

        // 6. Collision
        self.resolve_collisions();

        // 7. Events
        for event in self.events.dispatch() {
            self.handle_event(event);
        }

        // 8. Cleanup
        self.cleanup();

        // 9. Outcome
        self.check_outcome()
    }

    fn resolve_collisions(&mut self) {
        let mut entities: Vec<&mut dyn GameEntity> =
            Vec::with_capacity(1 + self.spawner.len() + self.bullets.active_count());
        entities.push(&mut self.player);
        for entity in self.spawner.iter_mut() {
            entities.push(entity.as_mut());
        }
        for bullet in self.bullets.active_mut() {
            entities.push(bullet);
        }
        self.collision.resolve(&mut entities, &mut self.events);
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::EnemyDied {
                position,
                type_tag,
                exp,
            } => {
                self.player.add_exp(exp, &mut self.events);
                self.stats.record_exp(exp);
                self.stats.record_kill(&type_tag);
                let score = exp * SCORE_PER_EXP;
                if score > 0 {
                    self.add_score(score);
                    self.popups.push(ScorePopup { position, score });
                }
                self.items
                    .try_spawn_random(position, &mut self.rng, &mut self.spawner);
            }
            GameEvent::ItemCollected { item_id, effects } => {
                let rewards = self.player.apply_effects(&effects, &item_id);
                self.stats.record_item();
                if rewards.score > 0 {
                    self.add_score(rewards.score);
                }
                self.state.add_lives(rewards.lives);
                self.events.publish(GameEvent::PlayerHealthChanged {
                    current: self.player.health.current(),
                    max: self.player.health.max(),
                });
                debug!("Collected {}", item_id);
            }
            GameEvent::HazardDamage {
                position,
                radius,
                damage,
            } => {
                if self.player.is_alive() && self.player.center().distance(position) <= radius {
                    self.player.take_damage(damage, &mut self.events);
                }
            }
            GameEvent::BeamHit {
                start,
                end,
                width,
                damage,
            } => {
                let hitbox = self.player.core().hitbox.rect;
                let reach = hitbox.w.min(hitbox.h) / 2.0 + width / 2.0;
                if self.player.is_alive() && segment_circle_intersect(start, end, hitbox.center(), reach) {
                    self.player.take_damage(damage, &mut self.events);
                }
            }
            GameEvent::BulletClear {
                owner,
                center,
                radius,
            } => {
                self.bullets.clear_radius(owner, center, radius);
            }
            GameEvent::SpawnPause { paused } => self.level.set_paused(paused),
            GameEvent::BossSpawned => info!("Boss incoming"),
            GameEvent::BossDefeated => {
                info!("Boss defeated");
                self.level.notify_boss_defeated();
            }
            GameEvent::LevelUp { level } => {
                self.stats.record_level(level);
                self.state.level = level;
            }
            GameEvent::LevelComplete => self.state.victory = true,
            // Logged by the subscriber installed in `new`
            GameEvent::PlayerHealthChanged { .. } => {}
        }
    }

    fn add_score(&mut self, amount: u32) {
        self.stats.add_score(amount);
        self.state.score = self.stats.score;
    }

    fn cleanup(&mut self) {
        for (_, category) in self.spawner.cleanup() {
            if category == EntityCategory::Enemy {
                self.level.notify_enemy_destroyed();
            }
        }

        let mut alive: HashSet<EntityId> = HashSet::new();
        if self.player.is_alive() {
            alive.insert(self.player.core().id);
        }
        alive.extend(self.spawner.iter().map(|e| e.core().id));
        alive.extend(self.bullets.active().iter().map(|b| b.core().id));
        self.collision.update(|id| alive.contains(&id));
    }

    fn check_outcome(&mut self) -> Outcome {
        if self.player.core().lifecycle.is_dead() {
            if self.state.lose_life() {
                info!("Game over with {} points", self.stats.score);
                return Outcome::GameOver;
            }
            let start = Self::player_start(self.screen);
            self.player.respawn(start);
            // Give the ship room to breathe
            self.bullets
                .clear_radius(BulletOwner::Enemy, start, self.screen.length());
            self.spawner.cleanup_by_category(EntityCategory::Hazard);
            info!("Life lost, {} left", self.state.lives);
            return Outcome::LifeLost;
        }
        if self.state.victory {
            info!("Victory with {} points", self.stats.score);
            return Outcome::Victory;
        }
        Outcome::Running
    }

    /// Starts a fresh run on the same level, keeping the high score
    pub fn reset(&mut self) {
        debug!("Spawn stats for the finished run: {:?}", self.spawner.stats());
        self.player.reset(Self::player_start(self.screen));
        self.bullets.cleanup();
        self.spawner.reset();
        self.collision = CollisionManager::new(self.screen.x, self.screen.y);
        self.level.reset();
        self.events.clear();
        self.stats.reset();
        self.state.reset();
        self.popups.clear();
    }
}
