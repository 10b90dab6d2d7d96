//! The player ship
//!
//! # Architecture
//!
//! - `config`: tuning loaded from `player.json`
//! - `movement`: acceleration, friction and clamping
//! - [`Player`]: health, shooting, i-frames, item effects and levels
//!
//! The player is a [`GameEntity`] so it takes part in collision like everything
//! else. Input arrives through [`Player::set_input`] before each update.

pub mod config;
pub mod movement;

pub use config::{ChargeLevel, PlayerConfig};

use crate::bullet::BulletRequest;
use crate::collision::hitbox::CollisionHitbox;
use crate::config::layers;
use crate::entity::{
    BulletOwner, CollisionTag, Contact, EntityCategory, EntityCore, GameEntity, InteractionState,
    LifecycleState, UpdateContext,
};
use crate::events::{EventManager, GameEvent};
use crate::input_system::PlayerInput;
use crate::item::ItemEffect;
use crate::progression::Progression;
use crate::stats::{Health, ModifierKind, StatBlock, StatModifier, StatType};
use glam::Vec2;
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Normal,
    DamagedModerate,
    DamagedCritical,
}

impl VisualState {
    pub fn from_health(fraction: f32) -> Self {
        if fraction <= 0.25 {
            VisualState::DamagedCritical
        } else if fraction <= 0.5 {
            VisualState::DamagedModerate
        } else {
            VisualState::Normal
        }
    }
}

/// Score and lives granted by item effects, for the session to apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectRewards {
    pub score: u32,
    pub lives: u32,
}

#[derive(Debug, Clone, Default)]
struct SpreadShot {
    cooldown_timer: f32,
    charging: bool,
    charge: f32,
    was_held: bool,
}

/// Fan angles in degrees, centered on straight up (-90)
pub fn spread_angles(level: &ChargeLevel) -> Vec<f32> {
    if level.count <= 1 {
        return vec![-90.0];
    }
    let half = level.angle / 2.0;
    let step = level.angle / (level.count - 1) as f32;
    (0..level.count).map(|i| -90.0 - half + step * i as f32).collect()
}

/// Highest level whose time `charge` has reached
pub fn charge_level(levels: &[ChargeLevel], charge: f32) -> Option<ChargeLevel> {
    let mut result = *levels.first()?;
    for level in levels {
        if charge >= level.time {
            result = *level;
        }
    }
    Some(result)
}

pub struct Player {
    core: EntityCore,
    config: PlayerConfig,
    pub health: Health,
    pub stats: StatBlock,
    pub progression: Progression,
    input: PlayerInput,
    shield: bool,
    shoot_timer: f32,
    spread: SpreadShot,
    /// Seconds of i-frames elapsed, `None` when vulnerable
    iframes: Option<f32>,
    visible: bool,
    visual: VisualState,
}

impl Player {
    /// Creates the ship centered on `center`
    pub fn new(center: Vec2, config: PlayerConfig) -> Self {
        let size = Vec2::from(config.size);
        let mut core = EntityCore::new(
            EntityCategory::Player,
            CollisionTag::Player,
            layers::PLAYER,
            center - size / 2.0,
            size,
            CollisionHitbox::rect_scaled(config.hitbox_scale),
        );
        core.sync_hitbox();
        Player {
            core,
            health: Health::new(config.health),
            stats: StatBlock::new(),
            progression: Progression::new(),
            input: PlayerInput::default(),
            shield: false,
            shoot_timer: config.shooting.cooldown,
            spread: SpreadShot {
                cooldown_timer: config.spread.cooldown,
                ..SpreadShot::default()
            },
            iframes: None,
            visible: true,
            visual: VisualState::Normal,
            config,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn set_input(&mut self, input: PlayerInput) {
        self.input = input;
    }

    pub fn is_alive(&self) -> bool {
        self.core.is_alive()
    }

    pub fn center(&self) -> Vec2 {
        self.core.center()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn visual_state(&self) -> VisualState {
        self.visual
    }

    pub fn speed(&self) -> f32 {
        self.stats.effective(StatType::MoveSpeed, self.config.speed)
    }

    pub fn fire_cooldown(&self) -> f32 {
        let rate = self.stats.effective(StatType::FireRate, 1.0).max(f32::EPSILON);
        self.config.shooting.cooldown / rate
    }

    pub fn bullet_damage(&self) -> f32 {
        self.stats.effective(StatType::Damage, self.config.shooting.damage)
    }

    fn start_iframes(&mut self) {
        self.iframes = Some(0.0);
        self.core.interaction = InteractionState::Intangible;
    }

    fn update_iframes(&mut self, dt: f32) {
        let Some(elapsed) = self.iframes else {
            return;
        };
        let elapsed = elapsed + dt;
        let blink = self.config.invincibility.blink_interval.max(f32::EPSILON);
        if elapsed >= self.config.invincibility.duration {
            self.iframes = None;
            self.visible = true;
            self.core.interaction = InteractionState::Default;
            debug!("Player vulnerable again");
        } else {
            self.iframes = Some(elapsed);
            self.visible = (elapsed / blink) as u32 % 2 == 0;
        }
    }

    /// Applies damage when the ship is vulnerable. Returns true if health was
    /// lost.
    pub fn take_damage(&mut self, amount: f32, events: &mut EventManager) -> bool {
        if !self.core.is_alive() || !self.core.interaction.allows_damage() || amount <= 0.0 {
            return false;
        }
        if self.shield {
            self.shield = false;
            self.start_iframes();
            info!("Shield absorbed a hit");
            return false;
        }

        let result = self.health.take_damage(amount);
        self.visual = VisualState::from_health(self.health.percentage());
        events.publish(GameEvent::PlayerHealthChanged {
            current: self.health.current(),
            max: self.health.max(),
        });
        if result.is_fatal {
            info!("Player destroyed");
            self.core.mark_dead(false);
            self.core.velocity = Vec2::ZERO;
        } else {
            debug!("Player hit for {} ({} left)", amount, self.health.current());
            self.start_iframes();
        }
        true
    }

    /// Adds exp and publishes `LevelUp` when a threshold is crossed
    pub fn add_exp(&mut self, amount: u32, events: &mut EventManager) -> u32 {
        let gained = self.progression.add_exp(amount as i64);
        if gained > 0 {
            info!("Player reached level {}", self.progression.level);
            events.publish(GameEvent::LevelUp {
                level: self.progression.level,
            });
        }
        gained
    }

    /// Applies item effects. Nothing happens while the ship is dead or dying.
    pub fn apply_effects(&mut self, effects: &[ItemEffect], source: &str) -> EffectRewards {
        let mut rewards = EffectRewards::default();
        if !self.core.is_alive() {
            return rewards;
        }
        for effect in effects {
            match *effect {
                ItemEffect::AddHealth { value } => {
                    self.health.heal(value);
                }
                ItemEffect::AddMaxHealth { value } => {
                    self.health.set_max(self.health.max() + value);
                    self.health.heal(value);
                }
                ItemEffect::FullHeal => self.health.fill(),
                ItemEffect::MultiplySpeed { value, duration } => self.stats.add(StatModifier::new(
                    StatType::MoveSpeed,
                    ModifierKind::Multiply,
                    value,
                    duration,
                    source,
                )),
                ItemEffect::MultiplyFireRate { value, duration } => self.stats.add(StatModifier::new(
                    StatType::FireRate,
                    ModifierKind::Multiply,
                    value,
                    duration,
                    source,
                )),
                ItemEffect::AddDamage { value, duration } => self.stats.add(StatModifier::new(
                    StatType::Damage,
                    ModifierKind::Add,
                    value,
                    duration,
                    source,
                )),
                ItemEffect::GrantShield => self.shield = true,
                ItemEffect::AddScore { value } => rewards.score += value,
                ItemEffect::AddLives { value } => rewards.lives += value,
            }
        }
        self.visual = VisualState::from_health(self.health.percentage());
        debug!("Applied {} effect(s) from {}", effects.len(), source);
        rewards
    }

    /// Brings the ship back at `center` with full health and fresh i-frames
    pub fn respawn(&mut self, center: Vec2) {
        self.core.reset(center - self.core.size / 2.0);
        self.health.fill();
        self.shield = false;
        self.visual = VisualState::Normal;
        self.shoot_timer = self.fire_cooldown();
        self.spread = SpreadShot {
            cooldown_timer: self.config.spread.cooldown,
            ..SpreadShot::default()
        };
        self.start_iframes();
        info!("Player respawned");
    }

    /// Full reset for a new run
    pub fn reset(&mut self, center: Vec2) {
        self.stats.clear();
        self.progression.reset();
        self.health = Health::new(self.config.health);
        self.respawn(center);
        self.iframes = None;
        self.visible = true;
        self.core.interaction = InteractionState::Default;
    }

    fn try_shoot(&mut self, dt: f32, ctx: &mut UpdateContext) {
        let cooldown = self.fire_cooldown();
        self.shoot_timer = (self.shoot_timer + dt).min(cooldown);
        if !self.input.fire || self.shoot_timer < cooldown {
            return;
        }
        self.shoot_timer = (self.shoot_timer - cooldown).max(0.0);
        let velocity = Vec2::from(self.config.shooting.bullet_velocity);
        ctx.bullets.push(
            BulletRequest::new(self.core.center(), velocity, BulletOwner::Player)
                .with_damage(self.bullet_damage()),
        );
    }

    fn update_spread(&mut self, dt: f32, ctx: &mut UpdateContext) {
        let held = self.input.spread;
        let spread = &mut self.spread;
        let config = &self.config.spread;
        spread.cooldown_timer = (spread.cooldown_timer + dt).min(config.cooldown);
        let pressed = held && !spread.was_held;
        let released = !held && spread.was_held;
        spread.was_held = held;
        if spread.cooldown_timer < config.cooldown {
            return;
        }

        if pressed {
            spread.charging = true;
            spread.charge = 0.0;
        }
        if spread.charging && held {
            let max_time = config.levels.last().map_or(0.0, |l| l.time);
            spread.charge = (spread.charge + dt).min(max_time);
        }
        if !(spread.charging && released) {
            return;
        }
        let level = charge_level(&config.levels, spread.charge);
        spread.charging = false;
        spread.charge = 0.0;
        spread.cooldown_timer = 0.0;

        let Some(level) = level else {
            return;
        };
        let damage = self.stats.effective(StatType::Damage, config.damage);
        let center = self.core.center();
        for angle in spread_angles(&level) {
            let rad = angle.to_radians();
            let velocity = Vec2::new(rad.cos(), rad.sin()) * config.speed;
            ctx.bullets
                .push(BulletRequest::new(center, velocity, BulletOwner::Player).with_damage(damage));
        }
        debug!("Spread shot: {} bullets over {} degrees", level.count, level.angle);
    }
}

impl GameEntity for Player {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "player"
    }

    fn update(&mut self, dt: f32, ctx: &mut UpdateContext) {
        match self.core.lifecycle {
            LifecycleState::Dead => return,
            LifecycleState::Dying => {
                self.core.mark_dead(false);
                return;
            }
            LifecycleState::Alive => {}
        }

        self.stats.update(dt);
        self.update_iframes(dt);

        let speed = self.speed();
        self.core.velocity =
            movement::step_velocity(self.core.velocity, self.input.movement, speed, &self.config.movement, dt);
        self.core.pos += self.core.velocity * dt;
        movement::clamp_to_screen(&mut self.core.pos, &mut self.core.velocity, self.core.size, ctx.screen);
        self.core.sync_hitbox();

        self.try_shoot(dt, ctx);
        self.update_spread(dt, ctx);
    }

    fn on_collision(&mut self, contact: &Contact, events: &mut EventManager) {
        match contact.other.tag {
            CollisionTag::Enemy | CollisionTag::EnemyBullet => {
                self.take_damage(contact.other.damage, events);
            }
            _ => {}
        }
    }

    fn health_fraction(&self) -> Option<f32> {
        Some(self.health.percentage())
    }

    fn color(&self) -> (u8, u8, u8) {
        if self.shield {
            (120, 200, 255)
        } else {
            self.config.color
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CollisionInfo;
    use crate::stats::PERMANENT;

    const SCREEN: Vec2 = Vec2::new(1280.0, 720.0);

    fn player() -> Player {
        Player::new(Vec2::new(640.0, 600.0), PlayerConfig::default())
    }

    fn ctx() -> UpdateContext {
        UpdateContext::new(SCREEN, None)
    }

    fn bullet_hit(damage: f32) -> Contact {
        Contact {
            other: CollisionInfo {
                id: 0,
                tag: CollisionTag::EnemyBullet,
                category: EntityCategory::Projectile,
                center: Vec2::ZERO,
                damage,
            },
            part: 0,
        }
    }

    fn fire_frames(player: &mut Player, frames: usize, dt: f32) -> usize {
        player.set_input(PlayerInput {
            fire: true,
            ..PlayerInput::default()
        });
        let mut ctx = ctx();
        for _ in 0..frames {
            player.update(dt, &mut ctx);
        }
        ctx.bullets.len()
    }

    #[test]
    fn test_hit_starts_iframes() {
        let mut player = player();
        let mut events = EventManager::new();

        player.on_collision(&bullet_hit(1.0), &mut events);
        assert_eq!(player.health.current(), 2.0);
        assert_eq!(player.core().interaction, InteractionState::Intangible);
        assert!(!player.core().collision_enabled());

        // Ignored while intangible
        assert!(!player.take_damage(1.0, &mut events));
        assert_eq!(player.health.current(), 2.0);

        let mut ctx = ctx();
        player.update(1.6, &mut ctx);
        assert_eq!(player.core().interaction, InteractionState::Default);
        assert!(player.visible());
        assert_eq!(events.pending(), 1);
    }

    #[test]
    fn test_blinks_during_iframes() {
        let mut player = player();
        let mut events = EventManager::new();
        player.take_damage(1.0, &mut events);

        let mut ctx = ctx();
        player.update(0.15, &mut ctx);
        assert!(!player.visible());
        player.update(0.1, &mut ctx);
        assert!(player.visible());
    }

    #[test]
    fn test_shield_absorbs_one_hit() {
        let mut player = player();
        let mut events = EventManager::new();
        player.apply_effects(&[ItemEffect::GrantShield], "shield");

        assert!(!player.take_damage(1.0, &mut events));
        assert_eq!(player.health.current(), 3.0);
        assert!(!player.shield);
        assert!(player.iframes.is_some());
    }

    #[test]
    fn test_fatal_damage_dies_over_two_updates() {
        let mut player = player();
        let mut events = EventManager::new();
        player.take_damage(5.0, &mut events);
        assert_eq!(player.core().lifecycle, LifecycleState::Dying);
        assert_eq!(player.visual_state(), VisualState::DamagedCritical);

        let mut ctx = ctx();
        player.update(0.016, &mut ctx);
        assert!(player.core().lifecycle.is_dead());

        player.respawn(Vec2::new(640.0, 600.0));
        assert!(player.is_alive());
        assert_eq!(player.health.current(), 3.0);
        assert!(player.iframes.is_some());
    }

    #[test]
    fn test_visual_state_thresholds() {
        assert_eq!(VisualState::from_health(1.0), VisualState::Normal);
        assert_eq!(VisualState::from_health(0.5), VisualState::DamagedModerate);
        assert_eq!(VisualState::from_health(0.25), VisualState::DamagedCritical);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut player = player();
        assert_eq!(fire_frames(&mut player, 20, 0.05), 10);
    }

    #[test]
    fn test_fire_rate_multiplier_shortens_cooldown() {
        let mut player = player();
        player.apply_effects(&[ItemEffect::MultiplyFireRate { value: 2.0, duration: 10.0 }], "rof");
        assert_eq!(fire_frames(&mut player, 20, 0.05), 20);
    }

    #[test]
    fn test_speed_buff_wears_off() {
        let mut player = player();
        player.apply_effects(&[ItemEffect::MultiplySpeed { value: 2.0, duration: 1.0 }], "boots");
        assert_eq!(player.speed(), 600.0);

        let mut ctx = ctx();
        for _ in 0..600 {
            player.update(crate::config::FIXED_DT, &mut ctx);
        }
        assert_eq!(player.speed(), 300.0);
        assert!(player.stats.is_empty());
    }

    #[test]
    fn test_damage_bonus_applies_to_bullets() {
        let mut player = player();
        player.apply_effects(&[ItemEffect::AddDamage { value: 1.0, duration: PERMANENT }], "dmg");
        player.set_input(PlayerInput {
            fire: true,
            ..PlayerInput::default()
        });
        let mut ctx = ctx();
        player.update(0.016, &mut ctx);
        assert_eq!(ctx.bullets[0].damage, Some(2.0));
        assert_eq!(ctx.bullets[0].vel, Vec2::new(0.0, -900.0));
    }

    #[test]
    fn test_spread_fires_on_release() {
        let mut player = player();
        let mut ctx = ctx();
        player.set_input(PlayerInput {
            spread: true,
            ..PlayerInput::default()
        });
        for _ in 0..6 {
            player.update(0.1, &mut ctx);
        }
        assert!(ctx.bullets.is_empty());
        assert!(player.spread.charging);

        player.set_input(PlayerInput::default());
        player.update(0.1, &mut ctx);
        assert_eq!(ctx.bullets.len(), 5);
        assert!(!player.spread.charging);
    }

    #[test]
    fn test_spread_angles_center_on_up() {
        let level = ChargeLevel {
            time: 0.0,
            count: 3,
            angle: 30.0,
        };
        assert_eq!(spread_angles(&level), vec![-105.0, -90.0, -75.0]);
        let single = ChargeLevel { count: 1, ..level };
        assert_eq!(spread_angles(&single), vec![-90.0]);
    }

    #[test]
    fn test_charge_level_picks_highest_reached() {
        let levels = PlayerConfig::default().spread.levels;
        assert_eq!(charge_level(&levels, 0.2).unwrap().count, 3);
        assert_eq!(charge_level(&levels, 0.7).unwrap().count, 5);
        assert_eq!(charge_level(&levels, 5.0).unwrap().count, 7);
        assert!(charge_level(&[], 1.0).is_none());
    }

    #[test]
    fn test_effects_and_rewards() {
        let mut player = player();
        let mut events = EventManager::new();
        player.take_damage(2.0, &mut events);

        let rewards = player.apply_effects(
            &[
                ItemEffect::AddHealth { value: 5.0 },
                ItemEffect::AddMaxHealth { value: 1.0 },
                ItemEffect::AddScore { value: 500 },
                ItemEffect::AddLives { value: 1 },
            ],
            "crate",
        );
        assert_eq!(player.health.max(), 4.0);
        assert_eq!(player.health.current(), 4.0);
        assert_eq!(rewards, EffectRewards { score: 500, lives: 1 });
    }

    #[test]
    fn test_effects_ignored_when_dead() {
        let mut player = player();
        let mut events = EventManager::new();
        player.take_damage(10.0, &mut events);
        let rewards = player.apply_effects(&[ItemEffect::AddScore { value: 100 }, ItemEffect::FullHeal], "x");
        assert_eq!(rewards, EffectRewards::default());
        assert_eq!(player.health.current(), 0.0);
    }

    #[test]
    fn test_level_up_publishes_event() {
        let mut player = player();
        let mut events = EventManager::new();
        assert_eq!(player.add_exp(30, &mut events), 1);
        assert_eq!(events.dispatch(), vec![GameEvent::LevelUp { level: 2 }]);
        assert_eq!(player.add_exp(0, &mut events), 0);
    }

    #[test]
    fn test_movement_stays_on_screen() {
        let mut player = player();
        player.set_input(PlayerInput {
            movement: Vec2::new(0.0, 1.0),
            ..PlayerInput::default()
        });
        let mut ctx = ctx();
        for _ in 0..120 {
            player.update(1.0 / 60.0, &mut ctx);
        }
        let rect = player.core().rect();
        assert_eq!(rect.bottom(), SCREEN.y);
        assert_eq!(player.core().velocity.y, 0.0);
    }
}
