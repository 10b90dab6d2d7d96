//! Enemies
//!
//! - `movement`: [`Movement`], the per-type steering behaviors
//! - `boss`: [`Boss`], the multi-part boss
//! - `boss_attack`: the boss attack patterns and their scheduler
//!
//! The four regular enemy types share [`Enemy`] and differ only in defaults,
//! movement and whether they carry a [`Gun`].
//!
//! Enemies only take damage inside the damageable region (50 px inside every
//! screen edge) and while their interaction state is `Default`. Killing one
//! publishes `EnemyDied`.

pub mod boss;
pub mod boss_attack;
pub mod movement;

pub use boss::Boss;
pub use movement::Movement;

use crate::bullet::BulletRequest;
use crate::collision::hitbox::{CollisionHitbox, HitboxShape};
use crate::config::bounds::{ENEMY_CLEANUP_MARGIN, ENEMY_DAMAGE_MARGIN};
use crate::config::layers;
use crate::entity::{
    BulletOwner, CollisionTag, Contact, DrawShape, EntityCategory, EntityCore, GameEntity,
    SpawnParams, UpdateContext,
};
use crate::events::{EventManager, GameEvent};
use crate::stats::Health;
use glam::Vec2;
use log::debug;
use movement::{homing_from_params, initial_direction, DEFAULT_TURN_RATE};

pub const CONTACT_DAMAGE: f32 = 1.0;
pub const SHOOTER_ARRIVE_DISTANCE: f32 = 5.0;
pub const WAYPOINT_ARRIVE_DISTANCE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Straight,
    Homing,
    Shooter,
    Waypoint,
}

struct KindDefaults {
    speed: f32,
    health: f32,
    size: f32,
    exp: u32,
    color: (u8, u8, u8),
}

impl EnemyKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            EnemyKind::Straight => "straight",
            EnemyKind::Homing => "homing",
            EnemyKind::Shooter => "shooter",
            EnemyKind::Waypoint => "waypoint",
        }
    }

    fn defaults(&self) -> KindDefaults {
        match self {
            EnemyKind::Straight => KindDefaults {
                speed: 100.0,
                health: 1.0,
                size: 40.0,
                exp: 5,
                color: (220, 60, 60),
            },
            EnemyKind::Homing => KindDefaults {
                speed: 150.0,
                health: 1.0,
                size: 36.0,
                exp: 8,
                color: (200, 80, 220),
            },
            EnemyKind::Shooter => KindDefaults {
                speed: 100.0,
                health: 2.0,
                size: 60.0,
                exp: 12,
                color: (255, 128, 0),
            },
            EnemyKind::Waypoint => KindDefaults {
                speed: 120.0,
                health: 1.0,
                size: 44.0,
                exp: 8,
                color: (80, 200, 220),
            },
        }
    }
}

/// Periodic shooter
#[derive(Debug, Clone, PartialEq)]
pub struct Gun {
    pub interval: f32,
    pub timer: f32,
    pub bullet_speed: f32,
    /// Aim at the player, otherwise fire straight down
    pub aim_at_player: bool,
    pub color: (u8, u8, u8),
    pub radius: f32,
}

impl Gun {
    pub fn new(interval: f32, bullet_speed: f32, aim_at_player: bool) -> Self {
        Gun {
            interval,
            timer: 0.0,
            bullet_speed,
            aim_at_player,
            color: (255, 200, 0),
            radius: 6.0,
        }
    }

    pub fn from_params(params: &SpawnParams) -> Self {
        Gun::new(
            params.f32_or("shoot_interval", 1.25),
            params.f32_or("bullet_speed", 300.0),
            params.bool_or("aim_at_player", true),
        )
    }

    /// Advances the timer and returns a bullet when it elapses
    pub fn tick(&mut self, dt: f32, muzzle: Vec2, ctx: &UpdateContext) -> Option<BulletRequest> {
        self.timer += dt;
        if self.interval <= 0.0 || self.timer < self.interval {
            return None;
        }
        self.timer = 0.0;
        let direction = if self.aim_at_player {
            ctx.direction_to_player(muzzle)
        } else {
            Vec2::Y
        };
        let mut request = BulletRequest::new(muzzle, direction * self.bullet_speed, BulletOwner::Enemy)
            .with_damage(1.0);
        request.color = Some(self.color);
        request.radius = Some(self.radius);
        Some(request)
    }
}

pub struct Enemy {
    core: EntityCore,
    kind: EnemyKind,
    health: Health,
    speed: f32,
    exp: u32,
    movement: Movement,
    gun: Option<Gun>,
    color: (u8, u8, u8),
    in_damage_region: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2, params: &SpawnParams) -> Self {
        let defaults = kind.defaults();
        let shape = match kind {
            EnemyKind::Homing => HitboxShape::Circle,
            _ => HitboxShape::Rect,
        };
        let core = EntityCore::new(
            EntityCategory::Enemy,
            CollisionTag::Enemy,
            layers::ENEMIES,
            pos,
            Vec2::splat(params.f32_or("size", defaults.size)),
            CollisionHitbox::new(shape, 0.85),
        );

        let speed = params.f32_or("speed", defaults.speed);
        let direction = initial_direction(params);
        let waypoint_movement = |arrive: f32| Movement::Waypoints {
            points: params.points("waypoints"),
            index: 0,
            speed: params.f32_or("waypoint_speed", 120.0),
            arrive,
        };
        let movement = match kind {
            EnemyKind::Straight => Movement::Linear { direction },
            EnemyKind::Homing => homing_from_params(params).unwrap_or(Movement::HomingContinuous {
                turn_rate: params.f32_or("turn_rate", DEFAULT_TURN_RATE),
            }),
            EnemyKind::Shooter if params.contains("waypoints") => {
                waypoint_movement(SHOOTER_ARRIVE_DISTANCE)
            }
            EnemyKind::Shooter => Movement::Linear { direction },
            EnemyKind::Waypoint => waypoint_movement(WAYPOINT_ARRIVE_DISTANCE),
        };
        let gun = (kind == EnemyKind::Shooter).then(|| Gun::from_params(params));

        let mut enemy = Enemy {
            core,
            kind,
            health: Health::new(params.f32_or("health", defaults.health)),
            speed,
            exp: params.f32_or("exp", defaults.exp as f32).max(0.0) as u32,
            movement,
            gun,
            color: defaults.color,
            in_damage_region: false,
        };
        // Homing enemies start out flying along their spawn direction
        if kind == EnemyKind::Homing {
            enemy.core.velocity = direction * speed;
        }
        enemy
    }

    pub fn straight(pos: Vec2, params: &SpawnParams) -> Self {
        Enemy::new(EnemyKind::Straight, pos, params)
    }

    pub fn homing(pos: Vec2, params: &SpawnParams) -> Self {
        Enemy::new(EnemyKind::Homing, pos, params)
    }

    pub fn shooter(pos: Vec2, params: &SpawnParams) -> Self {
        Enemy::new(EnemyKind::Shooter, pos, params)
    }

    pub fn waypoint(pos: Vec2, params: &SpawnParams) -> Self {
        Enemy::new(EnemyKind::Waypoint, pos, params)
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn movement(&self) -> &Movement {
        &self.movement
    }

    /// Damage is accepted only inside the damageable region and in `Default`
    pub fn can_take_damage(&self) -> bool {
        self.core.is_alive() && self.in_damage_region && self.core.interaction.allows_damage()
    }

    /// Applies `amount` and publishes `EnemyDied` when it is fatal
    pub fn take_damage(&mut self, amount: f32, events: &mut EventManager) -> bool {
        if !self.can_take_damage() {
            return false;
        }
        let result = self.health.take_damage(amount);
        if result.is_fatal {
            self.core.mark_dead(true);
            debug!("{} #{} destroyed", self.kind.type_name(), self.core.id);
            events.publish(GameEvent::EnemyDied {
                position: self.core.center(),
                type_tag: self.kind.type_name().to_string(),
                exp: self.exp_value(),
            });
        }
        true
    }
}

impl GameEntity for Enemy {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn update(&mut self, dt: f32, ctx: &mut UpdateContext) {
        if !self.core.is_alive() {
            return;
        }
        self.movement.step(&mut self.core, self.speed, dt, ctx);
        self.core.sync_hitbox();

        let muzzle = self.core.center();
        if let Some(request) = self.gun.as_mut().and_then(|gun| gun.tick(dt, muzzle, ctx)) {
            ctx.bullets.push(request);
        }

        self.in_damage_region = self.core.is_inside_screen(ctx.screen, ENEMY_DAMAGE_MARGIN);
        if self.core.is_offscreen(ctx.screen, ENEMY_CLEANUP_MARGIN) {
            self.core.mark_dead(true);
        }
    }

    fn on_collision(&mut self, contact: &Contact, events: &mut EventManager) {
        if contact.other.tag == CollisionTag::PlayerBullet {
            self.take_damage(contact.other.damage, events);
        }
    }

    fn contact_damage(&self) -> f32 {
        CONTACT_DAMAGE
    }

    fn exp_value(&self) -> u32 {
        self.exp
    }

    fn health_fraction(&self) -> Option<f32> {
        Some(self.health.percentage())
    }

    fn reset_from(&mut self, pos: Vec2, params: &SpawnParams) {
        let id = self.core.id;
        *self = Enemy::new(self.kind, pos, params);
        self.core.id = id;
    }

    fn color(&self) -> (u8, u8, u8) {
        self.color
    }

    fn draw_shape(&self) -> DrawShape {
        match self.kind {
            EnemyKind::Homing => DrawShape::Circle,
            _ => DrawShape::Rect,
        }
    }
}
