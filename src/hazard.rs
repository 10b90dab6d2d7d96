//! Timed mine hazard
//!
//! # Lifecycle
//!
//! `Deploying` (flies to its target) → `Armed` (fuse burning) →
//! `Exploding` (blast ring fading) → dead.
//!
//! The blast deals damage once, at the moment of detonation, as a
//! `HazardDamage` event; the world decides whether the player is inside the
//! radius. The same blast wipes enemy bullets inside the radius with a
//! `BulletClear`. Touching the player while armed detonates the mine early.

use crate::collision::hitbox::{CollisionHitbox, HitboxShape};
use crate::config::bounds::ENV_CLEANUP_MARGIN;
use crate::config::layers;
use crate::entity::{
    BulletOwner, CollisionTag, Contact, DrawShape, EntityCategory, EntityCore, GameEntity, InteractionState,
    SpawnParams, UpdateContext,
};
use crate::events::{EventManager, GameEvent};
use glam::Vec2;
use log::debug;

pub const MINE_DAMAGE: f32 = 15.0;
pub const MINE_DAMAGE_RADIUS: f32 = 160.0;
pub const MINE_DEPLOY_SPEED: f32 = 400.0;
pub const MINE_FUSE_TIME: f32 = 3.0;
pub const MINE_FADE_TIME: f32 = 3.0;
pub const MINE_SPRITE_RADIUS: f32 = 25.0;
const ARRIVE_DISTANCE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MineState {
    Deploying,
    Armed { fuse: f32 },
    Exploding { fade: f32 },
}

pub struct Mine {
    core: EntityCore,
    state: MineState,
    target: Vec2,
    /// `None` until the first update, then a third of the screen height
    target_y: Option<f32>,
    deploy_speed: f32,
    pub damage: f32,
    pub damage_radius: f32,
    fuse_time: f32,
    fade_time: f32,
}

impl Mine {
    pub fn new(pos: Vec2, params: &SpawnParams) -> Self {
        let size = Vec2::splat(MINE_SPRITE_RADIUS * 2.0);
        let core = EntityCore::new(
            EntityCategory::Hazard,
            CollisionTag::Hazard,
            layers::PICKUPS,
            pos,
            size,
            CollisionHitbox::new(HitboxShape::Circle, 1.0),
        );
        let center = core.center();
        Mine {
            target: Vec2::new(params.f32_or("target_x", center.x), center.y),
            target_y: params.get("target_y").and_then(|v| v.as_f64()).map(|y| y as f32),
            core,
            state: MineState::Deploying,
            deploy_speed: params.f32_or("deploy_speed", MINE_DEPLOY_SPEED),
            damage: params.f32_or("damage", MINE_DAMAGE),
            damage_radius: params.f32_or("damage_radius", MINE_DAMAGE_RADIUS),
            fuse_time: params.f32_or("fuse_time", MINE_FUSE_TIME),
            fade_time: params.f32_or("fade_time", MINE_FADE_TIME),
        }
    }

    pub fn state(&self) -> MineState {
        self.state
    }

    /// Fraction of the fuse or the fade that has elapsed
    pub fn progress(&self) -> f32 {
        match self.state {
            MineState::Deploying => 0.0,
            MineState::Armed { fuse } => (fuse / self.fuse_time.max(f32::EPSILON)).min(1.0),
            MineState::Exploding { fade } => (fade / self.fade_time.max(f32::EPSILON)).min(1.0),
        }
    }

    /// Switches to `Exploding` and returns the blast events
    fn detonate(&mut self) -> [GameEvent; 2] {
        self.state = MineState::Exploding { fade: 0.0 };
        self.core.interaction = InteractionState::ClipThrough;
        self.core.velocity = Vec2::ZERO;
        debug!("Mine #{} exploded", self.core.id);
        let center = self.core.center();
        [
            GameEvent::HazardDamage {
                position: center,
                radius: self.damage_radius,
                damage: self.damage,
            },
            GameEvent::BulletClear {
                owner: BulletOwner::Enemy,
                center,
                radius: self.damage_radius,
            },
        ]
    }

    fn deploy(&mut self, dt: f32) {
        let center = self.core.center();
        let to_target = self.target - center;
        let distance = to_target.length();
        if distance < ARRIVE_DISTANCE {
            self.core.set_center(self.target);
            self.core.velocity = Vec2::ZERO;
            self.state = MineState::Armed { fuse: 0.0 };
            return;
        }
        let step = (self.deploy_speed * dt).min(distance);
        self.core.velocity = to_target / distance * self.deploy_speed;
        self.core.set_center(center + to_target / distance * step);
    }
}

impl GameEntity for Mine {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "mine"
    }

    fn update(&mut self, dt: f32, ctx: &mut UpdateContext) {
        if self.core.lifecycle.is_dead() {
            return;
        }
        let target_y = *self.target_y.get_or_insert(ctx.screen.y / 3.0);
        self.target.y = target_y;

        match self.state {
            MineState::Deploying => self.deploy(dt),
            MineState::Armed { fuse } => {
                let fuse = fuse + dt;
                self.state = MineState::Armed { fuse };
                if fuse >= self.fuse_time {
                    let blast = self.detonate();
                    ctx.events.extend(blast);
                }
            }
            MineState::Exploding { fade } => {
                let fade = fade + dt;
                self.state = MineState::Exploding { fade };
                if fade >= self.fade_time {
                    self.core.mark_dead(true);
                }
            }
        }
        self.core.sync_hitbox();

        if self.core.is_offscreen(ctx.screen, ENV_CLEANUP_MARGIN) {
            self.core.mark_dead(true);
        }
    }

    fn on_collision(&mut self, contact: &Contact, events: &mut EventManager) {
        if contact.other.tag == CollisionTag::Player && matches!(self.state, MineState::Armed { .. }) {
            let blast = self.detonate();
            events.extend(blast);
        }
    }

    fn reset_from(&mut self, pos: Vec2, params: &SpawnParams) {
        let id = self.core.id;
        *self = Mine::new(pos, params);
        self.core.id = id;
    }

    fn color(&self) -> (u8, u8, u8) {
        match self.state {
            MineState::Deploying => (255, 140, 0),
            MineState::Armed { .. } => (255, 100, 0),
            MineState::Exploding { .. } => {
                let fade = 1.0 - self.progress();
                (255, (50.0 * fade) as u8, (50.0 * fade) as u8)
            }
        }
    }

    fn draw_shape(&self) -> DrawShape {
        match self.state {
            MineState::Exploding { .. } => DrawShape::Ring {
                radius: self.damage_radius,
            },
            _ => DrawShape::Circle,
        }
    }
}
