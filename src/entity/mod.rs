//! Entity model shared by every gameplay object
//!
//! # Architecture
//!
//! - `types`: categories, collision tags and bullet owners
//! - `state`: lifecycle (`Alive → Dying → Dead`) and interaction states
//! - `base`: [`EntityCore`], the position/size/state block every entity embeds
//! - `params`: [`SpawnParams`], the JSON parameters passed at spawn time
//!
//! Entities never hold references to each other. Whatever they need to know
//! about the world (screen size, player position) arrives through
//! [`UpdateContext`], and whatever they want to cause (bullets, events) goes
//! out through it.

pub mod base;
pub mod params;
pub mod state;
pub mod types;

pub use base::{EntityCore, EntityId};
pub use params::SpawnParams;
pub use state::{InteractionState, LifecycleState};
pub use types::{BulletOwner, CollisionTag, EntityCategory, SpawnEdge};

use crate::bullet::BulletRequest;
use crate::collision::shapes::Aabb;
use crate::events::{EventManager, GameEvent};
use glam::Vec2;

/// Snapshot of the other side of a collision
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionInfo {
    pub id: EntityId,
    pub tag: CollisionTag,
    pub category: EntityCategory,
    pub center: Vec2,
    pub damage: f32,
}

/// A collision as seen by one participant
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub other: CollisionInfo,
    /// Which of our hitboxes was hit. 0 is the main hitbox.
    pub part: usize,
}

/// How the renderer draws an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawShape {
    Rect,
    Circle,
    /// Expanding ring, `radius` in pixels
    Ring { radius: f32 },
}

/// A straight beam drawn from `origin`. `damage` is 0 for aiming lasers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beam {
    pub origin: Vec2,
    /// Unit vector
    pub direction: Vec2,
    pub range: f32,
    pub width: f32,
    pub damage: f32,
}

impl Beam {
    pub fn end(&self) -> Vec2 {
        self.origin + self.direction * self.range
    }
}

/// World inputs and outputs for one update
pub struct UpdateContext {
    pub screen: Vec2,
    /// Player center, `None` when the player is dead
    pub player_center: Option<Vec2>,
    pub bullets: Vec<BulletRequest>,
    pub events: Vec<GameEvent>,
}

impl UpdateContext {
    pub fn new(screen: Vec2, player_center: Option<Vec2>) -> Self {
        UpdateContext {
            screen,
            player_center,
            bullets: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn screen_center(&self) -> Vec2 {
        self.screen / 2.0
    }

    /// Normalized direction from `from` toward the player, or toward the screen
    /// center when the player is gone. Falls back to straight down.
    pub fn direction_to_player(&self, from: Vec2) -> Vec2 {
        let target = self.player_center.unwrap_or_else(|| self.screen_center());
        (target - from).try_normalize().unwrap_or(Vec2::Y)
    }
}

/// Behavior shared by enemies, pickups, hazards and bosses
pub trait GameEntity {
    fn core(&self) -> &EntityCore;
    fn core_mut(&mut self) -> &mut EntityCore;

    /// Registry name, e.g. `"shooter"`
    fn type_name(&self) -> &'static str;

    fn update(&mut self, dt: f32, ctx: &mut UpdateContext);

    fn on_collision(&mut self, _contact: &Contact, _events: &mut EventManager) {}

    /// Damage dealt to whatever this entity touches
    fn contact_damage(&self) -> f32 {
        0.0
    }

    fn exp_value(&self) -> u32 {
        0
    }

    fn health_fraction(&self) -> Option<f32> {
        None
    }

    /// Hitboxes beyond the main one, keyed by part index (1 and up)
    fn extra_hitboxes(&self) -> Vec<(usize, Aabb)> {
        Vec::new()
    }

    /// Re-initializes a pooled instance
    fn reset_from(&mut self, pos: Vec2, _params: &SpawnParams) {
        self.core_mut().reset(pos);
    }

    fn color(&self) -> (u8, u8, u8) {
        (255, 255, 255)
    }

    fn draw_shape(&self) -> DrawShape {
        DrawShape::Rect
    }

    /// Beams to draw on top of the entity
    fn beams(&self) -> Vec<Beam> {
        Vec::new()
    }

    fn collision_info(&self) -> CollisionInfo {
        let core = self.core();
        CollisionInfo {
            id: core.id,
            tag: core.tag,
            category: core.category,
            center: core.center(),
            damage: self.contact_damage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_to_player() {
        let ctx = UpdateContext::new(Vec2::new(100.0, 100.0), Some(Vec2::new(10.0, 0.0)));
        assert_eq!(ctx.direction_to_player(Vec2::ZERO), Vec2::X);
    }

    #[test]
    fn test_direction_falls_back_to_center_then_down() {
        let ctx = UpdateContext::new(Vec2::new(100.0, 100.0), None);
        assert_eq!(ctx.direction_to_player(Vec2::new(50.0, 0.0)), Vec2::Y);
        // Standing on the center itself
        assert_eq!(ctx.direction_to_player(Vec2::new(50.0, 50.0)), Vec2::Y);
    }
}
