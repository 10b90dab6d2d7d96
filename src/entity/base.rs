//! Shared state carried by every game entity

use super::state::{InteractionState, LifecycleState};
use super::types::{CollisionTag, EntityCategory};
use crate::collision::hitbox::CollisionHitbox;
use crate::collision::shapes::Aabb;
use glam::Vec2;
use std::sync::atomic::{AtomicU64, Ordering};

pub type EntityId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-unique entity id
pub fn next_entity_id() -> EntityId {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct EntityCore {
    pub id: EntityId,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    /// Degrees, clockwise in screen space
    pub rotation: f32,
    pub layer: i32,
    pub category: EntityCategory,
    pub tag: CollisionTag,
    pub lifecycle: LifecycleState,
    pub interaction: InteractionState,
    pub hitbox: CollisionHitbox,
}

impl EntityCore {
    pub fn new(
        category: EntityCategory,
        tag: CollisionTag,
        layer: i32,
        pos: Vec2,
        size: Vec2,
        hitbox: CollisionHitbox,
    ) -> Self {
        let mut core = EntityCore {
            id: next_entity_id(),
            pos,
            size,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            layer,
            category,
            tag,
            lifecycle: LifecycleState::Alive,
            interaction: InteractionState::Default,
            hitbox,
        };
        core.sync_hitbox();
        core
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.pos = center - self.size / 2.0;
    }

    pub fn rect(&self) -> Aabb {
        Aabb::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle.is_alive()
    }

    pub fn mark_dead(&mut self, immediate: bool) {
        self.lifecycle.mark_dead(immediate);
    }

    pub fn sync_hitbox(&mut self) {
        self.hitbox.update(self.pos, self.size, self.rotation);
    }

    pub fn collision_enabled(&self) -> bool {
        self.is_alive()
            && self.interaction.checks_collision()
            && self.interaction.hitbox_active()
            && self.hitbox.active
    }

    /// Revives a pooled entity at `pos`
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.velocity = Vec2::ZERO;
        self.rotation = 0.0;
        self.lifecycle = LifecycleState::Alive;
        self.interaction = InteractionState::Default;
        self.hitbox.reset();
        self.sync_hitbox();
    }

    /// True once the entity has left the screen grown by `margin`
    pub fn is_offscreen(&self, screen: Vec2, margin: f32) -> bool {
        let r = self.rect();
        r.right() < -margin
            || r.x > screen.x + margin
            || r.bottom() < -margin
            || r.y > screen.y + margin
    }

    /// True while the whole entity sits at least `margin` inside the screen
    pub fn is_inside_screen(&self, screen: Vec2, margin: f32) -> bool {
        let r = self.rect();
        r.x >= margin
            && r.y >= margin
            && r.right() <= screen.x - margin
            && r.bottom() <= screen.y - margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core_at(x: f32, y: f32) -> EntityCore {
        EntityCore::new(
            EntityCategory::Enemy,
            CollisionTag::Enemy,
            1,
            Vec2::new(x, y),
            Vec2::new(20.0, 20.0),
            CollisionHitbox::default(),
        )
    }

    #[test]
    fn test_ids_are_unique() {
        let a = core_at(0.0, 0.0);
        let b = core_at(0.0, 0.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_offscreen_respects_margin() {
        let screen = Vec2::new(100.0, 100.0);
        assert!(!core_at(-30.0, 0.0).is_offscreen(screen, 50.0));
        assert!(core_at(-80.0, 0.0).is_offscreen(screen, 50.0));
        assert!(core_at(0.0, 160.0).is_offscreen(screen, 50.0));
    }

    #[test]
    fn test_inside_screen_margin() {
        let screen = Vec2::new(200.0, 200.0);
        assert!(core_at(60.0, 60.0).is_inside_screen(screen, 50.0));
        assert!(!core_at(40.0, 60.0).is_inside_screen(screen, 50.0));
    }

    #[test]
    fn test_reset_revives_and_moves_hitbox() {
        let mut core = core_at(0.0, 0.0);
        core.mark_dead(true);
        core.interaction = InteractionState::Intangible;
        core.reset(Vec2::new(50.0, 50.0));

        assert!(core.is_alive());
        assert_eq!(core.interaction, InteractionState::Default);
        assert_eq!(core.hitbox.rect.x, 50.0);
    }
}
