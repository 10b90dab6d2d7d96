//! Per-entity hitbox
//!
//! A hitbox follows its owner. Its size is the owner's size times `scale`,
//! shifted by `offset` from the owner's center. The offset turns with the
//! owner's rotation.
//!
//! # Example
//!
//! ```ignore
//! let mut hitbox = CollisionHitbox::new(HitboxShape::Circle, 0.9);
//! hitbox.update(bullet.pos, bullet.size, 0.0);
//! assert!(hitbox.rect.w <= bullet.size.x);
//! ```

use super::shapes::{rotate, Aabb};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitboxShape {
    Rect,
    /// Square box around a circle of the owner's smaller half-extent
    Circle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionHitbox {
    pub shape: HitboxShape,
    pub scale: f32,
    pub offset: Vec2,
    default_scale: f32,
    pub active: bool,
    /// World-space box after the last `update`
    pub rect: Aabb,
    /// Owner rotation at the last `update`, in degrees
    pub rotation: f32,
}

impl CollisionHitbox {
    pub fn new(shape: HitboxShape, scale: f32) -> Self {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        CollisionHitbox {
            shape,
            scale,
            offset: Vec2::ZERO,
            default_scale: scale,
            active: true,
            rect: Aabb::default(),
            rotation: 0.0,
        }
    }

    pub fn rect_scaled(scale: f32) -> Self {
        CollisionHitbox::new(HitboxShape::Rect, scale)
    }

    pub fn reset(&mut self) {
        self.scale = self.default_scale;
        self.offset = Vec2::ZERO;
        self.active = true;
    }

    /// A rotated rectangle needs the SAT narrow phase
    pub fn is_rotated(&self) -> bool {
        self.shape == HitboxShape::Rect && self.rotation.rem_euclid(360.0) != 0.0
    }

    fn size_for(&self, owner_size: Vec2) -> Vec2 {
        match self.shape {
            HitboxShape::Rect => owner_size * self.scale,
            HitboxShape::Circle => Vec2::splat(owner_size.x.min(owner_size.y) * self.scale),
        }
    }

    /// Recomputes `rect` from the owner's top-left position, size and rotation
    pub fn update(&mut self, owner_pos: Vec2, owner_size: Vec2, rotation: f32) {
        let size = self.size_for(owner_size);
        let center = owner_pos + owner_size / 2.0 + rotate(self.offset, rotation);
        self.rect = Aabb::from_center(center, size);
        self.rotation = rotation;
    }
}

impl Default for CollisionHitbox {
    fn default() -> Self {
        CollisionHitbox::new(HitboxShape::Rect, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_size_follows_owner_scale() {
        let mut hitbox = CollisionHitbox::rect_scaled(0.5);
        hitbox.update(Vec2::new(100.0, 100.0), Vec2::new(40.0, 20.0), 0.0);

        assert_eq!(hitbox.rect, Aabb::new(110.0, 105.0, 20.0, 10.0));
    }

    #[test]
    fn test_non_positive_scale_falls_back_to_one() {
        let mut hitbox = CollisionHitbox::rect_scaled(0.0);
        hitbox.update(Vec2::ZERO, Vec2::new(40.0, 40.0), 0.0);
        assert_eq!(hitbox.scale, 1.0);
        assert_eq!(hitbox.rect.w, 40.0);
    }

    #[test]
    fn test_circle_uses_smaller_dimension() {
        let mut hitbox = CollisionHitbox::new(HitboxShape::Circle, 1.0);
        hitbox.update(Vec2::ZERO, Vec2::new(10.0, 6.0), 0.0);
        assert_eq!(hitbox.rect.w, 6.0);
        assert_eq!(hitbox.rect.h, 6.0);
    }

    #[test]
    fn test_offset_rotates_with_owner() {
        let mut hitbox = CollisionHitbox::rect_scaled(0.1);
        hitbox.offset = Vec2::new(10.0, 0.0);
        hitbox.update(Vec2::ZERO, Vec2::new(20.0, 20.0), 90.0);

        let center = hitbox.rect.center();
        assert!((center.x - 10.0).abs() < 1e-3);
        assert!((center.y - 20.0).abs() < 1e-3);
        assert!(hitbox.is_rotated());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut hitbox = CollisionHitbox::rect_scaled(0.9);
        hitbox.scale = 2.0;
        hitbox.offset = Vec2::new(5.0, 5.0);
        hitbox.active = false;
        hitbox.reset();

        assert_eq!(hitbox.scale, 0.9);
        assert_eq!(hitbox.offset, Vec2::ZERO);
        assert!(hitbox.active);
    }
}
