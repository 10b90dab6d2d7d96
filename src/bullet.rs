//! Bullets and the pooled bullet manager
//!
//! Bullets are the most numerous entities in the game, so they live in their
//! own manager instead of the general spawner. Dead bullets are moved to a pool
//! and revived by later spawns.
//!
//! # Example
//!
//! ```ignore
//! let mut bullets = BulletManager::new(Vec2::new(1280.0, 720.0));
//! bullets.spawn(BulletRequest::new(muzzle, Vec2::new(0.0, -900.0), BulletOwner::Player));
//! bullets.update(dt);
//! ```

use crate::collision::hitbox::{CollisionHitbox, HitboxShape};
use crate::config::bounds::{BULLET_ENEMY_MARGIN, BULLET_PLAYER_MARGIN};
use crate::config::layers;
use crate::entity::{
    BulletOwner, Contact, DrawShape, EntityCategory, EntityCore, EntityId, GameEntity,
    UpdateContext,
};
use crate::events::EventManager;
use glam::Vec2;
use log::debug;
use std::collections::HashMap;

const BULLET_HITBOX_SCALE: f32 = 0.9;

/// A bullet an entity wants fired. `pos` is the bullet's center.
#[derive(Debug, Clone, PartialEq)]
pub struct BulletRequest {
    pub pos: Vec2,
    pub vel: Vec2,
    pub owner: BulletOwner,
    pub damage: Option<f32>,
    pub radius: Option<f32>,
    pub color: Option<(u8, u8, u8)>,
}

impl BulletRequest {
    pub fn new(pos: Vec2, vel: Vec2, owner: BulletOwner) -> Self {
        BulletRequest {
            pos,
            vel,
            owner,
            damage: None,
            radius: None,
            color: None,
        }
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = Some(damage);
        self
    }
}

/// Per-owner defaults
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletStyle {
    pub color: (u8, u8, u8),
    pub radius: f32,
    pub damage: f32,
}

impl Default for BulletStyle {
    fn default() -> Self {
        BulletStyle {
            color: (255, 255, 255),
            radius: 3.0,
            damage: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    core: EntityCore,
    pub owner: BulletOwner,
    pub damage: f32,
    pub radius: f32,
    pub color: (u8, u8, u8),
}

impl Bullet {
    fn new(owner: BulletOwner) -> Self {
        Bullet {
            core: EntityCore::new(
                EntityCategory::Projectile,
                owner.bullet_tag(),
                layers::BULLETS,
                Vec2::ZERO,
                Vec2::splat(6.0),
                CollisionHitbox::new(HitboxShape::Circle, BULLET_HITBOX_SCALE),
            ),
            owner,
            damage: 1.0,
            radius: 3.0,
            color: (255, 255, 255),
        }
    }

    fn launch(&mut self, req: &BulletRequest, style: &BulletStyle) {
        self.owner = req.owner;
        self.damage = req.damage.unwrap_or(style.damage);
        self.radius = req.radius.unwrap_or(style.radius);
        self.color = req.color.unwrap_or(style.color);

        self.core.tag = req.owner.bullet_tag();
        self.core.size = Vec2::splat(self.radius * 2.0);
        self.core.reset(req.pos - self.core.size / 2.0);
        self.core.velocity = req.vel;
        self.core.sync_hitbox();
    }

    fn advance(&mut self, dt: f32) {
        self.core.pos += self.core.velocity * dt;
        self.core.sync_hitbox();
    }

    fn offscreen_margin(&self) -> f32 {
        match self.owner {
            BulletOwner::Player => BULLET_PLAYER_MARGIN,
            BulletOwner::Enemy => BULLET_ENEMY_MARGIN,
        }
    }
}

impl GameEntity for Bullet {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "bullet"
    }

    fn update(&mut self, dt: f32, _ctx: &mut UpdateContext) {
        self.advance(dt);
    }

    fn on_collision(&mut self, contact: &Contact, _events: &mut EventManager) {
        if contact.other.category != EntityCategory::Pickup {
            self.core.mark_dead(true);
        }
    }

    fn contact_damage(&self) -> f32 {
        self.damage
    }

    fn color(&self) -> (u8, u8, u8) {
        self.color
    }

    fn draw_shape(&self) -> DrawShape {
        DrawShape::Circle
    }
}

pub struct BulletManager {
    active: Vec<Bullet>,
    pool: Vec<Bullet>,
    styles: HashMap<BulletOwner, BulletStyle>,
    screen: Vec2,
}

impl BulletManager {
    pub fn new(screen: Vec2) -> Self {
        BulletManager {
            active: Vec::new(),
            pool: Vec::new(),
            styles: HashMap::new(),
            screen,
        }
    }

    pub fn set_style(&mut self, owner: BulletOwner, style: BulletStyle) {
        self.styles.insert(owner, style);
    }

    pub fn style(&self, owner: BulletOwner) -> BulletStyle {
        self.styles.get(&owner).copied().unwrap_or_default()
    }

    /// Fires a bullet, reusing a pooled one when available
    pub fn spawn(&mut self, req: BulletRequest) -> EntityId {
        let style = self.style(req.owner);
        let mut bullet = self.pool.pop().unwrap_or_else(|| Bullet::new(req.owner));
        bullet.launch(&req, &style);
        let id = bullet.core.id;
        self.active.push(bullet);
        id
    }

    /// Moves bullets, kills offscreen ones and recycles the dead
    pub fn update(&mut self, dt: f32) {
        let screen = self.screen;
        for bullet in &mut self.active {
            if !bullet.core.is_alive() {
                continue;
            }
            bullet.advance(dt);
            if bullet.core.is_offscreen(screen, bullet.offscreen_margin()) {
                bullet.core.mark_dead(true);
            }
        }
        self.recycle();
    }

    fn recycle(&mut self) {
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].core.is_alive() {
                i += 1;
            } else {
                let bullet = self.active.swap_remove(i);
                self.pool.push(bullet);
            }
        }
    }

    /// Kills every `owner` bullet within `radius` of `center`
    pub fn clear_radius(&mut self, owner: BulletOwner, center: Vec2, radius: f32) -> usize {
        let mut cleared = 0;
        for bullet in &mut self.active {
            if bullet.owner == owner
                && bullet.core.is_alive()
                && bullet.core.center().distance(center) <= radius
            {
                bullet.core.mark_dead(true);
                cleared += 1;
            }
        }
        self.recycle();
        debug!("Cleared {} {:?} bullets", cleared, owner);
        cleared
    }

    pub fn prewarm_pool(&mut self, count: usize) {
        for _ in 0..count {
            let mut bullet = Bullet::new(BulletOwner::Player);
            bullet.core.mark_dead(true);
            self.pool.push(bullet);
        }
    }

    pub fn cleanup(&mut self) {
        self.active.clear();
        self.pool.clear();
    }

    pub fn active(&self) -> &[Bullet] {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut [Bullet] {
        &mut self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CollisionTag;

    fn manager() -> BulletManager {
        BulletManager::new(Vec2::new(1280.0, 720.0))
    }

    #[test]
    fn test_spawn_uses_owner_style() {
        let mut bullets = manager();
        bullets.set_style(
            BulletOwner::Enemy,
            BulletStyle {
                color: (255, 80, 80),
                radius: 5.0,
                damage: 2.0,
            },
        );
        bullets.spawn(BulletRequest::new(Vec2::new(100.0, 100.0), Vec2::Y, BulletOwner::Enemy));

        let bullet = &bullets.active()[0];
        assert_eq!(bullet.core().tag, CollisionTag::EnemyBullet);
        assert_eq!(bullet.damage, 2.0);
        assert_eq!(bullet.core().center(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_default_style() {
        let mut bullets = manager();
        bullets.spawn(BulletRequest::new(Vec2::ZERO, Vec2::Y, BulletOwner::Player).with_damage(4.0));
        let bullet = &bullets.active()[0];
        assert_eq!(bullet.radius, 3.0);
        assert_eq!(bullet.color, (255, 255, 255));
        assert_eq!(bullet.damage, 4.0);
    }

    #[test]
    fn test_offscreen_bullets_return_to_pool() {
        let mut bullets = manager();
        bullets.spawn(BulletRequest::new(
            Vec2::new(640.0, 10.0),
            Vec2::new(0.0, -900.0),
            BulletOwner::Player,
        ));

        // 900 px/s for 0.1s moves 90px, past the 50px player margin
        bullets.update(0.1);
        assert_eq!(bullets.active_count(), 0);
        assert_eq!(bullets.pool.len(), 1);

        bullets.spawn(BulletRequest::new(Vec2::new(640.0, 360.0), Vec2::ZERO, BulletOwner::Enemy));
        assert_eq!(bullets.pool.len(), 0);
        assert_eq!(bullets.active()[0].core().tag, CollisionTag::EnemyBullet);
    }

    #[test]
    fn test_enemy_bullets_get_wider_margin() {
        let mut bullets = manager();
        bullets.spawn(BulletRequest::new(
            Vec2::new(640.0, 10.0),
            Vec2::new(0.0, -900.0),
            BulletOwner::Enemy,
        ));
        bullets.update(0.1);
        assert_eq!(bullets.active_count(), 1);
    }

    #[test]
    fn test_clear_radius_only_hits_owner() {
        let mut bullets = manager();
        let center = Vec2::new(500.0, 300.0);
        bullets.spawn(BulletRequest::new(center, Vec2::ZERO, BulletOwner::Enemy));
        bullets.spawn(BulletRequest::new(center + Vec2::new(30.0, 0.0), Vec2::ZERO, BulletOwner::Enemy));
        bullets.spawn(BulletRequest::new(center + Vec2::new(300.0, 0.0), Vec2::ZERO, BulletOwner::Enemy));
        bullets.spawn(BulletRequest::new(center, Vec2::ZERO, BulletOwner::Player));

        assert_eq!(bullets.clear_radius(BulletOwner::Enemy, center, 100.0), 2);
        assert_eq!(bullets.active_count(), 2);
    }

    #[test]
    fn test_prewarm_and_cleanup() {
        let mut bullets = manager();
        bullets.prewarm_pool(10);
        assert_eq!(bullets.pool.len(), 10);
        bullets.spawn(BulletRequest::new(Vec2::ZERO, Vec2::ZERO, BulletOwner::Player));
        bullets.cleanup();
        assert_eq!(bullets.active_count(), 0);
        assert_eq!(bullets.pool.len(), 0);
    }
}
