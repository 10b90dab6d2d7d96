//! Falling pickup entity

use super::effects::ItemEffect;
use crate::collision::hitbox::CollisionHitbox;
use crate::config::bounds::ITEM_CLEANUP_MARGIN;
use crate::config::layers;
use crate::entity::{
    CollisionTag, Contact, EntityCategory, EntityCore, GameEntity, SpawnParams, UpdateContext,
};
use crate::events::{EventManager, GameEvent};
use glam::Vec2;
use log::warn;

pub const PICKUP_SIZE: f32 = 24.0;
pub const FALL_SPEED: f32 = 50.0;

pub struct Pickup {
    core: EntityCore,
    pub item_id: String,
    pub effects: Vec<ItemEffect>,
    color: (u8, u8, u8),
}

impl Pickup {
    pub fn new(pos: Vec2, item_id: &str, effects: Vec<ItemEffect>, color: (u8, u8, u8)) -> Self {
        let mut core = EntityCore::new(
            EntityCategory::Pickup,
            CollisionTag::Pickup,
            layers::PICKUPS,
            pos,
            Vec2::splat(PICKUP_SIZE),
            CollisionHitbox::default(),
        );
        core.velocity = Vec2::new(0.0, FALL_SPEED);
        Pickup {
            core,
            item_id: item_id.to_string(),
            effects,
            color,
        }
    }

    /// Reads `item_id`, `effects` and `color` written by the item manager
    pub fn from_params(pos: Vec2, params: &SpawnParams) -> Self {
        let mut pickup = Pickup::new(pos, "unknown", Vec::new(), (255, 220, 80));
        pickup.apply_params(params);
        pickup
    }

    fn apply_params(&mut self, params: &SpawnParams) {
        self.item_id = params.str("item_id").unwrap_or("unknown").to_string();
        self.effects = match params.get("effects") {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                warn!("Pickup {} has unreadable effects: {}", self.item_id, e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        if let Some(color) = params.get("color").and_then(|v| serde_json::from_value(v.clone()).ok()) {
            self.color = color;
        }
    }
}

impl GameEntity for Pickup {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "item"
    }

    fn update(&mut self, dt: f32, ctx: &mut UpdateContext) {
        self.core.pos += self.core.velocity * dt;
        self.core.sync_hitbox();
        if self.core.pos.y > ctx.screen.y + ITEM_CLEANUP_MARGIN {
            self.core.mark_dead(true);
        }
    }

    fn on_collision(&mut self, contact: &Contact, events: &mut EventManager) {
        if contact.other.tag != CollisionTag::Player {
            return;
        }
        events.publish(GameEvent::ItemCollected {
            item_id: self.item_id.clone(),
            effects: self.effects.clone(),
        });
        self.core.mark_dead(true);
    }

    fn reset_from(&mut self, pos: Vec2, params: &SpawnParams) {
        self.core.reset(pos);
        self.core.velocity = Vec2::new(0.0, FALL_SPEED);
        self.apply_params(params);
    }

    fn color(&self) -> (u8, u8, u8) {
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CollisionInfo;
    use serde_json::json;

    fn player_contact() -> Contact {
        Contact {
            other: CollisionInfo {
                id: 0,
                tag: CollisionTag::Player,
                category: EntityCategory::Player,
                center: Vec2::ZERO,
                damage: 0.0,
            },
            part: 0,
        }
    }

    #[test]
    fn test_from_params_reads_effects() {
        let params = SpawnParams::new()
            .with("item_id", json!("medkit"))
            .with("effects", json!([{"type": "FULL_HEAL"}]))
            .with("color", json!([1, 2, 3]));
        let pickup = Pickup::from_params(Vec2::ZERO, &params);

        assert_eq!(pickup.item_id, "medkit");
        assert_eq!(pickup.effects, vec![ItemEffect::FullHeal]);
        assert_eq!(pickup.color(), (1, 2, 3));
    }

    #[test]
    fn test_falls_and_despawns_below_screen() {
        let mut pickup = Pickup::new(Vec2::new(100.0, 700.0), "x", Vec::new(), (0, 0, 0));
        let mut ctx = UpdateContext::new(Vec2::new(1280.0, 720.0), None);

        pickup.update(1.0, &mut ctx);
        assert_eq!(pickup.core().pos.y, 750.0);
        assert!(pickup.core().is_alive());

        pickup.update(1.0, &mut ctx);
        assert!(pickup.core().lifecycle.is_dead());
    }

    #[test]
    fn test_player_contact_publishes_collection() {
        let mut pickup = Pickup::new(Vec2::ZERO, "shield", vec![ItemEffect::GrantShield], (0, 0, 0));
        let mut events = EventManager::new();
        pickup.on_collision(&player_contact(), &mut events);

        assert!(!pickup.core().is_alive());
        assert_eq!(
            events.dispatch(),
            vec![GameEvent::ItemCollected {
                item_id: "shield".to_string(),
                effects: vec![ItemEffect::GrantShield],
            }]
        );
    }
}
