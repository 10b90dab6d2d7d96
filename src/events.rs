//! Gameplay event bus
//!
//! Entities publish events during update and collision; the game world drains
//! them once per tick. Subscribers (stat counters, logging) can also register
//! callbacks that run for every dispatched event of a given kind.
//!
//! # Example
//!
//! ```ignore
//! let mut events = EventManager::new();
//! events.publish(GameEvent::SpawnPause { paused: true });
//!
//! for event in events.dispatch() {
//!     match event {
//!         GameEvent::SpawnPause { paused } => level.set_paused(paused),
//!         _ => {}
//!     }
//! }
//! ```

use crate::entity::BulletOwner;
use crate::item::ItemEffect;
use glam::Vec2;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EnemyDied {
        position: Vec2,
        type_tag: String,
        exp: u32,
    },
    ItemCollected {
        item_id: String,
        effects: Vec<ItemEffect>,
    },
    PlayerHealthChanged {
        current: f32,
        max: f32,
    },
    BulletClear {
        owner: BulletOwner,
        center: Vec2,
        radius: f32,
    },
    SpawnPause {
        paused: bool,
    },
    BossSpawned,
    BossDefeated,
    HazardDamage {
        position: Vec2,
        radius: f32,
        damage: f32,
    },
    /// A beam fired along `start → end`; hits anything within `width / 2`
    BeamHit {
        start: Vec2,
        end: Vec2,
        width: f32,
        damage: f32,
    },
    LevelUp {
        level: u32,
    },
    LevelComplete,
}

/// Payload-free discriminant used for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    EnemyDied,
    ItemCollected,
    PlayerHealthChanged,
    BulletClear,
    SpawnPause,
    BossSpawned,
    BossDefeated,
    HazardDamage,
    BeamHit,
    LevelUp,
    LevelComplete,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::EnemyDied { .. } => EventKind::EnemyDied,
            GameEvent::ItemCollected { .. } => EventKind::ItemCollected,
            GameEvent::PlayerHealthChanged { .. } => EventKind::PlayerHealthChanged,
            GameEvent::BulletClear { .. } => EventKind::BulletClear,
            GameEvent::SpawnPause { .. } => EventKind::SpawnPause,
            GameEvent::BossSpawned => EventKind::BossSpawned,
            GameEvent::BossDefeated => EventKind::BossDefeated,
            GameEvent::HazardDamage { .. } => EventKind::HazardDamage,
            GameEvent::BeamHit { .. } => EventKind::BeamHit,
            GameEvent::LevelUp { .. } => EventKind::LevelUp,
            GameEvent::LevelComplete => EventKind::LevelComplete,
        }
    }
}

pub type EventHandler = Box<dyn FnMut(&GameEvent)>;

#[derive(Default)]
pub struct EventManager {
    queue: Vec<GameEvent>,
    subscribers: HashMap<EventKind, Vec<EventHandler>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: GameEvent) {
        self.queue.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        self.queue.extend(events);
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: EventHandler) {
        self.subscribers.entry(kind).or_default().push(handler);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Runs subscribers for every queued event and hands the events back
    pub fn dispatch(&mut self) -> Vec<GameEvent> {
        let events = std::mem::take(&mut self.queue);
        for event in &events {
            if let Some(handlers) = self.subscribers.get_mut(&event.kind()) {
                for handler in handlers.iter_mut() {
                    handler(event);
                }
            }
        }
        events
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_drains_in_order() {
        let mut events = EventManager::new();
        events.publish(GameEvent::BossSpawned);
        events.publish(GameEvent::LevelComplete);

        let drained = events.dispatch();
        assert_eq!(drained, vec![GameEvent::BossSpawned, GameEvent::LevelComplete]);
        assert_eq!(events.pending(), 0);
    }

    #[test]
    fn test_subscribers_only_see_their_kind() {
        let mut events = EventManager::new();
        let kills = Rc::new(Cell::new(0));
        let counter = Rc::clone(&kills);
        events.subscribe(
            EventKind::EnemyDied,
            Box::new(move |_| counter.set(counter.get() + 1)),
        );

        events.publish(GameEvent::EnemyDied {
            position: Vec2::ZERO,
            type_tag: "straight".to_string(),
            exp: 5,
        });
        events.publish(GameEvent::BossSpawned);
        events.dispatch();

        assert_eq!(kills.get(), 1);
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut events = EventManager::new();
        events.publish(GameEvent::SpawnPause { paused: true });
        events.clear();
        assert!(events.dispatch().is_empty());
    }
}
