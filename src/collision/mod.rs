//! Collision detection and response
//!
//! # Architecture
//!
//! - `shapes`: [`Aabb`](shapes::Aabb), oriented boxes and the AABB/SAT tests
//! - `hitbox`: [`CollisionHitbox`](hitbox::CollisionHitbox), the per-entity box that follows its owner
//! - `rules`: which collision tags interact
//! - `manager`: [`CollisionManager`], spatial-hash broad phase and dispatch
//!
//! Collision response is left to the entities: the manager only tells each
//! side what it touched.

pub mod hitbox;
pub mod manager;
pub mod rules;
pub mod shapes;

pub use manager::CollisionManager;
