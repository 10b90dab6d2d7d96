// Game module - Headless gameplay state
//
// This module contains:
// - world.rs: GameWorld and the fixed-tick update pipeline
// - types.rs: Outcome, score pop-ups and the fixed timestep

pub mod types;
pub mod world;

pub use types::*;
pub use world::GameWorld;
