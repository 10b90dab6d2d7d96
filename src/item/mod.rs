//! Pickups and the item catalogue
//!
//! - `effects`: [`ItemEffect`], what a pickup does to the player
//! - `definition`: [`ItemDefinition`], one entry of `items.json`
//! - `pickup`: [`Pickup`], the falling entity
//! - `manager`: [`ItemManager`], loot table and spawning

pub mod definition;
pub mod effects;
pub mod manager;
pub mod pickup;

pub use effects::ItemEffect;
pub use manager::ItemManager;
pub use pickup::Pickup;
