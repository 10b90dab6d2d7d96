//! Entity creation and ownership
//!
//! - `registry`: [`EntityRegistry`], type name to constructor
//! - `manager`: [`SpawnManager`], live entities, pools and spawn statistics

pub mod manager;
pub mod registry;

pub use manager::SpawnManager;
pub use registry::EntityRegistry;
