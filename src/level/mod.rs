//! Level data and scheduling
//!
//! # Architecture
//!
//! - `registry`: campaigns and level metadata from `campaigns.json`
//! - `stage`: stage files, timelines and exit triggers
//! - `pattern`: formation shapes that turn a count into positions
//! - `wave`: fires timeline entries into the spawn manager
//! - `manager`: owns the current stage and moves through the stage list

pub mod manager;
pub mod pattern;
pub mod registry;
pub mod stage;
pub mod wave;

pub use manager::LevelManager;
pub use registry::LevelRegistry;
pub use stage::StageLoader;
pub use wave::WaveContext;
