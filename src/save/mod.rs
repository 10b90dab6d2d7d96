//! Profile persistence
//!
//! The profile is a small JSON file holding the high score, unlocked levels
//! and the last campaign played. Every save also writes a timestamped backup.
//!
//! # Architecture
//!
//! - `types`: the [`Profile`] data and the save format version
//! - `manager`: [`SaveManager`] for file operations
//!
//! # Example Usage
//!
//! ```ignore
//! let saves = SaveManager::new(default_save_dir())?;
//! let mut profile = saves.load_profile()?;
//! profile.high_score = profile.high_score.max(stats.high_score);
//! saves.save_profile(&mut profile)?;
//! ```

pub mod manager;
pub mod types;

pub use manager::{default_save_dir, SaveManager};
pub use types::*;
