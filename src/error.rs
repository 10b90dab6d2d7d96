//! Error types shared by the loaders and managers
//!
//! Rendering code keeps returning `Result<(), String>` the way SDL2 does.
//! Everything that reads files or validates data returns [`GameError`].

use crate::entity::EntityCategory;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("unknown entity type {type_name:?} in category {category:?}")]
    UnknownEntity {
        category: EntityCategory,
        type_name: String,
    },

    #[error("unknown level: {0}")]
    UnknownLevel(String),

    #[error("unknown scene: {0}")]
    UnknownScene(String),

    #[error("invalid wave: {0}")]
    InvalidWave(String),

    #[error("unsupported save version: {0}")]
    InvalidSaveVersion(u32),

    #[error("SDL error: {0}")]
    Sdl(String),
}

impl From<GameError> for String {
    fn from(err: GameError) -> Self {
        err.to_string()
    }
}
