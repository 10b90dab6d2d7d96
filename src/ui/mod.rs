//! In-game overlay drawn on top of the world
//!
//! - [`Hud`]: score, high score, lives, level, exp and stage name
//! - [`HealthBar`](health_bar::HealthBar): the ship and boss bars
//! - [`BuffDisplay`]: active timed power-ups
//! - [`FloatingText`]: score pop-ups
//!
//! Everything renders procedurally with SDL2 primitives and the bitmap font.

pub mod buff_display;
pub mod floating_text;
pub mod health_bar;
pub mod hud;

pub use buff_display::BuffDisplay;
pub use floating_text::FloatingText;
pub use hud::{Hud, HudSnapshot};
