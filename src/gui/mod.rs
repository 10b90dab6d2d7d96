//! Full-screen menus
//!
//! Each screen wraps the base [`Menu`](menu::Menu) and turns input actions into its own
//! choice enum. The main loop decides what a choice does.

pub mod campaign_select;
pub mod game_over;
pub mod main_menu;
pub mod menu;
pub mod pause_menu;
pub mod settings_menu;

pub use campaign_select::{CampaignChoice, CampaignSelect};
pub use game_over::{GameOverChoice, GameOverScreen, RunSummary};
pub use main_menu::{MainMenu, MainMenuChoice};
pub use pause_menu::{PauseChoice, PauseMenu};
pub use settings_menu::SettingsMenu;
