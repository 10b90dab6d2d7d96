//! Settings screen
//!
//! Edits a copy of [`GameSettings`]. Confirming a toggle or value steps it in
//! place; the caller saves the settings when the screen closes.

use super::menu::{Menu, MenuItem, MenuResponse};
use crate::config::GameSettings;
use crate::input_system::GameAction;
use sdl2::render::Canvas;
use sdl2::video::Window;

pub const MAX_START_LIVES: u32 = 5;

const HITBOXES: usize = 0;
const LIVES: usize = 1;
const BACK: usize = 2;

pub struct SettingsMenu {
    menu: Menu,
    settings: GameSettings,
}

impl SettingsMenu {
    pub fn new(settings: GameSettings) -> Self {
        let mut screen = SettingsMenu {
            menu: Menu::new("SETTINGS", Vec::new()),
            settings,
        };
        screen.refresh(0);
        screen
    }

    fn refresh(&mut self, selected: usize) {
        let hitboxes = if self.settings.debug_hitboxes { "ON" } else { "OFF" };
        self.menu.set_items(vec![
            MenuItem::new(format!("HITBOXES {}", hitboxes)),
            MenuItem::new(format!("LIVES {}", self.settings.start_lives)),
            MenuItem::new("BACK"),
        ]);
        for _ in 0..selected {
            self.menu.select_next();
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Returns true when the screen should close
    pub fn handle_action(&mut self, action: GameAction) -> bool {
        match self.menu.handle_action(action) {
            MenuResponse::Confirmed(HITBOXES) => {
                self.settings.debug_hitboxes = !self.settings.debug_hitboxes;
                self.refresh(HITBOXES);
                false
            }
            MenuResponse::Confirmed(LIVES) => {
                self.settings.start_lives = self.settings.start_lives % MAX_START_LIVES + 1;
                self.refresh(LIVES);
                false
            }
            MenuResponse::Confirmed(BACK) | MenuResponse::Back => true,
            _ => false,
        }
    }

    pub fn render(&self, canvas: &mut Canvas<Window>) -> Result<(), String> {
        self.menu.render(canvas)
    }
}
