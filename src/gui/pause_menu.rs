//! Pause overlay

use super::menu::{Menu, MenuItem, MenuResponse};
use crate::input_system::GameAction;
use sdl2::render::Canvas;
use sdl2::video::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseChoice {
    Resume,
    MainMenu,
}

pub struct PauseMenu {
    menu: Menu,
}

impl PauseMenu {
    pub fn new() -> Self {
        PauseMenu {
            menu: Menu::new(
                "PAUSED",
                vec![MenuItem::new("RESUME"), MenuItem::new("MAIN MENU")],
            ),
        }
    }

    /// Pause or Back resume the game
    pub fn handle_action(&mut self, action: GameAction) -> Option<PauseChoice> {
        if action == GameAction::Pause {
            return Some(PauseChoice::Resume);
        }
        match self.menu.handle_action(action) {
            MenuResponse::Confirmed(0) | MenuResponse::Back => Some(PauseChoice::Resume),
            MenuResponse::Confirmed(_) => Some(PauseChoice::MainMenu),
            _ => None,
        }
    }

    pub fn render(&self, canvas: &mut Canvas<Window>) -> Result<(), String> {
        self.menu.render(canvas)
    }
}

impl Default for PauseMenu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_and_quit_to_menu() {
        let mut pause = PauseMenu::new();
        assert_eq!(pause.handle_action(GameAction::Pause), Some(PauseChoice::Resume));
        assert_eq!(pause.handle_action(GameAction::Back), Some(PauseChoice::Resume));
        pause.handle_action(GameAction::MenuDown);
        assert_eq!(pause.handle_action(GameAction::MenuConfirm), Some(PauseChoice::MainMenu));
    }
}
