//! Title screen menu

use super::menu::{Menu, MenuItem, MenuResponse, MenuStyle};
use crate::input_system::GameAction;
use sdl2::render::Canvas;
use sdl2::video::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainMenuChoice {
    Start,
    Campaigns,
    Settings,
    Quit,
}

const CHOICES: [MainMenuChoice; 4] = [
    MainMenuChoice::Start,
    MainMenuChoice::Campaigns,
    MainMenuChoice::Settings,
    MainMenuChoice::Quit,
];

pub struct MainMenu {
    menu: Menu,
}

impl MainMenu {
    pub fn new() -> Self {
        let style = MenuStyle {
            overlay_alpha: 0,
            ..MenuStyle::default()
        };
        let mut menu = Menu::with_style(
            "202X",
            vec![
                MenuItem::new("START"),
                MenuItem::new("CAMPAIGNS"),
                MenuItem::new("SETTINGS"),
                MenuItem::new("QUIT"),
            ],
            style,
        );
        menu.set_footer(Some("ARROWS TO MOVE  ENTER TO SELECT".to_string()));
        MainMenu { menu }
    }

    /// Shows the saved high score under the items
    pub fn set_high_score(&mut self, high_score: u32) {
        self.menu
            .set_footer(Some(format!("HIGH SCORE {}", high_score)));
    }

    /// Back on the title screen quits
    pub fn handle_action(&mut self, action: GameAction) -> Option<MainMenuChoice> {
        match self.menu.handle_action(action) {
            MenuResponse::Confirmed(index) => CHOICES.get(index).copied(),
            MenuResponse::Back => Some(MainMenuChoice::Quit),
            _ => None,
        }
    }

    pub fn render(&self, canvas: &mut Canvas<Window>) -> Result<(), String> {
        self.menu.render(canvas)
    }
}

impl Default for MainMenu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choices_follow_selection() {
        let mut menu = MainMenu::new();
        assert_eq!(menu.handle_action(GameAction::MenuConfirm), Some(MainMenuChoice::Start));
        menu.handle_action(GameAction::MenuDown);
        assert_eq!(menu.handle_action(GameAction::MenuConfirm), Some(MainMenuChoice::Campaigns));
        menu.handle_action(GameAction::MenuUp);
        menu.handle_action(GameAction::MenuUp);
        assert_eq!(menu.handle_action(GameAction::MenuConfirm), Some(MainMenuChoice::Quit));
    }

    #[test]
    fn test_back_quits() {
        let mut menu = MainMenu::new();
        assert_eq!(menu.handle_action(GameAction::Back), Some(MainMenuChoice::Quit));
        assert_eq!(menu.handle_action(GameAction::MenuDown), None);
    }
}
