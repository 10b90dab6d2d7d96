//! Base vertical menu
//!
//! A titled box of items with one highlighted selection. Concrete screens wrap
//! a [`Menu`] and map the selected index to their own choice enum.

use crate::input_system::GameAction;
use crate::text::{draw_centered_text, draw_simple_text};
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::{BlendMode, Canvas};
use sdl2::video::Window;

#[derive(Debug, Clone)]
pub struct MenuStyle {
    pub width: u32,
    /// Box height is derived from the item count when `None`
    pub height: Option<u32>,
    pub background_color: Color,
    pub border_color: Color,
    /// Dim the scene behind the menu, 0 for none
    pub overlay_alpha: u8,
    pub title_color: Color,
    pub item_color: Color,
    pub disabled_color: Color,
    pub selected_item_color: Color,
    pub highlight_color: Color,
    pub item_height: u32,
}

impl Default for MenuStyle {
    fn default() -> Self {
        MenuStyle {
            width: 500,
            height: None,
            background_color: Color::RGB(20, 20, 36),
            border_color: Color::RGB(100, 100, 140),
            overlay_alpha: 180,
            title_color: Color::RGB(220, 220, 240),
            item_color: Color::RGB(160, 160, 170),
            disabled_color: Color::RGB(80, 80, 90),
            selected_item_color: Color::RGB(255, 255, 255),
            highlight_color: Color::RGB(60, 80, 140),
            item_height: 48,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub text: String,
    pub enabled: bool,
}

impl MenuItem {
    pub fn new(text: impl Into<String>) -> Self {
        MenuItem {
            text: text.into(),
            enabled: true,
        }
    }

    pub fn disabled(text: impl Into<String>) -> Self {
        MenuItem {
            text: text.into(),
            enabled: false,
        }
    }
}

/// What a menu did with an input action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuResponse {
    None,
    Moved,
    Confirmed(usize),
    Back,
}

pub struct Menu {
    title: String,
    items: Vec<MenuItem>,
    selected_index: usize,
    style: MenuStyle,
    footer: Option<String>,
}

impl Menu {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Menu::with_style(title, items, MenuStyle::default())
    }

    pub fn with_style(title: impl Into<String>, items: Vec<MenuItem>, style: MenuStyle) -> Self {
        let mut menu = Menu {
            title: title.into(),
            items,
            selected_index: 0,
            style,
            footer: None,
        };
        menu.skip_disabled(1);
        menu
    }

    pub fn set_footer(&mut self, footer: Option<String>) {
        self.footer = footer;
    }

    pub fn set_items(&mut self, items: Vec<MenuItem>) {
        self.items = items;
        self.selected_index = 0;
        self.skip_disabled(1);
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    // Moves off disabled items in `step` direction; stays put when all are disabled
    fn skip_disabled(&mut self, step: isize) {
        let len = self.items.len();
        for _ in 0..len {
            if self.items[self.selected_index].enabled {
                return;
            }
            self.selected_index = (self.selected_index as isize + step).rem_euclid(len as isize) as usize;
        }
    }

    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected_index = if self.selected_index == 0 {
            self.items.len() - 1
        } else {
            self.selected_index - 1
        };
        self.skip_disabled(-1);
    }

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected_index = (self.selected_index + 1) % self.items.len();
        self.skip_disabled(1);
    }

    pub fn handle_action(&mut self, action: GameAction) -> MenuResponse {
        match action {
            GameAction::MenuUp => {
                self.select_previous();
                MenuResponse::Moved
            }
            GameAction::MenuDown => {
                self.select_next();
                MenuResponse::Moved
            }
            GameAction::MenuConfirm => match self.items.get(self.selected_index) {
                Some(item) if item.enabled => MenuResponse::Confirmed(self.selected_index),
                _ => MenuResponse::None,
            },
            GameAction::Back => MenuResponse::Back,
            _ => MenuResponse::None,
        }
    }

    fn box_height(&self) -> u32 {
        self.style
            .height
            .unwrap_or(110 + self.items.len() as u32 * self.style.item_height + 30)
    }

    pub fn render(&self, canvas: &mut Canvas<Window>) -> Result<(), String> {
        if self.style.overlay_alpha > 0 {
            canvas.set_blend_mode(BlendMode::Blend);
            canvas.set_draw_color(Color::RGBA(0, 0, 0, self.style.overlay_alpha));
            canvas.fill_rect(None)?;
            canvas.set_blend_mode(BlendMode::None);
        }

        let (screen_width, screen_height) = canvas.logical_size();
        let height = self.box_height();
        let menu_x = screen_width.saturating_sub(self.style.width) as i32 / 2;
        let menu_y = screen_height.saturating_sub(height) as i32 / 2;
        let frame = Rect::new(menu_x, menu_y, self.style.width, height);

        canvas.set_draw_color(self.style.background_color);
        canvas.fill_rect(frame)?;
        canvas.set_draw_color(self.style.border_color);
        canvas.draw_rect(frame)?;

        let center_x = menu_x + self.style.width as i32 / 2;
        draw_centered_text(canvas, &self.title, center_x, menu_y + 30, self.style.title_color, 3)?;

        let item_start_y = menu_y + 100;
        for (i, item) in self.items.iter().enumerate() {
            let item_y = item_start_y + (i as u32 * self.style.item_height) as i32;
            let is_selected = i == self.selected_index;

            if is_selected {
                canvas.set_draw_color(self.style.highlight_color);
                canvas.fill_rect(Rect::new(menu_x + 15, item_y - 6, self.style.width - 30, 34))?;
            }

            let color = if !item.enabled {
                self.style.disabled_color
            } else if is_selected {
                self.style.selected_item_color
            } else {
                self.style.item_color
            };
            draw_simple_text(canvas, &item.text, menu_x + 40, item_y, color, 3)?;
        }

        if let Some(footer) = &self.footer {
            draw_centered_text(
                canvas,
                footer,
                center_x,
                menu_y + height as i32 - 22,
                self.style.item_color,
                1,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Menu {
        Menu::new(
            "TEST",
            vec![MenuItem::new("A"), MenuItem::disabled("B"), MenuItem::new("C")],
        )
    }

    #[test]
    fn test_navigation_wraps_and_skips_disabled() {
        let mut menu = menu();
        assert_eq!(menu.selected_index(), 0);
        menu.select_next();
        assert_eq!(menu.selected_index(), 2);
        menu.select_next();
        assert_eq!(menu.selected_index(), 0);
        menu.select_previous();
        assert_eq!(menu.selected_index(), 2);
        menu.select_previous();
        assert_eq!(menu.selected_index(), 0);
    }

    #[test]
    fn test_first_enabled_item_is_selected() {
        let menu = Menu::new("T", vec![MenuItem::disabled("X"), MenuItem::new("Y")]);
        assert_eq!(menu.selected_index(), 1);
    }

    #[test]
    fn test_handle_action() {
        let mut menu = menu();
        assert_eq!(menu.handle_action(GameAction::MenuDown), MenuResponse::Moved);
        assert_eq!(menu.handle_action(GameAction::MenuConfirm), MenuResponse::Confirmed(2));
        assert_eq!(menu.handle_action(GameAction::Back), MenuResponse::Back);
        assert_eq!(menu.handle_action(GameAction::Pause), MenuResponse::None);
    }

    #[test]
    fn test_empty_menu_is_inert() {
        let mut menu = Menu::new("EMPTY", Vec::new());
        menu.select_next();
        menu.select_previous();
        assert_eq!(menu.handle_action(GameAction::MenuConfirm), MenuResponse::None);
    }
}
