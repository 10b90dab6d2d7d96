//! End-of-run screen for both game over and victory
//!
//! Shows the final score and run stats over a dark overlay, with a short
//! delay before input is accepted so a held fire key doesn't skip it.

use super::menu::{Menu, MenuItem, MenuResponse, MenuStyle};
use crate::input_system::GameAction;
use crate::session::SessionStats;
use crate::text::draw_centered_text;
use sdl2::pixels::Color;
use sdl2::render::{BlendMode, Canvas};
use sdl2::video::Window;

const INPUT_DELAY: f32 = 0.75;

#[derive(Debug, Clone)]
pub struct GameOverStyle {
    pub overlay_alpha: u8,
    pub defeat_color: Color,
    pub victory_color: Color,
    pub score_color: Color,
    pub detail_color: Color,
}

impl Default for GameOverStyle {
    fn default() -> Self {
        GameOverStyle {
            overlay_alpha: 220,
            defeat_color: Color::RGB(255, 50, 50),
            victory_color: Color::RGB(90, 255, 120),
            score_color: Color::RGB(255, 255, 100),
            detail_color: Color::RGB(150, 150, 160),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverChoice {
    /// Play the next level of the campaign
    Continue,
    Retry,
    MainMenu,
}

/// Stats shown on the screen, copied when the run ends
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub victory: bool,
    pub score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
    pub enemies_killed: u32,
    pub time: String,
}

impl RunSummary {
    pub fn from_stats(stats: &SessionStats, victory: bool, previous_high: u32) -> Self {
        RunSummary {
            victory,
            score: stats.score,
            high_score: stats.high_score,
            new_high_score: stats.score > previous_high,
            enemies_killed: stats.enemies_killed,
            time: stats.formatted_time(),
        }
    }
}

pub struct GameOverScreen {
    summary: Option<RunSummary>,
    choices: Vec<GameOverChoice>,
    menu: Menu,
    elapsed: f32,
    style: GameOverStyle,
}

impl GameOverScreen {
    pub fn new() -> Self {
        GameOverScreen {
            summary: None,
            choices: Vec::new(),
            menu: Menu::new("", Vec::new()),
            elapsed: 0.0,
            style: GameOverStyle::default(),
        }
    }

    /// Opens the screen. `has_next` offers Continue after a victory.
    pub fn trigger(&mut self, summary: RunSummary, has_next: bool) {
        self.choices = if summary.victory && has_next {
            vec![GameOverChoice::Continue, GameOverChoice::Retry, GameOverChoice::MainMenu]
        } else {
            vec![GameOverChoice::Retry, GameOverChoice::MainMenu]
        };
        let items = self
            .choices
            .iter()
            .map(|c| {
                MenuItem::new(match c {
                    GameOverChoice::Continue => "CONTINUE",
                    GameOverChoice::Retry => "RETRY",
                    GameOverChoice::MainMenu => "MAIN MENU",
                })
            })
            .collect();
        let style = MenuStyle {
            overlay_alpha: 0,
            height: Some(280),
            ..MenuStyle::default()
        };
        self.menu = Menu::with_style("", items, style);
        self.summary = Some(summary);
        self.elapsed = 0.0;
    }

    pub fn reset(&mut self) {
        self.summary = None;
        self.elapsed = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.summary.is_some()
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn update(&mut self, dt: f32) {
        if self.is_active() {
            self.elapsed += dt;
        }
    }

    pub fn accepts_input(&self) -> bool {
        self.is_active() && self.elapsed >= INPUT_DELAY
    }

    pub fn handle_action(&mut self, action: GameAction) -> Option<GameOverChoice> {
        if !self.accepts_input() {
            return None;
        }
        match self.menu.handle_action(action) {
            MenuResponse::Confirmed(index) => self.choices.get(index).copied(),
            MenuResponse::Back => Some(GameOverChoice::MainMenu),
            _ => None,
        }
    }

    pub fn render(&self, canvas: &mut Canvas<Window>) -> Result<(), String> {
        let Some(summary) = &self.summary else {
            return Ok(());
        };

        canvas.set_blend_mode(BlendMode::Blend);
        canvas.set_draw_color(Color::RGBA(0, 0, 0, self.style.overlay_alpha));
        canvas.fill_rect(None)?;
        canvas.set_blend_mode(BlendMode::None);

        let (screen_width, _) = canvas.logical_size();
        let center_x = screen_width as i32 / 2;

        let (title, color) = if summary.victory {
            ("VICTORY", self.style.victory_color)
        } else {
            ("GAME OVER", self.style.defeat_color)
        };
        draw_centered_text(canvas, title, center_x, 70, color, 6)?;
        draw_centered_text(
            canvas,
            &format!("SCORE {}", summary.score),
            center_x,
            150,
            self.style.score_color,
            3,
        )?;
        let high = if summary.new_high_score {
            "NEW HIGH SCORE!".to_string()
        } else {
            format!("HIGH SCORE {}", summary.high_score)
        };
        draw_centered_text(canvas, &high, center_x, 190, self.style.score_color, 2)?;
        draw_centered_text(
            canvas,
            &format!("KILLS {}  TIME {}", summary.enemies_killed, summary.time),
            center_x,
            220,
            self.style.detail_color,
            2,
        )?;

        if self.accepts_input() {
            self.menu.render(canvas)?;
        }
        Ok(())
    }
}

impl Default for GameOverScreen {
    fn default() -> Self {
        Self::new()
    }
}
