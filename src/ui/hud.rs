//! In-game heads-up display
//!
//! Top-left: score and high score. Top-right: lives, level and the exp bar.
//! The ship's health bar sits along the bottom-left and the stage name is
//! centered at the top. A boss bar appears under it while a boss is alive.

use super::health_bar::{HealthBar, HealthBarStyle};
use crate::entity::EntityCategory;
use crate::game::GameWorld;
use crate::text::{draw_centered_text, draw_simple_text, text_width};
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;

const MARGIN: i32 = 16;
const TEXT_SCALE: u32 = 2;
const EXP_BAR_WIDTH: u32 = 160;
const EXP_BAR_HEIGHT: u32 = 6;

/// Everything the HUD shows, taken from the world once per frame
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub score: u32,
    pub high_score: u32,
    pub lives: u32,
    pub level: u32,
    pub exp_progress: f32,
    pub health_fraction: f32,
    pub stage_name: Option<String>,
    pub boss_health: Option<f32>,
}

impl HudSnapshot {
    pub fn from_world(world: &GameWorld) -> Self {
        let boss_health = world
            .spawner
            .entities_by_category(EntityCategory::Enemy)
            .into_iter()
            .find(|e| e.type_name() == "boss" && e.core().is_alive())
            .and_then(|boss| boss.health_fraction());
        HudSnapshot {
            score: world.stats.score,
            high_score: world.stats.high_score,
            lives: world.state.lives,
            level: world.player.progression.level,
            exp_progress: world.player.progression.progress(),
            health_fraction: world.player.health.percentage(),
            stage_name: world.level.current_stage_name().map(str::to_string),
            boss_health,
        }
    }

    pub fn score_line(&self) -> String {
        format!("SCORE {:08}", self.score)
    }

    pub fn high_score_line(&self) -> String {
        format!("HI {:08}", self.high_score)
    }

    pub fn status_line(&self) -> String {
        format!("LIVES {}  LV {}", self.lives, self.level)
    }
}

pub struct Hud {
    health_bar: HealthBar,
    boss_bar: HealthBar,
    text_color: Color,
    accent_color: Color,
}

impl Hud {
    pub fn new() -> Self {
        Hud {
            health_bar: HealthBar::new(),
            boss_bar: HealthBar::with_style(HealthBarStyle::boss()),
            text_color: Color::RGB(240, 240, 240),
            accent_color: Color::RGB(120, 200, 255),
        }
    }

    pub fn render(&self, canvas: &mut Canvas<Window>, hud: &HudSnapshot) -> Result<(), String> {
        let (screen_width, screen_height) = canvas.logical_size();
        let right = screen_width as i32 - MARGIN;

        draw_simple_text(canvas, &hud.score_line(), MARGIN, MARGIN, self.text_color, TEXT_SCALE)?;
        draw_simple_text(
            canvas,
            &hud.high_score_line(),
            MARGIN,
            MARGIN + 22,
            self.accent_color,
            TEXT_SCALE,
        )?;

        let status = hud.status_line();
        draw_simple_text(
            canvas,
            &status,
            right - text_width(&status, TEXT_SCALE) as i32,
            MARGIN,
            self.text_color,
            TEXT_SCALE,
        )?;

        // Exp bar under the status line
        let exp_x = right - EXP_BAR_WIDTH as i32;
        let exp_y = MARGIN + 22;
        canvas.set_draw_color(Color::RGB(40, 40, 60));
        canvas.fill_rect(Rect::new(exp_x, exp_y, EXP_BAR_WIDTH, EXP_BAR_HEIGHT))?;
        let filled = (EXP_BAR_WIDTH as f32 * hud.exp_progress.clamp(0.0, 1.0)) as u32;
        if filled > 0 {
            canvas.set_draw_color(self.accent_color);
            canvas.fill_rect(Rect::new(exp_x, exp_y, filled, EXP_BAR_HEIGHT))?;
        }

        if let Some(name) = &hud.stage_name {
            draw_centered_text(
                canvas,
                &name.to_uppercase(),
                screen_width as i32 / 2,
                MARGIN,
                self.text_color,
                TEXT_SCALE,
            )?;
        }
        if let Some(fraction) = hud.boss_health {
            self.boss_bar
                .render_centered(canvas, screen_width as i32 / 2, MARGIN + 24, fraction)?;
        }

        let bar_y = screen_height as i32 - MARGIN - self.health_bar.style().height as i32;
        draw_simple_text(canvas, "HP", MARGIN, bar_y - 2, self.text_color, TEXT_SCALE)?;
        self.health_bar
            .render(canvas, MARGIN + 32, bar_y, hud.health_fraction)?;
        Ok(())
    }
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}
