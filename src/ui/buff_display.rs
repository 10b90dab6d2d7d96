//! Screen-space list of the ship's timed power-ups
//!
//! One row per boosted stat: a colored badge, the stat label and the seconds
//! left on the longest-running modifier for that stat.

use crate::stats::{StatBlock, StatType};
use crate::text::{draw_simple_text, GLYPH_HEIGHT};
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;

#[derive(Debug, Clone)]
pub struct BuffDisplayStyle {
    pub x: i32,
    pub y: i32,
    pub badge_size: u32,
    pub row_spacing: i32,
    pub text_scale: u32,
    pub text_color: Color,
}

impl Default for BuffDisplayStyle {
    fn default() -> Self {
        BuffDisplayStyle {
            x: 16,
            y: 110,
            badge_size: 16,
            row_spacing: 6,
            text_scale: 2,
            text_color: Color::RGB(230, 230, 230),
        }
    }
}

/// One displayed row
#[derive(Debug, Clone, PartialEq)]
pub struct BuffEntry {
    pub stat: StatType,
    pub remaining: f32,
}

impl BuffEntry {
    pub fn label(&self) -> String {
        format!("{} {:.0}S", self.stat.label(), self.remaining.ceil())
    }
}

fn badge_color(stat: StatType) -> Color {
    match stat {
        StatType::MoveSpeed => Color::RGB(80, 200, 255),
        StatType::FireRate => Color::RGB(255, 220, 60),
        StatType::Damage => Color::RGB(255, 90, 90),
    }
}

pub struct BuffDisplay {
    style: BuffDisplayStyle,
}

impl BuffDisplay {
    pub fn new() -> Self {
        BuffDisplay {
            style: BuffDisplayStyle::default(),
        }
    }

    pub fn with_style(style: BuffDisplayStyle) -> Self {
        BuffDisplay { style }
    }

    /// Rows for the timed modifiers, one per stat, in a fixed stat order
    pub fn entries(stats: &StatBlock) -> Vec<BuffEntry> {
        let mut entries: Vec<BuffEntry> = Vec::new();
        for (modifier, remaining) in stats.timed() {
            match entries.iter_mut().find(|e| e.stat == modifier.stat) {
                Some(entry) => entry.remaining = entry.remaining.max(remaining),
                None => entries.push(BuffEntry {
                    stat: modifier.stat,
                    remaining,
                }),
            }
        }
        entries.sort_by_key(|e| e.stat as u8);
        entries
    }

    pub fn render(&self, canvas: &mut Canvas<Window>, stats: &StatBlock) -> Result<(), String> {
        let row_height = (GLYPH_HEIGHT * self.style.text_scale).max(self.style.badge_size) as i32;
        let mut y = self.style.y;

        for entry in Self::entries(stats) {
            canvas.set_draw_color(badge_color(entry.stat));
            canvas.fill_rect(Rect::new(
                self.style.x,
                y,
                self.style.badge_size,
                self.style.badge_size,
            ))?;

            draw_simple_text(
                canvas,
                &entry.label(),
                self.style.x + self.style.badge_size as i32 + 8,
                y,
                self.style.text_color,
                self.style.text_scale,
            )?;
            y += row_height + self.style.row_spacing;
        }
        Ok(())
    }
}

impl Default for BuffDisplay {
    fn default() -> Self {
        Self::new()
    }
}
