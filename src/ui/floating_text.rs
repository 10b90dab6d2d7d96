//! Floating score numbers
//!
//! Each popup drifts upward and fades out over its lifetime. [`FloatingText`]
//! owns the live popups; the world hands it [`ScorePopup`]s as enemies die.

use crate::game::ScorePopup;
use crate::text::draw_centered_text;
use glam::Vec2;
use sdl2::pixels::Color;
use sdl2::render::{BlendMode, Canvas};
use sdl2::video::Window;

#[derive(Debug, Clone)]
pub struct FloatingTextStyle {
    pub scale: u32,
    /// Seconds a popup stays on screen
    pub lifetime: f32,
    /// Upward drift in pixels per second
    pub rise_speed: f32,
    pub color: Color,
    pub outline_color: Color,
    pub outline_offset: i32,
}

impl Default for FloatingTextStyle {
    fn default() -> Self {
        FloatingTextStyle {
            scale: 2,
            lifetime: 0.8,
            rise_speed: 60.0,
            color: Color::RGB(255, 230, 80),
            outline_color: Color::RGB(0, 0, 0),
            outline_offset: 1,
        }
    }
}

/// A single live popup
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingTextInstance {
    pub text: String,
    pub position: Vec2,
    pub age: f32,
}

pub struct FloatingText {
    style: FloatingTextStyle,
    active: Vec<FloatingTextInstance>,
}

impl FloatingText {
    pub fn new() -> Self {
        Self::with_style(FloatingTextStyle::default())
    }

    pub fn with_style(style: FloatingTextStyle) -> Self {
        FloatingText {
            style,
            active: Vec::new(),
        }
    }

    pub fn push(&mut self, text: impl Into<String>, position: Vec2) {
        self.active.push(FloatingTextInstance {
            text: text.into(),
            position,
            age: 0.0,
        });
    }

    pub fn push_score(&mut self, popup: &ScorePopup) {
        self.push(format!("+{}", popup.score), popup.position);
    }

    pub fn update(&mut self, dt: f32) {
        let rise = self.style.rise_speed * dt;
        for popup in &mut self.active {
            popup.age += dt;
            popup.position.y -= rise;
        }
        let lifetime = self.style.lifetime;
        self.active.retain(|p| p.age < lifetime);
    }

    /// Opacity for a popup of the given age
    pub fn alpha(&self, age: f32) -> u8 {
        let t = (age / self.style.lifetime).clamp(0.0, 1.0);
        (255.0 * (1.0 - t)) as u8
    }

    pub fn active(&self) -> &[FloatingTextInstance] {
        &self.active
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn render(&self, canvas: &mut Canvas<Window>) -> Result<(), String> {
        canvas.set_blend_mode(BlendMode::Blend);
        let outline = self.style.outline_color;
        for popup in &self.active {
            let alpha = self.alpha(popup.age);
            let x = popup.position.x as i32;
            let y = popup.position.y as i32;
            draw_centered_text(
                canvas,
                &popup.text,
                x + self.style.outline_offset,
                y + self.style.outline_offset,
                Color::RGBA(outline.r, outline.g, outline.b, alpha),
                self.style.scale,
            )?;
            let color = self.style.color;
            draw_centered_text(
                canvas,
                &popup.text,
                x,
                y,
                Color::RGBA(color.r, color.g, color.b, alpha),
                self.style.scale,
            )?;
        }
        canvas.set_blend_mode(BlendMode::None);
        Ok(())
    }
}

impl Default for FloatingText {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popups_rise_and_expire() {
        let mut texts = FloatingText::new();
        texts.push_score(&ScorePopup {
            position: Vec2::new(100.0, 200.0),
            score: 50,
        });
        assert_eq!(texts.active()[0].text, "+50");

        texts.update(0.5);
        assert_eq!(texts.active()[0].position.y, 170.0);

        texts.update(0.5);
        assert!(texts.active().is_empty());
    }

    #[test]
    fn test_alpha_fades_out() {
        let texts = FloatingText::new();
        assert_eq!(texts.alpha(0.0), 255);
        assert_eq!(texts.alpha(0.8), 0);
        assert!(texts.alpha(0.4) < 255);
    }
}
