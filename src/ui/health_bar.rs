//! Health bars for the ship and the boss
//!
//! Bars are stateless. Create one per style and call [`HealthBar::render`]
//! with the fraction to show.

use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;

/// Visual style of a health bar
#[derive(Debug, Clone)]
pub struct HealthBarStyle {
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
    /// Fill color above `low_threshold`
    pub health_color: Color,
    pub low_health_color: Color,
    pub low_threshold: f32,
    pub border_color: Color,
    /// 0 disables the border
    pub border_thickness: u32,
    /// Draw the bar even at full health
    pub show_when_full: bool,
}

impl Default for HealthBarStyle {
    fn default() -> Self {
        HealthBarStyle {
            width: 200,
            height: 12,
            background_color: Color::RGB(50, 50, 50),
            health_color: Color::RGB(0, 200, 0),
            low_health_color: Color::RGB(200, 0, 0),
            low_threshold: 0.3,
            border_color: Color::RGB(220, 220, 220),
            border_thickness: 1,
            show_when_full: true,
        }
    }
}

impl HealthBarStyle {
    /// Wide orange bar across the top of the screen
    pub fn boss() -> Self {
        HealthBarStyle {
            width: 600,
            height: 14,
            health_color: Color::RGB(255, 140, 0),
            low_health_color: Color::RGB(255, 40, 40),
            ..HealthBarStyle::default()
        }
    }
}

pub struct HealthBar {
    style: HealthBarStyle,
}

impl HealthBar {
    pub fn new() -> Self {
        HealthBar {
            style: HealthBarStyle::default(),
        }
    }

    pub fn with_style(style: HealthBarStyle) -> Self {
        HealthBar { style }
    }

    pub fn style(&self) -> &HealthBarStyle {
        &self.style
    }

    /// Width of the filled part for a health fraction
    pub fn fill_width(&self, fraction: f32) -> u32 {
        (self.style.width as f32 * fraction.clamp(0.0, 1.0)) as u32
    }

    pub fn fill_color(&self, fraction: f32) -> Color {
        if fraction < self.style.low_threshold {
            self.style.low_health_color
        } else {
            self.style.health_color
        }
    }

    /// Draws the bar with its top-left corner at `x`, `y`
    pub fn render(&self, canvas: &mut Canvas<Window>, x: i32, y: i32, fraction: f32) -> Result<(), String> {
        if !self.style.show_when_full && fraction >= 1.0 {
            return Ok(());
        }

        let frame = Rect::new(x, y, self.style.width, self.style.height);
        canvas.set_draw_color(self.style.background_color);
        canvas.fill_rect(frame)?;

        let fill = self.fill_width(fraction);
        if fill > 0 {
            canvas.set_draw_color(self.fill_color(fraction));
            canvas.fill_rect(Rect::new(x, y, fill, self.style.height))?;
        }

        // Border goes on top
        if self.style.border_thickness > 0 {
            canvas.set_draw_color(self.style.border_color);
            canvas.draw_rect(frame)?;
        }
        Ok(())
    }

    /// Draws the bar centered horizontally on `center_x`
    pub fn render_centered(
        &self,
        canvas: &mut Canvas<Window>,
        center_x: i32,
        y: i32,
        fraction: f32,
    ) -> Result<(), String> {
        self.render(canvas, center_x - self.style.width as i32 / 2, y, fraction)
    }
}

impl Default for HealthBar {
    fn default() -> Self {
        Self::new()
    }
}
