//! World rendering
//!
//! Entities are collected from the world and drawn back to front by render
//! layer. The sort is stable, so entities on the same layer keep spawn order.
//! Every entity is drawn from its [`DrawShape`] and color; nothing here
//! needs a texture. An optional background image is drawn when one loaded.

use crate::entity::{Beam, CollisionTag, DrawShape, GameEntity};
use crate::game::GameWorld;
use crate::player::VisualState;
use glam::Vec2;
use sdl2::pixels::Color;
use sdl2::rect::{Point, Rect};
use sdl2::render::{BlendMode, Canvas, Texture};
use sdl2::video::Window;

const STAR_COUNT: u32 = 90;
const STAR_SPEED: f32 = 40.0;

/// Entities in draw order, lowest layer first
///
/// The player is left out while blinking through invulnerability.
pub fn draw_order(world: &GameWorld) -> Vec<&dyn GameEntity> {
    let mut renderables: Vec<&dyn GameEntity> =
        Vec::with_capacity(1 + world.spawner.len() + world.bullets.active_count());

    if world.player.is_alive() && world.player.visible() {
        renderables.push(&world.player);
    }
    renderables.extend(world.spawner.iter().filter(|e| !e.core().lifecycle.is_dead()));
    for bullet in world.bullets.active() {
        renderables.push(bullet);
    }

    renderables.sort_by_key(|e| e.core().layer);
    renderables
}

/// Half-widths of each row of a filled circle, top to bottom
pub fn circle_spans(radius: i32) -> Vec<(i32, i32)> {
    let r = radius.max(0);
    (-r..=r)
        .map(|dy| {
            let half = ((r * r - dy * dy) as f32).sqrt() as i32;
            (dy, half)
        })
        .collect()
}

fn fill_circle(canvas: &mut Canvas<Window>, center: Vec2, radius: f32) -> Result<(), String> {
    let cx = center.x as i32;
    let cy = center.y as i32;
    for (dy, half) in circle_spans(radius.round() as i32) {
        canvas.draw_line(Point::new(cx - half, cy + dy), Point::new(cx + half, cy + dy))?;
    }
    Ok(())
}

fn draw_ring(canvas: &mut Canvas<Window>, center: Vec2, radius: f32) -> Result<(), String> {
    let segments = ((radius * 0.5) as usize).clamp(16, 128);
    let points: Vec<Point> = (0..=segments)
        .map(|i| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            let p = center + Vec2::from_angle(angle) * radius;
            Point::new(p.x as i32, p.y as i32)
        })
        .collect();
    canvas.draw_lines(points.as_slice())
}

/// A beam as parallel lines, one per pixel of width
fn draw_beam(canvas: &mut Canvas<Window>, beam: &Beam) -> Result<(), String> {
    let color = if beam.damage > 0.0 {
        Color::RGB(255, 240, 160)
    } else {
        Color::RGBA(255, 60, 60, 160)
    };
    canvas.set_draw_color(color);
    let normal = beam.direction.perp();
    let end = beam.end();
    let lines = beam.width.round().max(1.0) as i32;
    for i in 0..lines {
        let offset = normal * (i as f32 - (lines - 1) as f32 / 2.0);
        let (a, b) = (beam.origin + offset, end + offset);
        canvas.draw_line(Point::new(a.x as i32, a.y as i32), Point::new(b.x as i32, b.y as i32))?;
    }
    Ok(())
}

fn tint(color: (u8, u8, u8), state: VisualState) -> Color {
    let (r, g, b) = color;
    match state {
        VisualState::Normal => Color::RGB(r, g, b),
        VisualState::DamagedModerate => Color::RGB(r.saturating_add(60), g, b / 2),
        VisualState::DamagedCritical => Color::RGB(255, g / 3, b / 3),
    }
}

fn draw_entity(canvas: &mut Canvas<Window>, entity: &dyn GameEntity, color: Color) -> Result<(), String> {
    let core = entity.core();
    canvas.set_draw_color(color);
    match entity.draw_shape() {
        DrawShape::Rect => canvas.fill_rect(core.rect().to_sdl()),
        DrawShape::Circle => fill_circle(canvas, core.center(), core.size.x.min(core.size.y) / 2.0),
        DrawShape::Ring { radius } => draw_ring(canvas, core.center(), radius),
    }
}

/// Scrolling star field behind everything
pub fn render_background(
    canvas: &mut Canvas<Window>,
    background: Option<&Texture>,
    time: f32,
) -> Result<(), String> {
    canvas.set_draw_color(Color::RGB(6, 6, 18));
    canvas.clear();
    if let Some(texture) = background {
        canvas.copy(texture, None, None)?;
        return Ok(());
    }

    let (width, height) = canvas.logical_size();
    if width == 0 || height == 0 {
        return Ok(());
    }
    for i in 0..STAR_COUNT {
        // Fixed pseudo-random column and depth per star
        let seed = i.wrapping_mul(2_654_435_761);
        let x = (seed % width) as i32;
        let depth = 1 + (seed >> 8) % 3;
        let start = ((seed >> 4) % height) as f32;
        let y = (start + time * STAR_SPEED * depth as f32) % height as f32;
        let shade = 70 + depth as u8 * 50;
        canvas.set_draw_color(Color::RGB(shade, shade, shade));
        canvas.fill_rect(Rect::new(x, y as i32, depth, depth))?;
    }
    Ok(())
}

/// Draws every live entity, and the collision boxes when `show_hitboxes` is on
pub fn render_world(canvas: &mut Canvas<Window>, world: &GameWorld, show_hitboxes: bool) -> Result<(), String> {
    let player_id = world.player.core().id;
    for entity in draw_order(world) {
        let color = if entity.core().id == player_id {
            tint(entity.color(), world.player.visual_state())
        } else {
            let (r, g, b) = entity.color();
            Color::RGB(r, g, b)
        };
        draw_entity(canvas, entity, color)?;
        for beam in entity.beams() {
            draw_beam(canvas, &beam)?;
        }
    }

    if show_hitboxes {
        render_hitboxes(canvas, world)?;
    }
    Ok(())
}

fn hitbox_color(tag: CollisionTag) -> Color {
    match tag {
        CollisionTag::Player => Color::RGB(0, 255, 0),
        CollisionTag::PlayerBullet => Color::RGB(0, 255, 255),
        CollisionTag::Enemy => Color::RGB(255, 0, 0),
        CollisionTag::EnemyBullet => Color::RGB(255, 0, 255),
        CollisionTag::Pickup => Color::RGB(255, 255, 0),
        CollisionTag::Hazard => Color::RGB(255, 128, 0),
        CollisionTag::Neutral | CollisionTag::Environment => Color::RGB(128, 128, 128),
    }
}

fn render_hitboxes(canvas: &mut Canvas<Window>, world: &GameWorld) -> Result<(), String> {
    for (_, (tag, rect)) in world.collision.registered() {
        canvas.set_draw_color(hitbox_color(*tag));
        canvas.draw_rect(rect.to_sdl())?;
    }
    // Extra hitboxes, e.g. boss parts
    for entity in world.spawner.iter() {
        for (_, part) in entity.extra_hitboxes() {
            canvas.set_draw_color(hitbox_color(entity.core().tag));
            canvas.draw_rect(part.to_sdl())?;
        }
    }
    Ok(())
}

/// Black overlay for scene fades, `alpha` in `0.0..=1.0`
pub fn render_fade(canvas: &mut Canvas<Window>, alpha: f32) -> Result<(), String> {
    if alpha <= 0.0 {
        return Ok(());
    }
    canvas.set_blend_mode(BlendMode::Blend);
    canvas.set_draw_color(Color::RGBA(0, 0, 0, (alpha.clamp(0.0, 1.0) * 255.0) as u8));
    canvas.fill_rect(None)?;
    canvas.set_blend_mode(BlendMode::None);
    Ok(())
}
