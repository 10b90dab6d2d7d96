//! Acceleration, friction and screen clamping for the player ship

use super::config::MovementTuning;
use glam::Vec2;

/// Next velocity for the given input direction
///
/// With input, the velocity eases toward `direction * speed`, gains
/// acceleration and is capped at `speed * max_speed_mult`. Without input,
/// friction slows it down until it drops below the stop threshold.
pub fn step_velocity(velocity: Vec2, input: Vec2, speed: f32, tuning: &MovementTuning, dt: f32) -> Vec2 {
    match input.try_normalize() {
        Some(direction) => {
            let desired = direction * speed;
            let eased = velocity.lerp(desired, tuning.smoothing) + direction * tuning.accel * dt;
            eased.clamp_length_max(speed * tuning.max_speed_mult)
        }
        None => {
            let current = velocity.length();
            if current <= 0.0 {
                return Vec2::ZERO;
            }
            let next = (current - tuning.friction * dt).max(0.0);
            if next < tuning.stop_threshold {
                Vec2::ZERO
            } else {
                velocity * (next / current)
            }
        }
    }
}

/// Keeps `pos` (top-left) inside the screen, zeroing velocity on any clamped
/// axis
pub fn clamp_to_screen(pos: &mut Vec2, velocity: &mut Vec2, size: Vec2, screen: Vec2) {
    let max = (screen - size).max(Vec2::ZERO);
    let clamped = pos.clamp(Vec2::ZERO, max);
    if clamped.x != pos.x {
        velocity.x = 0.0;
    }
    if clamped.y != pos.y {
        velocity.y = 0.0;
    }
    *pos = clamped;
}
