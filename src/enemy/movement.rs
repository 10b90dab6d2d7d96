//! Enemy movement behaviors
//!
//! Every behavior sets the owner's velocity and then integrates the position.
//! Targets and waypoints are compared against the owner's center.

use crate::entity::{EntityCore, SpawnEdge, SpawnParams, UpdateContext};
use glam::Vec2;

pub const DEFAULT_TURN_RATE: f32 = 180.0;
pub const DEFAULT_LOCK_DELAY: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub enum Movement {
    /// Constant velocity. A zero direction keeps the enemy in place.
    Linear { direction: Vec2 },
    /// Turns toward the player by at most `turn_rate` degrees per second
    HomingContinuous { turn_rate: f32 },
    /// Flies straight, then locks onto the player once after `lock_delay`.
    /// With `axis` set, the lock aligns with the player on the spawn edge's
    /// cross axis and keeps moving inward.
    HomingSnapshot {
        lock_delay: f32,
        timer: f32,
        locked: bool,
        axis: bool,
        edge: Option<SpawnEdge>,
    },
    /// Cycles through `points`, switching target within `arrive` pixels
    Waypoints {
        points: Vec<Vec2>,
        index: usize,
        speed: f32,
        arrive: f32,
    },
}

/// Direction from `direction`, then from `spawn_edge`, then straight down
pub fn initial_direction(params: &SpawnParams) -> Vec2 {
    params
        .vec2("direction")
        .or_else(|| spawn_edge(params).map(|e| e.inward()))
        .unwrap_or(Vec2::Y)
}

pub fn spawn_edge(params: &SpawnParams) -> Option<SpawnEdge> {
    params.str("spawn_edge").and_then(SpawnEdge::parse)
}

/// Reads the `homing` key: `true`, `"snapshot"` or `"snapshot_axis"`
pub fn homing_from_params(params: &SpawnParams) -> Option<Movement> {
    let value = params.get("homing")?;
    let snapshot = |axis: bool| Movement::HomingSnapshot {
        lock_delay: params.f32_or("lock_delay", DEFAULT_LOCK_DELAY),
        timer: 0.0,
        locked: false,
        axis,
        edge: spawn_edge(params),
    };
    match (value.as_bool(), value.as_str()) {
        (Some(true), _) => Some(Movement::HomingContinuous {
            turn_rate: params.f32_or("turn_rate", DEFAULT_TURN_RATE),
        }),
        (_, Some("snapshot")) => Some(snapshot(false)),
        (_, Some("snapshot_axis")) => Some(snapshot(true)),
        _ => None,
    }
}

/// Wraps an angle difference into `-180..=180`
pub fn wrap_degrees(mut angle: f32) -> f32 {
    while angle > 180.0 {
        angle -= 360.0;
    }
    while angle < -180.0 {
        angle += 360.0;
    }
    angle
}

fn heading_degrees(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

impl Movement {
    pub fn step(&mut self, core: &mut EntityCore, speed: f32, dt: f32, ctx: &UpdateContext) {
        let center = core.center();
        match self {
            Movement::Linear { direction } => {
                core.velocity = *direction * speed;
            }
            Movement::HomingContinuous { turn_rate } => {
                let target_dir = ctx
                    .player_center
                    .and_then(|target| (target - center).try_normalize());
                if let Some(target_dir) = target_dir {
                    let current = core.velocity.try_normalize().unwrap_or(Vec2::Y);
                    let diff = wrap_degrees(heading_degrees(target_dir) - heading_degrees(current));
                    let max_turn = *turn_rate * dt;
                    let heading = (heading_degrees(current) + diff.clamp(-max_turn, max_turn)).to_radians();
                    core.velocity = Vec2::new(heading.cos(), heading.sin()) * speed;
                }
            }
            Movement::HomingSnapshot {
                lock_delay,
                timer,
                locked,
                axis,
                edge,
            } => {
                let target = if *locked { None } else { ctx.player_center };
                if let Some(target) = target {
                    *timer += dt;
                    if *timer >= *lock_delay {
                        match (*axis, *edge) {
                            (true, Some(edge)) if edge.is_vertical() => {
                                core.set_center(Vec2::new(target.x, center.y));
                                core.velocity = edge.inward() * speed;
                            }
                            (true, Some(edge)) => {
                                core.set_center(Vec2::new(center.x, target.y));
                                core.velocity = edge.inward() * speed;
                            }
                            _ => {
                                if let Some(dir) = (target - center).try_normalize() {
                                    core.velocity = dir * speed;
                                }
                            }
                        }
                        *locked = true;
                    }
                }
            }
            Movement::Waypoints {
                points,
                index,
                speed,
                arrive,
            } => {
                if points.is_empty() {
                    core.velocity = Vec2::ZERO;
                } else {
                    if center.distance(points[*index]) < *arrive {
                        *index = (*index + 1) % points.len();
                    }
                    core.velocity = (points[*index] - center)
                        .try_normalize()
                        .map_or(Vec2::ZERO, |dir| dir * *speed);
                }
            }
        }
        core.pos += core.velocity * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::hitbox::CollisionHitbox;
    use crate::entity::{CollisionTag, EntityCategory};
    use serde_json::json;

    fn core_centered(center: Vec2) -> EntityCore {
        let mut core = EntityCore::new(
            EntityCategory::Enemy,
            CollisionTag::Enemy,
            1,
            Vec2::ZERO,
            Vec2::splat(20.0),
            CollisionHitbox::default(),
        );
        core.set_center(center);
        core
    }

    fn ctx(player: Option<Vec2>) -> UpdateContext {
        UpdateContext::new(Vec2::new(1280.0, 720.0), player)
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(270.0), -90.0);
        assert_eq!(wrap_degrees(-350.0), 10.0);
        assert_eq!(wrap_degrees(45.0), 45.0);
    }

    #[test]
    fn test_initial_direction_priority() {
        let explicit = SpawnParams::new()
            .with("direction", json!([1, 0]))
            .with("spawn_edge", json!("bottom"));
        assert_eq!(initial_direction(&explicit), Vec2::X);

        let edge_only = SpawnParams::new().with("spawn_edge", json!("right"));
        assert_eq!(initial_direction(&edge_only), Vec2::NEG_X);

        assert_eq!(initial_direction(&SpawnParams::new()), Vec2::Y);
    }

    #[test]
    fn test_continuous_turn_is_rate_limited() {
        let mut core = core_centered(Vec2::new(100.0, 100.0));
        core.velocity = Vec2::new(0.0, 100.0);
        let mut movement = Movement::HomingContinuous { turn_rate: 90.0 };

        // Player straight to the right: a 90 degree turn, limited to 45
        movement.step(&mut core, 100.0, 0.5, &ctx(Some(Vec2::new(500.0, 100.0))));
        let heading = heading_degrees(core.velocity);
        assert!((heading - 45.0).abs() < 0.01);
        assert!((core.velocity.length() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_snapshot_locks_once() {
        let mut core = core_centered(Vec2::new(100.0, 100.0));
        let mut movement = Movement::HomingSnapshot {
            lock_delay: 0.5,
            timer: 0.0,
            locked: false,
            axis: false,
            edge: None,
        };

        movement.step(&mut core, 100.0, 0.25, &ctx(Some(Vec2::new(100.0, 600.0))));
        assert_eq!(core.velocity, Vec2::ZERO);

        movement.step(&mut core, 100.0, 0.25, &ctx(Some(Vec2::new(100.0, 600.0))));
        assert_eq!(core.velocity, Vec2::new(0.0, 100.0));

        // Player moves, direction stays
        movement.step(&mut core, 100.0, 0.25, &ctx(Some(Vec2::new(900.0, 100.0))));
        assert_eq!(core.velocity, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_snapshot_axis_aligns_on_cross_axis() {
        let mut core = core_centered(Vec2::new(100.0, 50.0));
        let mut movement = Movement::HomingSnapshot {
            lock_delay: 0.0,
            timer: 0.0,
            locked: false,
            axis: true,
            edge: Some(SpawnEdge::Top),
        };
        movement.step(&mut core, 100.0, 0.0, &ctx(Some(Vec2::new(400.0, 600.0))));
        assert_eq!(core.center(), Vec2::new(400.0, 50.0));
        assert_eq!(core.velocity, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_waypoints_advance_and_loop() {
        let mut core = core_centered(Vec2::new(0.0, 0.0));
        let mut movement = Movement::Waypoints {
            points: vec![Vec2::new(5.0, 0.0), Vec2::new(100.0, 0.0)],
            index: 0,
            speed: 50.0,
            arrive: 10.0,
        };
        movement.step(&mut core, 0.0, 0.1, &ctx(None));
        // Within 10 px of the first point, so heading for the second
        assert!(matches!(movement, Movement::Waypoints { index: 1, .. }));
        assert_eq!(core.velocity, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_homing_params() {
        let params = SpawnParams::new().with("homing", json!(true)).with("turn_rate", json!(90));
        assert_eq!(
            homing_from_params(&params),
            Some(Movement::HomingContinuous { turn_rate: 90.0 })
        );
        let params = SpawnParams::new().with("homing", json!("snapshot_axis"));
        assert!(matches!(
            homing_from_params(&params),
            Some(Movement::HomingSnapshot { axis: true, lock_delay: 0.5, .. })
        ));
        assert_eq!(homing_from_params(&SpawnParams::new().with("homing", json!(false))), None);
    }
}
