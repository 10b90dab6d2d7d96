//! Formation patterns
//!
//! A pattern turns `(count, width, height, config)` into spawn positions
//! (entity centers). `config` is the wave's `pattern_config` object; every
//! pattern reads `edge` (default `top`), `offset_x` (default 0) and
//! `offset_y` (default -100).

use crate::entity::{SpawnEdge, SpawnParams};
use glam::Vec2;
use log::warn;
use std::collections::HashMap;

pub type PatternFn = fn(usize, f32, f32, &SpawnParams) -> Vec<Vec2>;

pub const DEFAULT_OFFSET_Y: f32 = -100.0;

pub struct PatternRegistry {
    patterns: HashMap<String, PatternFn>,
}

impl Default for PatternRegistry {
    fn default() -> Self {
        let mut registry = PatternRegistry {
            patterns: HashMap::new(),
        };
        registry.register("line", line);
        registry.register("v", v_formation);
        registry.register("circle", circle);
        registry.register("grid", grid);
        registry.register("single", single);
        registry
    }
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, pattern: PatternFn) {
        self.patterns.insert(name.to_string(), pattern);
    }

    pub fn has(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.patterns.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Unknown patterns fall back to `count` copies of `(width / 2, -100)`
    pub fn positions(
        &self,
        name: &str,
        count: usize,
        width: f32,
        height: f32,
        config: &SpawnParams,
    ) -> Vec<Vec2> {
        match self.patterns.get(name) {
            Some(pattern) => pattern(count, width, height, config),
            None => {
                warn!("Unknown pattern '{}', using fallback", name);
                vec![Vec2::new(width / 2.0, DEFAULT_OFFSET_Y); count]
            }
        }
    }
}

struct EdgeConfig {
    edge: Option<SpawnEdge>,
    offset: Vec2,
}

fn edge_config(config: &SpawnParams) -> EdgeConfig {
    EdgeConfig {
        edge: SpawnEdge::parse(config.str("edge").unwrap_or("top")),
        offset: Vec2::new(
            config.f32_or("offset_x", 0.0),
            config.f32_or("offset_y", DEFAULT_OFFSET_Y),
        ),
    }
}

/// Midpoint of `edge` shifted by `offset`
fn edge_anchor(edge: Option<SpawnEdge>, offset: Vec2, width: f32, height: f32) -> Vec2 {
    match edge {
        Some(SpawnEdge::Top) => Vec2::new(width / 2.0 + offset.x, offset.y),
        Some(SpawnEdge::Bottom) => Vec2::new(width / 2.0 + offset.x, height + offset.y),
        Some(SpawnEdge::Left) => Vec2::new(offset.x, height / 2.0 + offset.y),
        Some(SpawnEdge::Right) => Vec2::new(width + offset.x, height / 2.0 + offset.y),
        None => Vec2::new(width / 2.0, DEFAULT_OFFSET_Y),
    }
}

/// Base coordinate on the axis perpendicular to the edge
fn edge_base(edge: SpawnEdge, offset: Vec2, width: f32, height: f32) -> f32 {
    match edge {
        SpawnEdge::Top => offset.y,
        SpawnEdge::Bottom => height + offset.y,
        SpawnEdge::Left => offset.x,
        SpawnEdge::Right => width + offset.x,
    }
}

pub fn line(count: usize, width: f32, height: f32, config: &SpawnParams) -> Vec<Vec2> {
    let EdgeConfig { edge, offset } = edge_config(config);
    let Some(edge) = edge else {
        return Vec::new();
    };
    let base = edge_base(edge, offset, width, height);
    if edge.is_vertical() {
        let spacing = config.f32_or("spacing", (width / (count as f32 + 1.0)).floor());
        (0..count)
            .map(|i| Vec2::new(spacing * (i as f32 + 1.0) + offset.x, base))
            .collect()
    } else {
        let spacing = config.f32_or("spacing", (height / (count as f32 + 1.0)).floor());
        (0..count)
            .map(|i| Vec2::new(base, spacing * (i as f32 + 1.0) + offset.y))
            .collect()
    }
}

pub fn v_formation(count: usize, width: f32, height: f32, config: &SpawnParams) -> Vec<Vec2> {
    let EdgeConfig { edge, offset } = edge_config(config);
    let Some(edge) = edge else {
        return Vec::new();
    };
    let x_spacing = config.f32_or("x_spacing", 120.0);
    let y_spacing = config.f32_or("y_spacing", 40.0);
    let tip_depth = config.f32_or("tip_depth", 120.0);
    let base = edge_base(edge, offset, width, height);

    (0..count)
        .map(|i| {
            let rel = i as f32 - (count as f32 - 1.0) / 2.0;
            let depth = base + tip_depth - rel.abs() * y_spacing;
            if edge.is_vertical() {
                Vec2::new((width / 2.0).floor() + offset.x + rel * x_spacing, depth)
            } else {
                Vec2::new(depth, (height / 2.0).floor() + offset.y + rel * x_spacing)
            }
        })
        .collect()
}

pub fn circle(count: usize, width: f32, height: f32, config: &SpawnParams) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }
    let radius = config.f32_or("radius", 200.0);
    let center = if config.contains("edge") {
        let EdgeConfig { edge, offset } = edge_config(config);
        edge_anchor(edge, offset, width, height)
    } else {
        Vec2::new(
            config.f32_or("center_x", width / 2.0),
            config.f32_or("center_y", DEFAULT_OFFSET_Y),
        )
    };
    let step = std::f32::consts::TAU / count as f32;
    (0..count)
        .map(|i| {
            let angle = i as f32 * step;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

pub fn grid(count: usize, width: f32, height: f32, config: &SpawnParams) -> Vec<Vec2> {
    let EdgeConfig { edge, offset } = edge_config(config);
    let Some(edge) = edge else {
        return Vec::new();
    };
    let cols = config
        .get("cols")
        .and_then(|v| v.as_u64())
        .map(|c| c as usize)
        .filter(|c| *c > 0)
        .unwrap_or_else(|| (count as f32).sqrt().ceil().max(1.0) as usize);
    let row_spacing = config.f32_or("row_spacing", 80.0);
    let col_spacing = config.f32_or("col_spacing", 100.0);
    let span = (cols as f32 - 1.0) * col_spacing;
    let base = edge_base(edge, offset, width, height);

    (0..count)
        .map(|i| {
            let row = (i / cols) as f32;
            let col = (i % cols) as f32;
            if edge.is_vertical() {
                let start_x = (width - span) / 2.0 + offset.x;
                Vec2::new(start_x + col * col_spacing, base + row * row_spacing)
            } else {
                let start_y = (height - span) / 2.0 + offset.y;
                Vec2::new(base + row * row_spacing, start_y + col * col_spacing)
            }
        })
        .collect()
}

pub fn single(count: usize, width: f32, height: f32, config: &SpawnParams) -> Vec<Vec2> {
    let pos = if config.contains("x") {
        Vec2::new(
            config.f32_or("x", width / 2.0),
            config.f32_or("y", DEFAULT_OFFSET_Y),
        )
    } else {
        let EdgeConfig { edge, offset } = edge_config(config);
        edge_anchor(edge, offset, width, height)
    };
    vec![pos; count]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const W: f32 = 1280.0;
    const H: f32 = 720.0;

    fn config(value: serde_json::Value) -> SpawnParams {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_line_spreads_along_top() {
        let positions = line(3, W, H, &SpawnParams::new());
        assert_eq!(
            positions,
            vec![Vec2::new(320.0, -100.0), Vec2::new(640.0, -100.0), Vec2::new(960.0, -100.0)]
        );
    }

    #[test]
    fn test_line_on_left_edge_runs_along_y() {
        let positions = line(2, W, H, &config(json!({"edge": "left", "offset_x": -50, "offset_y": 0})));
        assert_eq!(positions, vec![Vec2::new(-50.0, 240.0), Vec2::new(-50.0, 480.0)]);
    }

    #[test]
    fn test_v_tip_is_deepest() {
        let positions = v_formation(3, W, H, &SpawnParams::new());
        assert_eq!(positions[1], Vec2::new(640.0, 20.0));
        assert_eq!(positions[0], Vec2::new(520.0, -20.0));
        assert_eq!(positions[2], Vec2::new(760.0, -20.0));
    }

    #[test]
    fn test_circle_uses_explicit_center() {
        let positions = circle(4, W, H, &config(json!({"center_x": 400, "center_y": 300, "radius": 100})));
        assert_eq!(positions.len(), 4);
        assert!((positions[0] - Vec2::new(500.0, 300.0)).length() < 1e-3);
        assert!((positions[1] - Vec2::new(400.0, 400.0)).length() < 1e-3);
    }

    #[test]
    fn test_grid_is_centered() {
        let positions = grid(4, W, H, &SpawnParams::new());
        // 2 columns, 100 apart, centered on 640
        assert_eq!(positions[0], Vec2::new(590.0, -100.0));
        assert_eq!(positions[1], Vec2::new(690.0, -100.0));
        assert_eq!(positions[2], Vec2::new(590.0, -20.0));
    }

    #[test]
    fn test_single_repeats_point() {
        let positions = single(3, W, H, &config(json!({"x": 100, "y": 50})));
        assert_eq!(positions, vec![Vec2::new(100.0, 50.0); 3]);
    }

    #[test]
    fn test_unknown_pattern_falls_back() {
        let registry = PatternRegistry::new();
        let positions = registry.positions("spiral", 2, W, H, &SpawnParams::new());
        assert_eq!(positions, vec![Vec2::new(640.0, -100.0); 2]);
    }
}
