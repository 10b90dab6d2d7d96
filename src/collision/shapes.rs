//! Geometry primitives for hit testing
//!
//! `Aabb` is the float rectangle every hitbox resolves to. Rotated hitboxes
//! are tested with the separating axis theorem through [`Obb`].

use glam::Vec2;

/// Axis-aligned box, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Aabb { x, y, w, h }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Aabb {
            x: center.x - size.x / 2.0,
            y: center.y - size.y / 2.0,
            w: size.x,
            h: size.y,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Grows the box by `margin` on every side
    pub fn inflate(&self, margin: f32) -> Aabb {
        Aabb::new(
            self.x - margin,
            self.y - margin,
            self.w + margin * 2.0,
            self.h + margin * 2.0,
        )
    }

    pub fn to_sdl(&self) -> sdl2::rect::Rect {
        sdl2::rect::Rect::new(
            self.x.round() as i32,
            self.y.round() as i32,
            self.w.max(1.0).round() as u32,
            self.h.max(1.0).round() as u32,
        )
    }
}

/// Checks if two axis-aligned boxes overlap.
///
/// Touching edges do not count as an intersection.
pub fn aabb_intersect(a: &Aabb, b: &Aabb) -> bool {
    let x_overlap = a.x < b.right() && a.right() > b.x;
    let y_overlap = a.y < b.bottom() && a.bottom() > b.y;

    x_overlap && y_overlap
}

/// Oriented box: center, half extents and rotation in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec2,
    pub half: Vec2,
    pub rotation: f32,
}

impl Obb {
    pub fn from_aabb(rect: &Aabb, rotation: f32) -> Self {
        Obb {
            center: rect.center(),
            half: Vec2::new(rect.w / 2.0, rect.h / 2.0),
            rotation,
        }
    }

    fn axes(&self) -> [Vec2; 2] {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        [Vec2::new(cos, sin), Vec2::new(-sin, cos)]
    }

    pub fn corners(&self) -> [Vec2; 4] {
        let [ax, ay] = self.axes();
        let ex = ax * self.half.x;
        let ey = ay * self.half.y;
        [
            self.center - ex - ey,
            self.center + ex - ey,
            self.center + ex + ey,
            self.center - ex + ey,
        ]
    }

    fn project(&self, axis: Vec2) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for corner in self.corners() {
            let d = corner.dot(axis);
            min = min.min(d);
            max = max.max(d);
        }
        (min, max)
    }
}

/// Separating axis test between two oriented boxes
pub fn sat_intersect(a: &Obb, b: &Obb) -> bool {
    let axes = a.axes().into_iter().chain(b.axes());
    for axis in axes {
        let (a_min, a_max) = a.project(axis);
        let (b_min, b_max) = b.project(axis);
        if a_max <= b_min || b_max <= a_min {
            return false;
        }
    }
    true
}

/// True when the segment `start → end` passes within `radius` of `center`
pub fn segment_circle_intersect(start: Vec2, end: Vec2, center: Vec2, radius: f32) -> bool {
    let seg = end - start;
    let len_sq = seg.length_squared();
    let t = if len_sq > 0.0 {
        ((center - start).dot(seg) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (start + seg * t).distance_squared(center) <= radius * radius
}

/// Rotates `v` by `degrees`
pub fn rotate(v: Vec2, degrees: f32) -> Vec2 {
    if degrees == 0.0 {
        return v;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_intersect_overlapping() {
        let a = Aabb::new(0.0, 0.0, 32.0, 32.0);
        let b = Aabb::new(16.0, 16.0, 32.0, 32.0);

        assert!(aabb_intersect(&a, &b));
        assert!(aabb_intersect(&b, &a));
    }

    #[test]
    fn test_aabb_intersect_touching_edges() {
        let a = Aabb::new(0.0, 0.0, 32.0, 32.0);
        let b = Aabb::new(32.0, 0.0, 32.0, 32.0);

        assert!(!aabb_intersect(&a, &b));
    }

    #[test]
    fn test_aabb_intersect_contained() {
        let large = Aabb::new(0.0, 0.0, 100.0, 100.0);
        let small = Aabb::new(25.0, 25.0, 50.0, 50.0);

        assert!(aabb_intersect(&large, &small));
        assert!(aabb_intersect(&small, &large));
    }

    #[test]
    fn test_sat_matches_aabb_without_rotation() {
        let a = Aabb::new(0.0, 0.0, 20.0, 20.0);
        let b = Aabb::new(30.0, 0.0, 20.0, 20.0);
        assert!(!sat_intersect(&Obb::from_aabb(&a, 0.0), &Obb::from_aabb(&b, 0.0)));
    }

    #[test]
    fn test_sat_rotated_box_reaches_further() {
        // A 40x4 bar rotated 90 degrees reaches 20px up and down
        let bar = Aabb::new(0.0, 18.0, 40.0, 4.0);
        let target = Aabb::new(18.0, 2.0, 4.0, 4.0);

        assert!(!sat_intersect(&Obb::from_aabb(&bar, 0.0), &Obb::from_aabb(&target, 0.0)));
        assert!(sat_intersect(&Obb::from_aabb(&bar, 90.0), &Obb::from_aabb(&target, 0.0)));
    }

    #[test]
    fn test_segment_circle_hits_along_and_misses_past_end() {
        let start = Vec2::ZERO;
        let end = Vec2::new(100.0, 0.0);

        assert!(segment_circle_intersect(start, end, Vec2::new(50.0, 8.0), 10.0));
        assert!(!segment_circle_intersect(start, end, Vec2::new(50.0, 12.0), 10.0));
        // Beyond the end the nearest point is the endpoint
        assert!(!segment_circle_intersect(start, end, Vec2::new(115.0, 0.0), 10.0));
        assert!(segment_circle_intersect(start, start, Vec2::new(3.0, 4.0), 5.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::new(10.0, 0.0), 90.0);
        assert!(v.x.abs() < 1e-4);
        assert!((v.y - 10.0).abs() < 1e-4);
    }
}
