//! Clipping against the homogeneous clip volume.
//!
//! Geometry is clipped after projection and before the perspective divide,
//! where the volume is bounded by fixed planes:
//!
//! ```text
//! -w <= x <= w
//! -w <= y <= w
//! -w <= z <= w
//! ```
//!
//! Every surviving vertex has `w` at least the near-plane distance, so after
//! the divide it lands inside NDC [-1, 1] and maps to a pixel on the output.

use crate::math::vec4::Vec4;

/// A polygon corner carried through clipping: its clip-space position and the
/// view-space position it came from (for depth).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipVertex {
    pub clip: Vec4,
    pub view: Vec4,
}

impl ClipVertex {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            clip: self.clip.lerp(other.clip, t),
            view: self.view.lerp(other.view, t),
        }
    }
}

/// One face of the clip volume. The signed distance is non-negative inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipPlane {
    Left,
    Right,
    Bottom,
    Top,
    Near,
    Far,
}

impl ClipPlane {
    pub const ALL: [Self; 6] = [
        Self::Near,
        Self::Far,
        Self::Left,
        Self::Right,
        Self::Bottom,
        Self::Top,
    ];

    pub fn signed_distance(self, p: Vec4) -> f64 {
        match self {
            Self::Left => p.w + p.x,
            Self::Right => p.w - p.x,
            Self::Bottom => p.w + p.y,
            Self::Top => p.w - p.y,
            Self::Near => p.w + p.z,
            Self::Far => p.w - p.z,
        }
    }
}

/// Sutherland-Hodgman against a single plane.
fn clip_against_plane(vertices: &[ClipVertex], plane: ClipPlane) -> Vec<ClipVertex> {
    let mut output = Vec::with_capacity(vertices.len() + 1);

    for (i, current) in vertices.iter().enumerate() {
        let next = &vertices[(i + 1) % vertices.len()];
        let d0 = plane.signed_distance(current.clip);
        let d1 = plane.signed_distance(next.clip);

        if d0 >= 0.0 {
            output.push(*current);
        }
        if (d0 >= 0.0) != (d1 >= 0.0) {
            output.push(current.lerp(next, d0 / (d0 - d1)));
        }
    }
    output
}

/// Clips a convex polygon to the clip volume. Returns an empty list when
/// fewer than 3 corners survive.
pub fn clip_polygon(vertices: &[ClipVertex]) -> Vec<ClipVertex> {
    let mut result = vertices.to_vec();
    for plane in ClipPlane::ALL {
        if result.len() < 3 {
            return Vec::new();
        }
        result = clip_against_plane(&result, plane);
    }
    if result.len() < 3 {
        result.clear();
    }
    result
}

/// Parameter range `[t0, t1]` of the clip-space segment `a`-`b` that lies
/// inside the clip volume, or `None` when nothing of it is inside.
pub fn clip_segment_range(a: Vec4, b: Vec4) -> Option<(f64, f64)> {
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for plane in ClipPlane::ALL {
        let d0 = plane.signed_distance(a);
        let d1 = plane.signed_distance(b);
        match (d0 >= 0.0, d1 >= 0.0) {
            (true, true) => {}
            (false, false) => return None,
            (false, true) => t0 = t0.max(d0 / (d0 - d1)),
            (true, false) => t1 = t1.min(d0 / (d0 - d1)),
        }
    }

    (t0 <= t1).then_some((t0, t1))
}

/// Clips the clip-space segment `a`-`b` to the clip volume, or `None` when
/// nothing of it is inside. Endpoints already inside are returned untouched.
pub fn clip_segment(a: Vec4, b: Vec4) -> Option<(Vec4, Vec4)> {
    let (t0, t1) = clip_segment_range(a, b)?;
    let start = if t0 > 0.0 { a.lerp(b, t0) } else { a };
    let end = if t1 < 1.0 { a.lerp(b, t1) } else { b };
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertex(x: f64, y: f64, z: f64, w: f64) -> ClipVertex {
        ClipVertex {
            clip: Vec4::new(x, y, z, w),
            view: Vec4::point(x, y, -w),
        }
    }

    fn inside(p: Vec4) -> bool {
        ClipPlane::ALL.iter().all(|plane| plane.signed_distance(p) >= -1e-12)
    }

    #[test]
    fn polygon_inside_is_unchanged() {
        let quad = [
            vertex(-0.5, -0.5, 0.0, 1.0),
            vertex(0.5, -0.5, 0.0, 1.0),
            vertex(0.5, 0.5, 0.0, 1.0),
            vertex(-0.5, 0.5, 0.0, 1.0),
        ];
        assert_eq!(clip_polygon(&quad), quad.to_vec());
    }

    #[test]
    fn polygon_outside_is_dropped() {
        let triangle = [
            vertex(2.0, 0.0, 0.0, 1.0),
            vertex(3.0, 0.0, 0.0, 1.0),
            vertex(2.5, 0.5, 0.0, 1.0),
        ];
        assert!(clip_polygon(&triangle).is_empty());
    }

    #[test]
    fn polygon_crossing_the_near_plane_keeps_positive_w() {
        // One corner between the eye and the near plane: w vanishes while
        // the frustum depth term stays negative
        let triangle = [
            vertex(-0.5, 0.0, -0.5, 1.0),
            vertex(0.5, 0.0, -0.5, 1.0),
            vertex(0.0, 0.0, -0.2, 1e-12),
        ];
        let clipped = clip_polygon(&triangle);
        assert!(clipped.len() >= 3);
        assert!(clipped.iter().all(|v| inside(v.clip) && v.clip.w > 0.1));
    }

    #[test]
    fn polygon_larger_than_the_volume_is_cut_to_it() {
        let quad = [
            vertex(-4.0, -4.0, 0.0, 1.0),
            vertex(4.0, -4.0, 0.0, 1.0),
            vertex(4.0, 4.0, 0.0, 1.0),
            vertex(-4.0, 4.0, 0.0, 1.0),
        ];
        let clipped = clip_polygon(&quad);
        assert_eq!(clipped.len(), 4);
        for v in &clipped {
            assert_relative_eq!(v.clip.x.abs(), 1.0);
            assert_relative_eq!(v.clip.y.abs(), 1.0);
        }
    }

    #[test]
    fn segment_is_cut_at_the_volume_boundary() {
        let (a, b) = clip_segment(Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(3.0, 0.0, 0.0, 1.0))
            .expect("segment starts inside");
        assert_eq!(a, Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_relative_eq!(b, Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn segment_outside_or_behind_is_rejected() {
        assert!(clip_segment(Vec4::new(2.0, 0.0, 0.0, 1.0), Vec4::new(3.0, 0.0, 0.0, 1.0)).is_none());
        assert!(clip_segment(Vec4::new(0.0, 0.0, 0.0, -1.0), Vec4::new(0.0, 0.0, 0.0, -2.0)).is_none());
    }
}
