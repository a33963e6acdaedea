//! 2D segment and polygon containment tests in screen space.
//!
//! Only the x/y components of the [`Vec4`] endpoints are used.

use super::vec4::Vec4;
use super::EPSILON;

/// How far the containment ray is cast along +x.
const RAY_LENGTH: f64 = 100_000.0;

/// A line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub p1: Vec4,
    pub p2: Vec4,
}

impl Segment {
    pub const fn new(p1: Vec4, p2: Vec4) -> Self {
        Self { p1, p2 }
    }
}

/// Returns true if the two segments intersect in the xy plane.
///
/// Parallel and near-parallel segments never intersect.
pub fn segments_intersect(a: &Segment, b: &Segment) -> bool {
    let (x1, y1, x2, y2) = (a.p1.x, a.p1.y, a.p2.x, a.p2.y);
    let (x3, y3, x4, y4) = (b.p1.x, b.p1.y, b.p2.x, b.p2.y);

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < EPSILON {
        return false;
    }

    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;

    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Even-crossing containment test.
///
/// Casts a ray from `point` along +x and counts how many polygon edges it
/// crosses; an odd count means the point is inside. A ray that passes exactly
/// through a polygon vertex is counted once per edge sharing it.
pub fn point_in_polygon(point: Vec4, edges: &[Segment]) -> bool {
    let ray = Segment::new(
        Vec4::point(point.x, point.y, 0.0),
        Vec4::point(point.x + RAY_LENGTH, point.y, 0.0),
    );

    let crossings = edges
        .iter()
        .filter(|edge| segments_intersect(edge, &ray))
        .count();

    crossings % 2 == 1
}

/// Builds the closed edge loop of a polygon from its ordered corners.
pub fn polygon_edges(corners: &[Vec4]) -> Vec<Segment> {
    (0..corners.len())
        .map(|i| Segment::new(corners[i], corners[(i + 1) % corners.len()]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<Segment> {
        polygon_edges(&[
            Vec4::point(0.0, 0.0, 0.0),
            Vec4::point(10.0, 0.0, 0.0),
            Vec4::point(10.0, 10.0, 0.0),
            Vec4::point(0.0, 10.0, 0.0),
        ])
    }

    #[test]
    fn crossing_segments_intersect() {
        let a = Segment::new(Vec4::point(0.0, 0.0, 0.0), Vec4::point(2.0, 2.0, 0.0));
        let b = Segment::new(Vec4::point(0.0, 2.0, 0.0), Vec4::point(2.0, 0.0, 0.0));
        assert!(segments_intersect(&a, &b));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let a = Segment::new(Vec4::point(0.0, 0.0, 0.0), Vec4::point(2.0, 0.0, 0.0));
        let b = Segment::new(Vec4::point(0.0, 1.0, 0.0), Vec4::point(2.0, 1.0, 0.0));
        assert!(!segments_intersect(&a, &b));
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        let a = Segment::new(Vec4::point(0.0, 0.0, 0.0), Vec4::point(1.0, 1.0, 0.0));
        let b = Segment::new(Vec4::point(5.0, 0.0, 0.0), Vec4::point(4.0, 1.0, 0.0));
        assert!(!segments_intersect(&a, &b));
    }

    #[test]
    fn point_inside_convex_quad() {
        assert!(point_in_polygon(Vec4::point(5.0, 3.0, 0.0), &quad()));
    }

    #[test]
    fn point_outside_convex_quad() {
        // Ray crosses both vertical edges: even count
        assert!(!point_in_polygon(Vec4::point(-5.0, 3.0, 0.0), &quad()));
        // Ray crosses nothing
        assert!(!point_in_polygon(Vec4::point(15.0, 3.0, 0.0), &quad()));
        assert!(!point_in_polygon(Vec4::point(5.0, 13.0, 0.0), &quad()));
    }

    #[test]
    fn concave_polygon_uses_even_crossing_rule() {
        // U shape opening upwards
        let edges = polygon_edges(&[
            Vec4::point(0.0, 0.0, 0.0),
            Vec4::point(9.0, 0.0, 0.0),
            Vec4::point(9.0, 9.0, 0.0),
            Vec4::point(6.0, 9.0, 0.0),
            Vec4::point(6.0, 3.0, 0.0),
            Vec4::point(3.0, 3.0, 0.0),
            Vec4::point(3.0, 9.0, 0.0),
            Vec4::point(0.0, 9.0, 0.0),
        ]);
        assert!(point_in_polygon(Vec4::point(1.0, 6.5, 0.0), &edges));
        assert!(!point_in_polygon(Vec4::point(4.5, 6.5, 0.0), &edges));
        assert!(point_in_polygon(Vec4::point(4.5, 1.5, 0.0), &edges));
    }
}
