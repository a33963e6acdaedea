//! Polygon rasterization primitives.
//!
//! Polygons reach the rasterizer as a list of directed [`Edge`]s between
//! screen-mapped [`DVertex`]es. Every vertex carries its view-space attributes
//! alongside the pixel it landed on.

mod scanline;

pub use scanline::scan_convert;

use crate::math::vec4::Vec4;

/// Integer pixel position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Truncates the x/y components of a screen-space position.
impl From<Vec4> for Point {
    fn from(p: Vec4) -> Self {
        Self::new(p.x as i32, p.y as i32)
    }
}

/// A polygon corner after projection and screen mapping.
///
/// `z` is the view-space depth: larger values are nearer the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DVertex {
    pub pixel: Point,
    pub pos_vs: Vec4,
    pub normal_vs: Vec4,
    pub z: f64,
    pub color: Vec4,
}

impl DVertex {
    /// A vertex with only a pixel position, depth and color.
    pub fn flat(pixel: Point, z: f64, color: Vec4) -> Self {
        Self {
            pixel,
            pos_vs: Vec4::ZERO,
            normal_vs: Vec4::ZERO,
            z,
            color,
        }
    }
}

/// Directed polygon edge from `a` to `b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub a: DVertex,
    pub b: DVertex,
}

impl Edge {
    pub const fn new(a: DVertex, b: DVertex) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn min_y(&self) -> i32 {
        self.a.pixel.y.min(self.b.pixel.y)
    }

    #[inline]
    pub fn max_y(&self) -> i32 {
        self.a.pixel.y.max(self.b.pixel.y)
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.a.pixel.y == self.b.pixel.y
    }

    /// Edges are the same when both endpoints land on the same pixels.
    #[inline]
    pub fn same_pixels(&self, other: &Edge) -> bool {
        self.a.pixel == other.a.pixel && self.b.pixel == other.b.pixel
    }

    /// Builds the closed edge loop of a polygon from its ordered vertices.
    pub fn polygon(vertices: &[DVertex]) -> Vec<Edge> {
        (0..vertices.len())
            .map(|i| Edge::new(vertices[i], vertices[(i + 1) % vertices.len()]))
            .collect()
    }
}
