//! Active-edge-table scanline polygon fill with depth testing.
//!
//! # Algorithm Overview
//!
//! The polygon arrives as a closed list of screen-space edges. It is filled
//! one horizontal scanline at a time:
//!
//! 1. **Sort edges** by their lowest y and find the covered row range
//! 2. **Maintain the active edge list**: edges whose y-range covers the row
//! 3. **Intersect** every non-horizontal active edge with the row
//! 4. **Fill spans** between consecutive pairs of intersections
//!
//! ```text
//!          /\
//!         /  \
//!   y -- x0----x1 --      span [x0, x1] filled, depth interpolated
//!       /      \
//!      /________\
//! ```
//!
//! # Intersections
//!
//! For an edge from `a` to `b` the row `y` is hit at
//!
//! ```text
//! t = (y - a.y) / (b.y - a.y)
//! x = a.x + t * (b.x - a.x)
//! z = a.z + t * (b.z - a.z)
//! ```
//!
//! Intersections are sorted by x and duplicates at the same x collapse into
//! one, so a vertex shared by two edges is counted once. After pairing, an
//! unpaired trailing intersection is dropped.
//!
//! # Depth
//!
//! Depth is the view-space z of each vertex, linearly interpolated first along
//! the edges and then across the span. Larger z is nearer the camera: a pixel
//! is written only when its depth is greater than the stored one.

use super::Edge;
use crate::colors;
use crate::math::vec4::Vec4;
use crate::render::PixelSink;

/// Where one active edge crosses the current scanline.
#[derive(Clone, Copy, Debug)]
struct Intersection {
    x: i32,
    z: f64,
    color: Vec4,
}

/// Fills the polygon described by `edges` into `sink`, depth-testing against
/// `z_buffer` (row-major, `sink.width() * sink.height()` entries).
///
/// # Panics
/// Panics if fewer than 3 edges are given.
pub fn scan_convert<S: PixelSink + ?Sized>(sink: &mut S, z_buffer: &mut [f64], edges: &[Edge]) {
    assert!(
        edges.len() >= 3,
        "scan conversion needs at least 3 edges, got {}",
        edges.len()
    );

    let width = sink.width() as i32;
    let height = sink.height() as i32;
    debug_assert_eq!(
        z_buffer.len(),
        (width * height) as usize,
        "Depth buffer size doesn't match dimensions"
    );

    let mut sorted = edges.to_vec();
    sorted.sort_by_key(Edge::min_y);

    let y_min = sorted.iter().map(Edge::min_y).min().unwrap_or(0).max(0);
    let y_max = sorted
        .iter()
        .map(Edge::max_y)
        .max()
        .unwrap_or(-1)
        .min(height - 1);

    let mut active: Vec<Edge> = Vec::with_capacity(sorted.len());
    let mut intersections: Vec<Intersection> = Vec::with_capacity(sorted.len());

    for y in y_min..=y_max {
        for edge in &sorted {
            if edge.min_y() > y {
                break;
            }
            if edge.max_y() >= y && !active.iter().any(|e| e.same_pixels(edge)) {
                active.push(*edge);
            }
        }
        active.retain(|edge| edge.max_y() >= y);

        intersections.clear();
        intersections.extend(
            active
                .iter()
                .filter(|edge| !edge.is_horizontal())
                .map(|edge| intersect(edge, y)),
        );
        intersections.sort_by_key(|i| i.x);
        intersections.dedup_by_key(|i| i.x);

        for pair in intersections.chunks_exact(2) {
            fill_span(sink, z_buffer, width, y, &pair[0], &pair[1]);
        }
    }
}

#[inline]
fn intersect(edge: &Edge, y: i32) -> Intersection {
    let (a, b) = (&edge.a, &edge.b);
    let (ax, ay) = (f64::from(a.pixel.x), f64::from(a.pixel.y));
    let t = (f64::from(y) - ay) / (f64::from(b.pixel.y) - ay);
    let x = ax + t * (f64::from(b.pixel.x) - ax);
    Intersection {
        x: x.round() as i32,
        z: a.z + t * (b.z - a.z),
        color: a.color,
    }
}

#[inline]
fn fill_span<S: PixelSink + ?Sized>(
    sink: &mut S,
    z_buffer: &mut [f64],
    width: i32,
    y: i32,
    start: &Intersection,
    end: &Intersection,
) {
    let color = colors::pack(start.color);
    let start_x = f64::from(start.x);
    let span = f64::from(end.x) - start_x;

    for x in start.x.max(0)..=end.x.min(width - 1) {
        let t = if span == 0.0 {
            0.0
        } else {
            (f64::from(x) - start_x) / span
        };
        let z = start.z + t * (end.z - start.z);

        let idx = (y * width + x) as usize;
        if z > z_buffer[idx] {
            z_buffer[idx] = z;
            sink.set_pixel(x, y, color);
        }
    }
}
