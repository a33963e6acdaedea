//! Screen mapping, depth buffer and the drawing primitives built on them.
//!
//! The [`Renderer`] owns no color buffer. Every drawing call writes through a
//! [`PixelSink`] supplied by the caller, while the renderer keeps the state
//! that has to survive between calls: output size, the NDC-to-pixel matrix and
//! the z-buffer.

use log::trace;

use super::clip::{clip_polygon, clip_segment, clip_segment_range, ClipVertex};
use super::rasterizer::{scan_convert, DVertex, Edge, Point};
use super::PixelSink;
use crate::background::BackgroundImage;
use crate::colors;
use crate::math::mat4::Mat4;
use crate::math::vec4::Vec4;
use crate::math::EPSILON;
use crate::projection::ProjectionMode;

/// Relative depth slack that keeps outlines drawn over their own fill.
const OUTLINE_DEPTH_BIAS: f64 = 1e-2;

/// How a background image covers the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFit {
    /// Resample to exactly the output size.
    #[default]
    Stretch,
    /// Tile at native resolution.
    Repeat,
}

/// Resampling filter used by [`ImageFit::Stretch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageInterpolation {
    #[default]
    Nearest,
    Bilinear,
}

/// The matrix chain a model's geometry passes through on its way to clip space:
/// object -> world -> camera view -> view overlay -> projection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transforms {
    pub object_to_world: Mat4,
    pub world_to_view: Mat4,
    pub view_overlay: Mat4,
    pub projection: Mat4,
}

impl Transforms {
    /// Object space to view space, overlay included.
    pub fn to_view(&self) -> Mat4 {
        self.object_to_world * self.world_to_view * self.view_overlay
    }

    /// Object space to clip space.
    pub fn to_clip(&self) -> Mat4 {
        self.to_view() * self.projection
    }
}

pub struct Renderer {
    width: u32,
    height: u32,
    to_screen: Mat4,
    z_buffer: Vec<f64>,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        let mut renderer = Self {
            width,
            height,
            to_screen: Mat4::identity(),
            z_buffer: Vec::new(),
        };
        renderer.build_to_screen_matrix();
        renderer.init_z_buffer();
        renderer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
        self.build_to_screen_matrix();
        trace!("Renderer width set to {width}");
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
        self.build_to_screen_matrix();
        trace!("Renderer height set to {height}");
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.set_width(width);
        self.set_height(height);
    }

    /// Width over height, or 1 for a zero-height output.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }

    /// NDC -> pixel matrix: scale by half the output size, then shift the
    /// origin to the pixel center of the output.
    pub fn to_screen_matrix(&self) -> &Mat4 {
        &self.to_screen
    }

    fn build_to_screen_matrix(&mut self) {
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let mut m = Mat4::identity();
        m.set(0, 0, w / 2.0);
        m.set(1, 1, h / 2.0);
        m.set(3, 0, (w - 1.0) / 2.0);
        m.set(3, 1, (h - 1.0) / 2.0);
        self.to_screen = m;
    }

    /// Resets the depth buffer to "infinitely far" for the current output size.
    pub fn init_z_buffer(&mut self) {
        let size = (self.width * self.height) as usize;
        self.z_buffer.clear();
        self.z_buffer.resize(size, f64::NEG_INFINITY);
    }

    pub fn z_buffer(&self) -> &[f64] {
        &self.z_buffer
    }

    // =========================================================================
    // Pixels and lines
    // =========================================================================

    /// Draws a pixel, or with `thickness > 0` the square of side
    /// `2 * thickness + 1` centered on it, clipped to the output.
    pub fn draw_pixel<S: PixelSink + ?Sized>(&self, sink: &mut S, p: Point, color: u32, thickness: i32) {
        if thickness <= 0 {
            sink.set_pixel(p.x, p.y, color);
            return;
        }

        let start_x = (p.x - thickness).max(0);
        let end_x = (p.x + thickness).min(self.width as i32 - 1);
        let start_y = (p.y - thickness).max(0);
        let end_y = (p.y + thickness).min(self.height as i32 - 1);
        for x in start_x..=end_x {
            for y in start_y..=end_y {
                sink.set_pixel(x, y, color);
            }
        }
    }

    /// Draws a line between two pixels using Bresenham's line algorithm.
    ///
    /// Only integer arithmetic is used. Distances are doubled so the error
    /// term starts at half a pixel without fractions; when the error is
    /// exactly zero the tie is broken towards the positive direction so a
    /// line and its reverse light the same pixels.
    pub fn draw_line<S: PixelSink + ?Sized>(
        &self,
        sink: &mut S,
        p0: Point,
        p1: Point,
        color: Vec4,
        thickness: i32,
    ) {
        let color = colors::pack(color);
        walk_line(p0, p1, |p, _| self.draw_pixel(sink, p, color, thickness));
    }

    /// Draws a line whose depth runs from `z0` to `z1`, skipping pixels that
    /// lie behind what the z-buffer already holds. The z-buffer is not written.
    pub fn draw_line_depth_tested<S: PixelSink + ?Sized>(
        &self,
        sink: &mut S,
        (p0, z0): (Point, f64),
        (p1, z1): (Point, f64),
        color: Vec4,
        thickness: i32,
    ) {
        let color = colors::pack(color);
        let (width, height) = (self.width as i32, self.height as i32);
        walk_line(p0, p1, |p, t| {
            if p.x < 0 || p.y < 0 || p.x >= width || p.y >= height {
                return;
            }
            let z = z0 + t * (z1 - z0);
            let stored = self.z_buffer[(p.y * width + p.x) as usize];
            if z + OUTLINE_DEPTH_BIAS * z.abs().max(1.0) >= stored {
                self.draw_pixel(sink, p, color, thickness);
            }
        });
    }

    // =========================================================================
    // Background
    // =========================================================================

    pub fn draw_background<S: PixelSink + ?Sized>(&self, sink: &mut S, color: Vec4) {
        sink.fill_rect(0, 0, self.width, self.height, colors::pack(color));
    }

    /// Covers the output with `image`. Image row 0 lands on the top scanline.
    pub fn draw_background_image<S: PixelSink + ?Sized>(
        &self,
        sink: &mut S,
        image: &BackgroundImage,
        fit: ImageFit,
        interpolation: ImageInterpolation,
    ) {
        if image.is_empty() {
            return;
        }

        let scale_x = f64::from(self.width) / f64::from(image.width());
        let scale_y = f64::from(self.height) / f64::from(image.height());

        for y in 0..self.height {
            let row = self.height - 1 - y;
            for x in 0..self.width {
                let color = match fit {
                    ImageFit::Repeat => image.sample_repeat(x, row),
                    ImageFit::Stretch => {
                        let u = f64::from(x) / scale_x;
                        let v = f64::from(row) / scale_y;
                        match interpolation {
                            ImageInterpolation::Nearest => image.sample_nearest(u, v),
                            ImageInterpolation::Bilinear => image.sample_bilinear(u, v),
                        }
                    }
                };
                sink.set_pixel(x as i32, y as i32, colors::pack(color));
            }
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Projects an object-space point through `to_clip` to pixel space.
    ///
    /// Returns `None` for points at or behind the eye plane (clip w <= 0).
    pub fn project(&self, p: Vec4, to_clip: &Mat4) -> Option<Vec4> {
        let clip = p * *to_clip;
        if clip.w <= 0.0 {
            return None;
        }
        Some(clip.perspective_divide() * self.to_screen)
    }

    /// Clip space to the pixel it lands on. Only valid for clipped points.
    fn to_pixel(&self, clip: Vec4) -> Point {
        Point::from(clip.perspective_divide() * self.to_screen)
    }

    /// Draws the segment between two object-space points, clipped to the view volume.
    pub fn draw_edge<S: PixelSink + ?Sized>(
        &self,
        sink: &mut S,
        p0: Vec4,
        p1: Vec4,
        transforms: &Transforms,
        color: Vec4,
        thickness: i32,
    ) {
        let to_clip = transforms.to_clip();
        self.draw_projected_edge(sink, p0, p1, &to_clip, color, thickness);
    }

    fn draw_projected_edge<S: PixelSink + ?Sized>(
        &self,
        sink: &mut S,
        p0: Vec4,
        p1: Vec4,
        to_clip: &Mat4,
        color: Vec4,
        thickness: i32,
    ) {
        if let Some((c0, c1)) = clip_segment(p0 * *to_clip, p1 * *to_clip) {
            self.draw_line(sink, self.to_pixel(c0), self.to_pixel(c1), color, thickness);
        }
    }

    /// Draws a polygon outline that hides behind filled geometry already in
    /// the z-buffer. Edges on the polygon's own fill stay visible.
    pub fn draw_polygon_depth_tested<S: PixelSink + ?Sized>(
        &self,
        sink: &mut S,
        corners: &[Vec4],
        transforms: &Transforms,
        color: Vec4,
        thickness: i32,
    ) {
        let to_view = transforms.to_view();
        for (i, &c0) in corners.iter().enumerate() {
            let c1 = corners[(i + 1) % corners.len()];
            let (v0, v1) = (c0 * to_view, c1 * to_view);
            let (a, b) = (v0 * transforms.projection, v1 * transforms.projection);
            if let Some((t0, t1)) = clip_segment_range(a, b) {
                let depth = |t: f64| v0.z + t * (v1.z - v0.z);
                self.draw_line_depth_tested(
                    sink,
                    (self.to_pixel(a.lerp(b, t0)), depth(t0)),
                    (self.to_pixel(a.lerp(b, t1)), depth(t1)),
                    color,
                    thickness,
                );
            }
        }
    }

    /// Draws the closed outline of a polygon given its object-space corners.
    pub fn draw_polygon<S: PixelSink + ?Sized>(
        &self,
        sink: &mut S,
        corners: &[Vec4],
        transforms: &Transforms,
        color: Vec4,
        thickness: i32,
    ) {
        let to_clip = transforms.to_clip();
        for (i, &p0) in corners.iter().enumerate() {
            let p1 = corners[(i + 1) % corners.len()];
            self.draw_projected_edge(sink, p0, p1, &to_clip, color, thickness);
        }
    }

    /// Back-face test on a polygon's face normal and center.
    ///
    /// Both are taken to view space (overlay included). In perspective the
    /// face is culled when the center and the normal point the same way. In
    /// orthographic the normal is projected, and the face is culled when the
    /// projected normal points away from the viewer (NDC z grows into the screen).
    pub fn is_back_face(&self, normal: Vec4, center: Vec4, transforms: &Transforms, mode: ProjectionMode) -> bool {
        let to_view = transforms.to_view();
        let normal_vs = normal.with_w(0.0) * to_view;

        match mode {
            ProjectionMode::Perspective => {
                let center_vs = center.with_w(1.0) * to_view;
                center_vs.dot3(normal_vs) > 0.0
            }
            ProjectionMode::Orthographic => {
                let projected = normal_vs * transforms.projection;
                projected.length3() > EPSILON && projected.normalize3().z > 0.0
            }
        }
    }

    /// Fills a polygon with a flat color, depth-tested against the z-buffer.
    ///
    /// The polygon is clipped to the view volume first, so corners behind the
    /// near plane or off screen never reach the rasterizer.
    pub fn fill_polygon<S: PixelSink + ?Sized>(
        &mut self,
        sink: &mut S,
        corners: &[Vec4],
        normal: Vec4,
        transforms: &Transforms,
        color: Vec4,
    ) {
        if corners.len() < 3 {
            return;
        }

        let to_view = transforms.to_view();
        let normal_vs = normal.with_w(0.0) * to_view;

        let polygon: Vec<ClipVertex> = corners
            .iter()
            .map(|&corner| {
                let view = corner * to_view;
                ClipVertex {
                    clip: view * transforms.projection,
                    view,
                }
            })
            .collect();
        let clipped = clip_polygon(&polygon);
        if clipped.is_empty() {
            return;
        }

        let vertices: Vec<DVertex> = clipped
            .iter()
            .map(|v| DVertex {
                pixel: self.to_pixel(v.clip),
                pos_vs: v.view,
                normal_vs,
                z: v.view.z,
                color,
            })
            .collect();

        scan_convert(sink, &mut self.z_buffer, &Edge::polygon(&vertices));
    }
}

/// Bresenham walk from `p0` to `p1` inclusive. `visit` receives each pixel and
/// its fraction of the way along the line.
fn walk_line(p0: Point, p1: Point, mut visit: impl FnMut(Point, f64)) {
    let (mut x, mut y) = (p0.x, p0.y);

    let delta_x = i64::from(p1.x) - i64::from(p0.x);
    let ix = delta_x.signum() as i32;
    let delta_x = delta_x.abs() << 1;

    let delta_y = i64::from(p1.y) - i64::from(p0.y);
    let iy = delta_y.signum() as i32;
    let delta_y = delta_y.abs() << 1;

    let steps = (delta_x.max(delta_y) >> 1).max(1) as f64;
    let mut step = 0_u64;
    visit(Point::new(x, y), 0.0);

    if delta_x >= delta_y {
        // x is the major axis; the error may go below zero
        let mut error = delta_y - (delta_x >> 1);
        while x != p1.x {
            if error > 0 || (error == 0 && ix > 0) {
                error -= delta_x;
                y += iy;
            }
            error += delta_y;
            x += ix;
            step += 1;
            visit(Point::new(x, y), step as f64 / steps);
        }
    } else {
        let mut error = delta_x - (delta_y >> 1);
        while y != p1.y {
            if error > 0 || (error == 0 && iy > 0) {
                error -= delta_y;
                x += ix;
            }
            error += delta_x;
            y += iy;
            step += 1;
            visit(Point::new(x, y), step as f64 / steps);
        }
    }
}
