//! Rendering layer: pixel output, line drawing and polygon fill.

mod clip;
mod framebuffer;
mod rasterizer;
mod renderer;

pub use clip::{clip_polygon, clip_segment, clip_segment_range, ClipPlane, ClipVertex};
pub use framebuffer::FrameBuffer;
pub use rasterizer::{scan_convert, DVertex, Edge, Point};
pub use renderer::{ImageFit, ImageInterpolation, Renderer, Transforms};

/// Destination for rasterized pixels.
///
/// Coordinates are in pixels with (0, 0) at the first row of the buffer.
/// Implementations must silently ignore pixels outside `width x height`.
pub trait PixelSink {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Write a single pixel. `color` is packed ARGB8888.
    fn set_pixel(&mut self, x: i32, y: i32, color: u32);

    /// Fill a `width x height` rectangle whose first corner is (x, y).
    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: u32) {
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                self.set_pixel(x + dx, y + dy, color);
            }
        }
    }
}
