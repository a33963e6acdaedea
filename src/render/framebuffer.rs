//! Owning ARGB8888 color buffer used as the default [`PixelSink`].

use super::PixelSink;

/// A `width * height` color buffer with bounds-checked pixel access.
///
/// Row 0 is the bottom scanline: the screen mapping sends NDC +y to the last
/// row, and the window presents the buffer flipped vertically.
pub struct FrameBuffer {
    color_buffer: Vec<u32>,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            color_buffer: vec![0; (width * height) as usize],
            width,
            height,
        }
    }

    /// Reallocates the buffer for new dimensions. Contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.color_buffer = vec![0; (width * height) as usize];
        self.width = width;
        self.height = height;
    }

    pub fn clear(&mut self, color: u32) {
        self.color_buffer.fill(color);
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|idx| self.color_buffer[idx])
    }

    pub fn pixels(&self) -> &[u32] {
        &self.color_buffer
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: u32 has no padding and u8 has alignment 1, so viewing the
        // buffer as 4x as many bytes is valid for its whole lifetime.
        unsafe {
            std::slice::from_raw_parts(
                self.color_buffer.as_ptr() as *const u8,
                self.color_buffer.len() * 4,
            )
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some((y as u32 * self.width + x as u32) as usize)
        } else {
            None
        }
    }
}

impl PixelSink for FrameBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(idx) = self.index(x, y) {
            self.color_buffer[idx] = color;
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: u32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i32).min(self.width as i32);
        let y1 = (y + height as i32).min(self.height as i32);
        if x1 <= x0 {
            return;
        }
        for row in y0..y1 {
            let start = (row as u32 * self.width) as usize;
            self.color_buffer[start + x0 as usize..start + x1 as usize].fill(color);
        }
    }
}
