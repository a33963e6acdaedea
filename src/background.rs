//! Decoded background image and its resampling.

use std::path::Path;

use log::debug;

use crate::math::vec4::Vec4;
use crate::mesh::LoadError;

/// Raw 8-bit pixels of a decoded image, row-major from the top row.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u32,
}

impl BackgroundImage {
    /// Decode an image file (PNG, JPG, ...) into RGB bytes.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let img = image::open(path.as_ref())?.to_rgb8();
        let (width, height) = img.dimensions();
        debug!(
            "Decoded background {} ({width}x{height})",
            path.as_ref().display()
        );
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
            channels: 3,
        })
    }

    /// Wraps an already decoded buffer with at least 3 channels per pixel.
    ///
    /// # Panics
    /// Panics if the buffer is smaller than `width * height * channels` or has
    /// fewer than 3 channels.
    pub fn from_raw(data: Vec<u8>, width: u32, height: u32, channels: u32) -> Self {
        assert!(channels >= 3, "background image needs RGB channels");
        assert!(
            data.len() >= (width * height * channels) as usize,
            "background image buffer too small"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGB of the source pixel at (x, y), clamped to the image bounds.
    pub fn pixel(&self, x: i64, y: i64) -> Vec4 {
        let x = x.clamp(0, i64::from(self.width) - 1) as u32;
        let y = y.clamp(0, i64::from(self.height) - 1) as u32;
        let offset = ((x + self.width * y) * self.channels) as usize;
        Vec4::rgb(
            f64::from(self.data[offset]),
            f64::from(self.data[offset + 1]),
            f64::from(self.data[offset + 2]),
        )
    }

    /// Nearest source pixel to the fractional position (u, v).
    pub fn sample_nearest(&self, u: f64, v: f64) -> Vec4 {
        self.pixel(u.round() as i64, v.round() as i64)
    }

    /// Blend of the 4 source pixels around (u, v), weighted by the fractional offsets.
    pub fn sample_bilinear(&self, u: f64, v: f64) -> Vec4 {
        let (x0, y0) = (u.floor(), v.floor());
        let (fx, fy) = (u - x0, v - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = self.pixel(x0, y0).lerp(self.pixel(x0 + 1, y0), fx);
        let bottom = self.pixel(x0, y0 + 1).lerp(self.pixel(x0 + 1, y0 + 1), fx);
        top.lerp(bottom, fy)
    }

    /// Tiles the image: output pixel (x, y) reads source pixel (x mod w, y mod h).
    pub fn sample_repeat(&self, x: u32, y: u32) -> Vec4 {
        self.pixel(i64::from(x % self.width), i64::from(y % self.height))
    }
}
