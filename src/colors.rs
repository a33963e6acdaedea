//! Color constants and conversion between `Vec4` colors and packed ARGB8888.
//!
//! Colors travel through the pipeline as [`Vec4`] with 0-255 components in
//! x/y/z (w unused) and are packed only when handed to a [`PixelSink`].
//!
//! [`PixelSink`]: crate::render::PixelSink

use crate::math::vec4::Vec4;

pub const BACKGROUND: Vec4 = Vec4::rgb(0.0, 0.0, 0.0);
pub const BOUNDING_BOX: Vec4 = Vec4::rgb(255.0, 0.0, 0.0);
pub const HIGHLIGHT: Vec4 = Vec4::rgb(255.0, 255.0, 0.0);
pub const WHITE: Vec4 = Vec4::rgb(255.0, 255.0, 255.0);
/// Outline drawn over filled polygons.
pub const WIREFRAME: Vec4 = Vec4::rgb(40.0, 40.0, 40.0);

pub const AXIS_X: Vec4 = Vec4::rgb(255.0, 0.0, 0.0);
pub const AXIS_Y: Vec4 = Vec4::rgb(0.0, 255.0, 0.0);
pub const AXIS_Z: Vec4 = Vec4::rgb(0.0, 0.0, 255.0);

#[inline]
fn channel(value: f64) -> u32 {
    value.clamp(0.0, 255.0) as u32
}

/// Packs a 0-255 RGB color into opaque ARGB8888.
#[inline]
pub fn pack(color: Vec4) -> u32 {
    0xFF00_0000 | (channel(color.x) << 16) | (channel(color.y) << 8) | channel(color.z)
}

/// Unpacks ARGB8888 into a 0-255 RGB color. Alpha is dropped.
#[inline]
pub fn unpack(color: u32) -> Vec4 {
    Vec4::rgb(
        ((color >> 16) & 0xFF) as f64,
        ((color >> 8) & 0xFF) as f64,
        (color & 0xFF) as f64,
    )
}
