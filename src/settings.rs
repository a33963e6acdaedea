//! User-adjustable viewer state.
//!
//! [`Settings`] is a plain value owned by the [`Scene`](crate::scene::Scene);
//! the host mutates it in response to input and the scene reads it while
//! drawing and manipulating models.

use crate::animation::Interpolation;
use crate::colors;
use crate::math::vec4::Vec4;
use crate::render::{ImageFit, ImageInterpolation};
use crate::transform::{Action, AxisMask, Space};

/// How polygons are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Outlines only (key: 1)
    #[default]
    Wireframe,
    /// Flat-filled, depth-tested (key: 2)
    Filled,
    /// Flat-filled with outlines on top (key: 3)
    FilledWireframe,
}

impl RenderMode {
    pub fn draws_fill(self) -> bool {
        matches!(self, Self::Filled | Self::FilledWireframe)
    }

    pub fn draws_wireframe(self) -> bool {
        matches!(self, Self::Wireframe | Self::FilledWireframe)
    }
}

/// Which bounding boxes are overlaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundingBoxDisplay {
    #[default]
    Off,
    /// One box around each model.
    Model,
    /// One box around each geometry group.
    Geometry,
}

impl BoundingBoxDisplay {
    /// Off -> Model -> Geometry -> Off.
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::Model,
            Self::Model => Self::Geometry,
            Self::Geometry => Self::Off,
        }
    }
}

/// Mouse-to-transform conversion factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    /// Pixels of drag per world unit of translation.
    pub translate: f64,
    /// Pixels of drag per unit of scale change.
    pub scale: f64,
    /// Pixels of drag per degree of rotation.
    pub rotate: f64,
    /// Degrees of camera yaw/pitch per pixel.
    pub camera_orbit: f64,
    /// World units of camera pan per pixel.
    pub camera_pan: f64,
    /// Zoom offset per wheel step.
    pub zoom: f64,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            translate: 100.0,
            scale: 100.0,
            rotate: 2.0,
            camera_orbit: 0.25,
            camera_pan: 0.01,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundSettings {
    /// Draw the loaded image instead of the flat color.
    pub image_enabled: bool,
    pub fit: ImageFit,
    pub interpolation: ImageInterpolation,
    pub color: Vec4,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            image_enabled: false,
            fit: ImageFit::default(),
            interpolation: ImageInterpolation::default(),
            color: colors::BACKGROUND,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub render_mode: RenderMode,
    pub backface_culling: bool,
    pub bounding_box: BoundingBoxDisplay,
    pub action: Action,
    pub axes: AxisMask,
    pub space: Space,
    pub sensitivity: Sensitivity,
    /// Scale factors never shrink below this.
    pub min_scale: f64,
    pub frames_per_second: u32,
    pub interpolation: Interpolation,
    /// Bezier playback keeps keyframe 0's rotation and scale.
    pub only_translation: bool,
    /// Extra distance factor when framing the camera on a model.
    pub frame_offset: f64,
    pub background: BackgroundSettings,
    /// Extra pixels drawn around each wireframe pixel.
    pub wireframe_thickness: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            backface_culling: false,
            bounding_box: BoundingBoxDisplay::default(),
            action: Action::default(),
            axes: AxisMask::default(),
            space: Space::default(),
            sensitivity: Sensitivity::default(),
            min_scale: 0.05,
            frames_per_second: 30,
            interpolation: Interpolation::default(),
            only_translation: false,
            frame_offset: 1.5,
            background: BackgroundSettings::default(),
            wireframe_thickness: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_mode_parts() {
        assert!(RenderMode::Wireframe.draws_wireframe());
        assert!(!RenderMode::Wireframe.draws_fill());
        assert!(RenderMode::Filled.draws_fill());
        assert!(!RenderMode::Filled.draws_wireframe());
        assert!(RenderMode::FilledWireframe.draws_fill() && RenderMode::FilledWireframe.draws_wireframe());
    }

    #[test]
    fn bounding_box_display_cycles() {
        let mut display = BoundingBoxDisplay::default();
        for expected in [BoundingBoxDisplay::Model, BoundingBoxDisplay::Geometry, BoundingBoxDisplay::Off] {
            display = display.next();
            assert_eq!(display, expected);
        }
    }
}
