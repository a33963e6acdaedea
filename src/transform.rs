//! Manipulation vocabulary shared by live editing and keyframe playback.
//!
//! A manipulation is an [`Action`] along the axes of an [`AxisMask`], applied
//! in one [`Space`]:
//!
//! | Space  | Composition                                   |
//! |--------|-----------------------------------------------|
//! | Object | `T * object_to_world` (before the model's own transform) |
//! | World  | `object_to_world * T` (after it)              |
//! | View   | `T * view_overlay` (between camera and projection) |

use std::fmt;

use crate::math::mat4::Mat4;
use crate::math::vec4::Vec4;

/// Coordinate space a manipulation is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Space {
    #[default]
    Object,
    World,
    View,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Translate,
    Scale,
    Rotate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Which axes a manipulation affects. Any combination may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMask {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Default for AxisMask {
    fn default() -> Self {
        Self::only(Axis::X)
    }
}

impl AxisMask {
    pub const NONE: Self = Self {
        x: false,
        y: false,
        z: false,
    };

    pub const fn only(axis: Axis) -> Self {
        match axis {
            Axis::X => Self { x: true, ..Self::NONE },
            Axis::Y => Self { y: true, ..Self::NONE },
            Axis::Z => Self { z: true, ..Self::NONE },
        }
    }

    pub fn contains(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn toggle(&mut self, axis: Axis) {
        match axis {
            Axis::X => self.x = !self.x,
            Axis::Y => self.y = !self.y,
            Axis::Z => self.z = !self.z,
        }
    }

    /// `value` on every selected axis, `fallback` on the others. w = 0.
    pub fn select(&self, value: f64, fallback: f64) -> Vec4 {
        let pick = |on: bool| if on { value } else { fallback };
        Vec4::direction(pick(self.x), pick(self.y), pick(self.z))
    }
}

impl fmt::Display for AxisMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (on, name) in [(self.x, 'X'), (self.y, 'Y'), (self.z, 'Z')] {
            if on {
                write!(f, "{name}")?;
            }
        }
        Ok(())
    }
}

/// The matrix for one action. Only the parameter matching `action` is read.
///
/// Rotation angles are degrees, applied X first, then Y, then Z.
pub fn action_matrix(action: Action, translation: Vec4, scale: Vec4, rotation: Vec4) -> Mat4 {
    match action {
        Action::Translate => Mat4::translation_vec(translation),
        Action::Scale => Mat4::scaling_vec(scale),
        Action::Rotate => {
            Mat4::rotation_x(rotation.x) * Mat4::rotation_y(rotation.y) * Mat4::rotation_z(rotation.z)
        }
    }
}

/// Composes `m` into the object-to-world or view-overlay transform for `space`.
pub fn apply_in_space(m: &Mat4, space: Space, object_to_world: &mut Mat4, view_overlay: &mut Mat4) {
    match space {
        Space::Object => *object_to_world = *m * *object_to_world,
        Space::World => *object_to_world = *object_to_world * *m,
        Space::View => *view_overlay = *m * *view_overlay,
    }
}
