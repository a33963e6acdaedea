//! Projection parameters and matrix construction.
//!
//! Both projections produce OpenGL-style clip coordinates, expressed for row
//! vectors (the column-vector matrices are built and then transposed). View
//! space looks down −Z, so NDC z grows away from the viewer.

use crate::math::mat4::Mat4;

/// Which of the two cached projections is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Orthographic,
    Perspective,
}

/// Parallel-projection view volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicParameters {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for OrthographicParameters {
    fn default() -> Self {
        Self {
            left: -5.0,
            right: 5.0,
            top: 5.0,
            bottom: -5.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl OrthographicParameters {
    pub fn width(&self) -> f64 {
        (self.right - self.left).abs()
    }

    /// Builds the parallel-projection matrix: scale the box to [-1, 1]³ and
    /// translate its center onto the origin.
    pub fn matrix(&self) -> Mat4 {
        let Self {
            left,
            right,
            top,
            bottom,
            near,
            far,
        } = *self;

        let mut m = Mat4::identity();
        m.set(0, 0, 2.0 / (right - left));
        m.set(1, 1, 2.0 / (top - bottom));
        m.set(2, 2, -2.0 / (far - near));
        m.set(0, 3, -(right + left) / (right - left));
        m.set(1, 3, -(top + bottom) / (top - bottom));
        m.set(2, 3, -(far + near) / (far - near));
        m.transpose();
        m
    }
}

/// Perspective frustum. `fov` is the vertical field of view in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveParameters {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub near: f64,
    pub far: f64,
    pub fov: f64,
    pub aspect_ratio: f64,
}

impl Default for PerspectiveParameters {
    fn default() -> Self {
        Self::from_fov(45.0, 1.0, 0.1, 1000.0)
    }
}

impl PerspectiveParameters {
    /// Symmetric frustum from a vertical FOV in degrees.
    pub fn from_fov(fov: f64, aspect_ratio: f64, near: f64, far: f64) -> Self {
        let top = (fov.to_radians() / 2.0).tan() * near;
        let right = top * aspect_ratio;
        Self {
            left: -right,
            right,
            top,
            bottom: -top,
            near,
            far,
            fov,
            aspect_ratio,
        }
    }

    /// Frustum from explicit near-plane bounds; FOV and aspect are derived.
    pub fn from_bounds(left: f64, right: f64, top: f64, bottom: f64, near: f64, far: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
            near,
            far,
            fov: (2.0 * (top / near).atan()).to_degrees(),
            aspect_ratio: ((right - left) / (top - bottom)).abs(),
        }
    }

    /// Builds the frustum matrix. Clip w carries −z_view for the perspective divide.
    pub fn matrix(&self) -> Mat4 {
        let Self {
            left,
            right,
            top,
            bottom,
            near,
            far,
            ..
        } = *self;

        let mut m = Mat4::identity();
        m.set(0, 0, 2.0 * near / (right - left));
        m.set(1, 1, 2.0 * near / (top - bottom));
        m.set(0, 2, (right + left) / (right - left));
        m.set(1, 2, (top + bottom) / (top - bottom));
        m.set(2, 2, -(far + near) / (far - near));
        m.set(2, 3, -2.0 * far * near / (far - near));
        m.set(3, 2, -1.0);
        m.set(3, 3, 0.0);
        m.transpose();
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec4::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn orthographic_maps_box_to_unit_cube() {
        let params = OrthographicParameters {
            left: -2.0,
            right: 4.0,
            top: 3.0,
            bottom: -1.0,
            near: 1.0,
            far: 11.0,
        };
        let m = params.matrix();
        let near_corner = Vec4::point(-2.0, -1.0, -1.0) * m;
        assert_relative_eq!(near_corner, Vec4::point(-1.0, -1.0, -1.0), epsilon = 1e-12);
        let far_corner = Vec4::point(4.0, 3.0, -11.0) * m;
        assert_relative_eq!(far_corner, Vec4::point(1.0, 1.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let params = PerspectiveParameters::from_fov(90.0, 1.0, 1.0, 10.0);
        let m = params.matrix();

        let near = (Vec4::point(1.0, 1.0, -1.0) * m).perspective_divide();
        assert_relative_eq!(near, Vec4::point(1.0, 1.0, -1.0), epsilon = 1e-12);

        let far = (Vec4::point(0.0, 0.0, -10.0) * m).perspective_divide();
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bounds_derive_fov_and_aspect() {
        let params = PerspectiveParameters::from_bounds(-2.0, 2.0, 1.0, -1.0, 1.0, 100.0);
        assert_relative_eq!(params.fov, 90.0, epsilon = 1e-12);
        assert_relative_eq!(params.aspect_ratio, 2.0);
    }

    #[test]
    fn fov_round_trips_through_bounds() {
        let from_fov = PerspectiveParameters::from_fov(60.0, 1.5, 0.5, 50.0);
        let from_bounds = PerspectiveParameters::from_bounds(
            from_fov.left,
            from_fov.right,
            from_fov.top,
            from_fov.bottom,
            from_fov.near,
            from_fov.far,
        );
        assert_relative_eq!(from_bounds.fov, 60.0, epsilon = 1e-9);
        assert_relative_eq!(from_bounds.aspect_ratio, 1.5, epsilon = 1e-9);
    }
}
