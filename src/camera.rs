//! Orbit camera with cached orthographic and perspective projections.
//!
//! # Coordinate System
//!
//! View space is **right-handed**, looking down −Z:
//! - X: positive right
//! - Y: positive up
//! - Z: positive towards the viewer
//!
//! # View Transform
//!
//! The world-to-view transform is only ever produced by [`Camera::look_at`].
//! Orbit, pan and zoom adjust the cached [`OrbitParameters`] and re-derive it.
//!
//! # Projections
//!
//! Both projection matrices are kept live, so switching between them with
//! [`Camera::switch_to_projection`] is free.

use log::{info, trace};

use crate::math::mat4::Mat4;
use crate::math::vec4::Vec4;
use crate::projection::{
    OrthographicParameters, PerspectiveParameters, ProjectionMode,
};

const PITCH_LIMIT: f64 = 89.0;
const MIN_FOV: f64 = 1.0;
const MAX_FOV: f64 = 90.0;
const ORTHO_ZOOM_SENSITIVITY: f64 = 100.0;
const MIN_ORTHO_ZOOM: f64 = 0.05;

/// Eye placement and orientation cached by the last [`Camera::look_at`].
///
/// `forward` points from the look-at target back towards the eye.
/// Yaw and pitch are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParameters {
    pub eye: Vec4,
    pub forward: Vec4,
    pub right: Vec4,
    pub up: Vec4,
    pub world_up: Vec4,
    pub yaw: f64,
    pub pitch: f64,
}

impl Default for OrbitParameters {
    fn default() -> Self {
        Self {
            eye: Vec4::point(0.0, 0.0, 5.0),
            forward: Vec4::direction(0.0, 0.0, 1.0),
            right: Vec4::direction(1.0, 0.0, 0.0),
            up: Vec4::direction(0.0, 1.0, 0.0),
            world_up: Vec4::direction(0.0, 1.0, 0.0),
            yaw: -90.0,
            pitch: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    projection: Mat4,
    ortho_projection: Mat4,
    persp_projection: Mat4,
    mode: ProjectionMode,
    world_to_view: Mat4,
    ortho_params: OrthographicParameters,
    /// Accumulated orthographic zoom on top of `ortho_params`.
    ortho_zoom: f64,
    persp_params: PerspectiveParameters,
    orbit: OrbitParameters,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Creates a camera on +Z looking at the origin, in orthographic mode.
    pub fn new() -> Self {
        let ortho_params = OrthographicParameters::default();
        let persp_params = PerspectiveParameters::default();
        let orbit = OrbitParameters::default();

        let mut camera = Self {
            projection: ortho_params.matrix(),
            ortho_projection: ortho_params.matrix(),
            persp_projection: persp_params.matrix(),
            mode: ProjectionMode::Orthographic,
            world_to_view: Mat4::identity(),
            ortho_params,
            ortho_zoom: 1.0,
            persp_params,
            orbit,
        };
        camera.look_at(orbit.eye, Vec4::point(0.0, 0.0, 0.0), orbit.world_up);
        camera
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// Builds and activates an orthographic projection from explicit bounds.
    pub fn set_orthographic(
        &mut self,
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
        near: f64,
        far: f64,
    ) {
        self.ortho_params = OrthographicParameters {
            left,
            right,
            top,
            bottom,
            near,
            far,
        };
        self.ortho_zoom = 1.0;
        self.ortho_projection = self.ortho_params.matrix();
        self.projection = self.ortho_projection;
        self.mode = ProjectionMode::Orthographic;
    }

    /// Rebuilds the cached orthographic matrix from its bounds and zoom.
    fn rebuild_orthographic(&mut self) {
        let zoom = Mat4::scaling_xyz(self.ortho_zoom, self.ortho_zoom, 1.0);
        self.ortho_projection = self.ortho_params.matrix() * zoom;
        if self.mode == ProjectionMode::Orthographic {
            self.projection = self.ortho_projection;
        }
    }

    /// Symmetric orthographic box `width` wide, height derived from the aspect ratio.
    pub fn set_orthographic_width(&mut self, width: f64, aspect_ratio: f64, near: f64, far: f64) {
        let height = width / aspect_ratio;
        self.set_orthographic(
            -width / 2.0,
            width / 2.0,
            height / 2.0,
            -height / 2.0,
            near,
            far,
        );
    }

    /// Builds and activates a perspective projection from near-plane bounds.
    pub fn set_perspective(
        &mut self,
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
        near: f64,
        far: f64,
    ) {
        self.persp_params = PerspectiveParameters::from_bounds(left, right, top, bottom, near, far);
        self.persp_projection = self.persp_params.matrix();
        self.projection = self.persp_projection;
        self.mode = ProjectionMode::Perspective;
    }

    /// Symmetric perspective projection from a vertical FOV in degrees.
    pub fn set_perspective_fov(&mut self, fov: f64, aspect_ratio: f64, near: f64, far: f64) {
        let params = PerspectiveParameters::from_fov(fov, aspect_ratio, near, far);
        self.set_perspective(
            params.left,
            params.right,
            params.top,
            params.bottom,
            near,
            far,
        );
        self.persp_params.fov = fov;
        self.persp_params.aspect_ratio = aspect_ratio;
    }

    /// Activates the cached projection for `mode` without rebuilding it.
    pub fn switch_to_projection(&mut self, mode: ProjectionMode) {
        if self.mode == mode {
            return;
        }
        self.projection = match mode {
            ProjectionMode::Perspective => self.persp_projection,
            ProjectionMode::Orthographic => self.ortho_projection,
        };
        self.mode = mode;
        info!("Switched to {mode:?} projection");
    }

    /// Re-derives both projections for a new viewport aspect ratio, keeping the
    /// active mode, FOV, orthographic width and zoom, and clip planes.
    pub fn on_resize(&mut self, aspect_ratio: f64) {
        let mode = self.mode;
        let persp = self.persp_params;
        let ortho = self.ortho_params;
        let zoom = self.ortho_zoom;

        self.set_perspective_fov(persp.fov, aspect_ratio, persp.near, persp.far);
        self.set_orthographic_width(ortho.width(), aspect_ratio, ortho.near, ortho.far);
        self.ortho_zoom = zoom;
        self.rebuild_orthographic();
        self.switch_to_projection(mode);
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn is_perspective(&self) -> bool {
        self.mode == ProjectionMode::Perspective
    }

    /// Orthographic zoom factor applied since the box was last set.
    pub fn orthographic_zoom(&self) -> f64 {
        self.ortho_zoom
    }

    pub fn orthographic_parameters(&self) -> &OrthographicParameters {
        &self.ortho_params
    }

    pub fn perspective_parameters(&self) -> &PerspectiveParameters {
        &self.persp_params
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Points the camera from `eye` at `at`.
    ///
    /// Builds the orthonormal basis (right, up, forward) with forward pointing
    /// from `at` back to `eye`, and the world-to-view transform
    /// `Translate(-eye) * basisᵀ`.
    ///
    /// # Panics
    /// Panics if `eye == at` or `up` is parallel to `eye - at`.
    pub fn look_at(&mut self, eye: Vec4, at: Vec4, up: Vec4) {
        let forward = (eye - at).normalize3();
        let right = up.cross(forward).normalize3();
        let real_up = forward.cross(right).normalize3();

        self.orbit.eye = eye.with_w(1.0);
        self.orbit.forward = forward;
        self.orbit.right = right;
        self.orbit.up = real_up;
        self.orbit.world_up = up.with_w(0.0);

        self.world_to_view = Mat4::translation_vec(-eye) * self.basis().transposed();
    }

    /// The camera basis as a matrix with rows [right, up, forward].
    pub fn basis(&self) -> Mat4 {
        Mat4::from_rows(
            self.orbit.right,
            self.orbit.up,
            self.orbit.forward,
            Vec4::point(0.0, 0.0, 0.0),
        )
    }

    pub fn world_to_view(&self) -> &Mat4 {
        &self.world_to_view
    }

    pub fn orbit_parameters(&self) -> &OrbitParameters {
        &self.orbit
    }

    // =========================================================================
    // Orbit controls
    // =========================================================================

    /// Turns the view direction by yaw/pitch offsets in degrees around a fixed eye.
    ///
    /// Pitch is clamped to ±89° so the view never flips over the world-up axis.
    pub fn rotate_camera(&mut self, yaw_offset: f64, pitch_offset: f64) {
        self.orbit.yaw += yaw_offset;
        self.orbit.pitch = (self.orbit.pitch + pitch_offset).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let (yaw, pitch) = (self.orbit.yaw.to_radians(), self.orbit.pitch.to_radians());
        let view_dir = Vec4::direction(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize3();

        let eye = self.orbit.eye;
        let world_up = self.orbit.world_up;
        self.look_at(eye, eye + view_dir, world_up);
        trace!("Camera yaw {:.2}, pitch {:.2}", self.orbit.yaw, self.orbit.pitch);
    }

    /// Perspective: narrows/widens the FOV (clamped to [1°, 90°]).
    /// Orthographic: scales the projection in x/y, since there is no FOV.
    pub fn zoom_camera(&mut self, offset: f64) {
        match self.mode {
            ProjectionMode::Perspective => {
                let params = self.persp_params;
                let fov = (params.fov - offset).clamp(MIN_FOV, MAX_FOV);
                self.set_perspective_fov(fov, params.aspect_ratio, params.near, params.far);
            }
            ProjectionMode::Orthographic => {
                let factor = (1.0 + offset / ORTHO_ZOOM_SENSITIVITY).max(MIN_ORTHO_ZOOM);
                self.ortho_zoom *= factor;
                self.rebuild_orthographic();
            }
        }
    }

    /// Slides the eye in the camera's local X/Y plane, keeping the view direction.
    pub fn pan_camera(&mut self, dx: f64, dy: f64) {
        let eye = self.orbit.eye + self.orbit.right * dx + self.orbit.up * dy;
        let at = eye - self.orbit.forward;
        let world_up = self.orbit.world_up;
        self.look_at(eye, at, world_up);
    }
}
