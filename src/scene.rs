//! Per-frame orchestration of camera, models and renderer.
//!
//! The [`Scene`] is the context the host threads through every input handler
//! and draw call. It owns all viewer state; nothing is global.

use std::path::Path;

use log::{debug, info, trace, warn};

use crate::animation::{Animation, Frame, Interpolation};
use crate::background::BackgroundImage;
use crate::camera::Camera;
use crate::colors;
use crate::geometry::{BoundingBox, Polygon};
use crate::material::Material;
use crate::math::intersect::{point_in_polygon, polygon_edges};
use crate::math::vec4::Vec4;
use crate::mesh::LoadError;
use crate::model::Model;
use crate::render::{PixelSink, Renderer, Transforms};
use crate::settings::{BoundingBoxDisplay, Settings};
use crate::transform::{action_matrix, Action};

const ORTHO_NEAR: f64 = 1.0;
const ORTHO_FAR: f64 = 1000.0;
/// Extra margin on top of the configured frame offset.
const FRAME_MARGIN: f64 = 1.2;
const ORIGIN_AXIS_LENGTH: f64 = 1.0;

/// What the current mouse drag has applied so far.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragOffsets {
    translation: f64,
    scale: f64,
    rotation: f64,
}

impl Default for DragOffsets {
    fn default() -> Self {
        Self {
            translation: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

pub struct Scene {
    camera: Camera,
    models: Vec<Model>,
    renderer: Renderer,
    settings: Settings,
    selected: Option<usize>,
    background: Option<BackgroundImage>,
    recording: bool,
    playing: bool,
    /// The cursor was moved by keyframe navigation and is shown without playing.
    scrubbing: bool,
    drag: DragOffsets,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        let renderer = Renderer::new(width, height);
        let mut camera = Camera::new();
        camera.on_resize(renderer.aspect_ratio());

        Self {
            camera,
            models: Vec::new(),
            renderer,
            settings: Settings::default(),
            selected: None,
            background: None,
            recording: false,
            playing: false,
            scrubbing: false,
            drag: DragOffsets::default(),
        }
    }

    /// Drops every model and resets the camera.
    pub fn clear(&mut self) {
        self.models.clear();
        self.selected = None;
        self.recording = false;
        self.playing = false;
        self.scrubbing = false;
        self.camera = Camera::new();
        self.camera.on_resize(self.renderer.aspect_ratio());
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    // =========================================================================
    // Models
    // =========================================================================

    /// Loads an OBJ file, named after its file stem.
    pub fn load_model<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map_or_else(|| "model".to_string(), |stem| stem.to_string_lossy().into_owned());
        let model = Model::from_obj(name, path)?;
        self.add_model(model);
        Ok(())
    }

    /// Appends a model, selects it and frames the camera on it.
    pub fn add_model(&mut self, model: Model) {
        info!("Adding model `{}` ({} polygons)", model.name(), model.polygon_count());
        self.models.push(model);
        let index = self.models.len() - 1;
        self.selected = Some(index);
        self.frame_camera_on_model(index);
    }

    /// Backs the camera off along +z until the model fits the view, and sizes
    /// the orthographic box to match. The eye never moves closer, and the
    /// active projection mode is kept.
    pub fn frame_camera_on_model(&mut self, index: usize) {
        let Some(model) = self.models.get(index) else {
            return;
        };
        let object_to_world = *model.object_to_world();
        let d = model.dimensions() * object_to_world;
        let dimensions = Vec4::direction(d.x.abs(), d.y.abs(), d.z.abs());
        let center = model.bbox_center() * object_to_world;

        let aspect = self.renderer.aspect_ratio();
        let fov = self.camera.perspective_parameters().fov;
        let wide = dimensions.x > dimensions.y;
        let half_angle = if wide { aspect * fov / 2.0 } else { fov / 2.0 };

        let radius = dimensions.x.max(dimensions.y).max(dimensions.z) / 2.0;
        let offset = self.settings.frame_offset;
        let distance = (radius / half_angle.to_radians().sin()).abs() * offset * FRAME_MARGIN;

        if distance <= self.camera.orbit_parameters().eye.z.abs() {
            debug!("Camera already frames `{}`", model.name());
            return;
        }

        let eye = center + Vec4::direction(0.0, 0.0, distance);
        self.camera.look_at(eye, center, Vec4::direction(0.0, 1.0, 0.0));
        info!("Moved camera to ({:.3}, {:.3}, {:.3})", eye.x, eye.y, eye.z);

        let mode = self.camera.mode();
        let width = (if wide { dimensions.x } else { aspect * dimensions.y }) * offset;
        self.camera.set_orthographic_width(width, aspect, ORTHO_NEAR, ORTHO_FAR);
        self.camera.switch_to_projection(mode);
        info!("Orthographic width set to {width:.3}");
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_model(&self) -> Option<&Model> {
        self.selected.and_then(|i| self.models.get(i))
    }

    pub fn selected_model_mut(&mut self) -> Option<&mut Model> {
        self.selected.and_then(|i| self.models.get_mut(i))
    }

    /// Wraps around to the first model.
    pub fn select_next_model(&mut self) {
        if self.models.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < self.models.len() => i + 1,
            _ => 0,
        });
    }

    /// Wraps around to the last model.
    pub fn select_previous_model(&mut self) {
        if self.models.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i > 0 => i - 1,
            _ => self.models.len() - 1,
        });
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn set_material(&mut self, material: Material) {
        if let Some(model) = self.selected_model_mut() {
            model.set_material(material);
        }
    }

    /// Selects the model with a polygon under pixel `(x, y)`. Pixel row 0 is
    /// the bottom of the output. Later models win over earlier ones.
    pub fn pick_model(&mut self, x: i32, y: i32) -> Option<usize> {
        let point = Vec4::point(f64::from(x), f64::from(y), 0.0);

        let hit = (0..self.models.len()).rev().find(|&index| {
            let model = &self.models[index];
            let to_clip = self.model_transforms(index).to_clip();
            model.geometries().iter().flat_map(|g| &g.polygons).any(|polygon| {
                let screen: Option<Vec<Vec4>> = polygon
                    .corners(model.positions())
                    .into_iter()
                    .map(|corner| self.renderer.project(corner, &to_clip))
                    .collect();
                screen.is_some_and(|corners| point_in_polygon(point, &polygon_edges(&corners)))
            })
        });

        if let Some(index) = hit {
            debug!("Picked `{}`", self.models[index].name());
            self.selected = Some(index);
        }
        hit
    }

    // =========================================================================
    // Viewport and background
    // =========================================================================

    /// Resizes the output and re-derives both projections for the new aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.set_size(width, height);
        self.camera.on_resize(self.renderer.aspect_ratio());
        debug!("Scene resized to {width}x{height}");
    }

    pub fn set_background_image(&mut self, image: Option<BackgroundImage>) {
        self.settings.background.image_enabled = image.is_some();
        self.background = image;
    }

    /// Loads and enables a background image. On failure the current background
    /// is left as it was.
    pub fn load_background<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let image = BackgroundImage::from_file(path)?;
        self.set_background_image(Some(image));
        Ok(())
    }

    pub fn background_image(&self) -> Option<&BackgroundImage> {
        self.background.as_ref()
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// The matrix chain for one model: the playback cursor's transforms while
    /// an animation is shown, the live ones otherwise.
    pub fn model_transforms(&self, index: usize) -> Transforms {
        let model = &self.models[index];
        let cursor = if self.playing || self.scrubbing {
            model.animation().current_frame()
        } else {
            None
        };
        let (object_to_world, view_overlay) = match cursor {
            Some(frame) => (frame.object_to_world, frame.view_transform),
            None => (*model.object_to_world(), *model.view_transform()),
        };

        Transforms {
            object_to_world,
            world_to_view: *self.camera.world_to_view(),
            view_overlay,
            projection: *self.camera.projection(),
        }
    }

    pub fn is_back_face(&self, polygon: &Polygon, transforms: &Transforms) -> bool {
        self.renderer
            .is_back_face(polygon.normal, polygon.center, transforms, self.camera.mode())
    }

    /// Renders one frame into `sink`.
    pub fn draw<S: PixelSink + ?Sized>(&mut self, sink: &mut S) {
        self.draw_background(sink);
        self.renderer.init_z_buffer();

        let mode = self.settings.render_mode;
        let thickness = self.settings.wireframe_thickness;

        for index in 0..self.models.len() {
            let transforms = self.model_transforms(index);
            let model = &self.models[index];
            let color = if self.selected == Some(index) {
                colors::HIGHLIGHT
            } else {
                model.material().color
            };
            let outline = if mode.draws_fill() { colors::WIREFRAME } else { color };

            let visible: Vec<&Polygon> = model
                .geometries()
                .iter()
                .flat_map(|g| &g.polygons)
                .filter(|p| !(self.settings.backface_culling && self.is_back_face(p, &transforms)))
                .collect();

            // Fill the whole model first so its outlines can hide behind it
            if mode.draws_fill() {
                for polygon in &visible {
                    let corners = polygon.corners(model.positions());
                    self.renderer
                        .fill_polygon(sink, &corners, polygon.normal, &transforms, color);
                }
            }
            if mode.draws_wireframe() {
                for polygon in &visible {
                    let corners = polygon.corners(model.positions());
                    if mode.draws_fill() {
                        self.renderer
                            .draw_polygon_depth_tested(sink, &corners, &transforms, outline, thickness);
                    } else {
                        self.renderer
                            .draw_polygon(sink, &corners, &transforms, outline, thickness);
                    }
                }
            }

            match self.settings.bounding_box {
                BoundingBoxDisplay::Off => {}
                BoundingBoxDisplay::Model => {
                    draw_bounding_box(&self.renderer, sink, model.bounding_box(), &transforms, thickness);
                }
                BoundingBoxDisplay::Geometry => {
                    for bbox in model.geometries().iter().filter_map(|g| g.bounding_box()) {
                        draw_bounding_box(&self.renderer, sink, bbox, &transforms, thickness);
                    }
                }
            }

            self.draw_origin(sink, &transforms);
        }
    }

    fn draw_background<S: PixelSink + ?Sized>(&self, sink: &mut S) {
        let background = &self.settings.background;
        match &self.background {
            Some(image) if background.image_enabled => {
                self.renderer
                    .draw_background_image(sink, image, background.fit, background.interpolation);
            }
            _ => self.renderer.draw_background(sink, background.color),
        }
    }

    /// RGB triad along the model's local X, Y and Z.
    fn draw_origin<S: PixelSink + ?Sized>(&self, sink: &mut S, transforms: &Transforms) {
        let origin = Vec4::point(0.0, 0.0, 0.0);
        let axes = [
            (Vec4::direction(ORIGIN_AXIS_LENGTH, 0.0, 0.0), colors::AXIS_X),
            (Vec4::direction(0.0, ORIGIN_AXIS_LENGTH, 0.0), colors::AXIS_Y),
            (Vec4::direction(0.0, 0.0, ORIGIN_AXIS_LENGTH), colors::AXIS_Z),
        ];
        for (axis, color) in axes {
            self.renderer.draw_edge(sink, origin, origin + axis, transforms, color, 1);
        }
    }

    // =========================================================================
    // Manipulation
    // =========================================================================

    /// Applies a horizontal mouse drag of `dx` pixels to the selected model,
    /// using the selected action, axes and space.
    pub fn drag(&mut self, dx: f64) {
        if self.playing {
            return;
        }
        self.scrubbing = false;

        let settings = &self.settings;
        let sensitivity = settings.sensitivity;
        let axes = settings.axes;
        let (action, space, min_scale) = (settings.action, settings.space, settings.min_scale);

        let mut translation = Vec4::ZERO;
        let mut scale = Vec4::direction(1.0, 1.0, 1.0);
        let mut rotation = Vec4::ZERO;
        match action {
            Action::Translate => {
                let offset = dx / sensitivity.translate;
                self.drag.translation += offset;
                translation = axes.select(offset, 0.0);
            }
            Action::Scale => {
                let factor = (1.0 + dx / sensitivity.scale).max(min_scale);
                self.drag.scale *= factor;
                scale = axes.select(factor, 1.0);
            }
            Action::Rotate => {
                let angle = dx / sensitivity.rotate;
                self.drag.rotation += angle;
                rotation = axes.select(angle, 0.0);
            }
        }

        let m = action_matrix(action, translation, scale, rotation);
        let Some(model) = self.selected_model_mut() else {
            return;
        };
        match action {
            Action::Translate => model.translate(&m, space),
            Action::Scale => model.scale(&m, space),
            Action::Rotate => model.rotate(&m, space),
        }
        trace!("Drag {dx:+.1}px: {action:?} on {axes} in {space:?} space");
    }

    /// Ends the current drag. While recording, the drag becomes a keyframe
    /// `elapsed_seconds` after the previous one.
    pub fn end_drag(&mut self, elapsed_seconds: f64) {
        if self.recording {
            self.record_keyframe(elapsed_seconds);
        }
        self.drag = DragOffsets::default();
    }

    fn record_keyframe(&mut self, elapsed_seconds: f64) {
        let settings = &self.settings;
        let axes = settings.axes;
        let (action, space) = (settings.action, settings.space);
        let fps = f64::from(settings.frames_per_second);
        let scale = self.drag.scale.max(settings.min_scale);
        let drag = self.drag;

        let Some(model) = self.selected_model_mut() else {
            return;
        };
        let animation = model.animation();
        let frame_num = if animation.frame(0, Interpolation::Linear, false).is_none() {
            0
        } else {
            animation.last_frame_number() + (elapsed_seconds * fps).round() as i32
        };

        let frame = Frame::new(*model.object_to_world(), *model.view_transform(), frame_num).with_manipulation(
            action,
            space,
            axes.select(drag.translation, 0.0),
            axes.select(scale, 1.0),
            axes.select(drag.rotation, 0.0),
        );
        if model.animation_mut().add_key_frame(frame) {
            debug!("Recorded keyframe {frame_num} for `{}`", model.name());
        }
    }

    // =========================================================================
    // Animation
    // =========================================================================

    /// Clears every animation and records the selected model's current state
    /// as frame 0.
    pub fn start_recording(&mut self) {
        self.playing = false;
        self.scrubbing = false;
        for model in &mut self.models {
            model.animation_mut().clear();
        }
        self.drag = DragOffsets::default();
        self.recording = true;
        self.record_keyframe(0.0);
        info!("Recording started");
    }

    pub fn stop_recording(&mut self) {
        if self.recording {
            self.recording = false;
            info!("Recording stopped");
        }
    }

    /// Rewinds every animation and starts showing the playback cursors.
    pub fn start_playback(&mut self) {
        self.stop_recording();
        for model in &mut self.models {
            model.animation_mut().reset();
        }
        self.scrubbing = false;
        self.playing = true;
        info!("Playback started");
    }

    pub fn stop_playback(&mut self) {
        self.playing = false;
        self.scrubbing = false;
        for model in &mut self.models {
            model.animation_mut().reset();
        }
    }

    /// Advances every animation by one frame in lockstep.
    ///
    /// Once no animation has frames left, every cursor is rewound to frame 0,
    /// playback stops, and `false` is returned.
    pub fn play_animation_step(&mut self) -> bool {
        if !self.playing || self.models.is_empty() {
            return false;
        }

        let any_running = self.models.iter().any(|m| !m.animation().is_finished());
        if !any_running {
            self.stop_playback();
            info!("Playback finished");
            return false;
        }

        let interpolation = self.settings.interpolation;
        let only_translation = self.settings.only_translation;
        for model in &mut self.models {
            model.animation_mut().step_to_next_frame(interpolation, only_translation);
        }
        true
    }

    pub fn increase_playback_speed(&mut self, percent: f64) {
        for model in &mut self.models {
            model.animation_mut().increase_playback_speed(percent);
        }
    }

    pub fn decrease_playback_speed(&mut self, percent: f64) {
        for model in &mut self.models {
            model.animation_mut().decrease_playback_speed(percent);
        }
    }

    pub fn normal_playback_speed(&mut self) {
        for model in &mut self.models {
            model.animation_mut().normal_playback_speed();
        }
    }

    pub fn animation_to_first_keyframe(&mut self) {
        self.navigate(|a| a.to_first_keyframe());
    }

    pub fn animation_to_last_keyframe(&mut self) {
        self.navigate(|a| a.to_last_keyframe());
    }

    pub fn animation_to_next_keyframe(&mut self) {
        self.navigate(|a| a.to_next_keyframe());
    }

    pub fn animation_to_previous_keyframe(&mut self) {
        self.navigate(|a| a.to_previous_keyframe());
    }

    fn navigate(&mut self, step: impl Fn(&mut Animation)) {
        if self.models.iter().all(|m| m.animation().is_empty()) {
            warn!("No keyframes to navigate");
            return;
        }
        for model in &mut self.models {
            step(model.animation_mut());
        }
        self.scrubbing = true;
    }
}

fn draw_bounding_box<S: PixelSink + ?Sized>(
    renderer: &Renderer,
    sink: &mut S,
    bbox: &BoundingBox,
    transforms: &Transforms,
    thickness: i32,
) {
    for face in &bbox.faces {
        let corners = bbox.face_corners(face);
        renderer.draw_polygon(sink, &corners, transforms, colors::BOUNDING_BOX, thickness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mat4::Mat4;
    use crate::projection::ProjectionMode;
    use crate::render::FrameBuffer;
    use crate::settings::RenderMode;
    use crate::transform::{Axis, AxisMask, Space};
    use approx::assert_relative_eq;

    fn cube_scene() -> Scene {
        let mut scene = Scene::new(200, 200);
        scene.add_model(Model::cube("cube"));
        scene
    }

    fn visible_normals(scene: &Scene) -> Vec<Vec4> {
        let transforms = scene.model_transforms(0);
        scene.models()[0].geometries()[0]
            .polygons
            .iter()
            .filter(|p| !scene.is_back_face(p, &transforms))
            .map(|p| p.normal)
            .collect()
    }

    #[test]
    fn perspective_culling_from_front_keeps_front_face() {
        let mut scene = cube_scene();
        scene.camera_mut().switch_to_projection(ProjectionMode::Perspective);
        assert_relative_eq!(scene.camera().orbit_parameters().eye, Vec4::point(0.0, 0.0, 5.0));

        // Side faces are edge-on to the eye and count as facing away
        let visible = visible_normals(&scene);
        assert_eq!(visible.len(), 1);
        assert_relative_eq!(visible[0], Vec4::direction(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn perspective_culling_from_corner_keeps_three_faces() {
        let mut scene = cube_scene();
        scene.camera_mut().switch_to_projection(ProjectionMode::Perspective);
        scene.camera_mut().look_at(
            Vec4::point(5.0, 5.0, 5.0),
            Vec4::point(0.0, 0.0, 0.0),
            Vec4::direction(0.0, 1.0, 0.0),
        );

        let visible = visible_normals(&scene);
        assert_eq!(visible.len(), 3);
        assert!(visible.iter().all(|n| n.x + n.y + n.z > 0.0));
    }

    #[test]
    fn orthographic_culling_drops_only_the_back_face() {
        let scene = cube_scene();
        assert!(!scene.camera().is_perspective());

        let visible = visible_normals(&scene);
        assert_eq!(visible.len(), 5);
        assert!(visible.iter().all(|n| n.z >= 0.0));
    }

    #[test]
    fn large_models_push_the_camera_back() {
        let mut scene = Scene::new(200, 200);
        let mut model = Model::cube("big");
        model.scale(&Mat4::scaling(10.0), Space::Object);
        scene.add_model(model);

        let eye = scene.camera().orbit_parameters().eye;
        assert!(eye.z > 5.0);
        assert_relative_eq!(eye.x, 0.0);
        // Box 20 wide, times the frame offset
        assert_relative_eq!(scene.camera().orthographic_parameters().width(), 30.0, epsilon = 1e-9);
        assert!(!scene.camera().is_perspective());
    }

    #[test]
    fn selection_wraps() {
        let mut scene = cube_scene();
        scene.add_model(Model::cube("second"));
        assert_eq!(scene.selected_index(), Some(1));

        scene.select_next_model();
        assert_eq!(scene.selected_index(), Some(0));
        scene.select_previous_model();
        assert_eq!(scene.selected_index(), Some(1));
        scene.clear_selection();
        assert!(scene.selected_model().is_none());
        scene.select_previous_model();
        assert_eq!(scene.selected_index(), Some(1));
    }

    #[test]
    fn picking_hits_the_cube_and_misses_the_corner() {
        let mut scene = cube_scene();
        scene.clear_selection();

        assert_eq!(scene.pick_model(100, 100), Some(0));
        assert_eq!(scene.selected_index(), Some(0));

        scene.clear_selection();
        assert_eq!(scene.pick_model(2, 2), None);
        assert_eq!(scene.selected_index(), None);
    }

    #[test]
    fn drag_translates_selected_axes() {
        let mut scene = cube_scene();
        scene.settings_mut().axes = AxisMask::only(Axis::Y);
        scene.drag(50.0);
        scene.drag(50.0);

        let origin = Vec4::point(0.0, 0.0, 0.0) * *scene.models()[0].object_to_world();
        assert_relative_eq!(origin, Vec4::point(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn drag_scale_is_clamped() {
        let mut scene = cube_scene();
        scene.settings_mut().action = Action::Scale;
        scene.drag(-1000.0);

        let m = scene.models()[0].object_to_world();
        assert_relative_eq!(m.get(0, 0), 0.05);
        assert_relative_eq!(m.get(1, 1), 1.0);
    }

    #[test]
    fn recording_and_playback() {
        let mut scene = cube_scene();
        scene.start_recording();
        assert_eq!(scene.models()[0].animation().last_frame_number(), 0);

        scene.drag(100.0);
        scene.end_drag(1.0);
        scene.stop_recording();

        let animation = scene.models()[0].animation();
        assert_eq!(animation.last_frame_number(), 30);
        let key = animation.keyframes()[1];
        assert_eq!(key.action, Action::Translate);
        assert_relative_eq!(key.translation, Vec4::direction(1.0, 0.0, 0.0));

        // Put the model back; playback must show the recorded motion
        scene.models[0].set_transforms(
            Mat4::identity(),
            Mat4::identity(),
        );
        scene.start_playback();
        for _ in 0..15 {
            assert!(scene.play_animation_step());
        }
        let mid = Vec4::point(0.0, 0.0, 0.0) * scene.model_transforms(0).object_to_world;
        assert_relative_eq!(mid, Vec4::point(0.5, 0.0, 0.0), epsilon = 1e-12);

        for _ in 0..15 {
            assert!(scene.play_animation_step());
        }
        assert!(!scene.play_animation_step());
        assert!(!scene.is_playing());
        assert_eq!(scene.models()[0].animation().current_frame().unwrap().frame_num, 0);
    }

    #[test]
    fn lockstep_playback_runs_until_the_longest_animation_ends() {
        let mut scene = cube_scene();
        scene.add_model(Model::cube("second"));
        assert_eq!(scene.selected_index(), Some(1));

        // Second cube: keyframes 0 and 30
        scene.start_recording();
        scene.drag(100.0);
        scene.end_drag(1.0);

        // First cube: keyframes 0 and 15
        scene.select_previous_model();
        scene.drag(100.0);
        scene.end_drag(0.5);
        scene.drag(100.0);
        scene.end_drag(0.5);
        scene.stop_recording();
        assert_eq!(scene.models()[0].animation().last_frame_number(), 15);
        assert_eq!(scene.models()[1].animation().last_frame_number(), 30);

        let frame_of = |scene: &Scene, index: usize| {
            scene.models()[index].animation().current_frame().unwrap().frame_num
        };

        scene.start_playback();
        for _ in 0..20 {
            assert!(scene.play_animation_step());
        }
        assert_eq!(frame_of(&scene, 0), 15);
        assert_eq!(frame_of(&scene, 1), 20);

        for _ in 20..30 {
            assert!(scene.play_animation_step());
        }
        assert_eq!(frame_of(&scene, 0), 15);
        assert_eq!(frame_of(&scene, 1), 30);

        assert!(!scene.play_animation_step());
        assert!(!scene.is_playing());
        assert_eq!(frame_of(&scene, 0), 0);
        assert_eq!(frame_of(&scene, 1), 0);
    }

    #[test]
    fn keyframe_navigation_shows_cursor() {
        let mut scene = cube_scene();
        scene.start_recording();
        scene.drag(100.0);
        scene.end_drag(1.0);
        scene.stop_recording();
        scene.models[0].set_transforms(
            Mat4::identity(),
            Mat4::identity(),
        );

        scene.animation_to_last_keyframe();
        let end = Vec4::point(0.0, 0.0, 0.0) * scene.model_transforms(0).object_to_world;
        assert_relative_eq!(end, Vec4::point(1.0, 0.0, 0.0), epsilon = 1e-12);

        scene.drag(0.0);
        let live = Vec4::point(0.0, 0.0, 0.0) * scene.model_transforms(0).object_to_world;
        assert_relative_eq!(live, Vec4::point(0.0, 0.0, 0.0));
    }

    #[test]
    fn speed_changes_fan_out() {
        let mut scene = cube_scene();
        scene.start_recording();
        scene.drag(10.0);
        scene.end_drag(1.0);
        scene.stop_recording();

        scene.decrease_playback_speed(100.0);
        assert_eq!(scene.models()[0].animation().last_frame_number(), 60);
        scene.normal_playback_speed();
        assert_eq!(scene.models()[0].animation().last_frame_number(), 30);
    }

    #[test]
    fn draw_fills_highlighted_model_and_origin() {
        let mut scene = cube_scene();
        scene.settings_mut().render_mode = RenderMode::Filled;
        let mut fb = FrameBuffer::new(200, 200);
        scene.draw(&mut fb);

        // Front face covers the middle, drawn in the selection highlight
        let pixel = fb.get_pixel(85, 115).map(colors::unpack);
        assert_eq!(pixel, Some(colors::HIGHLIGHT));
        assert!(scene.renderer().z_buffer().iter().any(|z| z.is_finite()));

        // X axis of the origin triad runs right from the center
        let axis = fb.get_pixel(115, 99).map(colors::unpack);
        assert_eq!(axis, Some(colors::AXIS_X));
    }

    #[test]
    fn draw_uses_background_color_without_models() {
        let mut scene = Scene::new(8, 8);
        scene.settings_mut().background.color = Vec4::rgb(1.0, 2.0, 3.0);
        let mut fb = FrameBuffer::new(8, 8);
        scene.draw(&mut fb);
        let packed = colors::pack(Vec4::rgb(1.0, 2.0, 3.0));
        assert!(fb.pixels().iter().all(|&p| p == packed));
    }

    #[test]
    fn draw_survives_a_vertex_between_eye_and_near_plane() {
        let mut scene = cube_scene();
        scene.settings_mut().render_mode = RenderMode::FilledWireframe;
        let camera = scene.camera_mut();
        camera.switch_to_projection(ProjectionMode::Perspective);
        camera.look_at(
            Vec4::point(0.3, 0.2, 1.0 + 1e-12),
            Vec4::point(0.3, 0.2, 0.0),
            Vec4::direction(0.0, 1.0, 0.0),
        );

        let mut fb = FrameBuffer::new(200, 200);
        scene.draw(&mut fb);

        // The front face is closer than the near plane; the rest of the cube is still drawn
        let highlight = colors::pack(colors::HIGHLIGHT);
        assert!(fb.pixels().iter().any(|&p| p == highlight));
    }

    #[test]
    fn filled_wireframe_hides_edges_behind_the_fill() {
        let mut scene = cube_scene();
        scene.settings_mut().render_mode = RenderMode::FilledWireframe;
        scene.settings_mut().backface_culling = false;
        scene.camera_mut().switch_to_projection(ProjectionMode::Perspective);

        let mut fb = FrameBuffer::new(200, 200);
        scene.draw(&mut fb);

        // Front face spans columns and rows 39..=159; the back face and the
        // far ends of the side edges project inside it
        let outline = colors::pack(colors::WIREFRAME);
        let hidden = (45..=154).any(|y| (45..=154).any(|x| fb.get_pixel(x, y) == Some(outline)));
        assert!(!hidden);
        assert_eq!(fb.get_pixel(159, 100), Some(outline));
        assert_eq!(fb.get_pixel(39, 100), Some(outline));
    }
}
