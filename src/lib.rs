//! A CPU-rendered polygon model viewer with keyframe animation.
//!
//! Models are loaded from OBJ files, transformed in object, world or view
//! space, and drawn by a software rasterizer (Bresenham lines and a scanline
//! polygon fill with a z-buffer). SDL2 is used only for the window.
//!
//! # Quick Start
//!
//! ```ignore
//! use polyview::prelude::*;
//!
//! let mut scene = Scene::new(800, 600);
//! scene.add_model(Model::cube("cube"));
//! let mut frame = FrameBuffer::new(800, 600);
//! scene.draw(&mut frame);
//! ```

pub mod animation;
pub mod background;
pub mod camera;
pub mod colors;
pub mod geometry;
pub mod material;
pub mod math;
pub mod mesh;
pub mod model;
pub mod projection;
pub mod render;
pub mod scene;
pub mod settings;
pub mod transform;
pub mod window;

pub use mesh::LoadError;
pub use model::Model;
pub use scene::Scene;

/// Prelude module for convenient imports.
pub mod prelude {
    // Scene
    pub use crate::scene::Scene;
    pub use crate::settings::{BoundingBoxDisplay, RenderMode, Settings};

    // Models
    pub use crate::background::BackgroundImage;
    pub use crate::material::Material;
    pub use crate::mesh::LoadError;
    pub use crate::model::Model;

    // Camera
    pub use crate::camera::Camera;
    pub use crate::projection::ProjectionMode;

    // Manipulation & animation
    pub use crate::animation::{Animation, Frame, Interpolation};
    pub use crate::transform::{Action, Axis, AxisMask, Space};

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec4::Vec4;

    // Rendering
    pub use crate::render::{FrameBuffer, ImageFit, ImageInterpolation, PixelSink};

    // Window & Input
    pub use crate::window::{FrameLimiter, Keycode, MouseButton, Window, WindowEvent};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::{scan_convert, DVertex, Edge, FrameBuffer, PixelSink, Point, Renderer};
}
