use std::time::Instant;

use log::{info, warn};
use polyview::prelude::*;
use polyview::window::{IDLE_FPS, WINDOW_HEIGHT, WINDOW_WIDTH};

const SPEED_STEP_PERCENT: f64 = 25.0;
const PAN_KEY_PIXELS: f64 = 20.0;

const HELP: &str = "\
polyview [model.obj] [background-image]

  mouse   left drag: manipulate selected model, left click: pick
          right drag: orbit camera, middle drag: pan, wheel: zoom
  1 2 3   wireframe / filled / filled + wireframe
  T S R   translate / scale / rotate     X Y Z  toggle axis
  O W V   object / world / view space    P      toggle projection
  C       back-face culling              B      bounding boxes
  Tab     next model (Shift: previous)   Back   clear selection
  F       frame camera on selection      G      background image
  F5 F6   start / stop recording         Space  play / stop
  + - 0   faster / slower / normal speed I      linear / bezier
  L       bezier translation only        Home End PgUp PgDn  keyframes";

/// Mouse and timing state owned by the host loop.
struct Input {
    dragging: Option<MouseButton>,
    last_keyframe: Instant,
}

fn main() -> Result<(), String> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let model_path = args.next();
    let background_path = args.next();
    if model_path.as_deref().is_some_and(|a| a == "-h" || a == "--help") {
        println!("{HELP}");
        return Ok(());
    }

    let mut window = Window::new("polyview", WINDOW_WIDTH, WINDOW_HEIGHT)?;
    let mut frame_buffer = FrameBuffer::new(window.width(), window.height());
    let mut scene = Scene::new(window.width(), window.height());

    match model_path {
        Some(path) => scene.load_model(&path).map_err(|e| format!("{path}: {e}"))?,
        None => scene.add_model(Model::cube("cube")),
    }
    if let Some(model) = scene.selected_model() {
        window.set_title(&format!("polyview - {}", model.name()))?;
    }
    if let Some(path) = background_path {
        if let Err(e) = scene.load_background(&path) {
            warn!("Ignoring background {path}: {e}");
        }
    }

    let mut limiter = FrameLimiter::new(&window, IDLE_FPS);
    let mut input = Input {
        dragging: None,
        last_keyframe: Instant::now(),
    };
    info!("Press -h for key bindings");

    'running: loop {
        for event in window.poll_events() {
            match event {
                WindowEvent::Quit
                | WindowEvent::KeyDown {
                    key: Keycode::Escape,
                    ..
                } => break 'running,
                WindowEvent::Resize(width, height) => {
                    window.resize(width, height)?;
                    frame_buffer.resize(width, height);
                    scene.resize(width, height);
                }
                WindowEvent::KeyDown { key, shift } => handle_key(&mut scene, &mut input, key, shift),
                WindowEvent::MouseDown { button, x, y } => {
                    if button == MouseButton::Left && !scene.is_playing() {
                        scene.pick_model(x, y);
                    }
                    input.dragging = Some(button);
                }
                WindowEvent::MouseUp { button, .. } => {
                    if button == MouseButton::Left && input.dragging == Some(button) {
                        let elapsed = input.last_keyframe.elapsed().as_secs_f64();
                        scene.end_drag(elapsed);
                        if scene.is_recording() {
                            input.last_keyframe = Instant::now();
                        }
                    }
                    input.dragging = None;
                }
                WindowEvent::MouseMotion { dx, dy, .. } => {
                    handle_drag(&mut scene, input.dragging, f64::from(dx), f64::from(dy));
                }
                WindowEvent::MouseWheel(steps) => {
                    let zoom = scene.settings().sensitivity.zoom;
                    scene.camera_mut().zoom_camera(f64::from(steps) * zoom);
                }
                _ => {}
            }
        }

        if scene.is_playing() {
            limiter.set_fps(scene.settings().frames_per_second);
            if !scene.play_animation_step() {
                limiter.set_fps(IDLE_FPS);
            }
        }

        scene.draw(&mut frame_buffer);
        window.present(frame_buffer.as_bytes())?;
        limiter.wait_and_get_delta(&window);
    }

    Ok(())
}

fn handle_drag(scene: &mut Scene, button: Option<MouseButton>, dx: f64, dy: f64) {
    let sensitivity = scene.settings().sensitivity;
    match button {
        // Manipulation deltas are previous minus current x
        Some(MouseButton::Left) => scene.drag(-dx),
        Some(MouseButton::Right) => scene
            .camera_mut()
            .rotate_camera(dx * sensitivity.camera_orbit, dy * sensitivity.camera_orbit),
        Some(MouseButton::Middle) => scene
            .camera_mut()
            .pan_camera(-dx * sensitivity.camera_pan, -dy * sensitivity.camera_pan),
        _ => {}
    }
}

fn handle_key(scene: &mut Scene, input: &mut Input, key: Keycode, shift: bool) {
    let settings = scene.settings_mut();
    match key {
        Keycode::Num1 => settings.render_mode = RenderMode::Wireframe,
        Keycode::Num2 => settings.render_mode = RenderMode::Filled,
        Keycode::Num3 => settings.render_mode = RenderMode::FilledWireframe,
        Keycode::T => settings.action = Action::Translate,
        Keycode::S => settings.action = Action::Scale,
        Keycode::R => settings.action = Action::Rotate,
        Keycode::X => settings.axes.toggle(Axis::X),
        Keycode::Y => settings.axes.toggle(Axis::Y),
        Keycode::Z => settings.axes.toggle(Axis::Z),
        Keycode::O => settings.space = Space::Object,
        Keycode::W => settings.space = Space::World,
        Keycode::V => settings.space = Space::View,
        Keycode::C => settings.backface_culling = !settings.backface_culling,
        Keycode::B => settings.bounding_box = settings.bounding_box.next(),
        Keycode::G => settings.background.image_enabled = !settings.background.image_enabled,
        Keycode::L => settings.only_translation = !settings.only_translation,
        Keycode::I => {
            settings.interpolation = match settings.interpolation {
                Interpolation::Linear => Interpolation::Bezier,
                Interpolation::Bezier => Interpolation::Linear,
            };
            info!("Interpolation: {:?}", settings.interpolation);
        }
        Keycode::P => {
            let camera = scene.camera_mut();
            let mode = if camera.is_perspective() {
                ProjectionMode::Orthographic
            } else {
                ProjectionMode::Perspective
            };
            camera.switch_to_projection(mode);
        }
        Keycode::Tab if shift => scene.select_previous_model(),
        Keycode::Tab => scene.select_next_model(),
        Keycode::Backspace => scene.clear_selection(),
        Keycode::F => {
            if let Some(index) = scene.selected_index() {
                scene.frame_camera_on_model(index);
            }
        }
        Keycode::F5 => {
            scene.start_recording();
            input.last_keyframe = Instant::now();
        }
        Keycode::F6 => scene.stop_recording(),
        Keycode::Space => {
            if scene.is_playing() {
                scene.stop_playback();
            } else {
                scene.start_playback();
            }
        }
        Keycode::Equals | Keycode::KpPlus => scene.increase_playback_speed(SPEED_STEP_PERCENT),
        Keycode::Minus | Keycode::KpMinus => scene.decrease_playback_speed(SPEED_STEP_PERCENT),
        Keycode::Num0 => scene.normal_playback_speed(),
        Keycode::Home => scene.animation_to_first_keyframe(),
        Keycode::End => scene.animation_to_last_keyframe(),
        Keycode::PageUp => scene.animation_to_next_keyframe(),
        Keycode::PageDown => scene.animation_to_previous_keyframe(),
        Keycode::Left | Keycode::Right | Keycode::Up | Keycode::Down => {
            let step = PAN_KEY_PIXELS * scene.settings().sensitivity.camera_pan;
            let (dx, dy) = match key {
                Keycode::Left => (-step, 0.0),
                Keycode::Right => (step, 0.0),
                Keycode::Up => (0.0, step),
                _ => (0.0, -step),
            };
            scene.camera_mut().pan_camera(dx, dy);
        }
        _ => return,
    }
    log::debug!(
        "Action {:?} on {} in {:?} space, mode {:?}",
        scene.settings().action,
        scene.settings().axes,
        scene.settings().space,
        scene.settings().render_mode
    );
}
