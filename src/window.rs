//! SDL2 window that presents a [`FrameBuffer`](crate::render::FrameBuffer)
//! and translates SDL events into viewer input.
//!
//! The frame buffer's row 0 is the bottom of the image, so presentation flips
//! it vertically and mouse positions are reported in the same bottom-up
//! coordinates.

use std::time::Duration;

use sdl2::event::{Event, WindowEvent as SdlWindowEvent};
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::WindowContext;
use sdl2::{EventPump, TimerSubsystem};

pub use sdl2::keyboard::{Keycode, Mod};
pub use sdl2::mouse::MouseButton;

pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;
/// Frame rate while nothing is animating.
pub const IDLE_FPS: u32 = 60;

const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Quit,
    /// New drawable size in pixels.
    Resize(u32, u32),
    KeyDown { key: Keycode, shift: bool },
    MouseDown { button: MouseButton, x: i32, y: i32 },
    MouseUp { button: MouseButton, x: i32, y: i32 },
    /// Position plus the motion since the previous event, y pointing up.
    MouseMotion { x: i32, y: i32, dx: i32, dy: i32 },
    MouseWheel(i32),
}

/// Sleeps out the remainder of each frame to hold a target rate.
pub struct FrameLimiter {
    last_tick_ms: u64,
    frame_budget_ms: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window, fps: u32) -> Self {
        Self {
            last_tick_ms: window.timer().ticks64(),
            frame_budget_ms: Self::budget(fps),
        }
    }

    fn budget(fps: u32) -> u64 {
        1000 / u64::from(fps.max(1))
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.frame_budget_ms = Self::budget(fps);
    }

    /// Blocks until the frame budget is spent. Returns the milliseconds since
    /// the previous call.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let elapsed = window.timer().ticks64().saturating_sub(self.last_tick_ms);
        if elapsed < self.frame_budget_ms {
            std::thread::sleep(Duration::from_millis(self.frame_budget_ms - elapsed));
        }

        let now = window.timer().ticks64();
        let delta = now.saturating_sub(self.last_tick_ms);
        self.last_tick_ms = now;
        delta
    }
}

pub struct Window {
    // Fields drop in declaration order: texture before its creator
    texture: Texture<'static>,
    texture_creator: Box<TextureCreator<WindowContext>>,
    canvas: Canvas<sdl2::video::Window>,
    events: EventPump,
    timer: TimerSubsystem,
    width: u32,
    height: u32,
}

/// Creates a streaming ARGB8888 texture whose lifetime is tied to the boxed
/// creator instead of a borrow.
///
/// # Safety
/// The returned texture must be dropped before `creator`, and the box must not
/// be replaced while the texture lives.
unsafe fn streaming_texture(
    creator: &TextureCreator<WindowContext>,
    width: u32,
    height: u32,
) -> Result<Texture<'static>, String> {
    let creator: &'static TextureCreator<WindowContext> = &*(creator as *const _);
    creator
        .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
        .map_err(|e| e.to_string())
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl = sdl2::init()?;
        let video = sdl.video()?;
        let timer = sdl.timer()?;

        let canvas = video
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?
            .into_canvas()
            .build()
            .map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let events = sdl.event_pump()?;

        // SAFETY: the creator is boxed, owned by the same struct, and
        // declared after `texture`.
        let texture = unsafe { streaming_texture(&texture_creator, width, height)? };

        Ok(Self {
            texture,
            texture_creator,
            canvas,
            events,
            timer,
            width,
            height,
        })
    }

    /// Drains the SDL queue. Window-space mouse coordinates are converted to
    /// bottom-up frame buffer coordinates.
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        let bottom = self.height as i32 - 1;
        self.events
            .poll_iter()
            .filter_map(|event| match event {
                Event::Quit { .. } => Some(WindowEvent::Quit),
                Event::Window {
                    win_event: SdlWindowEvent::Resized(w, h),
                    ..
                } => Some(WindowEvent::Resize(w.max(1) as u32, h.max(1) as u32)),
                Event::KeyDown {
                    keycode: Some(key),
                    keymod,
                    ..
                } => Some(WindowEvent::KeyDown {
                    key,
                    shift: keymod.intersects(Mod::LSHIFTMOD | Mod::RSHIFTMOD),
                }),
                Event::MouseButtonDown { mouse_btn, x, y, .. } => Some(WindowEvent::MouseDown {
                    button: mouse_btn,
                    x,
                    y: bottom - y,
                }),
                Event::MouseButtonUp { mouse_btn, x, y, .. } => Some(WindowEvent::MouseUp {
                    button: mouse_btn,
                    x,
                    y: bottom - y,
                }),
                Event::MouseMotion {
                    x, y, xrel, yrel, ..
                } => Some(WindowEvent::MouseMotion {
                    x,
                    y: bottom - y,
                    dx: xrel,
                    dy: -yrel,
                }),
                Event::MouseWheel { y, .. } => Some(WindowEvent::MouseWheel(y)),
                _ => None,
            })
            .collect()
    }

    /// Uploads an ARGB8888 buffer (row 0 at the bottom) and shows it.
    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        let pitch = self.width as usize * BYTES_PER_PIXEL;
        self.texture
            .update(None, buffer, pitch)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas
            .copy_ex(&self.texture, None, None, 0.0, None, false, true)?;
        self.canvas.present();
        Ok(())
    }

    /// Recreates the streaming texture for a new drawable size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        // SAFETY: as in `Window::new`; the old texture is dropped on assignment
        // while the creator stays in place.
        self.texture = unsafe { streaming_texture(&self.texture_creator, width, height)? };
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), String> {
        self.canvas
            .window_mut()
            .set_title(title)
            .map_err(|e| e.to_string())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &TimerSubsystem {
        &self.timer
    }
}
