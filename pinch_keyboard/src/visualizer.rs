//! Display window using `minifb`.
//!
//! The window shows each composited frame, reports the quit key, and in
//! simulation mode turns the mouse into [`SimPointer`] updates for the
//! simulated hand detector.

use std::sync::mpsc::Sender;
use std::time::Duration;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::{KeyboardError, Result};
use crate::frame::Frame;
use crate::tracking::SimPointer;

pub const WINDOW_TITLE: &str = "Virtual Keyboard";

pub struct Visualizer {
    window: Window,
    sim_tx: Sender<SimPointer>,
    /// Size of the last frame presented, used to map mouse → frame pixels.
    frame_size: (usize, usize),
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Sender<SimPointer>) -> Result<Self> {
        let mut window = Window::new(
            WINDOW_TITLE,
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| KeyboardError::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer { window, sim_tx, frame_size: (width, height) })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse.  Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        if self.window.is_key_pressed(Key::Q, KeyRepeat::No) {
            return false;
        }

        let (win_w, win_h) = self.window.get_size();
        let position = self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(mx, my)| scale_to_frame((mx, my), (win_w, win_h), self.frame_size));
        let pinched = self.window.get_mouse_down(MouseButton::Left)
                   || self.window.is_key_down(Key::Space);

        // Nobody listens in MediaPipe mode; that's fine.
        let _ = self.sim_tx.send(SimPointer { position, pinched });
        true
    }

    /// Show one frame.
    pub fn present(&mut self, frame: &Frame) -> Result<()> {
        self.frame_size = (frame.width(), frame.height());
        self.window
            .update_with_buffer(frame.pixels(), frame.width(), frame.height())
            .map_err(|e| KeyboardError::Window(e.to_string()))
    }
}

/// Map a window-space mouse position to frame pixels when the frame is
/// shown scaled.
fn scale_to_frame(pos: (f32, f32), window: (usize, usize), frame: (usize, usize)) -> (f32, f32) {
    let sx = if window.0 == 0 { 1.0 } else { frame.0 as f32 / window.0 as f32 };
    let sy = if window.1 == 0 { 1.0 } else { frame.1 as f32 / window.1 as f32 };
    (pos.0 * sx, pos.1 * sy)
}
