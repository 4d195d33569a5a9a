//! The window side of the frame loop: framebuffer size, frame timing and input.
//!
//! A [`Surface`] wraps the winit window (if any) and answers the questions the
//! frame loop asks every iteration: how big is the framebuffer, did it change
//! size since the last poll, how much time passed, which keys are held.

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{dpi::PhysicalPosition, event::WindowEvent, keyboard::KeyCode, window::Window};

use crate::input::InputState;

#[derive(Debug)]
pub struct Surface {
    window: Option<Arc<Window>>,
    width: u32,
    height: u32,
    resized: bool,
    input: InputState,
    started: Instant,
    last_frame: Instant,
    delta: Duration,
    close_requested: bool,
}

impl Surface {
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();
        let mut surface = Self::headless(size.width, size.height);
        surface.window = Some(window);
        surface
    }

    /// A surface without a window, e.g. for offscreen rendering.
    pub fn headless(width: u32, height: u32) -> Self {
        let now = Instant::now();
        Self {
            window: None,
            width,
            height,
            resized: false,
            input: InputState::default(),
            started: now,
            last_frame: now,
            delta: Duration::ZERO,
            close_requested: false,
        }
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::CloseRequested => self.close_requested = true,
            _ => self.input.handle_window_event(event),
        }
    }

    /// Records a new framebuffer size. Zero-sized (minimised) framebuffers are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.resized = true;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Returns whether the size changed since the previous call, and resets the flag.
    pub fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }

    /// Starts a new frame and returns the time elapsed since the previous one.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.delta
    }

    /// Time between the two most recent [`Surface::tick`] calls.
    pub fn delta_time(&self) -> Duration {
        self.delta
    }

    /// Time since the surface was created.
    pub fn time(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn fps(&self) -> f32 {
        let dt = self.delta.as_secs_f32();
        if dt > 0.0 { 1.0 / dt } else { 0.0 }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.input.key_pressed(key)
    }

    pub fn key_released(&self, key: KeyCode) -> bool {
        self.input.key_released(key)
    }

    pub fn cursor_position(&self) -> PhysicalPosition<f64> {
        self.input.cursor_position()
    }

    /// Warps the cursor. Platforms that refuse the warp only log a warning.
    pub fn set_cursor_position(&mut self, position: PhysicalPosition<f64>) {
        if let Some(window) = &self.window {
            if let Err(e) = window.set_cursor_position(position) {
                log::warn!("Could not move the cursor: {}", e);
                return;
            }
        }
        self.input.set_cursor(position);
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub(crate) fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalSize;

    use super::*;

    #[test]
    fn resize_is_reported_once() {
        let mut surface = Surface::headless(800, 600);
        assert!(!surface.take_resized());

        surface.handle_window_event(&WindowEvent::Resized(PhysicalSize::new(1024, 512)));
        assert_eq!((surface.width(), surface.height()), (1024, 512));
        assert_eq!(surface.aspect_ratio(), 2.0);
        assert!(surface.take_resized());
        assert!(!surface.take_resized());
    }

    #[test]
    fn minimising_or_same_size_is_not_a_resize() {
        let mut surface = Surface::headless(800, 600);
        surface.resize(0, 0);
        surface.resize(800, 600);
        assert!(!surface.take_resized());
        assert_eq!((surface.width(), surface.height()), (800, 600));
    }

    #[test]
    fn tick_measures_elapsed_time() {
        let mut surface = Surface::headless(1, 1);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let dt = surface.tick();
        assert!(dt >= Duration::from_millis(5));
        assert_eq!(surface.delta_time(), dt);
        assert!(surface.fps() > 0.0);
        assert!(surface.time() >= dt);
    }

    #[test]
    fn headless_cursor_warp_updates_state() {
        let mut surface = Surface::headless(1, 1);
        surface.set_cursor_position(PhysicalPosition::new(12.0, 34.0));
        assert_eq!(surface.cursor_position(), PhysicalPosition::new(12.0, 34.0));
    }

    #[test]
    fn close_request_is_sticky() {
        let mut surface = Surface::headless(1, 1);
        assert!(!surface.close_requested());
        surface.handle_window_event(&WindowEvent::CloseRequested);
        assert!(surface.close_requested());
    }
}
