//! Raw keyboard and cursor state collected from winit window events.

use std::collections::HashSet;

use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Keys currently held down and the last known cursor position.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    cursor: PhysicalPosition<f64>,
}

impl InputState {
    /// Feeds a window event into the state. Events that carry no input are ignored.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press(key),
                        ElementState::Released => self.release(key),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.cursor = *position,
            // Keys held while the window loses focus never get a release event.
            WindowEvent::Focused(false) => self.keys_down.clear(),
            _ => (),
        }
    }

    pub fn press(&mut self, key: KeyCode) {
        self.keys_down.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn key_released(&self, key: KeyCode) -> bool {
        !self.key_pressed(key)
    }

    pub fn cursor_position(&self) -> PhysicalPosition<f64> {
        self.cursor
    }

    pub(crate) fn set_cursor(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_toggle_key_state() {
        let mut input = InputState::default();
        assert!(input.key_released(KeyCode::KeyA));

        input.press(KeyCode::KeyA);
        input.press(KeyCode::KeyA);
        assert!(input.key_pressed(KeyCode::KeyA));
        assert!(!input.key_pressed(KeyCode::KeyS));

        input.release(KeyCode::KeyA);
        assert!(input.key_released(KeyCode::KeyA));
    }

    #[test]
    fn losing_focus_releases_everything() {
        let mut input = InputState::default();
        input.press(KeyCode::KeyW);
        input.press(KeyCode::KeyD);
        input.handle_window_event(&WindowEvent::Focused(false));
        assert!(input.key_released(KeyCode::KeyW));
        assert!(input.key_released(KeyCode::KeyD));
    }
}
