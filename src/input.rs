use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};

/// Pixel scroll is converted to wheel notches at this rate.
const PIXELS_PER_LINE: f32 = 40.0;

/// Pointer state for the viewport, accumulated between frames.
#[derive(Default)]
pub struct Input {
    cursor_pos: Option<Vec2>,
    left_pressed: bool,
    right_pressed: bool,
    rotate_delta: Vec2,
    pan_delta: Vec2,
    wheel: f32,
    escape_pressed: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, pressed } => {
                if pressed && key == Key::Named(NamedKey::Escape) {
                    self.escape_pressed = true;
                }
            }
            InputEvent::Wheel { delta } => {
                self.wheel += delta;
            }
            InputEvent::MouseButton { button, pressed } => match button {
                MouseButton::Left => self.left_pressed = pressed,
                MouseButton::Right => self.right_pressed = pressed,
                _ => {}
            },
            InputEvent::CursorPos { x, y } => {
                let pos = Vec2::new(x, y);
                if let Some(prev) = self.cursor_pos {
                    let delta = pos - prev;
                    if self.left_pressed {
                        self.rotate_delta += delta;
                    } else if self.right_pressed {
                        self.pan_delta += delta;
                    }
                }
                self.cursor_pos = Some(pos);
            }
            InputEvent::CursorLeft => {
                self.cursor_pos = None;
            }
            InputEvent::Other => {}
        }
    }

    /// Drops held buttons, e.g. when a release was swallowed by the UI.
    pub fn release_buttons(&mut self) {
        self.left_pressed = false;
        self.right_pressed = false;
    }

    pub fn take_rotate_delta(&mut self) -> Option<Vec2> {
        take_nonzero(&mut self.rotate_delta)
    }

    pub fn take_pan_delta(&mut self) -> Option<Vec2> {
        take_nonzero(&mut self.pan_delta)
    }

    pub fn consume_wheel_delta(&mut self) -> Option<f32> {
        if self.wheel.abs() > 0.0 {
            let d = self.wheel;
            self.wheel = 0.0;
            Some(d)
        } else {
            None
        }
    }

    pub fn take_escape_pressed(&mut self) -> bool {
        std::mem::take(&mut self.escape_pressed)
    }

    pub fn clear_frame(&mut self) {
        self.rotate_delta = Vec2::ZERO;
        self.pan_delta = Vec2::ZERO;
        self.wheel = 0.0;
        self.escape_pressed = false;
    }
}

fn take_nonzero(value: &mut Vec2) -> Option<Vec2> {
    let taken = std::mem::take(value);
    (taken != Vec2::ZERO).then_some(taken)
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, pressed: bool },
    Wheel { delta: f32 },
    MouseButton { button: MouseButton, pressed: bool },
    CursorPos { x: f32, y: f32 },
    CursorLeft,
    Other,
}

impl InputEvent {
    pub fn from_window_event(ev: &WindowEvent) -> Self {
        match ev {
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                InputEvent::Wheel { delta: d }
            }
            WindowEvent::CursorMoved { position, .. } => {
                InputEvent::CursorPos { x: position.x as f32, y: position.y as f32 }
            }
            WindowEvent::CursorLeft { .. } => InputEvent::CursorLeft,
            WindowEvent::MouseInput { state, button, .. } => {
                InputEvent::MouseButton { button: *button, pressed: *state == ElementState::Pressed }
            }
            WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
                key: event.logical_key.clone(),
                pressed: event.state == ElementState::Pressed,
            },
            _ => InputEvent::Other,
        }
    }

    pub fn is_button_release(&self) -> bool {
        matches!(self, InputEvent::MouseButton { pressed: false, .. })
    }
}

#[cfg(test)]
impl Input {
    fn is_dragging(&self) -> bool {
        self.left_pressed || self.right_pressed
    }

    fn cursor_position(&self) -> Option<Vec2> {
        self.cursor_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut Input, button: MouseButton, pressed: bool) {
        input.push(InputEvent::MouseButton { button, pressed });
    }

    #[test]
    fn left_drag_accumulates_rotation() {
        let mut input = Input::new();
        input.push(InputEvent::CursorPos { x: 10.0, y: 10.0 });
        press(&mut input, MouseButton::Left, true);
        input.push(InputEvent::CursorPos { x: 15.0, y: 8.0 });
        input.push(InputEvent::CursorPos { x: 20.0, y: 8.0 });
        assert_eq!(input.take_rotate_delta(), Some(Vec2::new(10.0, -2.0)));
        assert_eq!(input.take_rotate_delta(), None);
        assert_eq!(input.take_pan_delta(), None);
    }

    #[test]
    fn right_drag_pans_and_release_stops() {
        let mut input = Input::new();
        input.push(InputEvent::CursorPos { x: 0.0, y: 0.0 });
        press(&mut input, MouseButton::Right, true);
        input.push(InputEvent::CursorPos { x: 4.0, y: 3.0 });
        press(&mut input, MouseButton::Right, false);
        input.push(InputEvent::CursorPos { x: 40.0, y: 30.0 });
        assert_eq!(input.take_pan_delta(), Some(Vec2::new(4.0, 3.0)));
        assert!(!input.is_dragging());
    }

    #[test]
    fn hover_without_buttons_moves_nothing() {
        let mut input = Input::new();
        input.push(InputEvent::CursorPos { x: 0.0, y: 0.0 });
        input.push(InputEvent::CursorPos { x: 50.0, y: 50.0 });
        assert_eq!(input.take_rotate_delta(), None);
        assert_eq!(input.cursor_position(), Some(Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn wheel_and_escape_are_consumed_once() {
        let mut input = Input::new();
        input.push(InputEvent::Wheel { delta: 1.0 });
        input.push(InputEvent::Wheel { delta: 0.5 });
        input.push(InputEvent::Key { key: Key::Named(NamedKey::Escape), pressed: true });
        assert_eq!(input.consume_wheel_delta(), Some(1.5));
        assert_eq!(input.consume_wheel_delta(), None);
        assert!(input.take_escape_pressed());
        assert!(!input.take_escape_pressed());
    }
}
