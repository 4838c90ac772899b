use std::collections::HashMap;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

use super::controller::{FrameInputs, InputSource};
use super::window::ViewportSize;
use crate::orbit::OrbitInput;

/// Pixel-precise scroll distance treated as one wheel line
const PIXELS_PER_LINE: f32 = 40.0;

/// Adapter that turns winit window events into buffered orbit input
#[derive(Debug, Clone, Default)]
pub struct WinitController {
    dragging: bool,
    cursor: Option<Vec2>,
    touches: HashMap<u64, Vec2>,
    pending: FrameInputs,
}

impl WinitController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a winit WindowEvent and update the buffered input
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => self.resized(ViewportSize::from(*size)),
            WindowEvent::MouseInput { state, button, .. } => self.mouse_button(*button, *state),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32))
            }
            WindowEvent::CursorLeft { .. } => self.cursor = None,
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.wheel(lines);
            }
            WindowEvent::Touch(touch) => self.touch(
                touch.id,
                touch.phase,
                Vec2::new(touch.location.x as f32, touch.location.y as f32),
            ),
            _ => {}
        }
    }

    pub fn resized(&mut self, size: ViewportSize) {
        self.pending.resize = Some(size);
    }

    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state == ElementState::Pressed;
        }
    }

    pub fn cursor_moved(&mut self, position: Vec2) {
        if let Some(previous) = self.cursor {
            if self.dragging {
                self.pending.orbit.rotate += position - previous;
            }
        }
        self.cursor = Some(position);
    }

    /// Wheel lines; scrolling up moves the camera closer
    pub fn wheel(&mut self, lines: f32) {
        self.pending.orbit.zoom += lines;
    }

    /// One finger rotates, two fingers pinch-zoom
    pub fn touch(&mut self, id: u64, phase: TouchPhase, position: Vec2) {
        match phase {
            TouchPhase::Started => {
                self.touches.insert(id, position);
            }
            TouchPhase::Moved => {
                let Some(previous) = self.touches.get(&id).copied() else {
                    return;
                };
                match self.touches.len() {
                    1 => self.pending.orbit.rotate += position - previous,
                    2 => {
                        let other = self
                            .touches
                            .iter()
                            .find(|(touch_id, _)| **touch_id != id)
                            .map(|(_, p)| *p);
                        if let Some(other) = other {
                            let before = previous.distance(other);
                            let after = position.distance(other);
                            if before > 0.0 {
                                self.pending.orbit.zoom += OrbitInput::pinch_steps(after / before);
                            }
                        }
                    }
                    _ => {}
                }
                self.touches.insert(id, position);
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.remove(&id);
            }
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

impl InputSource for WinitController {
    fn drain(&mut self) -> FrameInputs {
        std::mem::take(&mut self.pending)
    }
}
