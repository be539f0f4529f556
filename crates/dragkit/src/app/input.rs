use std::mem;

use winit::event::{ElementState, MouseButton, TouchPhase};

use super::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerDevice {
    Mouse,
    Touch(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One decoded pointer sample in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub device: PointerDevice,
    pub phase: PointerPhase,
    pub position: Vec2,
}

impl PointerSample {
    pub fn mouse(phase: PointerPhase, position: Vec2) -> Self {
        Self {
            device: PointerDevice::Mouse,
            phase,
            position,
        }
    }
}

/// Turns raw window input into per-tick pointer samples. Consecutive moves from the same
/// device collapse into the latest one, so a tick sees at most one move per device.
#[derive(Debug, Default)]
pub struct PointerCollector {
    cursor_position_px: Option<Vec2>,
    last_cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    active_touches: Vec<(u64, Vec2)>,
    pending: Vec<PointerSample>,
}

impl PointerCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        let position = Vec2 { x, y };
        self.cursor_position_px = Some(position);
        self.last_cursor_position_px = Some(position);
        if self.left_mouse_is_down {
            self.queue(PointerSample::mouse(PointerPhase::Move, position));
        }
    }

    pub fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }

        match state {
            ElementState::Pressed => {
                if self.left_mouse_is_down {
                    return;
                }
                let Some(position) = self.cursor_position_px else {
                    return;
                };
                self.left_mouse_is_down = true;
                self.queue(PointerSample::mouse(PointerPhase::Down, position));
            }
            ElementState::Released => {
                if !self.left_mouse_is_down {
                    return;
                }
                self.left_mouse_is_down = false;
                // Releasing outside the window still ends the drag where the cursor left.
                let position = self
                    .cursor_position_px
                    .or(self.last_cursor_position_px)
                    .unwrap_or_default();
                self.queue(PointerSample::mouse(PointerPhase::Up, position));
            }
        }
    }

    pub fn handle_touch(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) {
        let position = Vec2 { x, y };
        let device = PointerDevice::Touch(id);
        let phase = match phase {
            TouchPhase::Started => {
                self.active_touches.retain(|(existing, _)| *existing != id);
                self.active_touches.push((id, position));
                PointerPhase::Down
            }
            TouchPhase::Moved => {
                match self.active_touches.iter_mut().find(|(existing, _)| *existing == id) {
                    Some(touch) => touch.1 = position,
                    None => return,
                }
                PointerPhase::Move
            }
            TouchPhase::Ended => {
                self.active_touches.retain(|(existing, _)| *existing != id);
                PointerPhase::Up
            }
            TouchPhase::Cancelled => {
                self.active_touches.retain(|(existing, _)| *existing != id);
                PointerPhase::Cancel
            }
        };
        self.queue(PointerSample {
            device,
            phase,
            position,
        });
    }

    /// Window lost focus: every pressed pointer is cancelled.
    pub fn handle_focus_lost(&mut self) {
        if self.left_mouse_is_down {
            self.left_mouse_is_down = false;
            let position = self.last_cursor_position_px.unwrap_or_default();
            self.queue(PointerSample::mouse(PointerPhase::Cancel, position));
        }
        for (id, position) in mem::take(&mut self.active_touches) {
            self.queue(PointerSample {
                device: PointerDevice::Touch(id),
                phase: PointerPhase::Cancel,
                position,
            });
        }
    }

    pub fn drain_samples(&mut self) -> Vec<PointerSample> {
        mem::take(&mut self.pending)
    }

    fn queue(&mut self, sample: PointerSample) {
        if sample.phase == PointerPhase::Move {
            let previous = self
                .pending
                .iter_mut()
                .rev()
                .find(|pending| pending.device == sample.device);
            if let Some(previous) = previous {
                if previous.phase == PointerPhase::Move {
                    *previous = sample;
                    return;
                }
            }
        }
        self.pending.push(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phases(samples: &[PointerSample]) -> Vec<PointerPhase> {
        samples.iter().map(|sample| sample.phase).collect()
    }

    #[test]
    fn press_without_cursor_is_ignored() {
        let mut input = PointerCollector::new();
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);

        assert!(input.drain_samples().is_empty());
    }

    #[test]
    fn moves_are_only_reported_while_left_button_is_down() {
        let mut input = PointerCollector::new();
        input.set_cursor_position_px(10.0, 10.0);
        assert!(input.drain_samples().is_empty());

        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.set_cursor_position_px(20.0, 10.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);
        input.set_cursor_position_px(30.0, 10.0);

        let samples = input.drain_samples();
        assert_eq!(
            phases(&samples),
            vec![PointerPhase::Down, PointerPhase::Move, PointerPhase::Up]
        );
        assert_eq!(samples[2].position, Vec2 { x: 20.0, y: 10.0 });
    }

    #[test]
    fn consecutive_moves_collapse_to_latest() {
        let mut input = PointerCollector::new();
        input.set_cursor_position_px(0.0, 0.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.set_cursor_position_px(5.0, 0.0);
        input.set_cursor_position_px(9.0, 1.0);

        let samples = input.drain_samples();
        assert_eq!(phases(&samples), vec![PointerPhase::Down, PointerPhase::Move]);
        assert_eq!(samples[1].position, Vec2 { x: 9.0, y: 1.0 });
        assert!(input.drain_samples().is_empty());
    }

    #[test]
    fn held_button_does_not_repeat_down() {
        let mut input = PointerCollector::new();
        input.set_cursor_position_px(0.0, 0.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);

        assert_eq!(phases(&input.drain_samples()), vec![PointerPhase::Down]);
    }

    #[test]
    fn release_outside_window_uses_last_known_cursor() {
        let mut input = PointerCollector::new();
        input.set_cursor_position_px(40.0, 50.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.clear_cursor_position();
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);

        let samples = input.drain_samples();
        assert_eq!(samples.last().map(|s| s.position), Some(Vec2 { x: 40.0, y: 50.0 }));
    }

    #[test]
    fn touch_phases_map_per_finger() {
        let mut input = PointerCollector::new();
        input.handle_touch(7, TouchPhase::Started, 1.0, 1.0);
        input.handle_touch(7, TouchPhase::Moved, 2.0, 1.0);
        input.handle_touch(9, TouchPhase::Moved, 5.0, 5.0);
        input.handle_touch(7, TouchPhase::Ended, 3.0, 1.0);

        let samples = input.drain_samples();
        assert_eq!(
            phases(&samples),
            vec![PointerPhase::Down, PointerPhase::Move, PointerPhase::Up]
        );
        assert!(samples
            .iter()
            .all(|sample| sample.device == PointerDevice::Touch(7)));
    }

    #[test]
    fn focus_loss_cancels_pressed_pointers() {
        let mut input = PointerCollector::new();
        input.set_cursor_position_px(3.0, 4.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_touch(1, TouchPhase::Started, 8.0, 8.0);
        input.drain_samples();

        input.handle_focus_lost();
        let samples = input.drain_samples();
        assert_eq!(
            samples,
            vec![
                PointerSample::mouse(PointerPhase::Cancel, Vec2 { x: 3.0, y: 4.0 }),
                PointerSample {
                    device: PointerDevice::Touch(1),
                    phase: PointerPhase::Cancel,
                    position: Vec2 { x: 8.0, y: 8.0 },
                },
            ]
        );

        input.handle_mouse_input(MouseButton::Left, ElementState::Released);
        assert!(input.drain_samples().is_empty());
    }
}
