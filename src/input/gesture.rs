use crate::foundation::core::{Point, Transform};
use crate::input::event::{InputEvent, InputResponse, TransformOp, WheelDelta};

/// Two touch points closer than this cannot define a pinch ratio.
const MIN_PINCH_DISTANCE: f64 = 1e-6;

/// Gesture being tracked between its start and end events.
///
/// Nothing here outlives one interaction: every end event returns the state to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Single pointer or finger dragging the image.
    Dragging {
        /// Surface position of the previous event, used to compute the next pan delta.
        last: Point,
    },
    /// Two fingers zooming the image.
    Pinching {
        /// Finger distance when the pinch began.
        start_distance: f64,
        /// Image scale when the pinch began.
        start_scale: f64,
        /// Finger midpoint when the pinch began.
        start_midpoint: Point,
    },
}

/// Turns pointer, wheel and touch sequences into [`TransformOp`]s.
///
/// Mouse and touch input share one state machine. The interpreter reads the current transform to
/// derive zoom targets but never writes it; callers apply the returned op.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    state: GestureState,
    wheel_zoom_step: f64,
}

impl GestureInterpreter {
    pub fn new(wheel_zoom_step: f64) -> Self {
        Self {
            state: GestureState::Idle,
            wheel_zoom_step,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Whether a drag or pinch is in progress (hosts show a "grabbing" cursor).
    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Drop any in-flight gesture.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Feed one event in surface coordinates.
    ///
    /// `current` is the live transform, or `None` when no image is loaded; without an image every
    /// event is ignored and nothing asks the host to suppress default handling.
    pub fn handle(&mut self, event: &InputEvent, current: Option<Transform>) -> InputResponse {
        let Some(current) = current else {
            self.reset();
            return InputResponse::ignored();
        };

        let op = match event {
            InputEvent::PointerDown { pos } => {
                self.state = GestureState::Dragging { last: *pos };
                None
            }
            InputEvent::PointerMove { pos } => self.drag_to(*pos),
            InputEvent::PointerUp | InputEvent::PointerLeave => {
                if matches!(self.state, GestureState::Dragging { .. }) {
                    self.state = GestureState::Idle;
                }
                None
            }
            InputEvent::Wheel { pos, delta } => self.wheel(*pos, *delta, current),
            InputEvent::TouchStart { touches } => {
                match touches.as_slice() {
                    [] => {}
                    [only] => {
                        if !matches!(self.state, GestureState::Pinching { .. }) {
                            self.state = GestureState::Dragging { last: *only };
                        }
                    }
                    [a, b, ..] => self.begin_pinch(*a, *b, current),
                }
                None
            }
            InputEvent::TouchMove { touches } => self.touch_move(touches, current),
            InputEvent::TouchEnd { touches } => {
                self.touch_end(touches);
                None
            }
            InputEvent::TouchCancel => {
                self.state = GestureState::Idle;
                None
            }
        };

        InputResponse {
            op,
            prevent_default: event.affects_page(),
        }
    }

    fn drag_to(&mut self, pos: Point) -> Option<TransformOp> {
        let GestureState::Dragging { last } = self.state else {
            return None;
        };
        self.state = GestureState::Dragging { last: pos };
        Some(TransformOp::Pan { delta: pos - last })
    }

    fn wheel(&self, pos: Point, delta: WheelDelta, current: Transform) -> Option<TransformOp> {
        let scale = if delta.dy < 0.0 {
            current.scale * self.wheel_zoom_step
        } else if delta.dy > 0.0 {
            current.scale / self.wheel_zoom_step
        } else {
            return None;
        };
        Some(TransformOp::ZoomAt { anchor: pos, scale })
    }

    fn begin_pinch(&mut self, a: Point, b: Point, current: Transform) {
        let start_distance = a.distance(b);
        if start_distance < MIN_PINCH_DISTANCE {
            return;
        }
        self.state = GestureState::Pinching {
            start_distance,
            start_scale: current.scale,
            start_midpoint: a.midpoint(b),
        };
    }

    fn touch_move(&mut self, touches: &[Point], current: Transform) -> Option<TransformOp> {
        match (self.state, touches) {
            (
                GestureState::Pinching {
                    start_distance,
                    start_scale,
                    ..
                },
                [a, b, ..],
            ) => {
                let ratio = a.distance(*b) / start_distance;
                // The anchor follows the fingers rather than staying at the start midpoint.
                Some(TransformOp::ZoomAt {
                    anchor: a.midpoint(*b),
                    scale: start_scale * ratio,
                })
            }
            (GestureState::Pinching { .. }, _) => {
                self.state = GestureState::Idle;
                None
            }
            (_, [a, b, ..]) => {
                self.begin_pinch(*a, *b, current);
                None
            }
            (GestureState::Dragging { .. }, [only]) => self.drag_to(*only),
            _ => None,
        }
    }

    fn touch_end(&mut self, remaining: &[Point]) {
        match (self.state, remaining) {
            (GestureState::Pinching { .. }, [_, _, ..]) => {}
            (GestureState::Dragging { .. }, [first, ..]) => {
                self.state = GestureState::Dragging { last: *first };
            }
            _ => self.state = GestureState::Idle,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/gesture.rs"]
mod tests;
