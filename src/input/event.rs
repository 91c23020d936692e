use crate::foundation::core::{Point, Vec2};

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    /// Horizontal scroll amount.
    pub dx: f64,
    /// Vertical scroll amount (positive = down, which zooms out).
    pub dy: f64,
}

/// Raw input delivered by the host, in whatever coordinate space the receiver expects.
///
/// [`crate::EditorSession::handle_input`] takes client coordinates and maps them to surface pixels
/// before the [`crate::GestureInterpreter`] sees them. Touch variants carry every touch point that
/// is still down after the event, in a stable order.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary mouse button pressed over the surface.
    PointerDown { pos: Point },
    /// Mouse moved over the surface.
    PointerMove { pos: Point },
    /// Primary mouse button released.
    PointerUp,
    /// Mouse left the surface.
    PointerLeave,
    /// One wheel notch (or trackpad scroll) at `pos`.
    Wheel { pos: Point, delta: WheelDelta },
    /// A finger touched down; `touches` includes it.
    TouchStart { touches: Vec<Point> },
    /// One or more fingers moved.
    TouchMove { touches: Vec<Point> },
    /// A finger lifted; `touches` lists the ones still down.
    TouchEnd { touches: Vec<Point> },
    /// The platform aborted the touch sequence.
    TouchCancel,
}

impl InputEvent {
    /// Whether the host's default handling of this event scrolls or refreshes the page.
    pub fn affects_page(&self) -> bool {
        matches!(
            self,
            Self::Wheel { .. }
                | Self::TouchStart { .. }
                | Self::TouchMove { .. }
                | Self::TouchEnd { .. }
                | Self::TouchCancel
        )
    }

    /// Apply `f` to every point the event carries.
    pub fn map_points(self, f: impl Fn(Point) -> Point) -> Self {
        let map_all = |touches: Vec<Point>| -> Vec<Point> { touches.into_iter().map(&f).collect() };
        match self {
            Self::PointerDown { pos } => Self::PointerDown { pos: f(pos) },
            Self::PointerMove { pos } => Self::PointerMove { pos: f(pos) },
            Self::Wheel { pos, delta } => Self::Wheel { pos: f(pos), delta },
            Self::TouchStart { touches } => Self::TouchStart {
                touches: map_all(touches),
            },
            Self::TouchMove { touches } => Self::TouchMove {
                touches: map_all(touches),
            },
            Self::TouchEnd { touches } => Self::TouchEnd {
                touches: map_all(touches),
            },
            other @ (Self::PointerUp | Self::PointerLeave | Self::TouchCancel) => other,
        }
    }
}

/// A transform update requested by the interpreter. The session applies it through
/// [`crate::geometry`], clamping zoom scales first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    /// Translate the image by `delta` surface pixels.
    Pan { delta: Vec2 },
    /// Rescale to `scale` (before clamping) keeping the image point under `anchor` fixed.
    ZoomAt { anchor: Point, scale: f64 },
}

/// Result of feeding one event to the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputResponse {
    /// Transform update to apply, if any.
    pub op: Option<TransformOp>,
    /// Host should suppress default handling (page scroll, pull-to-refresh).
    pub prevent_default: bool,
}

impl InputResponse {
    pub(crate) fn ignored() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/event.rs"]
mod tests;
