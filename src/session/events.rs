use crate::foundation::core::Transform;

/// State change notifications delivered to the session observer, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// A new photo replaced the previous one.
    ImageReplaced { width: u32, height: u32 },
    /// The frame overlay was loaded or replaced.
    FrameChanged,
    /// The backing surface was reallocated.
    SurfaceResized { pixel_side: u32 },
    /// The live image transform changed.
    TransformChanged(Transform),
    /// A new surface frame is available through [`crate::EditorSession::frame`].
    Rendered { fingerprint: u64 },
}

pub(crate) type Observer = Box<dyn FnMut(&SessionEvent)>;
