//! Editor session: owns the mutable editor state and wires layout, gestures, geometry and the
//! compositor together.

pub(crate) mod editor;
pub(crate) mod events;
