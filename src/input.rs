//! Input model: raw pointer/wheel/touch events and the gesture state machine that turns them into
//! transform operations.

pub(crate) mod event;
pub(crate) mod gesture;
