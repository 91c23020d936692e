//! Rendering: the CPU compositor and the frame type it produces.

pub(crate) mod cpu;
pub(crate) mod frame;
