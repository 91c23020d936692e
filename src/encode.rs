//! Export: PNG encoding of rendered surfaces and the sinks that receive the bytes.

pub(crate) mod png;
pub(crate) mod sink;
