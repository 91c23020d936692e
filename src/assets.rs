//! Asset intake: user-selected photos, the frame overlay, and load ordering.

pub(crate) mod decode;
pub(crate) mod frame;
pub(crate) mod loader;
pub(crate) mod svg_raster;
