//! photoframe places a user photo beneath a fixed circular frame overlay and exports the result.
//!
//! The crate is UI-framework independent. A host:
//!
//! - Creates an [`EditorSession`] from an [`EditorConfig`] and its [`LayoutInputs`]
//! - Feeds it selected files, the frame overlay and pointer/wheel/touch [`InputEvent`]s
//! - Reads back the composited surface ([`FrameRGBA`]) or PNG bytes via a [`SaveSink`]
//!
//! Geometry and gesture handling are exposed as pure building blocks ([`fit_transform`],
//! [`zoom_at_point`], [`GestureInterpreter`]) for hosts that manage state themselves.
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub mod config;
pub(crate) mod encode;
pub mod geometry;
pub(crate) mod input;
pub(crate) mod layout;
pub(crate) mod render;
pub(crate) mod session;

pub use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8Premul, Transform, Vec2};
pub use crate::foundation::error::{PhotoframeError, PhotoframeResult};

pub use crate::assets::decode::{DecodedImage, SelectedFile, decode_image};
pub use crate::assets::frame::FrameAsset;
pub use crate::assets::loader::{LoadOutcome, LoadTicket};
pub use crate::assets::svg_raster::rasterize_svg_to_premul_rgba8;
pub use crate::config::{EditorConfig, LayoutConfig, MAX_SURFACE_SIDE};
pub use crate::encode::png::encode_png;
pub use crate::encode::sink::{DirSink, InMemorySink, SaveSink};
pub use crate::geometry::{ScaleLimits, fit_transform, pan, zoom_at_point, zoom_clamped};
pub use crate::input::event::{InputEvent, InputResponse, TransformOp, WheelDelta};
pub use crate::input::gesture::{GestureInterpreter, GestureState};
pub use crate::layout::controller::{LayoutChange, LayoutInputs, SurfaceController, SurfaceLayout};
pub use crate::render::cpu::{Compositor, RenderOpts};
pub use crate::render::frame::FrameRGBA;
pub use crate::session::editor::EditorSession;
pub use crate::session::events::SessionEvent;
