//! Pure transform math: fit-to-bounds placement, panning and anchor-preserving zoom.
//!
//! Nothing here owns state. The editor session feeds the current [`Transform`] in and stores what
//! comes out, which keeps every rule in this module checkable in isolation.

use crate::foundation::core::{Point, Transform, Vec2};

/// Smallest extent (pixels) the fit computation will fit into.
const MIN_FIT_EXTENT: f64 = 1.0;

/// Scale that centers the whole `image_w x image_h` image inside the canvas minus `margin`.
///
/// The tighter axis decides the scale and touches the margin exactly; the other axis gets
/// centered whitespace. Available extents that collapse to zero or below are treated as one pixel
/// so the returned scale is always positive.
pub fn fit_transform(
    image_w: u32,
    image_h: u32,
    canvas_w: f64,
    canvas_h: f64,
    margin: f64,
) -> Transform {
    debug_assert!(image_w > 0 && image_h > 0, "images have non-zero size");
    let iw = f64::from(image_w.max(1));
    let ih = f64::from(image_h.max(1));

    let avail_w = (canvas_w - 2.0 * margin).max(MIN_FIT_EXTENT);
    let avail_h = (canvas_h - 2.0 * margin).max(MIN_FIT_EXTENT);
    let scale = (avail_w / iw).min(avail_h / ih);

    Transform {
        x: (canvas_w - iw * scale) / 2.0,
        y: (canvas_h - ih * scale) / 2.0,
        scale,
    }
}

/// Translate by `delta`. Unbounded: the image may leave the visible area entirely.
pub fn pan(t: Transform, delta: Vec2) -> Transform {
    Transform {
        x: t.x + delta.x,
        y: t.y + delta.y,
        scale: t.scale,
    }
}

/// Rescale to `new_scale` while keeping the image point under `anchor` fixed on screen.
pub fn zoom_at_point(t: Transform, anchor: Point, new_scale: f64) -> Transform {
    let offset_x = (anchor.x - t.x) / t.scale;
    let offset_y = (anchor.y - t.y) / t.scale;
    Transform {
        x: anchor.x - offset_x * new_scale,
        y: anchor.y - offset_y * new_scale,
        scale: new_scale,
    }
}

/// Inclusive scale bounds for interactive zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLimits {
    /// Lower bound; the fitted scale of the current image/surface pair.
    pub min: f64,
    /// Upper bound; never below `min`.
    pub max: f64,
}

impl ScaleLimits {
    /// Bounds for an image fitted at `initial`: zooming out stops at the fit, zooming in at
    /// `max_scale` (or at the fit itself when the fit is already larger).
    pub fn from_initial(initial: Transform, max_scale: f64) -> Self {
        Self {
            min: initial.scale,
            max: max_scale.max(initial.scale),
        }
    }

    pub fn clamp(self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

/// [`zoom_at_point`] with the requested scale clamped first, so the anchor math sees the value
/// that is actually applied. Zero or negative requests clamp to `limits.min`; non-finite ones
/// leave `t` unchanged.
pub fn zoom_clamped(t: Transform, anchor: Point, requested: f64, limits: ScaleLimits) -> Transform {
    if !requested.is_finite() {
        return t;
    }
    zoom_at_point(t, anchor, limits.clamp(requested))
}

#[cfg(test)]
#[path = "../tests/unit/geometry/geometry.rs"]
mod tests;
