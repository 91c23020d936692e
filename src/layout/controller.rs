use crate::config::LayoutConfig;
use crate::foundation::core::{Point, Vec2};

/// Environment facts the host reports about where the surface lives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutInputs {
    /// Width available in the surface's container, CSS pixels.
    pub container_width: f64,
    /// Viewport width, CSS pixels.
    pub viewport_width: f64,
    /// Physical pixels per CSS pixel.
    pub device_pixel_ratio: f64,
    /// Client-space top-left corner of the surface.
    pub origin: Point,
}

impl LayoutInputs {
    pub fn new(container_width: f64, viewport_width: f64, device_pixel_ratio: f64) -> Self {
        Self {
            container_width,
            viewport_width,
            device_pixel_ratio,
            origin: Point::ZERO,
        }
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }
}

/// Resolved geometry of the square drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceLayout {
    /// On-screen side, CSS pixels.
    pub display_side: f64,
    /// Backing store side, pixels.
    pub pixel_side: u32,
    /// Client-space top-left corner.
    pub origin: Point,
}

impl SurfaceLayout {
    /// Surface pixels per client pixel.
    pub fn pixels_per_client(&self) -> f64 {
        f64::from(self.pixel_side) / self.display_side
    }

    /// Map a client-space point into surface pixels.
    pub fn client_to_surface(&self, p: Point) -> Point {
        let k = self.pixels_per_client();
        Point::new((p.x - self.origin.x) * k, (p.y - self.origin.y) * k)
    }

    /// Map a client-space displacement into surface pixels.
    pub fn client_delta_to_surface(&self, d: Vec2) -> Vec2 {
        d * self.pixels_per_client()
    }
}

/// What a layout update changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutChange {
    Unchanged,
    /// Display side or origin moved; the backing store is untouched.
    DisplayOnly,
    /// Backing store reallocated.
    PixelsResized { from: u32, to: u32 },
}

impl LayoutChange {
    pub fn pixels_changed(self) -> bool {
        matches!(self, Self::PixelsResized { .. })
    }
}

/// Keeps the surface sized to its container, the device pixel ratio and the loaded image.
#[derive(Debug, Clone)]
pub struct SurfaceController {
    cfg: LayoutConfig,
    current: SurfaceLayout,
}

impl SurfaceController {
    pub fn new(cfg: LayoutConfig, inputs: &LayoutInputs, image_dims: Option<(u32, u32)>) -> Self {
        let current = Self::compute(&cfg, inputs, image_dims);
        Self { cfg, current }
    }

    pub fn layout(&self) -> SurfaceLayout {
        self.current
    }

    /// Pure sizing rule.
    ///
    /// Display side is the smallest of container, viewport and the configured maximum. With an
    /// image loaded the backing store follows the image's long side (never upscaling past it,
    /// never exceeding the ceiling); otherwise it follows the display side times the DPR.
    pub fn compute(
        cfg: &LayoutConfig,
        inputs: &LayoutInputs,
        image_dims: Option<(u32, u32)>,
    ) -> SurfaceLayout {
        let display_side = [inputs.container_width, inputs.viewport_width]
            .into_iter()
            .filter(|v| v.is_finite() && *v > 0.0)
            .fold(cfg.max_display_side, f64::min)
            .max(1.0);

        let pixel_side = match image_dims {
            Some((w, h)) => w
                .max(h)
                .min(cfg.max_pixel_side)
                .max(cfg.min_pixel_side)
                .min(cfg.max_pixel_side),
            None => {
                let dpr = if inputs.device_pixel_ratio.is_finite() && inputs.device_pixel_ratio > 0.0
                {
                    inputs.device_pixel_ratio
                } else {
                    1.0
                };
                let px = (display_side * dpr).round();
                px.clamp(1.0, f64::from(cfg.max_pixel_side)) as u32
            }
        };

        let origin = if inputs.origin.x.is_finite() && inputs.origin.y.is_finite() {
            inputs.origin
        } else {
            Point::ZERO
        };

        SurfaceLayout {
            display_side,
            pixel_side,
            origin,
        }
    }

    /// Recompute the layout and report what changed.
    pub fn update(&mut self, inputs: &LayoutInputs, image_dims: Option<(u32, u32)>) -> LayoutChange {
        let next = Self::compute(&self.cfg, inputs, image_dims);
        let prev = std::mem::replace(&mut self.current, next);
        if prev.pixel_side != next.pixel_side {
            LayoutChange::PixelsResized {
                from: prev.pixel_side,
                to: next.pixel_side,
            }
        } else if prev != next {
            LayoutChange::DisplayOnly
        } else {
            LayoutChange::Unchanged
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/controller.rs"]
mod tests;
