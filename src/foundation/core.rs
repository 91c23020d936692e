pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Placement of the user image on the surface: translate to `(x, y)`, then scale uniformly.
///
/// `x`/`y` are surface pixels and locate the unscaled image origin (its top-left corner).
/// There is no rotation. Valid transforms have a finite, strictly positive `scale`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    /// Left edge of the image in surface pixels.
    pub x: f64,
    /// Top edge of the image in surface pixels.
    pub y: f64,
    /// Uniform magnification applied before placement.
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Surface-space position of the image origin.
    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Return `true` when every component is finite and `scale > 0`.
    pub fn is_valid(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.scale.is_finite() && self.scale > 0.0
    }

    /// Affine used for drawing: `T(x, y) * S(scale)`.
    pub fn to_affine(self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y)) * Affine::scale(self.scale)
    }

    /// Map an image-space point (source pixels) to surface pixels.
    pub fn image_to_surface(self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.x, p.y * self.scale + self.y)
    }

    /// Map a surface-space point back into image space.
    pub fn surface_to_image(self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.scale, (p.y - self.y) / self.scale)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
