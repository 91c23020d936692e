use std::sync::Arc;

use crate::foundation::error::{PhotoframeError, PhotoframeResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster image in premultiplied RGBA8 form.
///
/// Immutable once built; clones share the pixel buffer.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub(crate) rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap already-premultiplied RGBA8 pixels.
    ///
    /// Both sides must be in `1..=65535`, the range the CPU compositor can sample from.
    pub fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> PhotoframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(PhotoframeError::decode("image has zero width or height"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(PhotoframeError::decode(format!(
                "image {width}x{height} exceeds {}px per side",
                u16::MAX
            )));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8_premul.len() != expected {
            return Err(PhotoframeError::decode("image byte length mismatch"));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Longer of the two sides.
    pub fn long_side(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Whether both handles point at the same pixel buffer.
    pub(crate) fn shares_pixels_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rgba8_premul, &other.rgba8_premul)
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) and convert to premultiplied RGBA8.
///
/// Safe to call off the UI thread; the result is handed back through
/// [`crate::EditorSession::complete_image_load`].
pub fn decode_image(bytes: &[u8]) -> PhotoframeResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| PhotoframeError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    DecodedImage::from_premul_rgba8(width, height, rgba8_premul)
}

/// A file picked by the user, as handed over by the upload UI.
#[derive(Clone, Debug)]
pub struct SelectedFile {
    /// File name as picked by the user, for diagnostics only.
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Accept only files whose declared media type is in the `image/` category.
    pub fn validate(&self) -> PhotoframeResult<()> {
        if is_image_media_type(&self.media_type) {
            Ok(())
        } else {
            Err(PhotoframeError::invalid_input(format!(
                "'{}' is not an image (media type '{}')",
                self.name, self.media_type
            )))
        }
    }
}

pub(crate) fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
