use std::io::Cursor;

use crate::foundation::error::{PhotoframeError, PhotoframeResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::frame::FrameRGBA;

/// Encode a frame as a straight-alpha RGBA8 PNG.
pub fn encode_png(frame: &FrameRGBA) -> PhotoframeResult<Vec<u8>> {
    let mut rgba = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut rgba);
    }

    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba).ok_or_else(|| {
        PhotoframeError::encode(format!(
            "frame buffer does not match {}x{} RGBA8",
            frame.width, frame.height
        ))
    })?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PhotoframeError::encode(format!("write png: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
