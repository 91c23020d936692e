use crate::config::MAX_SURFACE_SIDE;
use crate::foundation::error::{PhotoframeError, PhotoframeResult};

/// Rasterize `tree` stretched to `width` x `height`, returning premultiplied RGBA8.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> PhotoframeResult<Vec<u8>> {
    if width > MAX_SURFACE_SIDE || height > MAX_SURFACE_SIDE {
        return Err(PhotoframeError::render(format!(
            "svg raster size too large: {width}x{height} (max {MAX_SURFACE_SIDE}x{MAX_SURFACE_SIDE})"
        )));
    }

    let size = tree.size();
    if !(size.width().is_finite() && size.height().is_finite())
        || size.width() <= 0.0
        || size.height() <= 0.0
    {
        return Err(PhotoframeError::render("svg has invalid width/height"));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PhotoframeError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
