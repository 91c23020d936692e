use std::sync::Arc;

use kurbo::{PathEl, Shape};

use crate::assets::decode::DecodedImage;
use crate::assets::frame::FrameAsset;
use crate::assets::svg_raster::rasterize_svg_to_premul_rgba8;
use crate::config::MAX_SURFACE_SIDE;
use crate::foundation::core::{Affine, Rgba8Premul, Transform};
use crate::foundation::error::{PhotoframeError, PhotoframeResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::frame::FrameRGBA;

/// Per-render settings that do not belong to the session state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOpts {
    /// Color painted over the whole surface before anything else.
    pub background: Rgba8Premul,
    /// Distance in surface pixels between the surface edge and the circular clip.
    pub clip_inset: f64,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            background: Rgba8Premul::from_straight_rgba(255, 255, 255, 255),
            clip_inset: 0.0,
        }
    }
}

struct ImagePaint {
    source: DecodedImage,
    paint: vello_cpu::Image,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MaskKey {
    side: u16,
    inset_bits: u64,
}

struct CachedMask {
    key: MaskKey,
    rgba8: Vec<u8>,
}

struct CachedFrameLayer {
    source: FrameAsset,
    side: u16,
    rgba8_premul: Vec<u8>,
}

/// CPU compositor powered by `vello_cpu`.
///
/// Draws, in order: background fill, the transformed image restricted to the centered circle,
/// then the frame overlay stretched over the full surface. Keeps the raster context, the
/// image paint, the clip mask and the stretched frame layer between calls.
#[derive(Default)]
pub struct Compositor {
    ctx: Option<vello_cpu::RenderContext>,
    image_paint: Option<ImagePaint>,
    mask: Option<CachedMask>,
    frame_layer: Option<CachedFrameLayer>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite one `side` x `side` frame.
    ///
    /// `image` pairs the photo with its image-to-surface transform. Identical inputs yield
    /// byte-identical output.
    #[tracing::instrument(level = "trace", skip_all, fields(side = side))]
    pub fn render(
        &mut self,
        side: u32,
        image: Option<(&DecodedImage, Transform)>,
        frame: Option<&FrameAsset>,
        opts: &RenderOpts,
    ) -> PhotoframeResult<FrameRGBA> {
        let side16 = surface_side_u16(side)?;
        let mut out = vello_cpu::Pixmap::new(side16, side16);
        clear_pixmap(&mut out, opts.background.to_array());

        if let Some((img, transform)) = image {
            if !transform.is_valid() {
                return Err(PhotoframeError::render(format!(
                    "invalid image transform {transform:?}"
                )));
            }
            let mut layer = vello_cpu::Pixmap::new(side16, side16);
            clear_pixmap_to_transparent(&mut layer);
            self.draw_image(&mut layer, img, transform)?;

            let mask = self.clip_mask(side16, opts.clip_inset)?;
            mask_apply_alpha_in_place(layer.data_as_u8_slice_mut(), mask)?;
            premul_over_in_place(out.data_as_u8_slice_mut(), layer.data_as_u8_slice())?;
        }

        if let Some(frame) = frame {
            let layer = self.frame_layer_for(side16, frame)?;
            premul_over_in_place(out.data_as_u8_slice_mut(), layer)?;
        }

        Ok(FrameRGBA {
            width: side,
            height: side,
            data: out.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> PhotoframeResult<R>,
    ) -> PhotoframeResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn image_paint_for(&mut self, img: &DecodedImage) -> PhotoframeResult<vello_cpu::Image> {
        if let Some(p) = self
            .image_paint
            .as_ref()
            .filter(|p| p.source.shares_pixels_with(img))
        {
            return Ok(p.paint.clone());
        }
        let paint = rgba_premul_to_image(img.rgba8_premul(), img.width(), img.height())?;
        self.image_paint = Some(ImagePaint {
            source: img.clone(),
            paint: paint.clone(),
        });
        Ok(paint)
    }

    fn draw_image(
        &mut self,
        dst: &mut vello_cpu::Pixmap,
        img: &DecodedImage,
        transform: Transform,
    ) -> PhotoframeResult<()> {
        let paint = self.image_paint_for(img)?;
        let w = f64::from(img.width());
        let h = f64::from(img.height());
        self.with_ctx_mut(dst.width(), dst.height(), |ctx| {
            ctx.set_transform(affine_to_cpu(transform.to_affine()));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            ctx.flush();
            ctx.render_to_pixmap(dst);
            Ok(())
        })
    }

    /// Coverage of the centered clip circle, as white premultiplied RGBA8.
    fn clip_mask(&mut self, side: u16, inset: f64) -> PhotoframeResult<&[u8]> {
        let key = MaskKey {
            side,
            inset_bits: inset.to_bits(),
        };
        if self.mask.as_ref().is_none_or(|m| m.key != key) {
            let mut pm = vello_cpu::Pixmap::new(side, side);
            clear_pixmap_to_transparent(&mut pm);

            let s = f64::from(side);
            let radius = s / 2.0 - inset;
            if radius.is_finite() && radius > 0.0 {
                let circle = kurbo::Circle::new((s / 2.0, s / 2.0), radius);
                let path = shape_to_cpu_path(&circle);
                self.with_ctx_mut(side, side, |ctx| {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
                    ctx.fill_path(&path);
                    ctx.flush();
                    ctx.render_to_pixmap(&mut pm);
                    Ok(())
                })?;
            }
            tracing::trace!(side, radius, "rebuilt clip mask");
            self.mask = Some(CachedMask {
                key,
                rgba8: pm.data_as_u8_slice().to_vec(),
            });
        }
        self.mask
            .as_ref()
            .map(|m| m.rgba8.as_slice())
            .ok_or_else(|| PhotoframeError::render("clip mask missing"))
    }

    /// The overlay stretched to `side` x `side`, premultiplied.
    fn frame_layer_for(&mut self, side: u16, frame: &FrameAsset) -> PhotoframeResult<&[u8]> {
        let fresh = self
            .frame_layer
            .as_ref()
            .is_some_and(|c| c.side == side && c.source.same_as(frame));
        if !fresh {
            let rgba8_premul = match frame {
                FrameAsset::Vector(tree) => {
                    rasterize_svg_to_premul_rgba8(tree, u32::from(side), u32::from(side))?
                }
                FrameAsset::Raster(img) => {
                    let paint =
                        rgba_premul_to_image(img.rgba8_premul(), img.width(), img.height())?;
                    let mut pm = vello_cpu::Pixmap::new(side, side);
                    clear_pixmap_to_transparent(&mut pm);

                    let s = f64::from(side);
                    let fw = f64::from(img.width());
                    let fh = f64::from(img.height());
                    self.with_ctx_mut(side, side, |ctx| {
                        ctx.set_transform(affine_to_cpu(Affine::scale_non_uniform(
                            s / fw,
                            s / fh,
                        )));
                        ctx.set_paint(paint);
                        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, fw, fh));
                        ctx.flush();
                        ctx.render_to_pixmap(&mut pm);
                        Ok(())
                    })?;
                    pm.data_as_u8_slice().to_vec()
                }
            };
            tracing::trace!(side, vector = frame.is_vector(), "rebuilt frame layer");
            self.frame_layer = Some(CachedFrameLayer {
                source: frame.clone(),
                side,
                rgba8_premul,
            });
        }
        self.frame_layer
            .as_ref()
            .map(|c| c.rgba8_premul.as_slice())
            .ok_or_else(|| PhotoframeError::render("frame layer missing"))
    }
}

fn surface_side_u16(side: u32) -> PhotoframeResult<u16> {
    if side == 0 || side > MAX_SURFACE_SIDE {
        return Err(PhotoframeError::render(format!(
            "surface side {side} outside 1..={MAX_SURFACE_SIDE}"
        )));
    }
    side.try_into()
        .map_err(|_| PhotoframeError::render("surface side exceeds u16"))
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn shape_to_cpu_path(shape: &impl Shape) -> vello_cpu::kurbo::BezPath {
    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in shape.path_elements(0.1) {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PhotoframeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PhotoframeError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PhotoframeError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(PhotoframeError::render("pixmap byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(bytes.len() / 4);
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> PhotoframeResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Scale every premultiplied pixel of `dst` by the alpha channel of `mask`.
fn mask_apply_alpha_in_place(dst: &mut [u8], mask: &[u8]) -> PhotoframeResult<()> {
    if dst.len() != mask.len() || !dst.len().is_multiple_of(4) {
        return Err(PhotoframeError::render(
            "mask_apply_alpha_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, m) in dst.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let w = u16::from(m[3]);
        if w == 255 {
            continue;
        }
        for c in d.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), w);
        }
    }
    Ok(())
}

fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> PhotoframeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PhotoframeError::render(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - sa;
        for c in 0..4 {
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = s[c].saturating_add(dc);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
