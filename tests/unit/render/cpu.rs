use super::*;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn solid(width: u32, height: u32, px: [u8; 4]) -> DecodedImage {
    let data = px.repeat((width * height) as usize);
    DecodedImage::from_premul_rgba8(width, height, data).unwrap()
}

/// 8x8 overlay: left half opaque blue, right half transparent.
fn half_blue_frame() -> FrameAsset {
    let mut data = Vec::with_capacity(8 * 8 * 4);
    for _y in 0..8 {
        for x in 0..8 {
            data.extend_from_slice(if x < 4 { &BLUE } else { &[0, 0, 0, 0] });
        }
    }
    FrameAsset::Raster(DecodedImage::from_premul_rgba8(8, 8, data).unwrap())
}

/// Image sampling may be off by a rounding step on resampled pixels.
fn assert_px_near(actual: Option<[u8; 4]>, expected: [u8; 4]) {
    let actual = actual.expect("pixel in bounds");
    for c in 0..4 {
        assert!(
            actual[c].abs_diff(expected[c]) <= 2,
            "pixel {actual:?} != {expected:?}"
        );
    }
}

fn opts(inset: f64) -> RenderOpts {
    RenderOpts {
        background: Rgba8Premul::from_straight_rgba(255, 255, 255, 255),
        clip_inset: inset,
    }
}

#[test]
fn empty_surface_is_background() {
    let mut c = Compositor::new();
    let out = c.render(12, None, None, &opts(0.0)).unwrap();
    assert_eq!((out.width, out.height), (12, 12));
    assert!(out.premultiplied);
    assert!(out.data.chunks_exact(4).all(|px| px == WHITE));
}

#[test]
fn image_is_clipped_to_the_circle() {
    let mut c = Compositor::new();
    let img = solid(4, 4, RED);
    // Scale 5 makes the 4x4 image cover the 20x20 surface.
    let out = c
        .render(20, Some((&img, Transform::new(0.0, 0.0, 5.0))), None, &opts(0.0))
        .unwrap();

    assert_px_near(out.pixel(10, 10), RED);
    assert_eq!(out.pixel(0, 0), Some(WHITE));
    assert_eq!(out.pixel(19, 19), Some(WHITE));
    assert_eq!(out.pixel(19, 0), Some(WHITE));
}

#[test]
fn inset_shrinks_the_circle() {
    let mut c = Compositor::new();
    let img = solid(4, 4, RED);
    let t = Transform::new(0.0, 0.0, 5.0);

    let wide = c.render(20, Some((&img, t)), None, &opts(0.0)).unwrap();
    let narrow = c.render(20, Some((&img, t)), None, &opts(5.0)).unwrap();

    assert_px_near(wide.pixel(3, 10), RED);
    assert_eq!(narrow.pixel(3, 10), Some(WHITE));
    assert_px_near(narrow.pixel(10, 10), RED);
}

#[test]
fn frame_draws_over_the_image() {
    let mut c = Compositor::new();
    let img = solid(4, 4, RED);
    let frame = half_blue_frame();
    let out = c
        .render(
            20,
            Some((&img, Transform::new(0.0, 0.0, 5.0))),
            Some(&frame),
            &opts(0.0),
        )
        .unwrap();

    // Left edge: overlay covers background. Right side inside circle: image shows through.
    assert_px_near(out.pixel(1, 10), BLUE);
    assert_px_near(out.pixel(18, 10), RED);
    // Outside circle on the transparent half: background.
    assert_eq!(out.pixel(19, 0), Some(WHITE));
}

#[test]
fn frame_without_image() {
    let mut c = Compositor::new();
    let out = c
        .render(20, None, Some(&half_blue_frame()), &opts(0.0))
        .unwrap();
    assert_px_near(out.pixel(1, 1), BLUE);
    assert_eq!(out.pixel(18, 18), Some(WHITE));
}

#[test]
fn vector_frame_is_rasterized_at_surface_size() {
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2"><rect width="1" height="2" fill="blue"/></svg>"#;
    let frame = FrameAsset::from_bytes(svg, true).unwrap();

    let mut c = Compositor::new();
    let out = c.render(20, None, Some(&frame), &opts(0.0)).unwrap();
    assert_eq!(out.pixel(2, 10), Some(BLUE));
    assert_eq!(out.pixel(17, 10), Some(WHITE));
}

#[test]
fn rendering_is_deterministic_across_instances() {
    let img = solid(3, 5, RED);
    let frame = half_blue_frame();
    let t = Transform::new(1.5, -2.25, 3.3);

    let mut a = Compositor::new();
    let first = a.render(24, Some((&img, t)), Some(&frame), &opts(2.0)).unwrap();
    let second = a.render(24, Some((&img, t)), Some(&frame), &opts(2.0)).unwrap();
    let mut b = Compositor::new();
    let third = b.render(24, Some((&img, t)), Some(&frame), &opts(2.0)).unwrap();

    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first, third);
}

#[test]
fn transform_changes_output() {
    let img = solid(4, 4, RED);
    let mut c = Compositor::new();
    let a = c
        .render(20, Some((&img, Transform::new(0.0, 0.0, 5.0))), None, &opts(0.0))
        .unwrap();
    let b = c
        .render(20, Some((&img, Transform::new(10.0, 0.0, 5.0))), None, &opts(0.0))
        .unwrap();
    assert_ne!(a.fingerprint(), b.fingerprint());
    assert_eq!(b.pixel(5, 10), Some(WHITE));
}

#[test]
fn rejects_bad_sides_and_transforms() {
    let mut c = Compositor::new();
    assert!(c.render(0, None, None, &opts(0.0)).is_err());
    assert!(c.render(MAX_SURFACE_SIDE + 1, None, None, &opts(0.0)).is_err());

    let img = solid(1, 1, RED);
    let err = c
        .render(8, Some((&img, Transform::new(f64::NAN, 0.0, 1.0))), None, &opts(0.0))
        .unwrap_err();
    assert!(matches!(err, PhotoframeError::Render(_)));
}

#[test]
fn over_and_mask_helpers() {
    let mut dst = vec![255, 255, 255, 255, 10, 20, 30, 255];
    let src = vec![0, 0, 128, 128, 0, 0, 0, 0];
    premul_over_in_place(&mut dst, &src).unwrap();
    assert_eq!(&dst[..4], &[127, 127, 255, 255]);
    assert_eq!(&dst[4..], &[10, 20, 30, 255]);

    let mut layer = vec![200, 100, 50, 200, 200, 100, 50, 200];
    let mask = vec![255, 255, 255, 255, 0, 0, 0, 0];
    mask_apply_alpha_in_place(&mut layer, &mask).unwrap();
    assert_eq!(&layer[..4], &[200, 100, 50, 200]);
    assert_eq!(&layer[4..], &[0, 0, 0, 0]);

    assert!(premul_over_in_place(&mut [0; 4], &[0; 8]).is_err());
}
