use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::input::event::WheelDelta;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn png_file(width: u32, height: u32) -> SelectedFile {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([30, 140, 200, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    SelectedFile::new("photo.png", "image/png", buf)
}

fn decoded(width: u32, height: u32) -> DecodedImage {
    decode_image(&png_file(width, height).bytes).unwrap()
}

fn session() -> EditorSession {
    EditorSession::new(EditorConfig::default(), LayoutInputs::new(500.0, 500.0, 1.0)).unwrap()
}

fn record_events(s: &mut EditorSession) -> Rc<RefCell<Vec<SessionEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    s.set_observer(move |e| sink.borrow_mut().push(*e));
    events
}

#[test]
fn fresh_session_renders_background_only() {
    let mut s = session();
    let frame = s.frame().unwrap();
    assert_eq!((frame.width, frame.height), (500, 500));
    assert!(frame.data.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));

    assert!(s.transform().is_none());
    assert!(s.scale_limits().is_none());
    assert!(!s.reset());
    assert!(!s.pan_by(Vec2::new(5.0, 5.0)));
    assert!(s.export_png().unwrap().is_none());

    let mut sink = InMemorySink::new();
    assert!(!s.export_to(&mut sink).unwrap());
    assert!(sink.saved().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = EditorConfig {
        wheel_zoom_step: 0.5,
        ..EditorConfig::default()
    };
    let err = EditorSession::new(cfg, LayoutInputs::new(500.0, 500.0, 1.0))
        .err()
        .unwrap();
    assert!(matches!(err, PhotoframeError::Config(_)));
}

#[test]
fn load_emits_events_in_order() {
    let mut s = session();
    let events = record_events(&mut s);

    assert!(s.load_file(png_file(1000, 500)).unwrap().is_applied());

    let events = events.borrow();
    assert_eq!(events[0], SessionEvent::ImageReplaced { width: 1000, height: 500 });
    assert_eq!(events[1], SessionEvent::SurfaceResized { pixel_side: 1000 });
    assert!(matches!(events[2], SessionEvent::TransformChanged(_)));
    assert!(matches!(events[3], SessionEvent::Rendered { .. }));
    assert_eq!(events.len(), 4);
}

#[test]
fn cleared_observer_receives_nothing() {
    let mut s = session();
    let events = record_events(&mut s);
    s.load_file(png_file(200, 200)).unwrap();
    let seen = events.borrow().len();
    assert!(seen > 0);

    s.clear_observer();
    assert!(s.pan_by(Vec2::new(3.0, 0.0)));
    assert!(s.render().is_ok());
    assert_eq!(events.borrow().len(), seen);
}

#[test]
fn stale_and_failed_loads_keep_state() {
    let mut s = session();
    let older = s.begin_image_load(&png_file(1, 1)).unwrap();
    let newer = s.begin_image_load(&png_file(1, 1)).unwrap();
    assert!(s.has_pending_image_load());

    assert!(matches!(
        s.complete_image_load(older, Ok(decoded(300, 200))),
        LoadOutcome::Superseded
    ));
    assert!(s.image().is_none());

    assert!(s.complete_image_load(newer, Ok(decoded(200, 300))).is_applied());
    assert_eq!(s.image().map(|i| (i.width(), i.height())), Some((200, 300)));
    let before = s.transform();

    // Completing the same ticket again is ignored.
    assert!(matches!(
        s.complete_image_load(newer, Ok(decoded(50, 50))),
        LoadOutcome::Superseded
    ));

    let t = s.begin_image_load(&png_file(1, 1)).unwrap();
    let outcome = s.complete_image_load(t, Err(PhotoframeError::decode("truncated")));
    assert!(matches!(outcome, LoadOutcome::Failed(PhotoframeError::Decode(_))));
    assert_eq!(s.image().map(|i| i.width()), Some(200));
    assert_eq!(s.transform(), before);
}

#[test]
fn non_image_file_changes_nothing() {
    let mut s = session();
    s.load_file(png_file(400, 400)).unwrap();
    let before = s.transform();
    let fp = s.frame().map(FrameRGBA::fingerprint);

    let err = s
        .load_file(SelectedFile::new("doc.pdf", "application/pdf", vec![1, 2, 3]))
        .unwrap_err();
    assert!(matches!(err, PhotoframeError::InvalidInput(_)));
    assert_eq!(s.transform(), before);
    assert_eq!(s.image().map(|i| i.width()), Some(400));
    assert_eq!(s.frame().map(FrameRGBA::fingerprint), fp);
    assert!(!s.has_pending_image_load());
}

#[test]
fn pan_by_maps_client_deltas() {
    let mut s = session();
    s.load_file(png_file(1000, 500)).unwrap();

    // 1000 backing pixels shown at 500 CSS pixels: two surface pixels per client pixel.
    let layout = s.layout();
    assert_eq!(layout.pixel_side, 1000);
    assert!(approx_eq(layout.display_side, 500.0));

    let t = s.transform().unwrap();
    assert!(approx_eq(t.scale, 0.92));
    assert!(approx_eq(t.x, 40.0));
    assert!(approx_eq(t.y, 270.0));

    assert!(s.pan_by(Vec2::new(10.0, -5.0)));
    let t = s.transform().unwrap();
    assert!(approx_eq(t.x, 60.0));
    assert!(approx_eq(t.y, 260.0));
    assert!(!s.pan_by(Vec2::ZERO));
}

#[test]
fn zoom_is_clamped_to_limits() {
    let mut s = session();
    s.load_file(png_file(1000, 500)).unwrap();
    let limits = s.scale_limits().unwrap();
    assert!(approx_eq(limits.min, 0.92));
    assert!(approx_eq(limits.max, 10.0));

    s.zoom_at(Point::new(250.0, 250.0), 100.0);
    assert!(approx_eq(s.transform().unwrap().scale, 10.0));

    s.zoom_at(Point::new(250.0, 250.0), 0.001);
    assert!(approx_eq(s.transform().unwrap().scale, 0.92));

    let before = s.transform();
    assert!(!s.zoom_at(Point::new(250.0, 250.0), f64::NAN));
    assert_eq!(s.transform(), before);
}

#[test]
fn wheel_and_drag_through_handle_input() {
    let mut s = session();

    let r = s.handle_input(InputEvent::Wheel {
        pos: Point::new(250.0, 250.0),
        delta: WheelDelta { dx: 0.0, dy: -1.0 },
    });
    assert_eq!(r, InputResponse::default());

    s.load_file(png_file(1000, 500)).unwrap();
    let r = s.handle_input(InputEvent::Wheel {
        pos: Point::new(250.0, 250.0),
        delta: WheelDelta { dx: 0.0, dy: -1.0 },
    });
    assert!(r.prevent_default);
    assert!(approx_eq(s.transform().unwrap().scale, 0.92 * 1.1));

    let before = s.transform().unwrap();
    s.handle_input(InputEvent::PointerDown {
        pos: Point::new(100.0, 100.0),
    });
    assert!(s.is_interacting());
    let r = s.handle_input(InputEvent::PointerMove {
        pos: Point::new(110.0, 100.0),
    });
    assert!(!r.prevent_default);
    assert!(matches!(r.op, Some(TransformOp::Pan { .. })));
    s.handle_input(InputEvent::PointerUp);
    assert!(!s.is_interacting());

    let after = s.transform().unwrap();
    assert!(approx_eq(after.x - before.x, 20.0));
    assert!(approx_eq(after.y, before.y));
}

#[test]
fn reset_restores_fit_and_is_idempotent() {
    let mut s = session();
    s.load_file(png_file(800, 600)).unwrap();
    let initial = s.initial_transform().unwrap();

    s.pan_by(Vec2::new(30.0, 12.0));
    s.zoom_at(Point::new(100.0, 80.0), 3.0);
    assert_ne!(s.transform(), Some(initial));

    assert!(s.reset());
    assert_eq!(s.transform(), Some(initial));
    let fp = s.frame().map(FrameRGBA::fingerprint);

    assert!(!s.reset());
    assert_eq!(s.transform(), Some(initial));
    assert_eq!(s.frame().map(FrameRGBA::fingerprint), fp);
}

#[test]
fn resize_without_image_reallocates_surface() {
    let mut s = session();
    let events = record_events(&mut s);

    let change = s.resize(LayoutInputs::new(500.0, 500.0, 2.0));
    assert_eq!(change, LayoutChange::PixelsResized { from: 500, to: 1000 });
    assert_eq!(s.frame().map(|f| f.width), Some(1000));
    assert!(
        events
            .borrow()
            .contains(&SessionEvent::SurfaceResized { pixel_side: 1000 })
    );
}

#[test]
fn display_only_resize_keeps_user_transform() {
    let mut s = session();
    s.load_file(png_file(1000, 500)).unwrap();
    s.pan_by(Vec2::new(10.0, 0.0));
    let moved = s.transform();

    let change = s.resize(LayoutInputs::new(250.0, 800.0, 3.0));
    assert_eq!(change, LayoutChange::DisplayOnly);
    assert_eq!(s.transform(), moved);
    assert_eq!(s.layout().pixel_side, 1000);

    // Four surface pixels per client pixel now.
    s.pan_by(Vec2::new(1.0, 0.0));
    let t = s.transform().unwrap();
    assert!(approx_eq(t.x - moved.unwrap().x, 4.0));
}

#[test]
fn frame_overlay_loads_and_failures() {
    let mut s = session();
    let events = record_events(&mut s);

    let t = s.begin_frame_load();
    let outcome = s.complete_frame_load(t, Err(PhotoframeError::asset_load("missing")));
    assert!(matches!(outcome, LoadOutcome::Failed(PhotoframeError::AssetLoad(_))));
    assert!(!s.has_frame());
    assert!(s.render().is_ok());

    let overlay = FrameAsset::Raster(decoded(10, 10));
    let t = s.begin_frame_load();
    assert!(s.complete_frame_load(t, Ok(overlay)).is_applied());
    assert!(s.has_frame());
    assert!(events.borrow().contains(&SessionEvent::FrameChanged));

    let missing = std::env::temp_dir().join(format!("photoframe_no_such_dir_{}", std::process::id()));
    let outcome = s.load_frame_from_config(&missing).unwrap();
    assert!(matches!(outcome, LoadOutcome::Failed(PhotoframeError::AssetLoad(_))));
    // The earlier overlay survives a failed reload.
    assert!(s.has_frame());

    let mut no_frame = EditorSession::new(
        EditorConfig {
            frame_path: None,
            ..EditorConfig::default()
        },
        LayoutInputs::new(500.0, 500.0, 1.0),
    )
    .unwrap();
    assert!(no_frame.load_frame_from_config(&missing).is_none());
}

#[test]
fn export_uses_configured_name() {
    let mut s = session();
    s.load_file(png_file(300, 300)).unwrap();

    let mut sink = InMemorySink::new();
    assert!(s.export_to(&mut sink).unwrap());
    let (name, bytes) = sink.last().unwrap();
    assert_eq!(name, "framed_image.png");

    let decoded = image::load_from_memory(bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (300, 300));
}
