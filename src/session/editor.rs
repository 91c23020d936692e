use std::path::Path;

use crate::assets::decode::{DecodedImage, SelectedFile, decode_image};
use crate::assets::frame::FrameAsset;
use crate::assets::loader::{LoadOutcome, LoadSlot, LoadTicket};
use crate::config::EditorConfig;
use crate::encode::png::encode_png;
use crate::encode::sink::SaveSink;
use crate::foundation::core::{Point, Transform, Vec2};
use crate::foundation::error::{PhotoframeError, PhotoframeResult};
use crate::geometry::{ScaleLimits, fit_transform, pan, zoom_clamped};
use crate::input::event::{InputEvent, InputResponse, TransformOp};
use crate::input::gesture::{GestureInterpreter, GestureState};
use crate::layout::controller::{LayoutChange, LayoutInputs, SurfaceController, SurfaceLayout};
use crate::render::cpu::{Compositor, RenderOpts};
use crate::render::frame::FrameRGBA;
use crate::session::events::{Observer, SessionEvent};

/// Where the loaded photo sits, plus the fit it was reset from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    initial: Transform,
    current: Transform,
    limits: ScaleLimits,
}

/// Interactive photo-in-circle editor.
///
/// All state lives here and changes only through `&mut self` methods, each of which re-renders
/// synchronously when it changes anything visible. Operations that need a photo are silent no-ops
/// until one is loaded.
pub struct EditorSession {
    config: EditorConfig,
    inputs: LayoutInputs,
    surface: SurfaceController,
    gestures: GestureInterpreter,
    compositor: Compositor,

    image: Option<DecodedImage>,
    frame_asset: Option<FrameAsset>,
    placement: Option<Placement>,
    image_loads: LoadSlot,
    frame_loads: LoadSlot,

    last_frame: Option<FrameRGBA>,
    observer: Option<Observer>,
}

impl EditorSession {
    /// Validate `config`, size the surface and draw the empty background.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn new(config: EditorConfig, inputs: LayoutInputs) -> PhotoframeResult<Self> {
        config.validate()?;
        let surface = SurfaceController::new(config.layout, &inputs, None);
        let gestures = GestureInterpreter::new(config.wheel_zoom_step);
        let mut session = Self {
            config,
            inputs,
            surface,
            gestures,
            compositor: Compositor::new(),
            image: None,
            frame_asset: None,
            placement: None,
            image_loads: LoadSlot::default(),
            frame_loads: LoadSlot::default(),
            last_frame: None,
            observer: None,
        };
        session.render()?;
        Ok(session)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Register the callback that receives every [`SessionEvent`]. Replaces any previous one.
    pub fn set_observer(&mut self, observer: impl FnMut(&SessionEvent) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    // Loading

    /// Start loading a user-selected file.
    ///
    /// Non-image files are rejected with [`PhotoframeError::InvalidInput`] and leave the session
    /// untouched (a load already in flight stays current).
    pub fn begin_image_load(&mut self, file: &SelectedFile) -> PhotoframeResult<LoadTicket> {
        file.validate()?;
        let ticket = self.image_loads.begin();
        tracing::debug!(
            ticket = ticket.get(),
            name = %file.name,
            len = file.bytes.len(),
            "image load started"
        );
        Ok(ticket)
    }

    /// Hand over the decode result for `ticket`. Only the most recently issued ticket applies.
    #[tracing::instrument(level = "debug", skip_all, fields(ticket = ticket.get()))]
    pub fn complete_image_load(
        &mut self,
        ticket: LoadTicket,
        result: PhotoframeResult<DecodedImage>,
    ) -> LoadOutcome {
        if !self.image_loads.settle(ticket) {
            tracing::debug!("stale image load discarded");
            return LoadOutcome::Superseded;
        }
        match result {
            Ok(image) => {
                self.apply_image(image);
                LoadOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(error = %err, "image load failed; keeping previous image");
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Validate, decode and apply `file` in one step.
    pub fn load_file(&mut self, file: SelectedFile) -> PhotoframeResult<LoadOutcome> {
        let ticket = self.begin_image_load(&file)?;
        let decoded = decode_image(&file.bytes);
        Ok(self.complete_image_load(ticket, decoded))
    }

    pub fn has_pending_image_load(&self) -> bool {
        self.image_loads.has_pending()
    }

    pub fn begin_frame_load(&mut self) -> LoadTicket {
        self.frame_loads.begin()
    }

    /// Hand over the overlay for `ticket`. A failed load keeps whatever overlay was there before
    /// and rendering proceeds without one if there was none.
    #[tracing::instrument(level = "debug", skip_all, fields(ticket = ticket.get()))]
    pub fn complete_frame_load(
        &mut self,
        ticket: LoadTicket,
        result: PhotoframeResult<FrameAsset>,
    ) -> LoadOutcome {
        if !self.frame_loads.settle(ticket) {
            tracing::debug!("stale frame load discarded");
            return LoadOutcome::Superseded;
        }
        match result {
            Ok(frame) => {
                let (w, h) = frame.intrinsic_size();
                tracing::info!(
                    width = w,
                    height = h,
                    vector = frame.is_vector(),
                    "frame overlay loaded"
                );
                self.frame_asset = Some(frame);
                self.emit(SessionEvent::FrameChanged);
                self.rerender();
                LoadOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(error = %err, "frame overlay unavailable");
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Load the configured `frame_path`, resolved against `base_dir`.
    ///
    /// Returns `None` when no overlay is configured.
    pub fn load_frame_from_config(&mut self, base_dir: &Path) -> Option<LoadOutcome> {
        let path = base_dir.join(self.config.frame_path.as_deref()?);
        let ticket = self.begin_frame_load();
        let result = FrameAsset::load(&path);
        Some(self.complete_frame_load(ticket, result))
    }

    // Interaction

    /// Re-run layout for new environment inputs.
    ///
    /// A change of backing pixel size re-fits the photo, discarding user pan and zoom. With a photo
    /// loaded the pixel side follows the photo, so a resize only changes the display side and the
    /// user transform is kept; the re-fit on a pixel change then happens in the photo load itself.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resize(&mut self, inputs: LayoutInputs) -> LayoutChange {
        self.inputs = inputs;
        let dims = self.image_dims();
        let change = self.surface.update(&inputs, dims);
        if let LayoutChange::PixelsResized { from, to } = change {
            tracing::debug!(from, to, "surface resized");
            self.gestures.reset();
            self.emit(SessionEvent::SurfaceResized { pixel_side: to });
            self.refit();
            self.rerender();
        }
        change
    }

    /// Feed one host event, in client coordinates.
    pub fn handle_input(&mut self, event: InputEvent) -> InputResponse {
        let layout = self.surface.layout();
        let event = event.map_points(|p| layout.client_to_surface(p));
        let response = self
            .gestures
            .handle(&event, self.placement.map(|p| p.current));
        if let Some(op) = response.op {
            self.apply_op(op);
        }
        response
    }

    /// Translate the photo by a client-space displacement. Returns whether anything moved.
    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        let delta = self.surface.layout().client_delta_to_surface(delta);
        self.apply_op(TransformOp::Pan { delta })
    }

    /// Zoom to `scale` (clamped) keeping the photo point under the client-space `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Point, scale: f64) -> bool {
        let anchor = self.surface.layout().client_to_surface(anchor);
        self.apply_op(TransformOp::ZoomAt { anchor, scale })
    }

    /// Restore the fit computed at load or resize. Idempotent.
    pub fn reset(&mut self) -> bool {
        self.gestures.reset();
        let Some(p) = self.placement else {
            return false;
        };
        self.commit_transform(p.initial)
    }

    // Output

    /// Composite the current state into a fresh surface frame.
    pub fn render(&mut self) -> PhotoframeResult<()> {
        let side = self.surface.layout().pixel_side;
        let opts = RenderOpts {
            background: self.config.background_premul(),
            clip_inset: self.config.inset_for(f64::from(side)),
        };
        let image = self.image.as_ref().zip(self.placement.map(|p| p.current));
        let frame = self
            .compositor
            .render(side, image, self.frame_asset.as_ref(), &opts)?;
        let fingerprint = frame.fingerprint();
        self.last_frame = Some(frame);
        self.emit(SessionEvent::Rendered { fingerprint });
        Ok(())
    }

    /// PNG bytes of the current surface, or `None` with no photo loaded.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn export_png(&mut self) -> PhotoframeResult<Option<Vec<u8>>> {
        if self.image.is_none() {
            tracing::debug!("export skipped: no image");
            return Ok(None);
        }
        if self.last_frame.is_none() {
            self.render()?;
        }
        let frame = self
            .last_frame
            .as_ref()
            .ok_or_else(|| PhotoframeError::render("no rendered frame to export"))?;
        encode_png(frame).map(Some)
    }

    /// Export and hand the PNG to `sink` under the configured file name.
    ///
    /// Returns `false` (and saves nothing) with no photo loaded.
    pub fn export_to(&mut self, sink: &mut dyn SaveSink) -> PhotoframeResult<bool> {
        let Some(bytes) = self.export_png()? else {
            return Ok(false);
        };
        sink.save(&self.config.export_file_name, &bytes)?;
        tracing::info!(
            file = %self.config.export_file_name,
            len = bytes.len(),
            "exported framed image"
        );
        Ok(true)
    }

    // Accessors

    pub fn transform(&self) -> Option<Transform> {
        self.placement.map(|p| p.current)
    }

    pub fn initial_transform(&self) -> Option<Transform> {
        self.placement.map(|p| p.initial)
    }

    pub fn scale_limits(&self) -> Option<ScaleLimits> {
        self.placement.map(|p| p.limits)
    }

    pub fn layout(&self) -> SurfaceLayout {
        self.surface.layout()
    }

    pub fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }

    pub fn has_frame(&self) -> bool {
        self.frame_asset.is_some()
    }

    /// Last rendered surface (premultiplied RGBA8).
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.last_frame.as_ref()
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    /// Whether a drag or pinch is in progress (a "grabbing" cursor hint).
    pub fn is_interacting(&self) -> bool {
        self.gestures.is_active()
    }

    fn image_dims(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|i| (i.width(), i.height()))
    }

    fn apply_image(&mut self, image: DecodedImage) {
        let (width, height) = (image.width(), image.height());
        tracing::info!(width, height, "image loaded");
        self.image = Some(image);
        self.gestures.reset();
        self.emit(SessionEvent::ImageReplaced { width, height });

        let dims = self.image_dims();
        let change = self.surface.update(&self.inputs, dims);
        if let LayoutChange::PixelsResized { to, .. } = change {
            self.emit(SessionEvent::SurfaceResized { pixel_side: to });
        }
        self.refit();
        self.rerender();
    }

    /// Recompute the fit for the current photo and surface and make it the live transform.
    fn refit(&mut self) {
        let Some((w, h)) = self.image_dims() else {
            return;
        };
        let side = f64::from(self.surface.layout().pixel_side);
        let initial = fit_transform(w, h, side, side, self.config.margin_for(side));
        let limits = ScaleLimits::from_initial(initial, self.config.max_scale);
        tracing::debug!(?initial, ?limits, "fitted image");
        self.placement = Some(Placement {
            initial,
            current: initial,
            limits,
        });
        self.emit(SessionEvent::TransformChanged(initial));
    }

    fn apply_op(&mut self, op: TransformOp) -> bool {
        let Some(p) = self.placement else {
            return false;
        };
        let next = match op {
            TransformOp::Pan { delta } => pan(p.current, delta),
            TransformOp::ZoomAt { anchor, scale } => zoom_clamped(p.current, anchor, scale, p.limits),
        };
        self.commit_transform(next)
    }

    fn commit_transform(&mut self, next: Transform) -> bool {
        let Some(p) = self.placement.as_mut() else {
            return false;
        };
        if p.current == next || !next.is_valid() {
            return false;
        }
        p.current = next;
        tracing::debug!(?next, "transform changed");
        self.emit(SessionEvent::TransformChanged(next));
        self.rerender();
        true
    }

    /// Render after a state change; failures keep the previous frame.
    fn rerender(&mut self) {
        if let Err(err) = self.render() {
            tracing::warn!(error = %err, "render failed; keeping previous frame");
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
