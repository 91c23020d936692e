//! Editor configuration.
//!
//! All lengths named `*_side`, `fit_margin` and `clip_inset` are surface pixels measured at
//! [`EditorConfig::reference_side`]; the session scales margin and inset proportionally to the
//! actual surface pixel side so the composition looks the same at every resolution.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{PhotoframeError, PhotoframeResult};

/// Upper bound for any surface side, matching the largest pixmap the CPU compositor allocates.
pub const MAX_SURFACE_SIDE: u32 = 16_384;

/// Top-level editor settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Surface side at which `fit_margin` and `clip_inset` are specified.
    pub reference_side: f64,
    /// Whitespace kept around the fitted image on the tighter axis.
    pub fit_margin: f64,
    /// Distance between the surface edge and the circular clip.
    pub clip_inset: f64,
    /// Largest absolute image scale reachable by zooming.
    pub max_scale: f64,
    /// Multiplicative zoom factor for one wheel notch.
    pub wheel_zoom_step: f64,
    /// Straight-alpha RGBA8 background painted under the clip.
    pub background_rgba: [u8; 4],
    /// Surface sizing policy.
    pub layout: LayoutConfig,
    /// Location of the frame overlay, resolved once against a host-provided base directory.
    pub frame_path: Option<PathBuf>,
    /// File name handed to the save sink on export.
    pub export_file_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            reference_side: 500.0,
            fit_margin: 20.0,
            clip_inset: 10.0,
            max_scale: 10.0,
            wheel_zoom_step: 1.1,
            background_rgba: [255, 255, 255, 255],
            layout: LayoutConfig::default(),
            frame_path: Some(PathBuf::from("frame.png")),
            export_file_name: "framed_image.png".to_owned(),
        }
    }
}

/// Surface sizing policy consumed by [`crate::SurfaceController`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Largest on-screen side in CSS pixels.
    pub max_display_side: f64,
    /// Pixel ceiling for the backing surface.
    pub max_pixel_side: u32,
    /// Pixel floor used when a tiny source image would otherwise shrink the surface further.
    pub min_pixel_side: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_display_side: 500.0,
            max_pixel_side: 2048,
            min_pixel_side: 64,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> PhotoframeResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| PhotoframeError::config(format!("parse editor config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: &Path) -> PhotoframeResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read editor config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Reject settings that would break geometry invariants.
    pub fn validate(&self) -> PhotoframeResult<()> {
        fn positive(name: &str, v: f64) -> PhotoframeResult<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(PhotoframeError::config(format!(
                    "{name} must be finite and > 0 (got {v})"
                )))
            }
        }
        fn non_negative(name: &str, v: f64) -> PhotoframeResult<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(PhotoframeError::config(format!(
                    "{name} must be finite and >= 0 (got {v})"
                )))
            }
        }

        positive("reference_side", self.reference_side)?;
        non_negative("fit_margin", self.fit_margin)?;
        non_negative("clip_inset", self.clip_inset)?;
        positive("max_scale", self.max_scale)?;
        positive("layout.max_display_side", self.layout.max_display_side)?;

        // Zero is allowed only when both are zero.
        let inset_ok = if self.fit_margin > 0.0 {
            self.clip_inset < self.fit_margin
        } else {
            self.clip_inset == 0.0
        };
        if !inset_ok {
            return Err(PhotoframeError::config(
                "clip_inset must be smaller than fit_margin",
            ));
        }
        if !(self.wheel_zoom_step.is_finite() && self.wheel_zoom_step > 1.0) {
            return Err(PhotoframeError::config("wheel_zoom_step must be > 1"));
        }
        let l = &self.layout;
        if l.max_pixel_side == 0 || l.max_pixel_side > MAX_SURFACE_SIDE {
            return Err(PhotoframeError::config(format!(
                "layout.max_pixel_side must be in 1..={MAX_SURFACE_SIDE}"
            )));
        }
        if l.min_pixel_side == 0 || l.min_pixel_side > l.max_pixel_side {
            return Err(PhotoframeError::config(
                "layout.min_pixel_side must be in 1..=layout.max_pixel_side",
            ));
        }
        if !self.export_file_name.to_ascii_lowercase().ends_with(".png") {
            return Err(PhotoframeError::config(
                "export_file_name must end with .png",
            ));
        }
        Ok(())
    }

    /// Fit margin scaled to a surface of `side` pixels.
    pub fn margin_for(&self, side: f64) -> f64 {
        self.fit_margin * side / self.reference_side
    }

    /// Clip inset scaled to a surface of `side` pixels.
    pub fn inset_for(&self, side: f64) -> f64 {
        self.clip_inset * side / self.reference_side
    }

    pub fn background_premul(&self) -> Rgba8Premul {
        let [r, g, b, a] = self.background_rgba;
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
