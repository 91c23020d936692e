use std::path::Path;
use std::sync::Arc;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::foundation::error::{PhotoframeError, PhotoframeResult};

/// Decorative overlay drawn on top of the clipped photo, stretched to the whole surface.
#[derive(Clone, Debug)]
pub enum FrameAsset {
    /// Raster overlay (typically a PNG with a transparent center).
    Raster(DecodedImage),
    /// Vector overlay, rasterized at surface size on demand.
    Vector(Arc<usvg::Tree>),
}

impl FrameAsset {
    /// Parse overlay bytes. `svg` selects the vector parser; everything else goes through the
    /// raster decoders.
    ///
    /// All failures surface as [`PhotoframeError::AssetLoad`].
    pub fn from_bytes(bytes: &[u8], svg: bool) -> PhotoframeResult<Self> {
        if svg {
            parse_svg(bytes, None)
        } else {
            decode_image(bytes)
                .map(Self::Raster)
                .map_err(|e| PhotoframeError::asset_load(format!("frame overlay: {e}")))
        }
    }

    /// Read and parse an overlay file. Files with an `.svg` extension are parsed as vector art.
    #[tracing::instrument(level = "debug", fields(path = %path.display()))]
    pub fn load(path: &Path) -> PhotoframeResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            PhotoframeError::asset_load(format!("read frame overlay '{}': {e}", path.display()))
        })?;

        if is_svg_path(path) {
            parse_svg(&bytes, path.parent())
        } else {
            Self::from_bytes(&bytes, false)
        }
    }

    /// Natural size of the artwork in its own units.
    pub fn intrinsic_size(&self) -> (f64, f64) {
        match self {
            Self::Raster(img) => (f64::from(img.width()), f64::from(img.height())),
            Self::Vector(tree) => {
                let size = tree.size();
                (f64::from(size.width()), f64::from(size.height()))
            }
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector(_))
    }

    /// Whether both handles refer to the same loaded artwork.
    pub(crate) fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Raster(a), Self::Raster(b)) => a.shares_pixels_with(b),
            (Self::Vector(a), Self::Vector(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn is_svg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

fn parse_svg(bytes: &[u8], resources_dir: Option<&Path>) -> PhotoframeResult<FrameAsset> {
    let opts = usvg::Options {
        resources_dir: resources_dir.map(Path::to_path_buf),
        fontdb: build_svg_fontdb(resources_dir),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| PhotoframeError::asset_load(format!("parse svg frame overlay: {e}")))?;
    Ok(FrameAsset::Vector(Arc::new(tree)))
}

/// System fonts plus any font files shipped next to the overlay (or in its `fonts/` folder).
fn build_svg_fontdb(resources_dir: Option<&Path>) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    if let Some(dir) = resources_dir {
        load_fonts_from_dir(&mut db, dir);
        load_fonts_from_dir(&mut db, &dir.join("fonts"));
    }
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };
    for path in rd.flatten().map(|entry| entry.path()) {
        let is_font = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ["ttf", "otf", "ttc"].iter().any(|f| ext.eq_ignore_ascii_case(f)));
        if is_font && path.is_file() && db.load_font_file(&path).is_err() {
            tracing::debug!(path = %path.display(), "skipped unreadable font");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/frame.rs"]
mod tests;
