/// Convenience result type used across photoframe.
pub type PhotoframeResult<T> = Result<T, PhotoframeError>;

/// Top-level error taxonomy used by editor APIs.
///
/// None of these are fatal to the editor: sessions absorb them and keep the last valid state.
#[derive(thiserror::Error, Debug)]
pub enum PhotoframeError {
    /// The selected file is not something the editor accepts (e.g. not an image media type).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Image bytes could not be decoded into a bitmap.
    #[error("decode error: {0}")]
    Decode(String),

    /// The frame overlay asset could not be loaded.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// Surface or pixmap level failures while drawing.
    #[error("render error: {0}")]
    Render(String),

    /// PNG encoding failures on export.
    #[error("encode error: {0}")]
    Encode(String),

    /// Rejected editor configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PhotoframeError {
    /// Build a [`PhotoframeError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`PhotoframeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PhotoframeError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`PhotoframeError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PhotoframeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PhotoframeError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
