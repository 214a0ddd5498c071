use std::path::PathBuf;

use qrcode::types::QrError;
use qrcode::EcLevel;

/// Everything that can go wrong while generating or exporting a code.
///
/// Only [`StudioError::Encoding`] and [`StudioError::InvalidParameter`] abort a
/// generation. Logo, caption and corner failures are recorded as warnings and
/// the pipeline carries on with the image it already has.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("cannot encode payload at error-correction level {level:?}: {source}")]
    Encoding {
        level: EcLevel,
        #[source]
        source: QrError,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("failed to load logo {}: {source}", .path.display())]
    Logo {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("drawing failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to save {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("unsupported export format for {} (use .png, .jpg or .jpeg)", .0.display())]
    UnsupportedFormat(PathBuf),
}

impl StudioError {
    /// True for failures that degrade a generation instead of aborting it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StudioError::Logo { .. } | StudioError::Render(_))
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;
