use ndarray::Array2;
use qrcode::{EcLevel, QrCode};

use crate::error::{Result, StudioError};

/// Encode `text` into the smallest symbol that fits at `ec_level`.
///
/// The returned grid is indexed `[[y, x]]`; `true` marks a dark module. It
/// holds the symbol only, without any quiet zone.
pub fn generate_qr_data(text: &str, ec_level: EcLevel) -> Result<Array2<bool>> {
    let code = QrCode::with_error_correction_level(text, ec_level).map_err(|source| {
        StudioError::Encoding {
            level: ec_level,
            source,
        }
    })?;

    let width = code.width();
    let modules = code.to_colors();

    Ok(Array2::from_shape_fn((width, width), |(y, x)| {
        matches!(modules[y * width + x], qrcode::Color::Dark)
    }))
}
