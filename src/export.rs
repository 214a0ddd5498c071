use std::borrow::Cow;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, ImageFormat, Rgb, RgbImage, RgbaImage};

use crate::error::{Result, StudioError};
use crate::render::blend;
use crate::style::WHITE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// Lossless, alpha preserved.
    Png,
    /// Lossy, alpha flattened onto white.
    Jpeg,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Ok(ExportFormat::Png),
            Some("jpg" | "jpeg") => Ok(ExportFormat::Jpeg),
            _ => Err(StudioError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Composite `image` over an opaque `background`, dropping alpha.
pub fn flatten(image: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let src = *image.get_pixel(x, y);
        let mut dst = image::Rgba([background[0], background[1], background[2], 255]);
        blend(&mut dst, src, src[3]);
        Rgb([dst[0], dst[1], dst[2]])
    })
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .map_err(StudioError::Encode)?;
    Ok(buf)
}

/// Write `image` to `path`, choosing PNG or JPEG from the extension.
pub fn save(image: &RgbaImage, path: &Path) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(path)?;
    match format {
        ExportFormat::Png => {
            let bytes = encode_png(image)?;
            std::fs::write(path, bytes)?;
        }
        ExportFormat::Jpeg => {
            flatten(image, WHITE)
                .save_with_format(path, ImageFormat::Jpeg)
                .map_err(|source| StudioError::Export {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
    }
    log::info!("saved {:?} to {}", format, path.display());
    Ok(format)
}

/// Put `image` on the system clipboard.
pub fn copy_to_clipboard(image: &RgbaImage) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| StudioError::Clipboard(e.to_string()))?;
    let data = arboard::ImageData {
        width: image.width() as usize,
        height: image.height() as usize,
        bytes: Cow::Borrowed(image.as_raw()),
    };

    #[cfg(target_os = "linux")]
    let result = {
        use arboard::SetExtLinux;
        // X11 and Wayland drop the selection when its owner exits.
        log::info!("holding the clipboard until another application takes it");
        clipboard.set().wait().image(data)
    };
    #[cfg(not(target_os = "linux"))]
    let result = clipboard.set_image(data);

    result.map_err(|e| StudioError::Clipboard(e.to_string()))
}

/// Scale `image` to fit a `max_width` x `max_height` viewport, keeping its aspect ratio.
///
/// Display helper for graphical front-ends; exported files always keep full size.
pub fn fit_within(image: &RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 || max_width == 0 || max_height == 0 {
        return image.clone();
    }
    let scale = (max_width as f64 / w as f64).min(max_height as f64 / h as f64);
    let nw = ((w as f64 * scale).round() as u32).clamp(1, max_width);
    let nh = ((h as f64 * scale).round() as u32).clamp(1, max_height);
    imageops::resize(image, nw, nh, FilterType::Triangle)
}
