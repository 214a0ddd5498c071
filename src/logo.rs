use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::{Result, StudioError};
use crate::render::blend;

/// Overlay the logo at `path` on the centre of `base`.
///
/// The logo is shrunk, never enlarged, so that its longer side fits
/// `round(base.height * size_ratio)` pixels. Its own alpha channel decides how
/// much of each module shows through.
pub fn embed(base: &RgbaImage, path: &Path, size_ratio: f32) -> Result<RgbaImage> {
    let logo = image::open(path)
        .map_err(|source| StudioError::Logo {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    let max_side = ((base.height() as f32 * size_ratio).round() as u32).max(1);
    let logo = fit_logo(logo, max_side);
    log::debug!(
        "placing {}x{} logo from {}",
        logo.width(),
        logo.height(),
        path.display()
    );

    let mut out = base.clone();
    overlay_centered(&mut out, &logo);
    Ok(out)
}

/// Downscale preserving aspect ratio until the longer side is at most `max_side`.
fn fit_logo(logo: RgbaImage, max_side: u32) -> RgbaImage {
    let (w, h) = logo.dimensions();
    let longest = w.max(h);
    if longest <= max_side || longest == 0 {
        return logo;
    }
    let scale = max_side as f64 / longest as f64;
    let nw = ((w as f64 * scale).round() as u32).clamp(1, max_side);
    let nh = ((h as f64 * scale).round() as u32).clamp(1, max_side);
    imageops::resize(&logo, nw, nh, FilterType::Lanczos3)
}

fn overlay_centered(base: &mut RgbaImage, logo: &RgbaImage) {
    let x0 = (base.width() as i64 - logo.width() as i64) / 2;
    let y0 = (base.height() as i64 - logo.height() as i64) / 2;

    for (lx, ly, src) in logo.enumerate_pixels() {
        let (x, y) = (x0 + lx as i64, y0 + ly as i64);
        if x < 0 || y < 0 || x >= base.width() as i64 || y >= base.height() as i64 {
            continue;
        }
        let dst = base.get_pixel_mut(x as u32, y as u32);
        blend(dst, *src, src[3]);
    }
}
