use image::{GrayImage, Luma, Rgba, RgbaImage};

use crate::error::{Result, StudioError};
use crate::render::{blend, supersample};

/// Stencil that is opaque inside a rounded rectangle spanning the whole
/// `width` x `height` area and transparent outside it.
///
/// The radius is clamped to half the shorter side.
pub fn rounded_rect_mask(width: u32, height: u32, radius: u32) -> GrayImage {
    let r = radius.min(width / 2).min(height / 2);
    let (w, h, rf) = (width as f32, height as f32, r as f32);

    GrayImage::from_fn(width, height, |x, y| {
        let in_corner_x = x < r || x >= width - r;
        let in_corner_y = y < r || y >= height - r;
        if !(in_corner_x && in_corner_y) {
            return Luma([255]);
        }
        let coverage = supersample(x, y, |u, v| {
            let cx = u.clamp(rf, w - rf);
            let cy = v.clamp(rf, h - rf);
            let (dx, dy) = (u - cx, v - cy);
            dx * dx + dy * dy <= rf * rf
        });
        Luma([(coverage * 255.0).round() as u8])
    })
}

/// Clip `image` to rounded corners of `radius` px, leaving the outside transparent.
pub fn round_corners(image: &RgbaImage, radius: u32) -> Result<RgbaImage> {
    if radius == 0 {
        return Ok(image.clone());
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(StudioError::Render(
            "cannot round the corners of an empty image".into(),
        ));
    }

    let mask = rounded_rect_mask(width, height, radius);
    let mut out = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    for ((dst, src), m) in out.pixels_mut().zip(image.pixels()).zip(mask.pixels()) {
        blend(dst, *src, m[0]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([40, 80, 120, 255]))
    }

    #[test]
    fn zero_radius_returns_input_unchanged() {
        let mut img = solid(30, 20);
        img.put_pixel(3, 4, Rgba([1, 2, 3, 77]));
        assert_eq!(round_corners(&img, 0).unwrap(), img);
    }

    #[test]
    fn corners_become_transparent_and_centre_stays() {
        let img = solid(100, 80);
        let out = round_corners(&img, 20).unwrap();
        for (x, y) in [(0, 0), (99, 0), (0, 79), (99, 79)] {
            assert_eq!(out.get_pixel(x, y)[3], 0, "corner ({x}, {y})");
        }
        assert_eq!(*out.get_pixel(50, 40), Rgba([40, 80, 120, 255]));
        // Straight edges between the corners are untouched.
        assert_eq!(*out.get_pixel(50, 0), Rgba([40, 80, 120, 255]));
        assert_eq!(*out.get_pixel(0, 40), Rgba([40, 80, 120, 255]));
    }

    #[test]
    fn mask_edges_are_antialiased() {
        let mask = rounded_rect_mask(64, 64, 32);
        let partial = mask.pixels().filter(|p| p[0] > 0 && p[0] < 255).count();
        assert!(partial > 0);
        assert_eq!(mask.get_pixel(32, 32)[0], 255);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn oversized_radius_is_clamped() {
        let out = round_corners(&solid(40, 40), 500).unwrap();
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(20, 20)[3], 255);
        assert_eq!(out.get_pixel(20, 0)[3], 255);
    }

    #[test]
    fn empty_image_is_a_render_error() {
        let err = round_corners(&RgbaImage::new(0, 0), 5).unwrap_err();
        assert!(matches!(err, StudioError::Render(_)));
    }
}
