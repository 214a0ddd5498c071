use std::path::{Path, PathBuf};

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbaImage};
use rusttype::{point, Font, Scale};

use crate::error::{Result, StudioError};
use crate::render::{blend, opaque};

pub const MIN_FONT_SIZE: u32 = 15;
pub const PADDING_TOP: u32 = 10;
pub const PADDING_BOTTOM: u32 = 20;

const SYSTEM_FONTS: &[&str] = &[
    "C:\\Windows\\Fonts\\arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
];

/// Ink bounds of a run of text, relative to the point it is drawn from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBox {
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    fn union(self, other: TextBox) -> TextBox {
        TextBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Typeface used for captions.
pub enum CaptionFont {
    Outline(Font<'static>),
    /// Built-in 8x8 bitmap face, scaled by whole pixels.
    Bitmap,
}

impl CaptionFont {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Font::try_from_vec(bytes)
            .map(CaptionFont::Outline)
            .ok_or_else(|| {
                StudioError::Render(format!("{} is not a usable font", path.display()))
            })
    }

    /// Load `preferred`, else the first installed system face, else the bitmap face.
    pub fn resolve(preferred: Option<&Path>) -> Self {
        if let Some(path) = preferred {
            match Self::from_file(path) {
                Ok(font) => return font,
                Err(e) => log::warn!("caption font unavailable, falling back: {e}"),
            }
        }
        for candidate in SYSTEM_FONTS.iter().map(PathBuf::from) {
            if !candidate.is_file() {
                continue;
            }
            if let Ok(font) = Self::from_file(&candidate) {
                log::debug!("caption font: {}", candidate.display());
                return font;
            }
        }
        log::warn!("no system font found, using the built-in bitmap face");
        CaptionFont::Bitmap
    }

    pub fn measure(&self, text: &str, size: u32) -> TextBox {
        match self {
            CaptionFont::Outline(font) => {
                let scale = Scale::uniform(size as f32);
                let ascent = font.v_metrics(scale).ascent;
                font.layout(text, scale, point(0.0, ascent))
                    .filter_map(|g| g.pixel_bounding_box())
                    .map(|bb| TextBox {
                        left: bb.min.x,
                        top: bb.min.y,
                        right: bb.max.x,
                        bottom: bb.max.y,
                    })
                    .reduce(TextBox::union)
                    .unwrap_or_default()
            }
            CaptionFont::Bitmap => {
                let scale = bitmap_scale(size) as i32;
                bitmap_pixels(text)
                    .map(|(x, y)| TextBox {
                        left: x * scale,
                        top: y * scale,
                        right: (x + 1) * scale,
                        bottom: (y + 1) * scale,
                    })
                    .reduce(TextBox::union)
                    .unwrap_or_default()
            }
        }
    }

    /// Draw `text` with its origin at `(x, y)`; ink outside `canvas` is clipped.
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        x: i32,
        y: i32,
        size: u32,
        text: &str,
        color: Rgb<u8>,
    ) {
        let color = opaque(color);
        let mut plot = |px: i32, py: i32, coverage: u8| {
            if px < 0 || py < 0 || px >= canvas.width() as i32 || py >= canvas.height() as i32 {
                return;
            }
            blend(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
        };

        match self {
            CaptionFont::Outline(font) => {
                let scale = Scale::uniform(size as f32);
                let ascent = font.v_metrics(scale).ascent;
                for glyph in font.layout(text, scale, point(x as f32, y as f32 + ascent)) {
                    if let Some(bb) = glyph.pixel_bounding_box() {
                        glyph.draw(|gx, gy, v| {
                            let a = (v * 255.0).round() as u8;
                            if a > 0 {
                                plot(bb.min.x + gx as i32, bb.min.y + gy as i32, a);
                            }
                        });
                    }
                }
            }
            CaptionFont::Bitmap => {
                let scale = bitmap_scale(size) as i32;
                for (gx, gy) in bitmap_pixels(text) {
                    for dy in 0..scale {
                        for dx in 0..scale {
                            plot(x + gx * scale + dx, y + gy * scale + dy, 255);
                        }
                    }
                }
            }
        }
    }
}

fn bitmap_scale(size: u32) -> u32 {
    ((size as f32 / 8.0).round() as u32).max(1)
}

/// Set pixels of `text` in unscaled bitmap-face coordinates.
fn bitmap_pixels(text: &str) -> impl Iterator<Item = (i32, i32)> + '_ {
    text.chars().enumerate().flat_map(|(i, ch)| {
        let rows = BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        rows.into_iter().enumerate().flat_map(move |(row, bits)| {
            (0..8)
                .filter(move |bit| bits & (1 << bit) != 0)
                .map(move |bit| (i as i32 * 8 + bit, row as i32))
        })
    })
}

/// Caption font size for an image `width` pixels wide.
pub fn font_size_for(width: u32) -> u32 {
    MIN_FONT_SIZE.max(width / 20)
}

/// Extend `image` downward with a band holding `text`, centred.
///
/// Blank captions leave the image untouched.
pub fn add_caption(
    image: &RgbaImage,
    text: &str,
    fill: Rgb<u8>,
    back: Rgb<u8>,
    font: &CaptionFont,
) -> Result<RgbaImage> {
    if text.trim().is_empty() {
        return Ok(image.clone());
    }

    let size = font_size_for(image.width());
    let bounds = font.measure(text, size);

    let height = image
        .height()
        .checked_add(bounds.height())
        .and_then(|h| h.checked_add(PADDING_TOP + PADDING_BOTTOM))
        .ok_or_else(|| StudioError::Render("caption band would be too tall".into()))?;
    let width = image.width();

    let mut canvas = RgbaImage::from_pixel(width, height, opaque(back));
    image::imageops::replace(&mut canvas, image, 0, 0);

    let text_x = (width as i64 - bounds.width() as i64) / 2;
    let text_y = (image.height() + PADDING_TOP) as i64;
    let origin_x = i32::try_from(text_x - bounds.left as i64)
        .map_err(|_| StudioError::Render("caption is too wide to place".into()))?;
    let origin_y = i32::try_from(text_y - bounds.top as i64)
        .map_err(|_| StudioError::Render("caption is too low to place".into()))?;
    font.draw(&mut canvas, origin_x, origin_y, size, text, fill);

    log::debug!("caption band {}x{} at size {size}", width, height - image.height());
    Ok(canvas)
}
