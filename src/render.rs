use image::{Rgb, Rgba, RgbaImage};
use ndarray::Array2;
use qrcode::EcLevel;
use rayon::prelude::*;

use crate::error::{Result, StudioError};
use crate::qr::generate_qr_data;
use crate::style::ModuleStyle;

/// Subsamples per pixel axis used for shape coverage.
const SUPERSAMPLE: u32 = 4;

/// Largest side, in pixels, the renderer will allocate.
pub const MAX_SIDE_PX: u32 = 16_384;

/// Which orthogonal neighbours of a dark module are dark too.
#[derive(Clone, Copy, Debug, Default)]
struct Neighbours {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

pub struct MatrixRenderer {
    grid: Array2<bool>,
    module_size: u32,
    border: u32,
    style: ModuleStyle,
    fill: Rgb<u8>,
    back: Rgb<u8>,
}

impl MatrixRenderer {
    pub fn new(
        payload: &str,
        ec_level: EcLevel,
        module_size: u32,
        border: u32,
        style: ModuleStyle,
        fill: Rgb<u8>,
        back: Rgb<u8>,
    ) -> Result<Self> {
        if module_size == 0 {
            return Err(StudioError::InvalidParameter(
                "module size must be at least 1 px".into(),
            ));
        }
        let grid = generate_qr_data(payload, ec_level)?;
        Ok(Self {
            grid,
            module_size,
            border,
            style,
            fill,
            back,
        })
    }

    /// Number of modules per side, quiet zone excluded.
    pub fn module_count(&self) -> usize {
        self.grid.dim().0
    }

    /// Side length of the rendered image in pixels, at most [`MAX_SIDE_PX`].
    pub fn side_px(&self) -> Result<u32> {
        u32::try_from(self.module_count())
            .ok()
            .and_then(|n| n.checked_add(self.border.checked_mul(2)?))
            .and_then(|n| n.checked_mul(self.module_size))
            .filter(|&side| side <= MAX_SIDE_PX)
            .ok_or_else(|| {
                StudioError::InvalidParameter(format!(
                    "rendered image would exceed {MAX_SIDE_PX} px per side"
                ))
            })
    }

    pub fn render_to_image(&self) -> Result<RgbaImage> {
        let side = self.side_px()?;
        let back = opaque(self.back);
        let mut img = RgbaImage::from_pixel(side, side, back);
        if side == 0 {
            return Ok(img);
        }

        let row_len = side as usize * 4;
        img.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let coverage = self.coverage_at(x as u32, y as u32);
                    if coverage > 0.0 {
                        px.copy_from_slice(&mix(self.back, self.fill, coverage).0);
                    }
                }
            });

        Ok(img)
    }

    /// Fraction of pixel `(x, y)` covered by a dark module shape.
    fn coverage_at(&self, x: u32, y: u32) -> f32 {
        let size = self.module_size;
        let (mx, my) = (x / size, y / size);
        let n = self.module_count() as u32;
        if mx < self.border || my < self.border || mx >= self.border + n || my >= self.border + n {
            return 0.0;
        }
        let (gx, gy) = ((mx - self.border) as usize, (my - self.border) as usize);
        if !self.grid[[gy, gx]] {
            return 0.0;
        }

        let (lx, ly) = (x % size, y % size);
        match self.style {
            ModuleStyle::Square => 1.0,
            ModuleStyle::Circle => supersample(lx, ly, |u, v| {
                let r = size as f32 / 2.0;
                let (dx, dy) = (u - r, v - r);
                dx * dx + dy * dy <= r * r
            }),
            ModuleStyle::Rounded => {
                let nb = self.neighbours(gx, gy);
                supersample(lx, ly, |u, v| inside_rounded_module(u, v, size as f32, nb))
            }
        }
    }

    fn neighbours(&self, x: usize, y: usize) -> Neighbours {
        let n = self.module_count();
        Neighbours {
            up: y > 0 && self.grid[[y - 1, x]],
            down: y + 1 < n && self.grid[[y + 1, x]],
            left: x > 0 && self.grid[[y, x - 1]],
            right: x + 1 < n && self.grid[[y, x + 1]],
        }
    }
}

/// Render `payload` as an opaque RGBA image.
pub fn render(
    payload: &str,
    ec_level: EcLevel,
    module_size: u32,
    border: u32,
    style: ModuleStyle,
    fill: Rgb<u8>,
    back: Rgb<u8>,
) -> Result<RgbaImage> {
    MatrixRenderer::new(payload, ec_level, module_size, border, style, fill, back)?
        .render_to_image()
}

/// A corner is rounded only when both neighbours sharing it are background.
fn inside_rounded_module(u: f32, v: f32, size: f32, nb: Neighbours) -> bool {
    let r = size / 2.0;
    let left_half = u < r;
    let top_half = v < r;
    let rounded = match (left_half, top_half) {
        (true, true) => !nb.up && !nb.left,
        (false, true) => !nb.up && !nb.right,
        (true, false) => !nb.down && !nb.left,
        (false, false) => !nb.down && !nb.right,
    };
    if !rounded {
        return true;
    }
    let (dx, dy) = (u - r, v - r);
    dx * dx + dy * dy <= r * r
}

/// Average `inside` over a regular grid of subsamples within pixel `(px, py)`.
pub(crate) fn supersample(px: u32, py: u32, inside: impl Fn(f32, f32) -> bool) -> f32 {
    let step = 1.0 / SUPERSAMPLE as f32;
    let mut hits = 0;
    for j in 0..SUPERSAMPLE {
        for i in 0..SUPERSAMPLE {
            let u = px as f32 + (i as f32 + 0.5) * step;
            let v = py as f32 + (j as f32 + 0.5) * step;
            if inside(u, v) {
                hits += 1;
            }
        }
    }
    hits as f32 / (SUPERSAMPLE * SUPERSAMPLE) as f32
}

pub(crate) fn opaque(c: Rgb<u8>) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], 255])
}

/// Paste `src` over `dst` through an 8-bit stencil, alpha channel included.
pub(crate) fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, mask: u8) {
    let m = mask as u32;
    for c in 0..4 {
        dst[c] = ((src[c] as u32 * m + dst[c] as u32 * (255 - m) + 127) / 255) as u8;
    }
}

fn mix(back: Rgb<u8>, fill: Rgb<u8>, t: f32) -> Rgba<u8> {
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Rgba([
        lerp(back[0], fill[0]),
        lerp(back[1], fill[1]),
        lerp(back[2], fill[2]),
        255,
    ])
}
