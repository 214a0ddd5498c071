use std::path::{Path, PathBuf};

use image::Rgb;
use qrcode::EcLevel;

use crate::error::{Result, StudioError};

pub const MIN_LOGO_RATIO: f32 = 0.10;
pub const MAX_LOGO_RATIO: f32 = 0.50;
pub const DEFAULT_LOGO_RATIO: f32 = 0.25;

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Shape used to draw each dark module.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModuleStyle {
    #[default]
    Square,
    /// Maximally rounded square: corners facing background become quarter circles.
    Rounded,
    /// Circle inscribed in the module box.
    Circle,
}

/// Logo overlay settings.
///
/// The toggle and the path are stored separately so switching the logo off
/// and on again brings back the same file.
#[derive(Clone, Debug, PartialEq)]
pub struct LogoSettings {
    pub enabled: bool,
    pub path: Option<PathBuf>,
    /// Fraction of the code height the logo's longer side may occupy.
    pub size_ratio: f32,
}

impl Default for LogoSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
            size_ratio: DEFAULT_LOGO_RATIO,
        }
    }
}

impl LogoSettings {
    /// The logo to draw, if the toggle is on and a path has been chosen.
    pub fn active(&self) -> Option<(&Path, f32)> {
        if !self.enabled {
            return None;
        }
        self.path.as_deref().map(|path| (path, self.size_ratio))
    }
}

/// Everything the pipeline needs for one generation.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleParameters {
    pub payload: String,
    pub caption: String,
    pub fill_color: Rgb<u8>,
    pub back_color: Rgb<u8>,
    pub module_style: ModuleStyle,
    pub error_correction: EcLevel,
    pub module_size: u32,
    pub border: u32,
    pub logo: LogoSettings,
    pub corner_radius: u32,
    /// Preferred caption typeface; system faces and a bitmap face are the fallbacks.
    pub font: Option<PathBuf>,
}

impl Default for StyleParameters {
    fn default() -> Self {
        Self {
            payload: String::new(),
            caption: String::new(),
            fill_color: BLACK,
            back_color: WHITE,
            module_style: ModuleStyle::Square,
            error_correction: EcLevel::H,
            module_size: 10,
            border: 4,
            logo: LogoSettings::default(),
            corner_radius: 0,
            font: None,
        }
    }
}

impl StyleParameters {
    pub fn validate(&self) -> Result<()> {
        if self.module_size == 0 {
            return Err(StudioError::InvalidParameter(
                "module size must be at least 1 px".into(),
            ));
        }
        let ratio = self.logo.size_ratio;
        if !(MIN_LOGO_RATIO..=MAX_LOGO_RATIO).contains(&ratio) {
            return Err(StudioError::InvalidParameter(format!(
                "logo size ratio {ratio} is outside {MIN_LOGO_RATIO}..={MAX_LOGO_RATIO}"
            )));
        }
        Ok(())
    }

    /// Error-correction level actually handed to the encoder.
    ///
    /// An active logo always forces level H, whatever was requested.
    pub fn effective_ec_level(&self) -> EcLevel {
        if self.logo.active().is_some() {
            EcLevel::H
        } else {
            self.error_correction
        }
    }
}

/// Parse `#RRGGBB` or `RRGGBB`.
pub fn parse_hex_color(s: &str) -> Result<Rgb<u8>> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || StudioError::InvalidParameter(format!("invalid color: {s}"));
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}
