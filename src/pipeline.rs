//! Generation pipeline: matrix render, logo, caption, rounded corners.
//!
//! Only the first stage can fail a generation. Later stages that fail are
//! skipped; their error is kept as a warning and the previous stage's image
//! is carried forward.

use std::path::PathBuf;

use image::RgbaImage;
use qrcode::EcLevel;

use crate::caption::{add_caption, CaptionFont};
use crate::corners::round_corners;
use crate::error::{Result, StudioError};
use crate::logo::embed;
use crate::render::render;
use crate::style::StyleParameters;

/// A finished image plus whatever went wrong along the way.
#[derive(Debug)]
pub struct Generation {
    pub image: RgbaImage,
    pub warnings: Vec<StudioError>,
}

impl Generation {
    pub fn logo_failed(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, StudioError::Logo { .. }))
    }
}

/// Outcome of one pipeline run.
///
/// Runs are synchronous, so the transient rendering state is never observable.
#[derive(Debug, Default)]
pub enum GenerationState {
    /// Nothing to encode; any displayed image should be cleared.
    #[default]
    Idle,
    Ready(Generation),
    /// The payload could not be encoded; any displayed image should be cleared.
    Failed(StudioError),
}

impl GenerationState {
    pub fn image(&self) -> Option<&RgbaImage> {
        match self {
            GenerationState::Ready(generation) => Some(&generation.image),
            _ => None,
        }
    }
}

/// Run an optional stage, keeping `image` if the stage fails.
fn best_effort(
    image: RgbaImage,
    warnings: &mut Vec<StudioError>,
    stage: impl FnOnce(&RgbaImage) -> Result<RgbaImage>,
) -> RgbaImage {
    match stage(&image) {
        Ok(next) => next,
        Err(e) => {
            log::warn!("{e}; continuing without this step");
            warnings.push(e);
            image
        }
    }
}

/// Run all stages for `params` and return the outcome.
pub fn generate(params: &StyleParameters) -> GenerationState {
    if params.payload.is_empty() {
        return GenerationState::Idle;
    }
    if let Err(e) = params.validate() {
        return GenerationState::Failed(e);
    }

    let ec_level = params.effective_ec_level();
    if ec_level != params.error_correction {
        log::warn!(
            "logo enabled: using error correction {:?} instead of {:?}",
            ec_level,
            params.error_correction
        );
    }

    let base = match render(
        &params.payload,
        ec_level,
        params.module_size,
        params.border,
        params.module_style,
        params.fill_color,
        params.back_color,
    ) {
        Ok(image) => image,
        Err(e) => {
            log::error!("{e}");
            return GenerationState::Failed(e);
        }
    };
    log::debug!("rendered {}x{} base image", base.width(), base.height());

    let mut warnings = Vec::new();

    let image = match params.logo.active() {
        Some((path, ratio)) => best_effort(base, &mut warnings, |img| embed(img, path, ratio)),
        None => base,
    };

    let image = if params.caption.trim().is_empty() {
        image
    } else {
        let font = CaptionFont::resolve(params.font.as_deref());
        best_effort(image, &mut warnings, |img| {
            add_caption(img, &params.caption, params.fill_color, params.back_color, &font)
        })
    };

    let image = best_effort(image, &mut warnings, |img| {
        round_corners(img, params.corner_radius)
    });

    GenerationState::Ready(Generation { image, warnings })
}

/// Session state behind an interactive front-end.
///
/// Owns the current parameters and the single current result. Every
/// [`Studio::regenerate`] replaces the result wholesale.
#[derive(Debug, Default)]
pub struct Studio {
    params: StyleParameters,
    state: GenerationState,
}

impl Studio {
    pub fn new(params: StyleParameters) -> Self {
        Self {
            params,
            state: GenerationState::Idle,
        }
    }

    pub fn params(&self) -> &StyleParameters {
        &self.params
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    /// Apply `change` to the parameters and regenerate.
    pub fn update(&mut self, change: impl FnOnce(&mut StyleParameters)) -> &GenerationState {
        change(&mut self.params);
        self.regenerate()
    }

    pub fn regenerate(&mut self) -> &GenerationState {
        self.state = generate(&self.params);
        if let GenerationState::Ready(generation) = &self.state {
            if generation.logo_failed() {
                // The stored path is kept so the user can retry.
                self.params.logo.enabled = false;
            }
        }
        &self.state
    }

    /// Switch the logo on or off without forgetting the chosen file.
    pub fn set_logo_enabled(&mut self, enabled: bool) -> &GenerationState {
        self.update(|p| {
            p.logo.enabled = enabled;
            if enabled {
                p.error_correction = EcLevel::H;
            }
        })
    }

    /// Pick a new logo file and turn the logo on.
    pub fn choose_logo(&mut self, path: PathBuf) -> &GenerationState {
        self.update(|p| {
            p.logo.path = Some(path);
            p.logo.enabled = true;
            p.error_correction = EcLevel::H;
        })
    }

    /// Restore default options, keeping the payload and caption.
    pub fn reset(&mut self) -> &GenerationState {
        let payload = std::mem::take(&mut self.params.payload);
        let caption = std::mem::take(&mut self.params.caption);
        self.params = StyleParameters {
            payload,
            caption,
            ..Default::default()
        };
        self.regenerate()
    }
}
