mod args;

use anyhow::{bail, Result};
use args::Args;
use clap::Parser;
use qr_studio::export;
use qr_studio::style::LogoSettings;
use qr_studio::{GenerationState, StyleParameters, Studio};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let params = StyleParameters {
        payload: args.text,
        caption: args.caption,
        fill_color: args.fill,
        back_color: args.back,
        module_style: args.style.into(),
        error_correction: args.error_correction.into(),
        module_size: args.module_size,
        border: args.border,
        logo: LogoSettings {
            enabled: args.logo.is_some(),
            path: args.logo,
            size_ratio: args.logo_size as f32 / 100.0,
        },
        corner_radius: args.radius,
        font: args.font,
    };

    log::info!("Generating QR code for: {}", params.payload);
    let mut studio = Studio::new(params);

    studio.regenerate();
    let generation = match studio.state() {
        GenerationState::Idle => bail!("Nothing to encode: the text is empty"),
        GenerationState::Failed(e) => bail!("Failed to generate QR code: {e}"),
        GenerationState::Ready(generation) => generation,
    };
    if studio.params().logo.path.is_some() && !studio.params().logo.enabled {
        log::warn!("Logo skipped; {} warning(s) recorded", generation.warnings.len());
    }

    let image = &generation.image;

    if let Some(path) = &args.output {
        export::save(image, path)?;
        println!("Saved to: {}", path.display());
    }
    if args.copy {
        export::copy_to_clipboard(image)?;
        println!("Copied to clipboard");
    }

    Ok(())
}
