use clap::{ArgGroup, Parser, ValueEnum};
use image::Rgb;
use qr_studio::style::{parse_hex_color, ModuleStyle};
use qrcode::EcLevel;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug)]
#[clap(rename_all = "UPPER")]
pub enum EcArg {
    L,
    M,
    Q,
    H,
}

impl From<EcArg> for EcLevel {
    fn from(v: EcArg) -> Self {
        match v {
            EcArg::L => EcLevel::L,
            EcArg::M => EcLevel::M,
            EcArg::Q => EcLevel::Q,
            EcArg::H => EcLevel::H,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StyleArg {
    Square,
    Rounded,
    Circle,
}

impl From<StyleArg> for ModuleStyle {
    fn from(v: StyleArg) -> Self {
        match v {
            StyleArg::Square => ModuleStyle::Square,
            StyleArg::Rounded => ModuleStyle::Rounded,
            StyleArg::Circle => ModuleStyle::Circle,
        }
    }
}

fn color(s: &str) -> Result<Rgb<u8>, String> {
    parse_hex_color(s).map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(name = "qr-studio")]
#[command(about = "Generate styled QR codes with an optional logo, caption and rounded corners")]
#[command(group(ArgGroup::new("target").required(true).multiple(true).args(["output", "copy"])))]
pub struct Args {
    /// Text or URL to encode
    #[arg(short, long)]
    pub text: String,

    /// Caption drawn below the code
    #[arg(long, default_value = "")]
    pub caption: String,

    /// Module color as #RRGGBB
    #[arg(long, default_value = "#000000", value_parser = color)]
    pub fill: Rgb<u8>,

    /// Background color as #RRGGBB
    #[arg(long, default_value = "#FFFFFF", value_parser = color)]
    pub back: Rgb<u8>,

    /// Module shape
    #[arg(short, long, value_enum, default_value = "square")]
    pub style: StyleArg,

    /// QR code error correction level (L, M, Q, H); a logo always forces H
    #[arg(short = 'e', long, default_value = "H")]
    pub error_correction: EcArg,

    /// Pixel size of one module
    #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    pub module_size: u32,

    /// Quiet-zone width in modules
    #[arg(short, long, default_value = "4")]
    pub border: u32,

    /// Logo image placed at the centre
    #[arg(short, long)]
    pub logo: Option<PathBuf>,

    /// Logo size as a percentage of the code height
    #[arg(long, default_value = "25", value_parser = clap::value_parser!(u8).range(10..=50))]
    pub logo_size: u8,

    /// Corner radius of the final image in pixels (0 disables rounding)
    #[arg(short, long, default_value = "0")]
    pub radius: u32,

    /// Caption font file (TTF/OTF)
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Output image path (.png or .jpg)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Copy the image to the system clipboard
    #[arg(short, long)]
    pub copy: bool,
}
