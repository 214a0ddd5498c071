use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use qr_studio::caption::{font_size_for, CaptionFont};
use qr_studio::export::{self, encode_png, ExportFormat};
use qr_studio::render::render;
use qr_studio::{generate, GenerationState, ModuleStyle, StudioError, StyleParameters, Studio};
use qrcode::{EcLevel, QrCode};

const URL: &str = "https://example.com/";

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("qr-studio-it-{}-{name}", std::process::id()))
}

fn params(payload: &str) -> StyleParameters {
    StyleParameters {
        payload: payload.into(),
        ..Default::default()
    }
}

fn ready(state: GenerationState) -> qr_studio::Generation {
    match state {
        GenerationState::Ready(generation) => generation,
        other => panic!("expected a finished image, got {other:?}"),
    }
}

fn module_count(payload: &str, level: EcLevel) -> u32 {
    QrCode::with_error_correction_level(payload, level)
        .unwrap()
        .width() as u32
}

#[test]
fn side_length_follows_module_count() {
    for (payload, module_size, border) in [("a", 1, 0), ("hello world", 3, 2), (URL, 10, 4)] {
        let p = StyleParameters {
            module_size,
            border,
            ..params(payload)
        };
        let generation = ready(generate(&p));
        let expected = (module_count(payload, EcLevel::H) + 2 * border) * module_size;
        assert_eq!(generation.image.dimensions(), (expected, expected));
        assert!(generation.image.pixels().all(|px| px[3] == 255));
        assert!(generation.warnings.is_empty());
    }
}

#[test]
fn example_url_is_reproducible_byte_for_byte() {
    let p = params(URL);
    let first = ready(generate(&p));
    let second = ready(generate(&p));

    let side = (module_count(URL, EcLevel::H) + 8) * 10;
    assert_eq!(first.image.dimensions(), (side, side));
    assert_eq!(first.image, second.image);
    assert_eq!(
        encode_png(&first.image).unwrap(),
        encode_png(&second.image).unwrap()
    );
}

#[test]
fn every_style_is_deterministic() {
    for style in [ModuleStyle::Square, ModuleStyle::Rounded, ModuleStyle::Circle] {
        let p = StyleParameters {
            module_style: style,
            caption: "Example".into(),
            corner_radius: 25,
            ..params(URL)
        };
        assert_eq!(ready(generate(&p)).image, ready(generate(&p)).image);
    }
}

#[test]
fn empty_payload_is_idle() {
    assert!(matches!(generate(&params("")), GenerationState::Idle));
}

#[test]
fn caption_grows_height_only() {
    let plain = ready(generate(&params(URL))).image;
    let captioned = ready(generate(&StyleParameters {
        caption: "Example".into(),
        ..params(URL)
    }))
    .image;

    let font = CaptionFont::resolve(None);
    let text_height = font.measure("Example", font_size_for(plain.width())).height();

    assert_eq!(captioned.width(), plain.width());
    assert_eq!(captioned.height(), plain.height() + text_height + 30);
    for (x, y, px) in plain.enumerate_pixels() {
        assert_eq!(captioned.get_pixel(x, y), px);
    }
}

#[test]
fn unusable_caption_font_falls_back_without_error() {
    let font_path = temp_path("junk-font.ttf");
    std::fs::write(&font_path, b"not a font at all").unwrap();

    let plain = ready(generate(&params(URL))).image;
    let state = generate(&StyleParameters {
        caption: "Example".into(),
        font: Some(font_path.clone()),
        ..params(URL)
    });
    std::fs::remove_file(&font_path).ok();

    let generation = ready(state);
    assert!(generation.warnings.is_empty());
    assert_eq!(generation.image.width(), plain.width());
    assert!(generation.image.height() > plain.height() + 30);
}

#[test]
fn missing_caption_font_falls_back_without_error() {
    let generation = ready(generate(&StyleParameters {
        caption: "Example".into(),
        font: Some(PathBuf::from("/nonexistent/qr-studio/font.ttf")),
        ..params(URL)
    }));
    assert!(generation.warnings.is_empty());
    // The caption band makes the image taller than the square code.
    assert!(generation.image.height() > generation.image.width());
}

#[test]
fn oversized_module_size_fails_instead_of_allocating() {
    let state = generate(&StyleParameters {
        module_size: 1_000_000,
        border: 0,
        ..params("a")
    });
    assert!(matches!(
        state,
        GenerationState::Failed(StudioError::InvalidParameter(_))
    ));
}

#[test]
fn whitespace_caption_changes_nothing() {
    let plain = ready(generate(&params(URL))).image;
    let spaced = ready(generate(&StyleParameters {
        caption: "   ".into(),
        ..params(URL)
    }))
    .image;
    assert_eq!(plain, spaced);
}

#[test]
fn unreadable_logo_degrades_to_base_render() {
    let path = temp_path("broken-logo.png");
    std::fs::write(&path, b"this is text, not an image").unwrap();

    let mut p = params(URL);
    p.logo.enabled = true;
    p.logo.path = Some(path.clone());
    let generation = ready(generate(&p));
    std::fs::remove_file(&path).ok();

    let base = render(
        URL,
        EcLevel::H,
        10,
        4,
        ModuleStyle::Square,
        p.fill_color,
        p.back_color,
    )
    .unwrap();
    assert_eq!(generation.image, base);
    assert_eq!(generation.warnings.len(), 1);
    assert!(matches!(generation.warnings[0], StudioError::Logo { .. }));
}

#[test]
fn logo_forces_level_h_and_is_drawn() {
    let path = temp_path("red-logo.png");
    RgbaImage::from_pixel(64, 64, Rgba([255, 0, 0, 255]))
        .save(&path)
        .unwrap();

    let mut p = StyleParameters {
        error_correction: EcLevel::L,
        ..params(URL)
    };
    p.logo.enabled = true;
    p.logo.path = Some(path.clone());
    let generation = ready(generate(&p));
    std::fs::remove_file(&path).ok();

    let side = (module_count(URL, EcLevel::H) + 8) * 10;
    assert_eq!(generation.image.dimensions(), (side, side));
    assert_eq!(*generation.image.get_pixel(side / 2, side / 2), Rgba([255, 0, 0, 255]));
    assert!(generation.warnings.is_empty());
}

#[test]
fn studio_disables_broken_logo_but_remembers_path() {
    let path = temp_path("studio-logo.png");
    std::fs::write(&path, b"nope").unwrap();

    let mut studio = Studio::new(params(URL));
    let state = studio.choose_logo(path.clone());
    assert!(matches!(state, GenerationState::Ready(g) if g.logo_failed()));
    assert!(!studio.params().logo.enabled);
    assert_eq!(studio.params().logo.path.as_ref(), Some(&path));

    // Fix the file and re-enable: the stored path is picked up again.
    RgbaImage::from_pixel(32, 32, Rgba([0, 0, 255, 255]))
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();
    let state = studio.set_logo_enabled(true);
    let generation = match state {
        GenerationState::Ready(g) => g,
        other => panic!("expected a finished image, got {other:?}"),
    };
    assert!(generation.warnings.is_empty());
    let side = generation.image.width();
    assert_eq!(*generation.image.get_pixel(side / 2, side / 2), Rgba([0, 0, 255, 255]));
    assert!(studio.params().logo.enabled);
    std::fs::remove_file(&path).ok();
}

#[test]
fn zero_radius_keeps_corners_opaque_and_radius_clears_them() {
    let square = ready(generate(&params(URL))).image;
    assert_eq!(square.get_pixel(0, 0)[3], 255);

    let rounded = ready(generate(&StyleParameters {
        corner_radius: 40,
        ..params(URL)
    }))
    .image;
    assert_eq!(rounded.dimensions(), square.dimensions());
    assert_eq!(rounded.get_pixel(0, 0)[3], 0);
    let (cx, cy) = (square.width() / 2, square.height() / 2);
    assert_eq!(rounded.get_pixel(cx, cy), square.get_pixel(cx, cy));
}

#[test]
fn unencodable_payload_fails() {
    let state = generate(&params(&"9".repeat(8000)));
    assert!(matches!(state, GenerationState::Failed(StudioError::Encoding { .. })));
}

#[test]
fn jpeg_export_flattens_rounded_corners_to_white() {
    let image = ready(generate(&StyleParameters {
        corner_radius: 50,
        ..params(URL)
    }))
    .image;
    let path = temp_path("rounded.jpg");
    assert_eq!(export::save(&image, &path).unwrap(), ExportFormat::Jpeg);

    let back = image::open(&path).unwrap().to_rgb8();
    std::fs::remove_file(&path).ok();
    assert_eq!(back.dimensions(), image.dimensions());
    let corner = back.get_pixel(0, 0);
    assert!(corner.0.iter().all(|&c| c > 240), "corner was {corner:?}");
}

#[test]
fn png_export_keeps_alpha() {
    let image = ready(generate(&StyleParameters {
        corner_radius: 30,
        ..params("alpha")
    }))
    .image;
    let path = temp_path("rounded.png");
    export::save(&image, &path).unwrap();
    let back = image::open(&path).unwrap().to_rgba8();
    std::fs::remove_file(&path).ok();
    assert_eq!(back, image);
}

#[test]
fn unsupported_extension_is_reported() {
    let image = RgbaImage::new(4, 4);
    let err = export::save(&image, &temp_path("code.bmp")).unwrap_err();
    assert!(matches!(err, StudioError::UnsupportedFormat(_)));
}
