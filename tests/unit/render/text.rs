use super::*;
use crate::render::support::{TEST_FONT, test_fonts};

#[test]
fn missing_font_file_is_a_validation_error() {
    let dir = std::env::temp_dir();
    let err = FontLibrary::load(&dir, ["refcard-no-such-font.ttf"]).unwrap_err();
    assert!(err.to_string().starts_with("validation error: read font"), "{err}");
}

#[test]
fn unknown_font_name_is_reported() {
    let fonts = FontLibrary::default();
    let mut engine = TextEngine::new(&fonts);
    let err = engine.measure("nope.ttf", 12, "Gear").unwrap_err();
    assert!(err.to_string().contains("font nope.ttf not loaded"));
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let mut fonts = FontLibrary::default();
    fonts.insert("junk.ttf", b"definitely not a font".to_vec());
    let mut engine = TextEngine::new(&fonts);
    assert!(engine.measure("junk.ttf", 12, "Gear").is_err());
}

#[test]
fn measurements_grow_with_size_and_text() {
    let Some(fonts) = test_fonts() else {
        eprintln!("skipping: no TrueType font available");
        return;
    };
    let mut engine = TextEngine::new(&fonts);
    let small = engine.measure(TEST_FONT, 20, "Gear").unwrap();
    let large = engine.measure(TEST_FONT, 40, "Gear").unwrap();
    let longer = engine.measure(TEST_FONT, 20, "Gear up").unwrap();
    assert!(small.width > 0 && small.height > 0);
    assert!(small.height <= 20);
    assert!(large.width > small.width);
    assert!(large.height > small.height);
    assert!(longer.width > small.width);

    let with_space = engine.measure(TEST_FONT, 20, "Gear ").unwrap();
    assert!(with_space.width > small.width);

    // Cached result matches a fresh engine.
    let mut fresh = TextEngine::new(&fonts);
    assert_eq!(fresh.measure(TEST_FONT, 20, "Gear").unwrap(), small);
    assert_eq!(engine.measure(TEST_FONT, 20, "Gear").unwrap(), small);
}

#[test]
fn line_height_includes_descent() {
    let Some(fonts) = test_fonts() else {
        eprintln!("skipping: no TrueType font available");
        return;
    };
    let mut engine = TextEngine::new(&fonts);
    let small = engine.shape(TEST_FONT, 20, "gjpqy", Rgba8::WHITE).unwrap();
    let large = engine.shape(TEST_FONT, 40, "gjpqy", Rgba8::WHITE).unwrap();
    assert!(small.descent > 0.0);
    assert!(small.line_height() > small.extent.height);
    assert!(large.line_height() > small.line_height());
}

#[test]
fn engines_share_library_font_bytes() {
    let Some(fonts) = test_fonts() else {
        eprintln!("skipping: no TrueType font available");
        return;
    };
    let before = std::sync::Arc::strong_count(fonts.get(TEST_FONT).unwrap());
    let mut engine = TextEngine::new(&fonts);
    engine.measure(TEST_FONT, 20, "Gear").unwrap();
    assert!(std::sync::Arc::strong_count(fonts.get(TEST_FONT).unwrap()) > before);
}
