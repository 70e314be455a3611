use super::*;

const SAMPLE: &str = include_str!("../../config/config.json");

fn sample() -> Config {
    Config::from_reader(SAMPLE.as_bytes()).unwrap()
}

#[test]
fn sample_config_parses_and_validates() {
    let cfg = sample();
    cfg.validate().unwrap();
    assert_eq!(cfg.jpg_quality, 85);
    assert_eq!(cfg.default_image.w, 4096);
    assert_eq!(cfg.image_header.text_colour, Rgba8::WHITE);
    assert_eq!(cfg.alternate_colours.len(), 10);
    assert_eq!(cfg.render_threads, Some(4));
}

#[test]
fn relative_paths_resolve_against_config_dir() {
    let mut cfg = sample();
    cfg.fonts_dir = PathBuf::from("/abs/fonts");
    cfg.resolve_paths(Path::new("/etc/refcard"));
    assert_eq!(cfg.devices_file, PathBuf::from("/etc/refcard/devices.json"));
    assert_eq!(cfg.game_data_dir, PathBuf::from("/etc/refcard/games"));
    assert_eq!(cfg.fonts_dir, PathBuf::from("/abs/fonts"));
    assert_eq!(
        cfg.hotas_image_path("x55"),
        PathBuf::from("/etc/refcard/images/hotas/x55.jpg")
    );
}

#[test]
fn validation_rejects_bad_values() {
    let mut cfg = sample();
    cfg.jpg_quality = 0;
    assert!(matches!(cfg.validate(), Err(RefcardError::Validation(_))));

    let mut cfg = sample();
    cfg.alternate_colours.clear();
    assert!(cfg.validate().is_err());

    let mut cfg = sample();
    cfg.render_threads = Some(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn unknown_keys_are_rejected() {
    let mut v: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
    v["Bogus"] = serde_json::json!(1);
    let err = Config::from_reader(v.to_string().as_bytes()).unwrap_err();
    assert!(err.to_string().starts_with("serialization error: "));
}

#[test]
fn font_names_are_deduplicated() {
    let cfg = sample();
    assert_eq!(
        cfg.font_names(),
        vec!["YanoneKaffeesatz-Bold.ttf", "YanoneKaffeesatz-Regular.ttf"]
    );
    assert_eq!(cfg.watermark_text(), "refcard v0.1.0 (refcard.local)");
}

#[test]
fn overlay_start_size_is_not_configurable() {
    let mut v: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
    v["InputFontSize"] = 60.into();
    assert!(Config::from_reader(v.to_string().as_bytes()).is_err());
}
