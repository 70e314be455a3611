use std::collections::BTreeMap;

use super::*;
use crate::foundation::core::{InputRect, Rgba8};
use crate::model::{DEFAULT_PROFILE, OverlayData, OverlaysByImage};
use crate::render::support::{fixture_config, temp_dir, test_fonts};

fn devices() -> DeviceModel {
    DeviceModel::from_path(concat!(env!("CARGO_MANIFEST_DIR"), "/config/devices.json")).unwrap()
}

fn image_overlays() -> BTreeMap<String, OverlayData> {
    let mut o = OverlayData::new(InputRect::new(320, 400, 460, 60));
    o.push_text("PLANE", "Gear".to_owned());
    BTreeMap::from([("SaitekX55Joystick:1".to_owned(), o)])
}

fn overlays() -> OverlaysByProfile {
    let by_image = OverlaysByImage::from([
        ("x55".to_owned(), image_overlays()),
        ("missing".to_owned(), image_overlays()),
    ]);
    OverlaysByProfile::from([
        ("Zulu".to_owned(), by_image.clone()),
        (DEFAULT_PROFILE.to_owned(), by_image),
    ])
}

#[test]
fn zero_threads_is_rejected() {
    assert!(CardRenderer::new(Some(0)).is_err());
    assert_eq!(CardRenderer::new(Some(3)).unwrap().threads(), 3);
}

#[test]
fn missing_logo_yields_no_cards() {
    let root = temp_dir("pipeline_no_logo");
    let cfg = fixture_config(&root);
    let model = devices();
    let fonts = FontLibrary::default();
    let overlays = overlays();
    let colours = ContextToColours::new();
    let log = RequestLog::new();
    let req = RenderRequest {
        overlays: &overlays,
        colours: &colours,
        logo_id: "no-such-logo",
        config: &cfg,
        devices: &model,
        fonts: &fonts,
    };
    let out = CardRenderer::new(Some(1)).unwrap().render(&req, &log);
    assert!(out.cards.is_empty());
    assert_eq!(out.total_bytes, 0);
    let entries = log.into_entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].message.starts_with("logo "));
}

#[test]
fn cards_are_ordered_and_failures_stay_in_their_slot() {
    let Some(fonts) = test_fonts() else {
        eprintln!("skipping: no TrueType font available");
        return;
    };
    let root = temp_dir("pipeline_order");
    let cfg = fixture_config(&root);
    let model = devices();
    let overlays = overlays();
    let colours = ContextToColours::from([("PLANE".to_owned(), Rgba8::rgb(0, 90, 0))]);
    let req = RenderRequest {
        overlays: &overlays,
        colours: &colours,
        logo_id: "fs2020",
        config: &cfg,
        devices: &model,
        fonts: &fonts,
    };

    let log = RequestLog::new();
    let out = CardRenderer::new(Some(4)).unwrap().render(&req, &log);
    let order: Vec<(&str, &str)> = out
        .cards
        .iter()
        .map(|c| (c.profile.as_str(), c.image.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Zulu", "missing"),
            ("Zulu", "x55"),
            (DEFAULT_PROFILE, "missing"),
            (DEFAULT_PROFILE, "x55"),
        ]
    );
    assert!(out.cards[0].jpeg.is_empty());
    assert!(!out.cards[1].jpeg.is_empty());
    assert!(out.cards[2].jpeg.is_empty());
    assert_eq!(
        out.total_bytes,
        out.cards.iter().map(|c| c.jpeg.len()).sum::<usize>()
    );
    assert_eq!(log.error_count(), 2);

    // Same input, different pool size, same bytes.
    let again = CardRenderer::new(Some(1))
        .unwrap()
        .render(&req, &RequestLog::new());
    assert_eq!(again.cards, out.cards);
}
