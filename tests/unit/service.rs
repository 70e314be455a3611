use super::*;
use crate::render::support::{fixture_config, temp_dir, test_fonts};

const STICK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Version Num="1660">
  <FriendlyName>Airliner</FriendlyName>
  <Device DeviceName="Saitek Pro Flight X-55 Rhino Stick" GUID="{A1}" ProductID="8853">
    <Context ContextName="PLANE">
      <Action ActionName="KEY_GEAR_TOGGLE" Flag="2">
        <Primary><KEY Information="Joystick Button 1">1</KEY></Primary>
      </Action>
      <Action ActionName="KEY_FLAPS_INCR" Flag="2">
        <Primary><KEY Information="Joystick Button 1">1</KEY></Primary>
      </Action>
    </Context>
  </Device>
  <Device DeviceName="Generic Gamepad" GUID="{B2}" ProductID="1">
    <Context ContextName="MENU"/>
  </Device>
</Version>"#;

fn devices() -> DeviceModel {
    DeviceModel::from_path(concat!(env!("CARGO_MANIFEST_DIR"), "/config/devices.json")).unwrap()
}

#[test]
fn unavailable_title_fails_the_request() {
    let root = temp_dir("service_no_games");
    let mut cfg = fixture_config(&root);
    cfg.game_data_dir = root.join("nowhere");
    let service = RefCardService::from_parts(cfg, devices(), FontLibrary::default()).unwrap();
    let err = service.generate(GameKind::Sws, &[]).unwrap_err();
    assert!(err.to_string().contains("game data for sws unavailable"));
}

#[test]
fn empty_request_produces_no_cards() {
    let root = temp_dir("service_empty");
    let service =
        RefCardService::from_parts(fixture_config(&root), devices(), FontLibrary::default())
            .unwrap();
    let resp = service.generate(GameKind::Sws, &[Vec::new()]).unwrap();
    assert!(resp.cards.is_empty());
    assert_eq!(resp.total_bytes, 0);
    assert!(resp.log.iter().all(|e| !e.is_error), "{:?}", resp.log);
    assert!(resp.log[0].message.contains("Star Wars Squadrons"));
}

#[test]
fn fs2020_request_renders_one_card_per_profile_image() {
    let Some(fonts) = test_fonts() else {
        eprintln!("skipping: no TrueType font available");
        return;
    };
    let root = temp_dir("service_fs2020");
    let service = RefCardService::from_parts(fixture_config(&root), devices(), fonts).unwrap();
    let resp = service
        .generate(GameKind::Fs2020, &[STICK.as_bytes().to_vec()])
        .unwrap();

    assert_eq!(resp.cards.len(), 1);
    assert_eq!(resp.cards[0].profile, "Airliner");
    assert_eq!(resp.cards[0].image, "x55");
    assert_eq!(resp.rendered().count(), 1);
    assert_eq!(resp.total_bytes, resp.cards[0].jpeg.len());

    // The gamepad has no device info.
    let errors: Vec<&str> = resp
        .log
        .iter()
        .filter(|e| e.is_error)
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("missing info"));
}
