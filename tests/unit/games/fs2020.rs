use super::*;
use std::path::Path;

fn config_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config"))
}

fn adapter() -> Fs2020 {
    let data = GameData::from_path(config_dir().join("games/fs2020.json")).unwrap();
    Fs2020::new(data).unwrap()
}

fn model() -> DeviceModel {
    DeviceModel::from_path(config_dir().join("devices.json")).unwrap()
}

fn parse(files: &[&str]) -> (ParsedBinds, RequestLog) {
    let files: Vec<Vec<u8>> = files.iter().map(|f| f.as_bytes().to_vec()).collect();
    let log = RequestLog::new();
    let out = adapter().parse(&files, &model(), &log);
    (out, log)
}

const STICK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Version Num="1660">
  <Device DeviceName="Saitek Pro Flight X-55 Rhino Stick" GUID="{A1}" ProductID="8853">
    <Context ContextName="PLANE">
      <Action ActionName="KEY_GEAR_TOGGLE" Flag="2">
        <Primary><KEY Information="Joystick Button 1">1</KEY></Primary>
      </Action>
      <Action ActionName="AXIS_AILERONS_SET" Flag="4">
        <Primary><KEY Information="Joystick L-Axis X">30</KEY></Primary>
        <Secondary><KEY Information="Joystick Axis X">31</KEY></Secondary>
      </Action>
      <Action ActionName="KEY_NOTHING" Flag="2">
        <Primary/>
      </Action>
    </Context>
  </Device>
</Version>"#;

fn stick_actions(out: &ParsedBinds) -> &crate::model::GameActions {
    &out.binds[DEFAULT_PROFILE]["SaitekX55Joystick"]["PLANE"]
}

#[test]
fn parses_devices_contexts_and_slots() {
    let (out, log) = parse(&[STICK]);
    assert_eq!(log.error_count(), 0, "{:?}", log.entries());
    assert!(out.devices.contains("SaitekX55Joystick"));
    assert!(out.contexts.contains("PLANE"));

    let actions = stick_actions(&out);
    assert_eq!(actions["KEY_GEAR_TOGGLE"], GameInput::new("Joystick Button 1"));
    assert_eq!(
        actions["AXIS_AILERONS_SET"],
        GameInput::new("Joystick L-Axis X").with_secondary("Joystick Axis X")
    );
    assert!(!actions.contains_key("KEY_NOTHING"));
}

#[test]
fn friendly_name_sets_profile_for_that_file_only() {
    let named = r#"<Version><FriendlyName>Airliner</FriendlyName>
      <Device DeviceName="Saitek Pro Flight X-55 Rhino Throttle">
        <Context ContextName="PLANE">
          <Action ActionName="AXIS_THROTTLE_SET"><Primary><KEY Information="Joystick L-Axis X"/></Primary></Action>
        </Context>
      </Device></Version>"#;
    let (out, _) = parse(&[named, STICK]);
    assert!(out.binds["Airliner"].contains_key("SaitekX55Throttle"));
    assert!(out.binds[DEFAULT_PROFILE].contains_key("SaitekX55Joystick"));
    assert!(!out.binds[DEFAULT_PROFILE].contains_key("SaitekX55Throttle"));
}

#[test]
fn unknown_and_missing_info_devices_are_skipped_but_contexts_kept() {
    let xml = r#"<Version>
      <Device DeviceName="Mystery Stick">
        <Context ContextName="MYSTERY"><Action ActionName="A"><Primary><KEY Information="Joystick Button 1"/></Primary></Action></Context>
      </Device>
      <Device DeviceName="Generic Gamepad">
        <Context ContextName="PAD"/>
      </Device>
    </Version>"#;
    let (out, log) = parse(&[xml]);
    assert!(out.binds.is_empty());
    assert!(out.devices.is_empty());
    assert!(out.contexts.contains("MYSTERY"));
    assert!(out.contexts.contains("PAD"));

    let entries = log.into_entries();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].message.contains("unknown device 'Mystery Stick'"));
    assert!(entries[1].message.contains("missing info"));
}

#[test]
fn duplicates_keep_first_occurrence() {
    let xml = r#"<Version>
      <Device DeviceName="Saitek Pro Flight X-55 Rhino Stick">
        <Context ContextName="PLANE">
          <Action ActionName="KEY_GEAR_TOGGLE"><Primary><KEY Information="Joystick Button 1"/></Primary></Action>
          <Action ActionName="KEY_GEAR_TOGGLE"><Primary><KEY Information="Joystick Button 9"/></Primary></Action>
        </Context>
        <Context ContextName="PLANE">
          <Action ActionName="KEY_FLAPS_INCR"><Primary><KEY Information="Joystick Button 2"/></Primary></Action>
        </Context>
      </Device>
    </Version>"#;
    let (out, log) = parse(&[xml, STICK]);
    let actions = stick_actions(&out);
    assert_eq!(actions["KEY_GEAR_TOGGLE"].primary, "Joystick Button 1");
    assert!(!actions.contains_key("KEY_FLAPS_INCR"));
    // Second file repeats the device in the same profile.
    assert!(!actions.contains_key("AXIS_AILERONS_SET"));

    let messages: Vec<String> = log.into_entries().into_iter().map(|e| e.message).collect();
    assert!(messages.iter().any(|m| m.contains("duplicate action")));
    assert!(messages.iter().any(|m| m.contains("duplicate context")));
    assert!(messages.iter().any(|m| m.contains("duplicate device")));
}

#[test]
fn bad_numbers_are_logged_and_action_kept() {
    let xml = r#"<Version>
      <Device DeviceName="Saitek Pro Flight X-55 Rhino Stick">
        <Context ContextName="PLANE">
          <Action ActionName="KEY_GEAR_TOGGLE" Flag="two"><Primary><KEY Information="Joystick Button 1">one</KEY></Primary></Action>
        </Context>
      </Device>
    </Version>"#;
    let (out, log) = parse(&[xml]);
    assert!(stick_actions(&out).contains_key("KEY_GEAR_TOGGLE"));
    let entries = log.into_entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.is_error && e.message.contains("format error")));
}

#[test]
fn syntax_error_stops_file_but_keeps_earlier_binds() {
    let xml = r#"<Version>
      <Device DeviceName="Saitek Pro Flight X-55 Rhino Stick">
        <Context ContextName="PLANE">
          <Action ActionName="KEY_GEAR_TOGGLE"><Primary><KEY Information="Joystick Button 1"/></Primary></Action>
          <Action ActionName="KEY_FLAPS_INCR"><Primary><KEY Information="Joystick Button 2"/></Secondary></Action>
        </Context>
      </Device>
    </Version>"#;
    let (out, log) = parse(&[xml]);
    let actions = stick_actions(&out);
    assert!(actions.contains_key("KEY_GEAR_TOGGLE"));
    assert!(!actions.contains_key("KEY_FLAPS_INCR"));
    let entries = log.into_entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].message.starts_with("fs2020 file 0: format error: markup syntax error"));
}

#[test]
fn resolve_applies_device_substitutions() {
    let a = adapter();
    assert_eq!(
        a.resolve("SaitekX55Throttle", "Joystick L-Axis X", None).unwrap(),
        "ZAxis"
    );
    assert_eq!(
        a.resolve("SaitekX55Joystick", "Joystick L-Axis X", None).unwrap(),
        "LXAxis"
    );
    assert_eq!(a.logo(), "fs2020");
    assert_eq!(a.label(), "fs2020");
}

#[test]
fn entity_references_are_expanded_in_names_and_text() {
    let xml = r#"<Version>
  <FriendlyName>Airbus &amp; Boeing</FriendlyName>
  <Device DeviceName="Stick &amp; Rudder &#35;2">
    <Context ContextName="PLANE">
      <Action ActionName="KEY_GEAR_TOGGLE" Flag="2">
        <Primary><KEY Information="Joystick Button 1">1</KEY></Primary>
      </Action>
    </Context>
  </Device>
</Version>"#;
    let mut devices = model();
    devices
        .device_name_map
        .insert("Stick & Rudder #2".to_owned(), "SaitekX55Joystick".to_owned());
    let log = RequestLog::new();
    let out = adapter().parse(&[xml.as_bytes().to_vec()], &devices, &log);

    assert_eq!(log.error_count(), 0, "{:?}", log.entries());
    assert!(out.devices.contains("SaitekX55Joystick"));
    let profiles: Vec<&str> = out.binds.keys().map(String::as_str).collect();
    assert_eq!(profiles, vec!["Airbus & Boeing"]);
    assert_eq!(
        out.binds["Airbus & Boeing"]["SaitekX55Joystick"]["PLANE"]["KEY_GEAR_TOGGLE"],
        GameInput::new("Joystick Button 1")
    );
}

#[test]
fn unknown_entity_is_logged_and_parsing_continues() {
    let xml = r#"<Version>
  <FriendlyName>Bush &bogus; Pilot</FriendlyName>
  <Device DeviceName="Saitek Pro Flight X-55 Rhino Stick">
    <Context ContextName="PLANE">
      <Action ActionName="KEY_GEAR_TOGGLE" Flag="2">
        <Primary><KEY Information="Joystick Button 1">1</KEY></Primary>
      </Action>
    </Context>
  </Device>
</Version>"#;
    let (out, log) = parse(&[xml]);
    assert_eq!(log.error_count(), 1, "{:?}", log.entries());
    assert!(out.binds.contains_key("Bush  Pilot"));
}
