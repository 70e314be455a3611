//! Star Wars Squadrons `settings.txt` exports.
//!
//! Binding subfields arrive on separate, unordered lines:
//!
//! ```text
//! GstInput.JoystickDevice1 Saitek Pro Flight X-55 Rhino Stick
//! GstKeyBinding.IncomStarshipInputConcepts.ConceptFirePrimary.0.button 22
//! GstKeyBinding.IncomStarshipInputConcepts.ConceptFirePrimary.0.deviceid 0
//! GstKeyBinding.IncomStarshipInputConcepts.ConceptFirePrimary.0.axis 26
//! ```
//!
//! so they are buffered per (context, action, override index) and resolved in a second pass.

use std::collections::BTreeMap;

use regex::Regex;

use crate::data::devices::{DeviceInputs, DeviceModel};
use crate::data::game::GameData;
use crate::foundation::error::{RefcardError, RefcardResult};
use crate::foundation::log::RequestLog;
use crate::games::{GameAdapter, GameKind};
use crate::model::{DEFAULT_PROFILE, DEVICE_MISSING_INFO, GameInput, ParsedBinds};
use crate::resolve::{AxisCodeFields, resolve_axis_code};

const BIND_PREFIX: &str = "GstKeyBinding.";
const JOYSTICK_PREFIX: &str = "GstInput.JoystickDevice";

/// Subfields that carry nothing the cards need.
const IGNORED_SUBFIELDS: &[&str] = &["altbutton", "identifier", "modifier", "negate", "type"];

/// Context -> action -> override index -> subfield -> value.
type CandidateIndex = BTreeMap<String, BTreeMap<String, BTreeMap<u32, BTreeMap<String, String>>>>;

pub struct Sws {
    data: GameData,
    bind: Regex,
    joystick: Regex,
}

impl Sws {
    pub fn new(data: GameData) -> RefcardResult<Self> {
        let bind = compile(&data, "Bind", 5)?;
        let joystick = compile(&data, "Joystick", 2)?;
        Ok(Self {
            data,
            bind,
            joystick,
        })
    }

    fn index_line(
        &self,
        line: &str,
        devices: &DeviceModel,
        candidates: &mut CandidateIndex,
        device_ids: &mut BTreeMap<String, String>,
        out: &mut ParsedBinds,
        log: &RequestLog,
    ) {
        if line.starts_with(BIND_PREFIX) {
            let Some(c) = self.bind.captures(line) else {
                return;
            };
            let override_idx = match c[3].parse::<u32>() {
                Ok(v) => v,
                Err(_) => {
                    log.error(
                        "sws",
                        &RefcardError::format(format!(
                            "override index '{}' is not a number",
                            &c[3]
                        )),
                    );
                    return;
                }
            };
            out.contexts.insert(c[1].to_owned());
            candidates
                .entry(c[1].to_owned())
                .or_default()
                .entry(c[2].to_owned())
                .or_default()
                .entry(override_idx)
                .or_default()
                .insert(c[4].to_owned(), c[5].trim().to_owned());
        } else if line.starts_with(JOYSTICK_PREFIX) {
            let Some(c) = self.joystick.captures(line) else {
                return;
            };
            let full = c[2].trim();
            if full.is_empty() {
                return;
            }
            let short = match devices.short_name(full) {
                None => {
                    log.error(
                        "sws",
                        &RefcardError::unknown_reference(format!("unknown device '{full}'")),
                    );
                    return;
                }
                Some(DEVICE_MISSING_INFO) => {
                    log.err(format!("sws: missing info for device '{full}'"));
                    return;
                }
                Some(short) => short,
            };
            // Joystick numbers are 1-based; binding device ids are 0-based.
            match c[1].parse::<u32>() {
                Ok(n) if n >= 1 => {
                    device_ids.insert((n - 1).to_string(), short.to_owned());
                    out.devices.insert(short.to_owned());
                }
                _ => log.error(
                    "sws",
                    &RefcardError::format(format!("unexpected joystick number '{}'", &c[1])),
                ),
            }
        }
    }
}

impl GameAdapter for Sws {
    fn kind(&self) -> GameKind {
        GameKind::Sws
    }

    fn game_data(&self) -> &GameData {
        &self.data
    }

    fn parse(&self, files: &[Vec<u8>], devices: &DeviceModel, log: &RequestLog) -> ParsedBinds {
        let mut out = ParsedBinds::default();
        let mut candidates = CandidateIndex::new();
        let mut device_ids = BTreeMap::new();

        for file in files {
            let text = String::from_utf8_lossy(file);
            for line in text.lines() {
                self.index_line(
                    line.trim_start(),
                    devices,
                    &mut candidates,
                    &mut device_ids,
                    &mut out,
                    log,
                );
            }
        }

        let profile = out.binds.entry(DEFAULT_PROFILE.to_owned()).or_default();
        for (context, actions) in &candidates {
            for (action, overrides) in actions {
                // Ascending override order decides primary vs secondary.
                for subfields in overrides.values() {
                    let Some(fields) = collect_fields(context, action, subfields, log) else {
                        continue;
                    };
                    if fields.device_id == "-1" {
                        continue;
                    }
                    let Some(device) = device_ids.get(&fields.device_id) else {
                        continue;
                    };
                    let input = match resolve_axis_code(device, &fields) {
                        Ok(Some(input)) => input,
                        Ok(None) => continue,
                        Err(e) => {
                            log.error(&format!("sws {context}.{action}"), &e);
                            continue;
                        }
                    };

                    let bound = profile
                        .entry(device.clone())
                        .or_default()
                        .entry(context.clone())
                        .or_default();
                    match bound.get_mut(action) {
                        None => {
                            bound.insert(action.clone(), GameInput::new(input));
                        }
                        Some(existing) => {
                            if existing.primary != input && existing.secondary.is_none() {
                                existing.secondary = Some(input);
                            }
                        }
                    }
                }
            }
        }
        if profile.is_empty() {
            out.binds.clear();
        }
        out
    }

    /// Inputs are already canonical after parsing.
    fn resolve(
        &self,
        _device: &str,
        raw: &str,
        _inputs: Option<&DeviceInputs>,
    ) -> RefcardResult<String> {
        Ok(raw.to_owned())
    }
}

fn collect_fields(
    context: &str,
    action: &str,
    subfields: &BTreeMap<String, String>,
    log: &RequestLog,
) -> Option<AxisCodeFields> {
    let mut fields = AxisCodeFields::default();
    let mut any = false;
    for (name, value) in subfields {
        match name.to_ascii_lowercase().as_str() {
            "axis" => fields.axis = value.clone(),
            "button" => fields.button = value.clone(),
            "deviceid" => fields.device_id = value.clone(),
            other if IGNORED_SUBFIELDS.contains(&other) => continue,
            _ => {
                log.error(
                    &format!("sws {context}.{action}"),
                    &RefcardError::format(format!("unknown subfield '{name}' value '{value}'")),
                );
                continue;
            }
        }
        any = true;
    }
    any.then_some(fields)
}

fn compile(data: &GameData, name: &str, groups: usize) -> RefcardResult<Regex> {
    let src = data
        .regexes
        .get(name)
        .ok_or_else(|| RefcardError::validation(format!("missing regex '{name}'")))?;
    let re = Regex::new(src)
        .map_err(|e| RefcardError::validation(format!("invalid regex '{name}': {e}")))?;
    if re.captures_len() != groups + 1 {
        return Err(RefcardError::validation(format!(
            "regex '{name}' must have {groups} capture groups"
        )));
    }
    Ok(re)
}

#[cfg(test)]
#[path = "../../tests/unit/games/sws.rs"]
mod tests;
