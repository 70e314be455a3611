use std::collections::BTreeMap;

use regex::Regex;

use crate::data::devices::DeviceInputs;
use crate::data::game::InputTypeMapping;
use crate::foundation::error::{RefcardError, RefcardResult};

/// Pattern classes in match priority order.
pub const PATTERN_NAMES: [&str; 5] = ["Button", "Axis", "Pov", "Rotation", "Slider"];

/// Resolves free-text input names (`"Joystick L-Axis X"`) to canonical input ids.
///
/// Classes are tried in [`PATTERN_NAMES`] order and the first match decides the outcome,
/// even when that outcome is a failure.
#[derive(Clone, Debug)]
pub struct PatternResolver {
    button: Regex,
    axis: Regex,
    pov: Regex,
    rotation: Regex,
    slider: Regex,
}

impl PatternResolver {
    /// Compile the five required patterns from a title's named regexes.
    pub fn new(regexes: &BTreeMap<String, String>) -> RefcardResult<Self> {
        let missing: Vec<&str> = PATTERN_NAMES
            .into_iter()
            .filter(|name| !regexes.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(RefcardError::validation(format!(
                "missing regexes: {}",
                missing.join(", ")
            )));
        }

        let compile = |name: &str| -> RefcardResult<Regex> {
            Regex::new(&regexes[name])
                .map_err(|e| RefcardError::validation(format!("invalid regex '{name}': {e}")))
        };
        Ok(Self {
            button: compile("Button")?,
            axis: compile("Axis")?,
            pov: compile("Pov")?,
            rotation: compile("Rotation")?,
            slider: compile("Slider")?,
        })
    }

    /// Resolve `raw` for `device`.
    ///
    /// `subs` is the device's substitution table; `inputs` the device's known inputs, which a
    /// slider must exist in.
    pub fn resolve(
        &self,
        device: &str,
        raw: &str,
        subs: Option<&InputTypeMapping>,
        inputs: Option<&DeviceInputs>,
    ) -> RefcardResult<String> {
        if let Some(c) = self.button.captures(raw) {
            return Ok(group(&c, 1).to_owned());
        }

        if let Some(c) = self.axis.captures(raw) {
            let axis = format!("{}{}", group(&c, 1), group(&c, 2));
            let axis = substitute(subs, "Axis", &axis).map(str::to_owned).unwrap_or(axis);
            return Ok(format!("{axis}Axis"));
        }

        if let Some(c) = self.pov.captures(raw) {
            let index = match group(&c, 1) {
                "" => "1",
                idx => idx,
            };
            return Ok(format!("POV{index}{}", title_case(group(&c, 2))));
        }

        if let Some(c) = self.rotation.captures(raw) {
            let letter = group(&c, 1);
            return Ok(match substitute(subs, "Rotation", letter) {
                Some(s) => format!("{s}Axis"),
                None => format!("R{letter}Axis"),
            });
        }

        if let Some(c) = self.slider.captures(raw) {
            let letter = group(&c, 1);
            let Some(s) = substitute(subs, "Slider", letter) else {
                return Err(RefcardError::unknown_reference(format!(
                    "no slider mapping for '{raw}' on device {device}"
                )));
            };
            let slider = format!("{s}Axis");
            if inputs.is_some_and(|i| i.contains_key(&slider)) {
                return Ok(slider);
            }
            return Err(RefcardError::unknown_reference(format!(
                "slider {slider} not found on device {device}"
            )));
        }

        Err(RefcardError::unknown_reference(format!(
            "no input pattern matches '{raw}' on device {device}"
        )))
    }
}

fn substitute<'a>(subs: Option<&'a InputTypeMapping>, kind: &str, key: &str) -> Option<&'a str> {
    subs?.get(kind)?.get(key).map(String::as_str)
}

fn group<'h>(c: &regex::Captures<'h>, i: usize) -> &'h str {
    c.get(i).map_or("", |m| m.as_str())
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/pattern.rs"]
mod tests;
