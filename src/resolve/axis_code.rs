//! Literal input tables for titles that export numeric axis codes.
//!
//! The values were reverse engineered against Saitek X-55 hardware. They are opaque: distinct
//! codes mapping to the same axis is expected, and no formula is implied.

use crate::foundation::error::{RefcardError, RefcardResult};

/// Axis codes that name an axis directly, whatever the button field says.
const AXIS_CODES: &[(&str, &str)] = &[
    ("8", "XAxis"), // throttle
    ("9", "YAxis"),
    ("10", "XAxis"),
    ("11", "YAxis"),
];

/// Axis code whose button field carries the real input.
const BUTTON_AXIS_CODE: &str = "26";

/// Button ranges on [`BUTTON_AXIS_CODE`] that map to `button - offset`.
const BUTTON_OFFSETS: &[(u32, u32, u32)] = &[
    // (first, last, offset)
    (22, 39, 21),
    (64, 85, 45),
];

/// Button on [`BUTTON_AXIS_CODE`] that carries no input.
const IGNORED_BUTTON: u32 = 86;

/// Device-specific buttons on [`BUTTON_AXIS_CODE`].
const DEVICE_BUTTONS: &[(&str, u32, &str)] = &[
    ("SaitekX55Joystick", 46, "RZAxis"),
    ("SaitekX55Joystick", 47, "RZAxis"),
    ("SaitekX55Joystick", 48, "POV1Up"),
    ("SaitekX55Joystick", 49, "POV1Down"),
    ("SaitekX55Joystick", 50, "POV1Left"),
    ("SaitekX55Joystick", 51, "POV1Right"),
    ("SaitekX55Throttle", 40, "ZAxis"),
    ("SaitekX55Throttle", 41, "ZAxis"),
    ("SaitekX55Throttle", 42, "RXAxis"),
    ("SaitekX55Throttle", 43, "RXAxis"),
    ("SaitekX55Throttle", 44, "RYAxis"),
    ("SaitekX55Throttle", 45, "RYAxis"),
    ("SaitekX55Throttle", 46, "RZAxis"),
    ("SaitekX55Throttle", 47, "RZAxis"),
];

/// Fields of one binding candidate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AxisCodeFields {
    pub axis: String,
    pub button: String,
    pub device_id: String,
}

/// Map a candidate on `device` to a canonical input id.
///
/// `Ok(None)` means the candidate is deliberately ignored.
pub fn resolve_axis_code(device: &str, fields: &AxisCodeFields) -> RefcardResult<Option<String>> {
    if fields.device_id == "-1" {
        return Ok(None);
    }

    if let Some((_, axis)) = AXIS_CODES.iter().find(|(code, _)| *code == fields.axis) {
        return Ok(Some((*axis).to_owned()));
    }

    if fields.axis == BUTTON_AXIS_CODE {
        let button: u32 = fields.button.trim().parse().map_err(|_| {
            RefcardError::format(format!(
                "button '{}' is not a number on device {device}",
                fields.button
            ))
        })?;

        for &(first, last, offset) in BUTTON_OFFSETS {
            if (first..=last).contains(&button) {
                return Ok(Some((button - offset).to_string()));
            }
        }
        if button == IGNORED_BUTTON {
            return Ok(None);
        }
        if let Some((_, _, input)) = DEVICE_BUTTONS
            .iter()
            .find(|(d, b, _)| *d == device && *b == button)
        {
            return Ok(Some((*input).to_owned()));
        }
    }

    Err(RefcardError::unknown_reference(format!(
        "unknown input on device {device}: axis '{}' button '{}'",
        fields.axis, fields.button
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/axis_code.rs"]
mod tests;
