use std::collections::BTreeSet;

use crate::data::devices::{DeviceInputs, DeviceModel};
use crate::foundation::error::RefcardError;
use crate::foundation::log::RequestLog;
use crate::games::GameAdapter;
use crate::model::{OverlayData, OverlaysByImage, OverlaysByProfile, ParsedBinds};

/// Group resolved binds into per-image overlays.
///
/// Every failure is logged and drops only the bind (or the one input of a bind) it
/// concerns. Overlay keys are `"{device}:{input}"`, so devices sharing a photo share a
/// bucket without colliding.
pub fn populate_image_overlays(
    parsed: &ParsedBinds,
    model: &DeviceModel,
    adapter: &dyn GameAdapter,
    debug_output: bool,
    log: &RequestLog,
) -> OverlaysByProfile {
    let mut needed: BTreeSet<String> = parsed.devices.clone();
    for devices in parsed.binds.values() {
        needed.extend(devices.keys().cloned());
    }
    let filtered = model.filter(&needed, log);
    if debug_output {
        match serde_json::to_string_pretty(&filtered) {
            Ok(dump) => tracing::debug!("targeted device map:\n{dump}"),
            Err(e) => tracing::debug!("targeted device map not printable: {e}"),
        }
    }

    let label = adapter.label();
    let mut out = OverlaysByProfile::new();
    for (profile, devices) in &parsed.binds {
        let mut by_image = OverlaysByImage::new();
        for (device, contexts) in devices {
            let Some(inputs) = filtered.get(device.as_str()).copied() else {
                continue;
            };
            let Some(image) = model.image_for(device) else {
                log.error(
                    label,
                    &RefcardError::unknown_reference(format!("no image for device {device}")),
                );
                continue;
            };

            for (context, actions) in contexts {
                for (action, input) in actions {
                    let primary = match adapter.resolve(device, &input.primary, Some(inputs)) {
                        Ok(id) => Some(id),
                        Err(e) => {
                            log.error(&format!("{label} primary input of {action}"), &e);
                            None
                        }
                    };
                    let secondary = input.secondary.as_deref().and_then(|raw| {
                        match adapter.resolve(device, raw, Some(inputs)) {
                            Ok(id) => Some(id),
                            Err(e) => {
                                log.error(&format!("{label} secondary input of {action}"), &e);
                                None
                            }
                        }
                    });

                    for id in [primary, secondary].into_iter().flatten() {
                        let target = Target {
                            device,
                            image,
                            context,
                            action,
                        };
                        place(&mut by_image, &target, &id, inputs, adapter, log);
                    }
                }
            }
        }
        if !by_image.is_empty() {
            out.insert(profile.clone(), by_image);
        }
    }
    out
}

struct Target<'a> {
    device: &'a str,
    image: &'a str,
    context: &'a str,
    action: &'a str,
}

fn place(
    by_image: &mut OverlaysByImage,
    t: &Target<'_>,
    input: &str,
    inputs: &DeviceInputs,
    adapter: &dyn GameAdapter,
    log: &RequestLog,
) {
    let label = adapter.label();
    let Some(rect) = inputs.get(input) else {
        log.error(
            label,
            &RefcardError::unknown_reference(format!(
                "unknown input {input} for {} on device {}",
                t.action, t.device
            )),
        );
        return;
    };
    if rect.is_unplaced() {
        log.error(
            label,
            &RefcardError::layout(format!(
                "location 0,0 for {} ({input}) on device {}",
                t.action, t.device
            )),
        );
        return;
    }

    let text = match adapter.game_data().label(t.action) {
        Some(text) => text.to_owned(),
        None => {
            log.err(format!(
                "{label}: label not found for {} context {} device {}",
                t.action, t.context, t.device
            ));
            t.action.to_owned()
        }
    };

    by_image
        .entry(t.image.to_owned())
        .or_default()
        .entry(format!("{}:{input}", t.device))
        .or_insert_with(|| OverlayData::new(*rect))
        .push_text(t.context, text);
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/aggregate.rs"]
mod tests;
