use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::Serialize;

use crate::foundation::core::{InputRect, Rgba8};

/// Profile used by titles without named binding sets.
pub const DEFAULT_PROFILE: &str = "default_metarefcard";
/// Short name for devices a title knows only by name.
pub const DEVICE_MISSING_INFO: &str = "DeviceMissingInfo";

/// Raw (or already canonical) inputs bound to one action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GameInput {
    pub primary: String,
    pub secondary: Option<String>,
}

impl GameInput {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }
}

/// Action -> input.
pub type GameActions = BTreeMap<String, GameInput>;
/// Context -> actions.
pub type GameContextActions = BTreeMap<String, GameActions>;
/// Device short name -> contexts.
pub type GameDeviceContextActions = BTreeMap<String, GameContextActions>;
/// Profile -> devices.
pub type GameBindsByProfile = BTreeMap<String, GameDeviceContextActions>;

/// Output of a title's parser.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedBinds {
    pub binds: GameBindsByProfile,
    pub devices: BTreeSet<String>, // short names referenced
    pub contexts: BTreeSet<String>,
}

/// Labels to draw on one physical control.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OverlayData {
    /// Context -> labels, each list kept sorted.
    pub context_to_texts: BTreeMap<String, Vec<String>>,
    pub rect: InputRect,
}

impl OverlayData {
    pub fn new(rect: InputRect) -> Self {
        Self {
            context_to_texts: BTreeMap::new(),
            rect,
        }
    }

    /// Add a label under `context`, keeping the list sorted.
    pub fn push_text(&mut self, context: &str, text: String) {
        let texts = self.context_to_texts.entry(context.to_owned()).or_default();
        texts.push(text);
        texts.sort();
    }

    /// `(context, text)` pairs in draw order: contexts by name, then texts.
    pub fn texts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.context_to_texts
            .iter()
            .flat_map(|(ctx, texts)| texts.iter().map(move |t| (ctx.as_str(), t.as_str())))
    }
}

/// Image -> `"{device}:{input}"` -> overlay.
pub type OverlaysByImage = BTreeMap<String, BTreeMap<String, OverlayData>>;
/// Profile -> images.
pub type OverlaysByProfile = BTreeMap<String, OverlaysByImage>;
/// Context -> background colour.
pub type ContextToColours = BTreeMap<String, Rgba8>;

/// Assign colours by cycling `palette` over the sorted context names.
pub fn generate_context_colours(
    contexts: &BTreeSet<String>,
    palette: &[Rgba8],
) -> ContextToColours {
    if palette.is_empty() {
        return ContextToColours::new();
    }
    contexts
        .iter()
        .zip(palette.iter().cycle())
        .map(|(ctx, colour)| (ctx.clone(), *colour))
        .collect()
}

/// Readable tree of parsed binds for verbose output.
pub fn binds_summary(binds: &GameBindsByProfile) -> String {
    let mut out = String::new();
    for (profile, devices) in binds {
        let _ = writeln!(out, "Profile=\"{profile}\"");
        for (device, contexts) in devices {
            let _ = writeln!(out, "  DeviceName=\"{device}\"");
            for (context, actions) in contexts {
                let _ = writeln!(out, "    ContextName=\"{context}\"");
                for (action, input) in actions {
                    let _ = write!(
                        out,
                        "      ActionName=\"{action}\" PrimaryInfo=\"{}\"",
                        input.primary
                    );
                    if let Some(secondary) = &input.secondary {
                        let _ = write!(out, " SecondaryInfo=\"{secondary}\"");
                    }
                    out.push('\n');
                }
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../tests/unit/model.rs"]
mod tests;
