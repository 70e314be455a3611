//! Flight Simulator 2020 XML input profiles.
//!
//! ```xml
//! <FriendlyName>Airliner</FriendlyName>
//! <Device DeviceName="..." GUID="..." ProductID="...">
//!   <Context ContextName="PLANE">
//!     <Action ActionName="KEY_GEAR_TOGGLE" Flag="2">
//!       <Primary><KEY Information="Joystick Button 1">1</KEY></Primary>
//!     </Action>
//!   </Context>
//! </Device>
//! ```

use std::collections::BTreeSet;

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::reader::Reader;

use crate::data::devices::{DeviceInputs, DeviceModel};
use crate::data::game::GameData;
use crate::foundation::error::{RefcardError, RefcardResult};
use crate::foundation::log::RequestLog;
use crate::games::{GameAdapter, GameKind};
use crate::model::{DEFAULT_PROFILE, DEVICE_MISSING_INFO, GameInput, ParsedBinds};
use crate::resolve::PatternResolver;

pub struct Fs2020 {
    data: GameData,
    resolver: PatternResolver,
}

impl Fs2020 {
    pub fn new(data: GameData) -> RefcardResult<Self> {
        let resolver = PatternResolver::new(&data.regexes)?;
        Ok(Self { data, resolver })
    }
}

impl GameAdapter for Fs2020 {
    fn kind(&self) -> GameKind {
        GameKind::Fs2020
    }

    fn game_data(&self) -> &GameData {
        &self.data
    }

    fn parse(&self, files: &[Vec<u8>], devices: &DeviceModel, log: &RequestLog) -> ParsedBinds {
        let mut parser = BindsParser::new(devices, log);
        for (idx, file) in files.iter().enumerate() {
            parser.parse_file(idx, file);
        }
        parser.out
    }

    fn resolve(
        &self,
        device: &str,
        raw: &str,
        inputs: Option<&DeviceInputs>,
    ) -> RefcardResult<String> {
        self.resolver
            .resolve(device, raw, self.data.input_map.get(device), inputs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Primary,
    Secondary,
}

/// Open element kinds the parser tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    FriendlyName,
    Device,
    Context,
    Action,
    Slot(Slot),
    Key,
    Other,
}

#[derive(Debug, Default)]
struct PendingAction {
    name: String,
    primary: String,
    secondary: String,
}

struct BindsParser<'a> {
    devices: &'a DeviceModel,
    log: &'a RequestLog,
    out: ParsedBinds,
    seen_devices: BTreeSet<(String, String)>, // (profile, short name)

    // Reset per file.
    profile: String,
    stack: Vec<Scope>,
    skip_depth: usize,
    // Character data of the innermost open element, entities already expanded.
    text: String,
    device: Option<String>,
    device_contexts: BTreeSet<String>,
    context: Option<String>,
    context_actions: BTreeSet<String>,
    action: Option<PendingAction>,
}

impl<'a> BindsParser<'a> {
    fn new(devices: &'a DeviceModel, log: &'a RequestLog) -> Self {
        Self {
            devices,
            log,
            out: ParsedBinds::default(),
            seen_devices: BTreeSet::new(),
            profile: DEFAULT_PROFILE.to_owned(),
            stack: Vec::new(),
            skip_depth: 0,
            text: String::new(),
            device: None,
            device_contexts: BTreeSet::new(),
            context: None,
            context_actions: BTreeSet::new(),
            action: None,
        }
    }

    fn reset_file(&mut self) {
        self.profile = DEFAULT_PROFILE.to_owned();
        self.stack.clear();
        self.skip_depth = 0;
        self.text.clear();
        self.device = None;
        self.device_contexts.clear();
        self.context = None;
        self.context_actions.clear();
        self.action = None;
    }

    fn parse_file(&mut self, idx: usize, bytes: &[u8]) {
        self.reset_file();
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::with_capacity(256);
        let mut entity = String::new();

        loop {
            let decoder = reader.decoder();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    self.text.clear();
                    self.open(decoder, &e, false);
                }
                Ok(Event::Empty(e)) => {
                    self.text.clear();
                    self.open(decoder, &e, true);
                }
                Ok(Event::End(_)) => {
                    let text = std::mem::take(&mut self.text);
                    self.element_text(text.trim());
                    self.close();
                }
                Ok(Event::Text(t)) => match t.decode() {
                    Ok(text) => self.text.push_str(&text),
                    Err(e) => self.log.error(
                        &format!("fs2020 file {idx}"),
                        &RefcardError::format(format!("undecodable text: {e}")),
                    ),
                },
                Ok(Event::CData(t)) => match decoder.decode(&t) {
                    Ok(text) => self.text.push_str(&text),
                    Err(e) => self.log.error(
                        &format!("fs2020 file {idx}"),
                        &RefcardError::format(format!("undecodable text: {e}")),
                    ),
                },
                Ok(Event::GeneralRef(r)) => match expand_entity(&r, &mut entity) {
                    Ok(text) => self.text.push_str(&text),
                    Err(e) => self.log.error(&format!("fs2020 file {idx}"), &e),
                },
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    self.log.error(
                        &format!("fs2020 file {idx}"),
                        &RefcardError::format(format!(
                            "markup syntax error near byte {}: {e}",
                            reader.buffer_position()
                        )),
                    );
                    break;
                }
            }
            buf.clear();
        }
    }

    fn open(&mut self, decoder: Decoder, e: &BytesStart<'_>, empty: bool) {
        let name = e.name();
        let name = name.as_ref();

        if self.skip_depth > 0 {
            if name == b"Context" {
                if let Some(ctx) = attr(decoder, e, b"ContextName") {
                    self.out.contexts.insert(ctx);
                }
            }
            if !empty {
                self.skip_depth += 1;
            }
            return;
        }

        let scope = match name {
            b"FriendlyName" => Some(Scope::FriendlyName),
            b"Device" => self.open_device(decoder, e).then_some(Scope::Device),
            b"Context" if self.device.is_some() => {
                self.open_context(decoder, e).then_some(Scope::Context)
            }
            b"Action" if self.context.is_some() => {
                self.open_action(decoder, e).then_some(Scope::Action)
            }
            b"Primary" if self.action.is_some() => Some(Scope::Slot(Slot::Primary)),
            b"Secondary" if self.action.is_some() => Some(Scope::Slot(Slot::Secondary)),
            b"KEY" => match self.stack.last() {
                Some(Scope::Slot(slot)) => {
                    let slot = *slot;
                    if let Some(info) = attr(decoder, e, b"Information") {
                        self.set_information(slot, info);
                    }
                    Some(Scope::Key)
                }
                _ => Some(Scope::Other),
            },
            _ => Some(Scope::Other),
        };

        match scope {
            Some(scope) if empty => self.end_scope(scope),
            Some(scope) => self.stack.push(scope),
            None if !empty => self.skip_depth = 1,
            None => {}
        }
    }

    fn close(&mut self) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }
        if let Some(scope) = self.stack.pop() {
            self.end_scope(scope);
        }
    }

    fn element_text(&mut self, text: &str) {
        if self.skip_depth > 0 || text.is_empty() {
            return;
        }
        match self.stack.last() {
            Some(Scope::FriendlyName) => self.profile = text.to_owned(),
            Some(Scope::Key) => {
                if text.parse::<i64>().is_err() {
                    let action = self.action.as_ref().map_or("", |a| a.name.as_str());
                    self.log.error(
                        "fs2020",
                        &RefcardError::format(format!(
                            "key code '{text}' is not a number in action {action}"
                        )),
                    );
                }
            }
            _ => {}
        }
    }

    fn open_device(&mut self, decoder: Decoder, e: &BytesStart<'_>) -> bool {
        let full = attr(decoder, e, b"DeviceName").unwrap_or_default();
        let Some(short) = self.devices.short_name(&full) else {
            self.log.error(
                "fs2020",
                &RefcardError::unknown_reference(format!("unknown device '{full}'")),
            );
            return false;
        };
        if short == DEVICE_MISSING_INFO {
            self.log.err(format!("fs2020: missing info for device '{full}'"));
            return false;
        }
        if !self
            .seen_devices
            .insert((self.profile.clone(), short.to_owned()))
        {
            self.log.err(format!(
                "fs2020: duplicate device '{full}' in profile {}",
                self.profile
            ));
            return false;
        }

        tracing::debug!(
            device = %full,
            short,
            guid = %attr(decoder, e, b"GUID").unwrap_or_default(),
            product_id = %attr(decoder, e, b"ProductID").unwrap_or_default(),
            "fs2020 device"
        );
        self.out.devices.insert(short.to_owned());
        self.device = Some(short.to_owned());
        self.device_contexts.clear();
        true
    }

    fn open_context(&mut self, decoder: Decoder, e: &BytesStart<'_>) -> bool {
        let name = attr(decoder, e, b"ContextName").unwrap_or_default();
        self.out.contexts.insert(name.clone());
        if !self.device_contexts.insert(name.clone()) {
            self.log.err(format!("fs2020: duplicate context {name}"));
            return false;
        }
        self.context = Some(name);
        self.context_actions.clear();
        true
    }

    fn open_action(&mut self, decoder: Decoder, e: &BytesStart<'_>) -> bool {
        let name = attr(decoder, e, b"ActionName").unwrap_or_default();
        if let Some(flag) = attr(decoder, e, b"Flag") {
            if flag.trim().parse::<i64>().is_err() {
                self.log.error(
                    "fs2020",
                    &RefcardError::format(format!("action {name} flag '{flag}' is not a number")),
                );
            }
        }
        if !self.context_actions.insert(name.clone()) {
            self.log.err(format!("fs2020: duplicate action {name}"));
            return false;
        }
        self.action = Some(PendingAction {
            name,
            ..PendingAction::default()
        });
        true
    }

    fn set_information(&mut self, slot: Slot, info: String) {
        if let Some(action) = self.action.as_mut() {
            match slot {
                Slot::Primary => action.primary = info,
                Slot::Secondary => action.secondary = info,
            }
        }
    }

    fn end_scope(&mut self, scope: Scope) {
        match scope {
            Scope::Device => self.device = None,
            Scope::Context => self.context = None,
            Scope::Action => self.commit_action(),
            _ => {}
        }
    }

    fn commit_action(&mut self) {
        let Some(action) = self.action.take() else {
            return;
        };
        let (Some(device), Some(context)) = (&self.device, &self.context) else {
            return;
        };
        let input = match (action.primary.is_empty(), action.secondary.is_empty()) {
            (true, true) => return,
            (true, false) => GameInput::new(action.secondary),
            (false, true) => GameInput::new(action.primary),
            (false, false) => GameInput::new(action.primary).with_secondary(action.secondary),
        };
        self.out
            .binds
            .entry(self.profile.clone())
            .or_default()
            .entry(device.clone())
            .or_default()
            .entry(context.clone())
            .or_default()
            .insert(action.name, input);
    }
}

/// Expand `&name;` or a character reference to its text.
fn expand_entity(r: &BytesRef<'_>, scratch: &mut String) -> RefcardResult<String> {
    let name = r
        .decode()
        .map_err(|e| RefcardError::format(format!("undecodable entity reference: {e}")))?;
    scratch.clear();
    scratch.push('&');
    scratch.push_str(&name);
    scratch.push(';');
    quick_xml::escape::unescape(scratch.as_str())
        .map(|v| v.into_owned())
        .map_err(|e| RefcardError::format(format!("unknown entity reference: {e}")))
}

fn attr(decoder: Decoder, e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.decode_and_unescape_value(decoder).ok().map(|v| v.into_owned()))
}

#[cfg(test)]
#[path = "../../tests/unit/games/fs2020.rs"]
mod tests;
