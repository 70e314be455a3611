//! Per-title binding file adapters.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::data::devices::{DeviceInputs, DeviceModel};
use crate::data::game::GameData;
use crate::foundation::error::{RefcardError, RefcardResult};
use crate::foundation::log::RequestLog;
use crate::model::ParsedBinds;

pub mod fs2020;
pub mod sws;

pub use fs2020::Fs2020;
pub use sws::Sws;

/// Capabilities every title implements.
pub trait GameAdapter: Send + Sync {
    fn kind(&self) -> GameKind;

    fn game_data(&self) -> &GameData;

    /// Parse uploaded binding files into canonical binds.
    ///
    /// Never fails as a whole: malformed pieces are logged and dropped.
    fn parse(&self, files: &[Vec<u8>], devices: &DeviceModel, log: &RequestLog) -> ParsedBinds;

    /// Resolve one bound input of `device` to a canonical input id.
    fn resolve(
        &self,
        device: &str,
        raw: &str,
        inputs: Option<&DeviceInputs>,
    ) -> RefcardResult<String>;

    fn logo(&self) -> &str {
        &self.game_data().logo
    }

    fn label(&self) -> &'static str {
        self.kind().label()
    }
}

/// Supported titles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameKind {
    Fs2020,
    Sws,
}

impl GameKind {
    pub const ALL: [GameKind; 2] = [GameKind::Fs2020, GameKind::Sws];

    pub fn label(self) -> &'static str {
        match self {
            GameKind::Fs2020 => "fs2020",
            GameKind::Sws => "sws",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GameKind::Fs2020 => "Flight Simulator 2020 input configs",
            GameKind::Sws => "Star Wars Squadrons input configs",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            GameKind::Fs2020 => 0,
            GameKind::Sws => 1,
        }
    }

    /// Build the title's adapter, compiling its patterns.
    pub fn build(self, data: GameData) -> RefcardResult<Arc<dyn GameAdapter>> {
        Ok(match self {
            GameKind::Fs2020 => Arc::new(Fs2020::new(data)?),
            GameKind::Sws => Arc::new(Sws::new(data)?),
        })
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameKind {
    type Err = RefcardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameKind::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RefcardError::validation(format!("unknown game '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/games/mod.rs"]
mod tests;
