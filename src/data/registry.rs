use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::data::game::GameData;
use crate::foundation::error::{RefcardError, RefcardResult};
use crate::games::{GameAdapter, GameKind};

type Slot = OnceLock<Result<Arc<dyn GameAdapter>, String>>;

/// Lazily built, immutable per-title adapters.
///
/// Each title is loaded at most once. Concurrent first requests block on the same
/// initializer, and a failed load is kept and reported to every later request.
pub struct GameRegistry {
    game_data_dir: PathBuf,
    slots: [Slot; GameKind::ALL.len()],
}

impl GameRegistry {
    pub fn new(game_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            game_data_dir: game_data_dir.into(),
            slots: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    pub fn get(&self, kind: GameKind) -> RefcardResult<Arc<dyn GameAdapter>> {
        self.slots[kind.index()]
            .get_or_init(|| self.load(kind).map_err(|e| e.to_string()))
            .clone()
            .map_err(|msg| {
                RefcardError::validation(format!("game data for {kind} unavailable: {msg}"))
            })
    }

    fn load(&self, kind: GameKind) -> RefcardResult<Arc<dyn GameAdapter>> {
        let path = self.game_data_dir.join(format!("{}.json", kind.label()));
        tracing::info!(game = %kind, path = %path.display(), "loading game data");
        let data = GameData::from_path(&path)?;
        kind.build(data)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/registry.rs"]
mod tests;
