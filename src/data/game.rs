use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::devices::read_json;
use crate::foundation::error::RefcardResult;

/// Input kind -> raw game suffix -> canonical suffix (e.g. `Slider` -> `X` -> `U`).
pub type InputTypeMapping = BTreeMap<String, BTreeMap<String, String>>;

/// Per-title reference data (`{GameDataDir}/{label}.json`).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameData {
    /// Logo file stem under `LogoImagesDir`.
    pub logo: String,
    /// Named regex sources; which names are required depends on the title.
    #[serde(default)]
    pub regexes: BTreeMap<String, String>,
    /// Device short name -> substitution tables.
    #[serde(default)]
    pub input_map: BTreeMap<String, InputTypeMapping>,
    /// Action name -> display label.
    #[serde(default)]
    pub input_labels: BTreeMap<String, String>,
}

impl GameData {
    pub fn from_path(path: impl AsRef<Path>) -> RefcardResult<Self> {
        read_json(path.as_ref())
    }

    pub fn label(&self, action: &str) -> Option<&str> {
        self.input_labels.get(action).map(String::as_str)
    }
}
