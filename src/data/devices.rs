use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::foundation::core::{Dimensions2d, InputRect};
use crate::foundation::error::{RefcardError, RefcardResult};
use crate::foundation::log::RequestLog;

/// Input name -> rectangle on the device photo.
pub type DeviceInputs = BTreeMap<String, InputRect>;
/// Device short name -> inputs.
pub type DeviceMap = BTreeMap<String, DeviceInputs>;
/// Device short name -> image name (photo file stem).
pub type ImageMap = BTreeMap<String, String>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DevicesDoc {
    generated_file: PathBuf,
    #[serde(default)]
    device_map: DeviceMap,
    #[serde(default)]
    image_map: ImageMap,
    #[serde(default)]
    device_name_map: BTreeMap<String, String>,
    #[serde(default)]
    device_labels_by_image: BTreeMap<String, String>,
    #[serde(default)]
    image_size_override: BTreeMap<String, Dimensions2d>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GeneratedDoc {
    #[serde(default)]
    device_map: DeviceMap,
    #[serde(default)]
    image_map: ImageMap,
}

/// Device reference model shared read-only by every request.
#[derive(Clone, Debug, Default)]
pub struct DeviceModel {
    pub inputs: DeviceMap,
    pub image_map: ImageMap,
    /// Full device name as exported by a game -> short name.
    pub device_name_map: BTreeMap<String, String>,
    pub device_labels_by_image: BTreeMap<String, String>,
    pub image_size_override: BTreeMap<String, Dimensions2d>,
}

impl DeviceModel {
    /// Load the manual override file and the generated file it names.
    ///
    /// `GeneratedFile` is resolved against the override file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> RefcardResult<Self> {
        let path = path.as_ref();
        let doc: DevicesDoc = read_json(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let generated_path = if doc.generated_file.is_relative() {
            base.join(&doc.generated_file)
        } else {
            doc.generated_file.clone()
        };
        let generated: GeneratedDoc = read_json(&generated_path)?;

        Ok(Self {
            inputs: merge_device_maps(generated.device_map, doc.device_map),
            image_map: merge_image_maps(generated.image_map, doc.image_map),
            device_name_map: doc.device_name_map,
            device_labels_by_image: doc.device_labels_by_image,
            image_size_override: doc.image_size_override,
        })
    }

    /// Short name for a game's full device name.
    pub fn short_name(&self, full_name: &str) -> Option<&str> {
        self.device_name_map.get(full_name).map(String::as_str)
    }

    pub fn image_for(&self, short_name: &str) -> Option<&str> {
        self.image_map.get(short_name).map(String::as_str)
    }

    /// Header label for an image, falling back to the image name.
    pub fn label_for_image<'a>(&'a self, image: &'a str) -> &'a str {
        self.device_labels_by_image
            .get(image)
            .map(String::as_str)
            .unwrap_or(image)
    }

    /// Restrict the model to the devices a request references.
    ///
    /// Referenced devices absent from the model are logged once each.
    pub fn filter<'a>(
        &'a self,
        needed: &BTreeSet<String>,
        log: &RequestLog,
    ) -> BTreeMap<&'a str, &'a DeviceInputs> {
        let mut out = BTreeMap::new();
        for short_name in needed {
            match self.inputs.get_key_value(short_name) {
                Some((k, inputs)) => {
                    out.insert(k.as_str(), inputs);
                }
                None => log.error(
                    "",
                    &RefcardError::unknown_reference(format!(
                        "device not found in device model: {short_name}"
                    )),
                ),
            }
        }
        out
    }
}

/// Key-wise union of two device maps. For an input present in both, `overrides` wins.
pub fn merge_device_maps(mut generated: DeviceMap, overrides: DeviceMap) -> DeviceMap {
    for (short_name, inputs) in overrides {
        generated.entry(short_name).or_default().extend(inputs);
    }
    generated
}

/// Key-wise union of two image maps with `overrides` winning.
pub fn merge_image_maps(mut generated: ImageMap, overrides: ImageMap) -> ImageMap {
    generated.extend(overrides);
    generated
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> RefcardResult<T> {
    let f = File::open(path)
        .map_err(|e| RefcardError::validation(format!("open '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| RefcardError::serde(format!("parse '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/data/devices.rs"]
mod tests;
