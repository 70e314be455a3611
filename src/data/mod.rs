//! Reference data loaded once and shared read-only.

pub mod devices;
pub mod game;
pub mod registry;

pub use devices::{DeviceInputs, DeviceMap, DeviceModel, ImageMap};
pub use game::{GameData, InputTypeMapping};
pub use registry::GameRegistry;
