//! refcard renders printable HOTAS reference cards from game control binding exports.
//!
//! A request flows through four stages:
//!
//! - a per-title [`GameAdapter`] parses the uploaded binding files
//! - raw input names are resolved to canonical input ids of the device model
//! - resolved binds are grouped into per-image overlays
//! - every (profile, image) pair is rendered to JPEG in parallel
//!
//! [`RefCardService`] ties the stages together for one request.
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod data;
pub mod foundation;
pub mod games;
pub mod model;
pub mod overlay;
pub mod render;
pub mod resolve;
pub mod service;

pub use crate::config::Config;
pub use crate::data::{DeviceModel, GameData, GameRegistry};
pub use crate::foundation::core::{Dimensions2d, InputRect, Point2d, Rgba8};
pub use crate::foundation::error::{RefcardError, RefcardResult};
pub use crate::foundation::log::{LogEntry, RequestLog};
pub use crate::games::{GameAdapter, GameKind};
pub use crate::model::{OverlayData, OverlaysByProfile, ParsedBinds};
pub use crate::render::{FontLibrary, RenderedCard};
pub use crate::service::{RefCardResponse, RefCardService};
