//! Raw game input names -> canonical input ids.

pub mod axis_code;
pub mod pattern;

pub use axis_code::{AxisCodeFields, resolve_axis_code};
pub use pattern::PatternResolver;
