//! Card rendering: font fitting, text shaping, CPU rasterization and the parallel
//! per-card pipeline.

pub mod card;
pub mod cpu;
pub mod fit;
pub mod pipeline;
pub mod text;

pub use card::{CardEnv, CardJob, pixel_multiplier, render_card};
pub use cpu::{CardCanvas, encode_jpeg};
pub use fit::{MAX_FIT_STEPS, TextExtent, TextMeasure, fit_font_size};
pub use pipeline::{CardRenderer, RenderOutput, RenderRequest, RenderedCard};
pub use text::{FontLibrary, ShapedText, TextEngine};

#[cfg(test)]
#[path = "../../tests/unit/render/support.rs"]
pub(crate) mod support;
