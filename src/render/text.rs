use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{RefcardError, RefcardResult};
use crate::render::fit::{TextExtent, TextMeasure};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Raw font files keyed by file name, loaded once and shared read-only.
#[derive(Clone, Debug, Default)]
pub struct FontLibrary {
    fonts: BTreeMap<String, Arc<Vec<u8>>>,
}

impl FontLibrary {
    /// Read every named font from `dir`. A missing file is a validation error.
    pub fn load<'a>(
        dir: &Path,
        names: impl IntoIterator<Item = &'a str>,
    ) -> RefcardResult<Self> {
        let mut fonts = BTreeMap::new();
        for name in names {
            let path = dir.join(name);
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read font {}", path.display()))
                .map_err(|e| RefcardError::validation(format!("{e:#}")))?;
            tracing::debug!(font = name, bytes = bytes.len(), "loaded font");
            fonts.insert(name.to_owned(), Arc::new(bytes));
        }
        Ok(Self { fonts })
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.fonts.insert(name.into(), Arc::new(bytes));
    }

    pub fn get(&self, name: &str) -> RefcardResult<&Arc<Vec<u8>>> {
        self.fonts
            .get(name)
            .ok_or_else(|| RefcardError::validation(format!("font {name} not loaded")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }
}

#[derive(Clone)]
struct LoadedFace {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// A laid-out single line, ready to draw.
pub struct ShapedText {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    pub(crate) font: vello_cpu::peniko::FontData,
    /// Baseline of the first line, relative to the layout's top.
    pub(crate) baseline: f32,
    /// Descent of the first line below its baseline.
    pub(crate) descent: f32,
    /// Width and ascent.
    pub extent: TextExtent,
}

/// Task-local text shaping.
///
/// Owns its own Parley contexts and face cache, so one engine must never be shared
/// between render tasks.
pub struct TextEngine<'a> {
    fonts: &'a FontLibrary,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    faces: HashMap<String, LoadedFace>,
    extents: HashMap<(String, u32, String), TextExtent>,
}

impl<'a> TextEngine<'a> {
    pub fn new(fonts: &'a FontLibrary) -> Self {
        Self {
            fonts,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
            extents: HashMap::new(),
        }
    }

    fn face(&mut self, font: &str) -> RefcardResult<LoadedFace> {
        if let Some(face) = self.faces.get(font) {
            return Ok(face.clone());
        }
        let bytes = self.fonts.get(font)?;
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::new(bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            RefcardError::validation(format!("no font families registered from {font}"))
        })?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| RefcardError::validation(format!("font family in {font} has no name")))?
            .to_string();

        let face = LoadedFace {
            family,
            data: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::new(bytes.clone()), 0),
        };
        self.faces.insert(font.to_owned(), face.clone());
        Ok(face)
    }

    /// Shape `text` on one line in `font` at `size` pixels.
    pub fn shape(
        &mut self,
        font: &str,
        size: u32,
        text: &str,
        colour: Rgba8,
    ) -> RefcardResult<ShapedText> {
        if size == 0 {
            return Err(RefcardError::layout(format!("font size 0 for '{text}'")));
        }
        let face = self.face(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(face.family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size as f32));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8::from(
            colour,
        )));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let (ascent, descent, baseline) = layout
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                (m.ascent, m.descent, m.baseline)
            })
            .unwrap_or((0.0, 0.0, 0.0));
        let extent = TextExtent {
            width: layout.full_width().round() as i32,
            height: ascent.round() as i32,
        };

        Ok(ShapedText {
            layout,
            font: face.data,
            baseline,
            descent,
            extent,
        })
    }
}

impl ShapedText {
    /// Ascent plus descent, rounded: the height a background behind this text needs.
    pub fn line_height(&self) -> i32 {
        (self.extent.height as f32 + self.descent).round() as i32
    }
}

impl TextMeasure for TextEngine<'_> {
    fn measure(&mut self, font: &str, size: u32, text: &str) -> RefcardResult<TextExtent> {
        let key = (font.to_owned(), size, text.to_owned());
        if let Some(extent) = self.extents.get(&key) {
            return Ok(*extent);
        }
        let extent = self.shape(font, size, text, Rgba8::WHITE)?.extent;
        self.extents.insert(key, extent);
        Ok(extent)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
