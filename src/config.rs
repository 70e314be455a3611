use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Dimensions2d, Point2d, Rgba8};
use crate::foundation::error::{RefcardError, RefcardResult};

/// Application configuration (`config.json`).
///
/// Keys are PascalCase in the document. Directory and file fields are resolved against the
/// config file's directory by [`Config::from_path`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Config {
    pub app_name: String,
    pub version: String,
    pub domain: String,
    #[serde(default)]
    pub debug_output: bool,
    #[serde(default)]
    pub verbose_output: bool,

    pub devices_file: PathBuf,
    pub game_data_dir: PathBuf,

    pub default_image: Dimensions2d,
    pub pixel_multiplier: f64,
    pub hotas_images_dir: PathBuf,
    pub logo_images_dir: PathBuf,
    pub jpg_quality: u8,

    pub fonts_dir: PathBuf,
    pub input_font: String,
    pub input_min_font_size: u32,
    pub input_pixel_x_inset: f64,
    pub input_pixel_y_inset: f64,

    pub image_header: HeaderStyle,
    pub watermark: WatermarkStyle,

    pub light_colour: Rgba8,
    pub dark_colour: Rgba8,
    pub alternate_colours: Vec<Rgba8>,

    /// Worker threads for rendering. `None` uses rayon's global pool.
    #[serde(default)]
    pub render_threads: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct HeaderStyle {
    pub font: String,
    pub font_size: f64,
    pub inset: Point2d,
    pub text_colour: Rgba8,
    pub background_height: f64,
    pub background_colour: Rgba8,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct WatermarkStyle {
    pub text: String,
    pub text_colour: Rgba8,
    pub background_colour: Rgba8,
    pub font: String,
    pub font_size: f64,
    pub location: Point2d,
}

impl Config {
    /// Parse a configuration from a JSON reader. Paths are left as written.
    pub fn from_reader<R: std::io::Read>(r: R) -> RefcardResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| RefcardError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse, resolve and validate a configuration file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RefcardResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RefcardError::validation(format!("open config '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        cfg.resolve_paths(base);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Make every relative path field relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for p in [
            &mut self.devices_file,
            &mut self.game_data_dir,
            &mut self.hotas_images_dir,
            &mut self.logo_images_dir,
            &mut self.fonts_dir,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }

    pub fn validate(&self) -> RefcardResult<()> {
        if !(1..=100).contains(&self.jpg_quality) {
            return Err(RefcardError::validation(format!(
                "JpgQuality must be in 1..=100, got {}",
                self.jpg_quality
            )));
        }
        if self.default_image.w <= 0 || self.default_image.h <= 0 {
            return Err(RefcardError::validation("DefaultImage must have positive w and h"));
        }
        if !self.pixel_multiplier.is_finite() || self.pixel_multiplier <= 0.0 {
            return Err(RefcardError::validation("PixelMultiplier must be finite and > 0"));
        }
        if self.input_min_font_size < 2 {
            return Err(RefcardError::validation("InputMinFontSize must be >= 2"));
        }
        if self.alternate_colours.is_empty() {
            return Err(RefcardError::validation("AlternateColours must not be empty"));
        }
        if self.render_threads == Some(0) {
            return Err(RefcardError::validation("RenderThreads must be >= 1 when set"));
        }
        for (what, name) in [
            ("InputFont", &self.input_font),
            ("ImageHeader.Font", &self.image_header.font),
            ("Watermark.Font", &self.watermark.font),
        ] {
            if name.trim().is_empty() {
                return Err(RefcardError::validation(format!("{what} must not be empty")));
            }
        }
        Ok(())
    }

    /// Distinct font file names the renderer needs.
    pub fn font_names(&self) -> Vec<&str> {
        let mut names = vec![
            self.input_font.as_str(),
            self.image_header.font.as_str(),
            self.watermark.font.as_str(),
        ];
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Path of the base photo for an image name.
    pub fn hotas_image_path(&self, image: &str) -> PathBuf {
        self.hotas_images_dir.join(format!("{image}.jpg"))
    }

    /// Path of a title's logo.
    pub fn logo_path(&self, logo: &str) -> PathBuf {
        self.logo_images_dir.join(format!("{logo}.jpg"))
    }

    /// Text of the watermark drawn on every card.
    pub fn watermark_text(&self) -> String {
        format!("{} v{} ({})", self.watermark.text, self.version, self.domain)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
