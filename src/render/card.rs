use std::collections::BTreeMap;

use crate::assets::{PreparedImage, load_image};
use crate::config::Config;
use crate::data::devices::DeviceModel;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{RefcardError, RefcardResult};
use crate::foundation::log::RequestLog;
use crate::model::{ContextToColours, DEFAULT_PROFILE, OverlayData};
use crate::render::cpu::{CardCanvas, LABEL_CORNER_RADIUS, encode_jpeg};
use crate::render::fit::{TextMeasure, fit_font_size};
use crate::render::text::{FontLibrary, TextEngine};

/// Read-only state every card of one request draws from.
pub struct CardEnv<'a> {
    pub config: &'a Config,
    pub devices: &'a DeviceModel,
    pub fonts: &'a FontLibrary,
    pub logo: &'a PreparedImage,
    pub colours: &'a ContextToColours,
    pub log: &'a RequestLog,
}

/// One (profile, image) pair to draw.
#[derive(Clone, Copy, Debug)]
pub struct CardJob<'a> {
    pub profile: &'a str,
    pub image: &'a str,
    pub overlays: &'a BTreeMap<String, OverlayData>,
}

/// Scale from default-image coordinates to the photo's pixels.
pub fn pixel_multiplier(config: &Config, devices: &DeviceModel, image: &str) -> f64 {
    match devices.image_size_override.get(image) {
        Some(dims) => f64::from(dims.w) / f64::from(config.default_image.w),
        None => config.pixel_multiplier,
    }
}

/// Draw one reference card and encode it as JPEG.
///
/// Overlays with bad geometry are logged and skipped. Anything else, including a
/// label taller than its box, fails the whole card.
pub fn render_card(env: &CardEnv<'_>, job: &CardJob<'_>) -> RefcardResult<Vec<u8>> {
    let photo = load_image(&env.config.hotas_image_path(job.image))?;
    let m = pixel_multiplier(env.config, env.devices, job.image);
    let mut canvas = CardCanvas::new(photo.width, photo.height)?;
    let mut text = TextEngine::new(env.fonts);

    canvas.draw_image(&photo, 0.0, 0.0)?;
    canvas.draw_image(env.logo, 0.0, 0.0)?;
    let x_offset = f64::from(env.logo.width);

    draw_header(&mut canvas, &mut text, env, job, x_offset, m)?;
    draw_watermark(&mut canvas, &mut text, env.config, x_offset, m)?;

    for (key, overlay) in job.overlays {
        match draw_overlay(&mut canvas, &mut text, env, key, overlay, m) {
            Ok(()) => {}
            Err(e @ RefcardError::Layout(_)) => {
                env.log.error(&format!("{} {key}", job.image), &e);
            }
            Err(e) => return Err(e),
        }
    }

    let rgb = canvas.finish()?;
    encode_jpeg(&rgb, env.config.jpg_quality)
}

fn draw_header(
    canvas: &mut CardCanvas,
    text: &mut TextEngine<'_>,
    env: &CardEnv<'_>,
    job: &CardJob<'_>,
    x_offset: f64,
    m: f64,
) -> RefcardResult<()> {
    let style = &env.config.image_header;
    let mut label = env.devices.label_for_image(job.image).to_owned();
    if job.profile != DEFAULT_PROFILE {
        label = format!("{label} ({})", job.profile);
    }

    let start = (style.font_size * m).round() as i32;
    let target_w = canvas.width() as i32 - (x_offset + 2.0 * style.inset.x * m).round() as i32;
    let size = fit_font_size(
        text,
        &style.font,
        &label,
        target_w,
        start,
        env.config.input_min_font_size,
    )?;

    let width = f64::from(canvas.width());
    canvas.fill_rect(
        x_offset,
        0.0,
        width - x_offset,
        style.background_height * m,
        style.background_colour,
    );
    let shaped = text.shape(&style.font, size, &label, style.text_colour)?;
    canvas.draw_text(&shaped, x_offset + style.inset.x * m, style.inset.y * m);
    Ok(())
}

fn draw_watermark(
    canvas: &mut CardCanvas,
    text: &mut TextEngine<'_>,
    config: &Config,
    x_offset: f64,
    m: f64,
) -> RefcardResult<()> {
    let style = &config.watermark;
    let size = (style.font_size * m).round() as u32;
    let label = Label {
        font: &style.font,
        size,
        text: &config.watermark_text(),
        background: style.background_colour,
        colour: style.text_colour,
    };
    label.draw(
        canvas,
        text,
        x_offset + style.location.x * m,
        style.location.y * m,
        size as i32,
    )
}

fn draw_overlay(
    canvas: &mut CardCanvas,
    text: &mut TextEngine<'_>,
    env: &CardEnv<'_>,
    key: &str,
    overlay: &OverlayData,
    m: f64,
) -> RefcardResult<()> {
    let config = env.config;
    let r = overlay.rect;
    if r.is_known_bad() {
        return Ok(());
    }
    if r.is_unplaced() {
        return Err(RefcardError::layout(format!("overlay {key} was never placed")));
    }
    let x = f64::from(r.x) * m;
    let y = f64::from(r.y) * m;
    if x >= f64::from(canvas.width()) || y >= f64::from(canvas.height()) {
        return Err(RefcardError::layout(format!(
            "overlay {key} at {},{} is outside the {}x{} image",
            r.x,
            r.y,
            canvas.width(),
            canvas.height()
        )));
    }

    let labels: Vec<(&str, &str)> = overlay.texts().collect();
    if labels.is_empty() {
        return Ok(());
    }
    let target_w = ((f64::from(r.w) - 2.0 * config.input_pixel_x_inset) * m).round() as i32;
    let target_h = ((f64::from(r.h) - 2.0 * config.input_pixel_y_inset) * m).round() as i32;
    let full = labels
        .iter()
        .map(|(_, t)| *t)
        .collect::<Vec<_>>()
        .join(" ");
    let font = config.input_font.as_str();
    let size = fit_font_size(
        text,
        font,
        &full,
        target_w,
        target_h,
        config.input_min_font_size,
    )?;

    let left = (f64::from(r.x) + config.input_pixel_x_inset) * m;
    let top = (f64::from(r.y) + config.input_pixel_y_inset) * m;
    let mut prefix = String::new();
    for (context, label_text) in labels {
        let offset = text.measure(font, size, &prefix)?.width;
        let label = Label {
            font,
            size,
            text: label_text,
            background: env
                .colours
                .get(context)
                .copied()
                .unwrap_or(config.dark_colour),
            colour: config.light_colour,
        };
        label.draw(canvas, text, left + f64::from(offset), top, target_h)?;
        prefix.push_str(label_text);
        prefix.push(' ');
    }
    Ok(())
}

/// Text on a rounded background sized by `size`, drawn one size smaller and centered.
struct Label<'a> {
    font: &'a str,
    size: u32,
    text: &'a str,
    background: Rgba8,
    colour: Rgba8,
}

impl Label<'_> {
    fn draw(
        &self,
        canvas: &mut CardCanvas,
        text: &mut TextEngine<'_>,
        x: f64,
        top: f64,
        target_h: i32,
    ) -> RefcardResult<()> {
        let outer = text.shape(self.font, self.size, self.text, self.colour)?;
        let inner = text.shape(
            self.font,
            self.size.saturating_sub(1).max(1),
            self.text,
            self.colour,
        )?;
        let box_h = outer.line_height();
        let y = top + f64::from(target_h - box_h) / 2.0;

        canvas.fill_rounded_rect(
            x,
            y,
            f64::from(outer.extent.width),
            f64::from(box_h),
            LABEL_CORNER_RADIUS,
            self.background,
        );
        let inner_x = x + f64::from(outer.extent.width - inner.extent.width) / 2.0;
        let inner_top = y + f64::from(box_h - inner.line_height()) / 2.0;
        canvas.draw_text(&inner, inner_x, inner_top + f64::from(inner.extent.height));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/card.rs"]
mod tests;
