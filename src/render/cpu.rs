use std::sync::Arc;

use anyhow::Context;
use vello_cpu::kurbo::Shape;

use crate::assets::PreparedImage;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{RefcardError, RefcardResult};
use crate::render::text::ShapedText;

/// Corner radius of label backgrounds.
pub const LABEL_CORNER_RADIUS: f64 = 6.0;

/// CPU raster surface one reference card is drawn on.
pub struct CardCanvas {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
}

impl CardCanvas {
    pub fn new(width: u32, height: u32) -> RefcardResult<Self> {
        let (w, h) = dims_u16(width, height)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(Self {
            ctx,
            width: w,
            height: h,
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Draw `image` unscaled with its top-left corner at `(x, y)`.
    pub fn draw_image(&mut self, image: &PreparedImage, x: f64, y: f64) -> RefcardResult<()> {
        let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        Ok(())
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, colour: Rgba8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(to_color(colour));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x, y, x + w, y + h));
    }

    pub fn fill_rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        colour: Rgba8,
    ) {
        let path = vello_cpu::kurbo::RoundedRect::new(x, y, x + w, y + h, radius).to_path(0.1);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(to_color(colour));
        self.ctx.fill_path(&path);
    }

    /// Draw a shaped line with its first baseline at `baseline_y`.
    pub fn draw_text(&mut self, text: &ShapedText, x: f64, baseline_y: f64) {
        let top = baseline_y - f64::from(text.baseline);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, top)));
        for line in text.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&text.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    /// Rasterize everything drawn so far into an opaque RGB image.
    pub fn finish(mut self) -> RefcardResult<image::RgbImage> {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);

        // Premultiplied channels are already the colour composited over black.
        let rgb: Vec<u8> = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        image::RgbImage::from_raw(self.width(), self.height(), rgb)
            .ok_or_else(|| RefcardError::invariant("rendered buffer does not match canvas size"))
    }
}

pub fn encode_jpeg(rgb: &image::RgbImage, quality: u8) -> RefcardResult<Vec<u8>> {
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .context("encode jpeg")?;
    Ok(out)
}

fn to_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn dims_u16(width: u32, height: u32) -> RefcardResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| RefcardError::layout(format!("image width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| RefcardError::layout(format!("image height {height} exceeds u16")))?;
    if w == 0 || h == 0 {
        return Err(RefcardError::layout("image has zero size"));
    }
    Ok((w, h))
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> RefcardResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(RefcardError::invariant("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
