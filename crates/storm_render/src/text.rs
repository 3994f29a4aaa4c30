//! Overlay text
//!
//! Printable ASCII from the bundled DejaVu Sans Mono, rasterized once with
//! `fontdue` and composited into an RGBA label on demand.

use crate::raster::blend;
use fontdue::{Font, FontSettings, Metrics};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use storm_core::RendererError;

const FONT_BYTES: &[u8] = include_bytes!("../fonts/DejaVuSansMono.ttf");

/// Overlay glyph height in pixels.
pub const OVERLAY_PX: f32 = 24.0;
pub const OVERLAY_TEXT: Rgba<u8> = Rgba([0, 255, 0, 255]);
pub const OVERLAY_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Drawn for characters outside the rasterized set.
const REPLACEMENT: char = '?';

struct Glyph {
    metrics: Metrics,
    coverage: Vec<u8>,
}

pub struct OverlayFont {
    ascent: f32,
    line_height: u32,
    glyphs: HashMap<char, Glyph>,
}

impl OverlayFont {
    /// Load the bundled font and rasterize `' '..='~'` at `px`.
    pub fn embedded(px: f32) -> Result<Self, RendererError> {
        let settings = FontSettings {
            scale: px,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(FONT_BYTES, settings).map_err(|e| RendererError::Font(e.to_string()))?;
        let line = font
            .horizontal_line_metrics(px)
            .ok_or_else(|| RendererError::Font("font has no horizontal line metrics".to_string()))?;

        let glyphs = (' '..='~')
            .map(|ch| {
                let (metrics, coverage) = font.rasterize(ch, px);
                (ch, Glyph { metrics, coverage })
            })
            .collect();

        Ok(Self {
            ascent: line.ascent,
            line_height: (line.ascent - line.descent).ceil().max(1.0) as u32,
            glyphs,
        })
    }

    pub fn line_height(&self) -> u32 {
        self.line_height
    }

    /// Pixel width of `text` on one line.
    pub fn measure(&self, text: &str) -> u32 {
        let width: f32 = text
            .chars()
            .filter_map(|ch| self.glyph(ch))
            .map(|glyph| glyph.metrics.advance_width)
            .sum();
        width.ceil() as u32
    }

    fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch).or_else(|| self.glyphs.get(&REPLACEMENT))
    }

    /// `text` in `fg` on an opaque `bg` box sized to fit it.
    pub fn render_label(&self, text: &str, fg: Rgba<u8>, bg: Rgba<u8>) -> RgbaImage {
        let mut label = RgbaImage::from_pixel(self.measure(text).max(1), self.line_height, bg);
        let (width, height) = (i64::from(label.width()), i64::from(label.height()));

        let mut pen = 0.0f32;
        for glyph in text.chars().filter_map(|ch| self.glyph(ch)) {
            let metrics = &glyph.metrics;
            if metrics.width > 0 {
                // fontdue's ymin is the bitmap bottom relative to the baseline, y up.
                let left = (pen + metrics.xmin as f32).round() as i64;
                let top = (self.ascent - (metrics.ymin as f32 + metrics.height as f32)).round() as i64;

                for (i, &coverage) in glyph.coverage.iter().enumerate() {
                    let x = left + (i % metrics.width) as i64;
                    let y = top + (i / metrics.width) as i64;
                    if coverage == 0 || x < 0 || y < 0 || x >= width || y >= height {
                        continue;
                    }
                    let alpha = (u16::from(fg[3]) * u16::from(coverage) / 255) as u8;
                    blend(label.get_pixel_mut(x as u32, y as u32), Rgba([fg[0], fg[1], fg[2], alpha]));
                }
            }
            pen += metrics.advance_width;
        }
        label
    }
}
