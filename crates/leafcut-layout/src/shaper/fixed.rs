// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixed-advance shaper for environments without font files (CI, headless
// servers). Every character advances by a constant fraction of the font size
// and glyphs are drawn as solid boxes, which keeps layout deterministic and
// rasters non-empty.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use super::{FontStyle, TextShaper};

/// Deterministic monospaced stand-in for a real font.
#[derive(Debug, Clone, Copy)]
pub struct FixedShaper {
    /// Advance of one character as a fraction of the font size.
    pub advance_ratio: f32,
}

impl Default for FixedShaper {
    fn default() -> Self {
        Self { advance_ratio: 0.5 }
    }
}

impl TextShaper for FixedShaper {
    fn advance(&self, _ch: char, style: FontStyle) -> f32 {
        let bold_extra = if style.bold { 1.1 } else { 1.0 };
        style.size * self.advance_ratio * bold_extra
    }

    fn line_extent(&self, style: FontStyle) -> f32 {
        style.size
    }

    fn draw_glyph(
        &self,
        canvas: &mut RgbaImage,
        x: f32,
        y: f32,
        ch: char,
        style: FontStyle,
        color: Rgba<u8>,
    ) {
        if ch.is_whitespace() {
            return;
        }
        let width = (self.advance(ch, style) * 0.8).max(1.0) as u32;
        let height = (style.size * 0.7).max(1.0) as u32;
        let top = y + style.size * 0.15;
        let rect = Rect::at(x.round() as i32, top.round() as i32).of_size(width, height);
        draw_filled_rect_mut(canvas, rect, color);
    }
}
