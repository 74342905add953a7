// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text shaping backends.
//
// Layout never computes glyph metrics itself: it asks a `TextShaper` for
// advances and line extents, and the rasteriser asks the same shaper to draw.
// `GlyphShaper` reads real font files; `FixedShaper` is a font-less stand-in
// for headless builds and tests.

pub mod fixed;
pub mod glyph;

use image::{Rgba, RgbaImage};

pub use fixed::FixedShaper;
pub use glyph::GlyphShaper;

/// Font selection for one run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStyle {
    /// Pixel size (em height).
    pub size: f32,
    pub bold: bool,
}

impl FontStyle {
    pub fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }

    pub fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }

    /// Same face at a multiplied size.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            size: self.size * factor,
            ..self
        }
    }
}

/// Measures and draws glyphs for the layout engine.
pub trait TextShaper: Send + Sync {
    /// Horizontal advance of a single character, in pixels.
    fn advance(&self, ch: char, style: FontStyle) -> f32;

    /// Height of the glyph box (ascent minus descent), in pixels.
    fn line_extent(&self, style: FontStyle) -> f32;

    /// Draw one character with the top of its glyph box at `(x, y)`.
    fn draw_glyph(
        &self,
        canvas: &mut RgbaImage,
        x: f32,
        y: f32,
        ch: char,
        style: FontStyle,
        color: Rgba<u8>,
    );

    /// Width of `text` with `letter_spacing` added after every character.
    fn measure(&self, text: &str, style: FontStyle, letter_spacing: f32) -> f32 {
        text.chars()
            .map(|ch| self.advance(ch, style) + letter_spacing)
            .sum()
    }
}
