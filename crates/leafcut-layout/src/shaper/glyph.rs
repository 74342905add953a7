// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font-backed shaper using `ab_glyph` metrics and `imageproc` drawing.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use leafcut_core::error::{LeafcutError, Result};
use tracing::{debug, instrument};

use super::{FontStyle, TextShaper};

/// Shaper backed by TrueType/OpenType faces.
///
/// A bold face is optional; without one, bold runs are drawn twice with a
/// one-pixel horizontal offset.
#[derive(Clone)]
pub struct GlyphShaper {
    regular: FontArc,
    bold: Option<FontArc>,
}

impl GlyphShaper {
    /// Build a shaper from raw font bytes.
    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self> {
        let regular = FontArc::try_from_vec(regular)
            .map_err(|err| LeafcutError::Font(format!("regular face: {err}")))?;
        let bold = bold
            .map(|bytes| {
                FontArc::try_from_vec(bytes)
                    .map_err(|err| LeafcutError::Font(format!("bold face: {err}")))
            })
            .transpose()?;
        Ok(Self { regular, bold })
    }

    /// Load faces from font files on disk.
    #[instrument(skip_all, fields(regular = %regular.as_ref().display()))]
    pub fn open(regular: impl AsRef<Path>, bold: Option<&Path>) -> Result<Self> {
        let regular_bytes = std::fs::read(regular.as_ref())?;
        let bold_bytes = bold.map(std::fs::read).transpose()?;
        debug!(has_bold = bold_bytes.is_some(), "Font files read");
        Self::from_bytes(regular_bytes, bold_bytes)
    }

    fn face(&self, style: FontStyle) -> &FontArc {
        match (&self.bold, style.bold) {
            (Some(bold), true) => bold,
            _ => &self.regular,
        }
    }

    fn synthesises_bold(&self, style: FontStyle) -> bool {
        style.bold && self.bold.is_none()
    }
}

impl TextShaper for GlyphShaper {
    fn advance(&self, ch: char, style: FontStyle) -> f32 {
        let scaled = self.face(style).as_scaled(PxScale::from(style.size));
        let mut width = scaled.h_advance(scaled.glyph_id(ch));
        if self.synthesises_bold(style) {
            width += 1.0;
        }
        width
    }

    fn line_extent(&self, style: FontStyle) -> f32 {
        let scaled = self.face(style).as_scaled(PxScale::from(style.size));
        scaled.ascent() - scaled.descent()
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
        let mut buf = [0u8; 4];
        let text = ch.encode_utf8(&mut buf);
        let scale = PxScale::from(style.size);
        let face = self.face(style);
        let (px, py) = (x.round() as i32, y.round() as i32);
        draw_text_mut(canvas, color, px, py, scale, face, text);
        if self.synthesises_bold(style) {
            draw_text_mut(canvas, color, px + 1, py, scale, face, text);
        }
    }
}
