// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasteriser — paints a probed document layout into one bitmap at a fixed
// oversampling factor.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use leafcut_core::error::{LeafcutError, Result};
use leafcut_layout::{DocumentLayout, Paint, TextShaper};
use tracing::{debug, info, instrument};

use crate::resources::LoadedImages;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const PLACEHOLDER_FILL: Rgba<u8> = Rgba([241, 241, 241, 255]);
const PLACEHOLDER_EDGE: Rgba<u8> = Rgba([170, 170, 170, 255]);

/// Renders a `DocumentLayout` into an RGBA bitmap.
pub struct Rasterizer<'a> {
    shaper: &'a dyn TextShaper,
    /// Device pixels per layout pixel.
    scale: u32,
}

impl<'a> Rasterizer<'a> {
    pub fn new(shaper: &'a dyn TextShaper, scale: u32) -> Self {
        Self { shaper, scale }
    }

    /// Paint the whole layout. A zero-sized result is a `RenderFailed` error.
    #[instrument(skip_all, fields(width = layout.width, height = layout.total_height, scale = self.scale))]
    pub fn rasterize(&self, layout: &DocumentLayout, images: &LoadedImages) -> Result<RgbaImage> {
        let width = layout.width.saturating_mul(self.scale);
        let height = layout.total_height.saturating_mul(self.scale);
        if width == 0 || height == 0 {
            return Err(LeafcutError::RenderFailed(format!(
                "surface has zero dimensions ({width}x{height})"
            )));
        }

        let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);
        let s = self.scale as f32;

        for op in &layout.paint {
            match op {
                Paint::Text {
                    x,
                    y,
                    text,
                    style,
                    letter_spacing,
                } => {
                    let style = style.scaled(s);
                    let mut cursor = x * s;
                    for ch in text.chars() {
                        self.shaper
                            .draw_glyph(&mut canvas, cursor, y * s, ch, style, INK);
                        cursor += self.shaper.advance(ch, style) + letter_spacing * s;
                    }
                }
                Paint::Image {
                    x,
                    y,
                    width,
                    height,
                    src,
                } => match images.get(src) {
                    Some(img) => {
                        let w = ((width * s).round() as u32).max(1);
                        let h = ((height * s).round() as u32).max(1);
                        let resized = img.resize_exact(w, h, FilterType::Triangle).to_rgba8();
                        imageops::overlay(
                            &mut canvas,
                            &resized,
                            (x * s).round() as i64,
                            (y * s).round() as i64,
                        );
                    }
                    None => self.placeholder(&mut canvas, *x, *y, *width, *height),
                },
                Paint::Placeholder {
                    x,
                    y,
                    width,
                    height,
                } => self.placeholder(&mut canvas, *x, *y, *width, *height),
            }
        }

        info!(width, height, ops = layout.paint.len(), "Document rasterised");
        Ok(canvas)
    }

    /// Broken-image box: light fill with a grey outline.
    fn placeholder(&self, canvas: &mut RgbaImage, x: f32, y: f32, width: f32, height: f32) {
        let s = self.scale as f32;
        let w = ((width * s).round() as u32).max(1);
        let h = ((height * s).round() as u32).max(1);
        let rect = Rect::at((x * s).round() as i32, (y * s).round() as i32).of_size(w, h);
        draw_filled_rect_mut(canvas, rect, PLACEHOLDER_FILL);
        draw_hollow_rect_mut(canvas, rect, PLACEHOLDER_EDGE);
        debug!(x, y, width, height, "Placeholder painted");
    }
}
