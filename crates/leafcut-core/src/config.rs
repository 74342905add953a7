// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PaperSize;

/// Engine-wide export settings. Every field has a default matching the
/// stylesheet the documents are authored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Width of the virtual single-column canvas, in layout pixels.
    pub canvas_width: u32,
    /// Padding around the content on every side.
    pub padding: u32,
    /// Body font size in pixels.
    pub font_size: f32,
    /// Body line height as a multiple of the font size.
    pub line_height: f32,
    /// Heading line height as a multiple of the heading font size.
    pub heading_line_height: f32,
    /// Extra space after every glyph, in em.
    pub letter_spacing: f32,
    /// Letter spacing for bold inline runs, in em.
    pub bold_letter_spacing: f32,
    /// Oversampling factor applied when rasterising.
    pub scale: u32,
    /// Clearance kept between a chosen cut and the page window's end.
    pub safety_margin: u32,
    /// Number of siblings kept on the same page as a preceding heading.
    pub keep_with_window: usize,
    /// Upper bound on loading one embedded image.
    pub image_timeout_ms: u64,
    /// Delay awaited after layout before capture.
    pub settle_delay_ms: u64,
    /// JPEG quality for the image artifact (1-100).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            padding: 32,
            font_size: 16.0,
            line_height: 1.8,
            heading_line_height: 1.4,
            letter_spacing: 0.1,
            bold_letter_spacing: 0.05,
            scale: 2,
            safety_margin: 8,
            keep_with_window: 3,
            image_timeout_ms: 15_000,
            settle_delay_ms: 500,
            jpeg_quality: 95,
        }
    }
}

impl ExportConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Width of the content column inside the padding.
    pub fn content_width(&self) -> u32 {
        self.canvas_width.saturating_sub(2 * self.padding)
    }
}

/// Fixed output page geometry for the paginated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    pub paper: PaperSize,
    /// Margin on every side, in points.
    pub margin_pt: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            margin_pt: 40.0,
        }
    }
}

impl PageSetup {
    /// Printable width inside the margins, in points.
    pub fn content_width_pt(&self) -> f32 {
        let (w, _) = self.paper.dimensions_pt();
        (w - 2.0 * self.margin_pt).max(1.0)
    }

    /// Printable height inside the margins, in points.
    pub fn content_height_pt(&self) -> f32 {
        let (_, h) = self.paper.dimensions_pt();
        (h - 2.0 * self.margin_pt).max(1.0)
    }

    /// Usable page height expressed in layout pixels for a canvas of
    /// `canvas_width`, given that the canvas is scaled to the printable width.
    pub fn max_page_height_px(&self, canvas_width: u32) -> u32 {
        let px_per_pt = canvas_width as f32 / self.content_width_pt();
        ((self.content_height_pt() * px_per_pt).floor() as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_with_40pt_margins_maps_to_layout_pixels() {
        let setup = PageSetup::default();
        // (841.89 - 80) / (595.28 - 80) * 800 ≈ 1182.9
        assert_eq!(setup.max_page_height_px(800), 1182);
    }

    #[test]
    fn partial_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, r#"{ "scale": 3, "settle_delay_ms": 0 }"#).unwrap();

        let config = ExportConfig::load(&path).unwrap();
        assert_eq!(config.scale, 3);
        assert_eq!(config.settle_delay(), Duration::ZERO);
        assert_eq!(config.canvas_width, 800);
        assert_eq!(config.jpeg_quality, 95);
    }

    #[test]
    fn content_width_excludes_padding() {
        assert_eq!(ExportConfig::default().content_width(), 736);
    }
}
