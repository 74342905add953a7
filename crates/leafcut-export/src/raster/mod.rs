// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — full-document capture, page slicing, and JPEG encoding.

pub mod rasterizer;
pub mod slicer;

pub use rasterizer::Rasterizer;
pub use slicer::{PageSlice, slice_pages};

use image::buffer::ConvertBuffer;
use image::{RgbImage, RgbaImage};
use leafcut_core::error::{LeafcutError, Result};

/// Encode an opaque RGBA raster as JPEG bytes with the given quality (1-100).
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let rgb: RgbImage = image.convert();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|err| LeafcutError::ImageError(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn jpeg_round_trips_dimensions() {
        let img = RgbaImage::from_pixel(64, 48, Rgba([255, 255, 255, 255]));
        let bytes = encode_jpeg(&img, 95).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "JPEG SOI marker");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }
}
