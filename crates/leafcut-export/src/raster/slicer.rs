// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page slicer — cuts the full-document raster at page boundaries.
//
// Boundaries are in layout pixels; the raster is `scale` times taller. Each
// offset is mapped with `floor(y * raster_height / total_height)` so adjacent
// slices share their edge row index and never overlap or leave a gap.

use image::RgbaImage;
use image::imageops;
use leafcut_core::error::{LeafcutError, Result};
use leafcut_core::types::PageBoundary;
use tracing::{debug, instrument};

/// One page worth of pixels.
#[derive(Debug, Clone)]
pub struct PageSlice {
    pub boundary: PageBoundary,
    pub image: RgbaImage,
}

/// Map a layout offset onto a raster row.
fn raster_row(y: u32, raster_height: u32, total_height: u32) -> u32 {
    ((y as u64 * raster_height as u64) / total_height as u64) as u32
}

/// Cut `full` into one slice per boundary.
#[instrument(skip(full, boundaries), fields(pages = boundaries.len()))]
pub fn slice_pages(
    full: &RgbaImage,
    boundaries: &[PageBoundary],
    total_height: u32,
) -> Result<Vec<PageSlice>> {
    if total_height == 0 {
        return Err(LeafcutError::RenderFailed(
            "cannot slice a document with zero height".into(),
        ));
    }

    if let [only] = boundaries {
        return Ok(vec![PageSlice {
            boundary: *only,
            image: full.clone(),
        }]);
    }

    let (width, raster_height) = full.dimensions();
    let mut slices = Vec::with_capacity(boundaries.len());
    for boundary in boundaries {
        let top = raster_row(boundary.start, raster_height, total_height);
        let bottom = raster_row(boundary.end, raster_height, total_height).min(raster_height);
        let rows = bottom.saturating_sub(top);
        if rows == 0 {
            return Err(LeafcutError::RenderFailed(format!(
                "page {}..{} maps to an empty raster band",
                boundary.start, boundary.end
            )));
        }
        let image = imageops::crop_imm(full, 0, top, width, rows).to_image();
        debug!(start = boundary.start, end = boundary.end, top, rows, "Page sliced");
        slices.push(PageSlice {
            boundary: *boundary,
            image,
        });
    }
    Ok(slices)
}
