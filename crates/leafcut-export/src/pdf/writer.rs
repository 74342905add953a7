// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — places one page slice per PDF page using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.
//
// Every slice is drawn at the top-left margin corner, scaled so its width
// fills the printable width. Slices are never taller than the printable
// height because the paginator sized them against the same page geometry.

use leafcut_core::PageSetup;
use leafcut_core::error::{LeafcutError, Result};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::raster::PageSlice;

/// Image pixels map 1:1 onto points before scaling.
const PLACEMENT_DPI: f32 = 72.0;

/// Assembles rasterised pages into a PDF.
pub struct PdfWriter {
    setup: PageSetup,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    pub fn new(setup: PageSetup) -> Self {
        Self { setup, title: None }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.setup.paper.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Build a PDF with one page per slice, in order. No slices yields a
    /// single blank page.
    #[instrument(skip(self, slices), fields(pages = slices.len()))]
    pub fn create_from_pages(&self, slices: &[PageSlice]) -> Result<Vec<u8>> {
        let (page_w, page_h) = self.page_dimensions();
        let page_h_pt = page_h.into_pt().0;
        let margin_pt = self.setup.margin_pt;
        let content_w_pt = self.setup.content_width_pt();
        let title = self.title.as_deref().unwrap_or("Summary");

        info!(paper = ?self.setup.paper, title, "Assembling paginated PDF");

        let mut doc = PdfDocument::new(title);
        let mut pages: Vec<PdfPage> = Vec::with_capacity(slices.len().max(1));

        for (index, slice) in slices.iter().enumerate() {
            let (img_w, img_h) = slice.image.dimensions();
            if img_w == 0 || img_h == 0 {
                return Err(LeafcutError::PdfError(format!(
                    "page {index} has an empty image ({img_w}x{img_h})"
                )));
            }

            // printpdf takes RGB8; the raster is opaque so alpha is dropped.
            let rgb = ::image::DynamicImage::ImageRgba8(slice.image.clone()).to_rgb8();
            let raw = RawImage {
                pixels: RawImageData::U8(rgb.into_raw()),
                width: img_w as usize,
                height: img_h as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let scale = content_w_pt / img_w as f32;
            let placed_h_pt = img_h as f32 * scale;
            if placed_h_pt > self.setup.content_height_pt() + 1.0 {
                warn!(page = index, placed_h_pt, "Page slice exceeds printable height");
            }

            // PDF origin is bottom-left; anchor the slice under the top margin.
            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(margin_pt)),
                    translate_y: Some(Pt(page_h_pt - margin_pt - placed_h_pt)),
                    scale_x: Some(scale),
                    scale_y: Some(scale),
                    dpi: Some(PLACEMENT_DPI),
                    rotate: None,
                },
            }];

            debug!(page = index, img_w, img_h, scale, "Slice placed on page");
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }
        if output.is_empty() {
            return Err(LeafcutError::PdfError("printpdf produced no output".into()));
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use leafcut_core::types::{PageBoundary, PaperSize};

    fn slice(start: u32, end: u32) -> PageSlice {
        PageSlice {
            boundary: PageBoundary::new(start, end),
            image: RgbaImage::from_pixel(80, (end - start) * 2, Rgba([250, 250, 250, 255])),
        }
    }

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn one_pdf_page_per_slice() {
        let mut writer = PdfWriter::new(PageSetup::default());
        writer.set_title("Quarterly");
        let bytes = writer
            .create_from_pages(&[slice(0, 40), slice(40, 90), slice(90, 100)])
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(page_count(&bytes), 3);
    }

    #[test]
    fn empty_slice_is_a_pdf_error() {
        let writer = PdfWriter::new(PageSetup::default());
        let empty = PageSlice {
            boundary: PageBoundary::new(0, 0),
            image: RgbaImage::new(0, 0),
        };
        let result = writer.create_from_pages(&[empty]);
        assert!(matches!(result, Err(LeafcutError::PdfError(_))));
    }

    #[test]
    fn no_slices_gives_a_blank_page() {
        let writer = PdfWriter::new(PageSetup {
            paper: PaperSize::Letter,
            margin_pt: 36.0,
        });
        let bytes = writer.create_from_pages(&[]).unwrap();
        assert_eq!(page_count(&bytes), 1);
    }
}
