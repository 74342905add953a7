// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export orchestrator — drives one document through the pipeline:
//
//   validate → load images → probe layout → settle → rasterise
//     → (JPEG) encode
//     → (PDF)  plan breakpoints → paginate → slice → assemble
//
// Every call owns an `ExportSession`; nothing is shared between calls except
// the exporter's configuration, shaper, and loader, all read-only.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::RgbaImage;
use leafcut_core::config::{ExportConfig, PageSetup};
use leafcut_core::document::Document;
use leafcut_core::error::{LeafcutError, Result};
use leafcut_core::types::PageBoundary;
use leafcut_layout::{
    DocumentLayout, LayoutProber, Pagination, Paginator, TextShaper, plan_breakpoints,
};
use tracing::{debug, info, instrument, warn};

use crate::artifact::{ArtifactFormat, DocumentArtifact, ImageArtifact, download_base_name, file_name};
use crate::pdf::PdfWriter;
use crate::raster::{Rasterizer, encode_jpeg, slice_pages};
use crate::resources::{ResourceLoader, load_images};
use crate::session::ExportSession;

/// Turns documents into JPEG or paginated PDF artifacts.
pub struct Exporter<L: ResourceLoader> {
    shaper: Box<dyn TextShaper>,
    loader: L,
    config: ExportConfig,
    live: Arc<AtomicUsize>,
}

impl<L: ResourceLoader> Exporter<L> {
    pub fn new(shaper: Box<dyn TextShaper>, loader: L, config: ExportConfig) -> Self {
        Self {
            shaper,
            loader,
            config,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Number of exports currently holding a session.
    pub fn active_sessions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    // -- JPEG -----------------------------------------------------------------

    /// Render the whole document into one JPEG.
    ///
    /// Fails with `RenderFailed` when the document lays out to zero height.
    #[instrument(skip(self, document), fields(blocks = document.blocks.len()))]
    pub async fn export_as_image(
        &self,
        document: &Document,
        base_name: &str,
    ) -> Result<ImageArtifact> {
        document.validate()?;
        let mut session = ExportSession::open(ArtifactFormat::Jpeg, self.live.clone());
        self.settle(&mut session, document).await;

        let surface = self.render(&mut session)?;
        let (width, height) = surface.dimensions();
        let bytes = encode_jpeg(surface, self.config.jpeg_quality)?;

        let artifact = ImageArtifact {
            file_name: file_name(base_name, ArtifactFormat::Jpeg),
            bytes,
            width,
            height,
            created_at: session.created_at,
            diagnostics: session.diagnostics.clone(),
        };
        info!(
            session = %session.id,
            file = %artifact.file_name,
            width,
            height,
            bytes = artifact.bytes.len(),
            "Image export complete"
        );
        Ok(artifact)
    }

    // -- PDF ------------------------------------------------------------------

    /// Render the document and split it across fixed-size pages without
    /// cutting through blocks that fit on a page.
    #[instrument(skip(self, document, setup), fields(blocks = document.blocks.len(), paper = ?setup.paper))]
    pub async fn export_as_paginated_document(
        &self,
        document: &Document,
        base_name: &str,
        setup: PageSetup,
    ) -> Result<DocumentArtifact> {
        document.validate()?;
        let mut session = ExportSession::open(ArtifactFormat::Pdf, self.live.clone());
        self.settle(&mut session, document).await;

        let mut writer = PdfWriter::new(setup);
        writer.set_title(
            document
                .title
                .clone()
                .unwrap_or_else(|| download_base_name(base_name)),
        );

        let layout = session
            .layout
            .as_ref()
            .ok_or_else(|| LeafcutError::RenderFailed("layout was not probed".into()))?;

        let (boundaries, bytes) = if layout.is_empty() {
            info!(session = %session.id, "Empty document, emitting a single blank page");
            (vec![PageBoundary::new(0, 0)], writer.create_from_pages(&[])?)
        } else {
            let total_height = layout.total_height;
            let max_page_height = setup.max_page_height_px(self.config.canvas_width);
            let pagination = self.paginate_layout(layout, max_page_height);
            debug!(
                total_height,
                max_page_height,
                pages = pagination.page_count(),
                "Document paginated"
            );
            for degradation in &pagination.degradations {
                session.diagnostics.push(degradation.clone());
            }

            let surface = self.render(&mut session)?;
            let slices = slice_pages(surface, &pagination.boundaries, total_height)?;
            (pagination.boundaries, writer.create_from_pages(&slices)?)
        };

        if session.diagnostics.has_oversized_block() {
            warn!(session = %session.id, "At least one block was cut across pages");
        }

        let artifact = DocumentArtifact {
            file_name: file_name(base_name, ArtifactFormat::Pdf),
            bytes,
            boundaries,
            created_at: session.created_at,
            diagnostics: session.diagnostics.clone(),
        };
        info!(
            session = %session.id,
            file = %artifact.file_name,
            pages = artifact.page_count(),
            bytes = artifact.bytes.len(),
            "Paginated export complete"
        );
        Ok(artifact)
    }

    // -- Pipeline steps -------------------------------------------------------

    /// Wait until the document is ready to capture: every embedded image has
    /// loaded or given up, the layout is probed, and the settle delay passed.
    /// Failures here only degrade the output.
    async fn settle(&self, session: &mut ExportSession, document: &Document) {
        let sources = document.image_sources();
        let (images, diagnostics) =
            load_images(&self.loader, &sources, self.config.image_timeout()).await;
        session.images = images;
        session.diagnostics.extend(diagnostics);

        let layout = LayoutProber::new(self.shaper.as_ref(), &self.config)
            .probe(document, &session.images);
        debug!(
            session = %session.id,
            total_height = layout.total_height,
            blocks = layout.blocks.len(),
            images = session.images.len(),
            "Layout probed"
        );
        session.layout = Some(layout);

        let delay = self.config.settle_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Page boundaries for a probed layout. A layout that fits on one page
    /// skips breakpoint planning entirely.
    fn paginate_layout(&self, layout: &DocumentLayout, max_page_height: u32) -> Pagination {
        if layout.total_height <= max_page_height {
            debug!(total_height = layout.total_height, "Single page, planning skipped");
            return Pagination {
                boundaries: vec![PageBoundary::new(0, layout.total_height)],
                degradations: Vec::new(),
            };
        }
        let plan = plan_breakpoints(
            &layout.blocks,
            layout.total_height,
            self.config.keep_with_window,
        );
        Paginator::new(max_page_height, self.config.safety_margin).paginate(&plan, &layout.blocks)
    }

    /// Rasterise the probed layout into the session's render surface.
    fn render<'s>(&self, session: &'s mut ExportSession) -> Result<&'s RgbaImage> {
        let layout = session
            .layout
            .as_ref()
            .ok_or_else(|| LeafcutError::RenderFailed("layout was not probed".into()))?;
        let surface = Rasterizer::new(self.shaper.as_ref(), self.config.scale)
            .rasterize(layout, &session.images)?;
        Ok(session.surface.insert(surface))
    }
}
