// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// leafcut-export — Output side of the export engine.
//
// Loads embedded images under a time bound, rasterises a probed layout,
// slices the raster at page boundaries, and encodes the result as a single
// JPEG or a paginated PDF. `Exporter` ties the steps together per call.

pub mod artifact;
pub mod exporter;
pub mod pdf;
pub mod raster;
pub mod resources;
pub mod session;

// Re-export the primary types so callers can use `leafcut_export::Exporter` etc.
pub use artifact::{ArtifactFormat, DocumentArtifact, ImageArtifact, download_base_name, file_name};
pub use exporter::Exporter;
pub use pdf::PdfWriter;
pub use raster::{PageSlice, Rasterizer, encode_jpeg, slice_pages};
pub use resources::{FsLoader, LoadedImages, MemoryLoader, ResourceLoader, load_images};
pub use session::ExportSession;
