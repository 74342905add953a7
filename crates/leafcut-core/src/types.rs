// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core geometry and export types for Leafcut.
//
// All layout geometry is expressed in whole layout pixels (`u32`) so that
// re-running the pipeline on the same input yields identical boundaries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one export call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Semantic kind of a laid-out block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Heading { level: u8 },
    Paragraph,
    List { ordered: bool },
    ListItem,
}

impl BlockKind {
    pub fn is_heading(&self) -> bool {
        matches!(self, Self::Heading { .. })
    }
}

/// Geometry of one block after layout.
///
/// `height` is the block's flow extent: from its top edge to the top edge of
/// whatever follows it, so `top + height` is the first pixel that belongs to
/// the next block. Blocks are listed in document (pre-)order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBlock {
    /// Position in the flattened document order.
    pub order: usize,
    pub kind: BlockKind,
    /// Nesting depth; 0 for top-level blocks.
    pub depth: u32,
    /// Offset from the document top, in layout pixels.
    pub top: u32,
    pub height: u32,
}

impl PlacedBlock {
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    /// Whether `y` lies strictly inside this block's extent.
    pub fn straddles(&self, y: u32) -> bool {
        self.top < y && y < self.bottom()
    }
}

/// Why a breakpoint exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakKind {
    /// Bottom of a block; cutting here never splits it.
    SafeEnd,
    /// Top of a heading; a page should begin exactly here.
    ForcedStart,
}

/// A pixel offset at which pagination may cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub y: u32,
    pub kind: BreakKind,
    /// Lies strictly inside a heading's keep-with group. Only used when no
    /// free breakpoint is available in the page window.
    pub held: bool,
}

/// Half-open vertical band `[start, end)` of the document, in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBoundary {
    pub start: u32,
    pub end: u32,
}

impl PageBoundary {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn height(&self) -> u32 {
        self.end - self.start
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PostScript points (width, height).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (mm_to_pt(w as f32), mm_to_pt(h as f32))
    }
}

/// Millimetres to PostScript points (1 in = 25.4 mm = 72 pt).
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// A degraded-but-successful outcome observed during one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degradation {
    /// No safe breakpoint existed in a page window; the page was hard-cut at
    /// `cut`, visually splitting the block with index `order` (if any).
    OversizedBlock { order: Option<usize>, cut: u32 },
    /// A keep-with group was taller than the page window and was broken at
    /// one of its interior breakpoints.
    KeepWithDissolved { cut: u32 },
    /// An embedded image exceeded the load bound; a placeholder was used.
    ImageTimeout { src: String },
    /// An embedded image failed to load or decode; a placeholder was used.
    ImageUnavailable { src: String, reason: String },
}

/// Degraded cases collected over the course of one export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDiagnostics {
    pub degradations: Vec<Degradation>,
}

impl ExportDiagnostics {
    pub fn push(&mut self, degradation: Degradation) {
        self.degradations.push(degradation);
    }

    pub fn extend(&mut self, other: ExportDiagnostics) {
        self.degradations.extend(other.degradations);
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    /// True when at least one page was hard-cut through a block.
    pub fn has_oversized_block(&self) -> bool {
        self.degradations
            .iter()
            .any(|d| matches!(d, Degradation::OversizedBlock { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_in_points() {
        let (w, h) = PaperSize::A4.dimensions_pt();
        assert!((w - 595.28).abs() < 0.01, "got {w}");
        assert!((h - 841.89).abs() < 0.01, "got {h}");
    }

    #[test]
    fn straddles_is_strict() {
        let block = PlacedBlock {
            order: 0,
            kind: BlockKind::Paragraph,
            depth: 0,
            top: 100,
            height: 50,
        };
        assert!(!block.straddles(100));
        assert!(block.straddles(101));
        assert!(block.straddles(149));
        assert!(!block.straddles(150));
    }

    #[test]
    fn diagnostics_flag_oversized_blocks() {
        let mut diag = ExportDiagnostics::default();
        assert!(!diag.is_degraded());
        diag.push(Degradation::ImageTimeout { src: "a.png".into() });
        assert!(diag.is_degraded());
        assert!(!diag.has_oversized_block());
        diag.push(Degradation::OversizedBlock {
            order: Some(0),
            cut: 500,
        });
        assert!(diag.has_oversized_block());
    }
}
