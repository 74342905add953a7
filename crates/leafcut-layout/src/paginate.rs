// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paginator — greedy single pass over planned breakpoints.
//
// For each page window `[cursor, cursor + max_page_height]` the page ends at
// the last free breakpoint that keeps `safety_margin` clear of the window's
// end, or failing that the last free breakpoint in the window at all. Without
// a free one, a held breakpoint is used (the keep-with group is taller than a
// page); without any breakpoint, the page is hard-cut at the window's end.

use leafcut_core::types::{Breakpoint, Degradation, PageBoundary, PlacedBlock};
use tracing::{debug, info, instrument, warn};

use crate::breakpoints::BreakPlan;

/// Page boundaries covering `[0, total_height)` plus any degraded cuts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub boundaries: Vec<PageBoundary>,
    pub degradations: Vec<Degradation>,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.boundaries.len()
    }

    /// Whether any page had to be cut through a block.
    pub fn has_hard_cut(&self) -> bool {
        self.degradations
            .iter()
            .any(|d| matches!(d, Degradation::OversizedBlock { .. }))
    }
}

/// Assigns page boundaries for a fixed usable page height.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    max_page_height: u32,
    safety_margin: u32,
}

/// Offset of the last breakpoint in `window` at or below `bound` with the
/// given `held` flag.
fn last_at_or_below(window: &[Breakpoint], bound: u32, held: bool) -> Option<u32> {
    window
        .iter()
        .rev()
        .find(|bp| bp.held == held && bp.y <= bound)
        .map(|bp| bp.y)
}

impl Paginator {
    pub fn new(max_page_height: u32, safety_margin: u32) -> Self {
        Self {
            max_page_height: max_page_height.max(1),
            safety_margin,
        }
    }

    pub fn max_page_height(&self) -> u32 {
        self.max_page_height
    }

    /// Walk `plan` and return page boundaries. `blocks` is only used to name
    /// the block a hard cut goes through.
    #[instrument(skip_all, fields(total = plan.total_height, max = self.max_page_height))]
    pub fn paginate(&self, plan: &BreakPlan, blocks: &[PlacedBlock]) -> Pagination {
        let total = plan.total_height;
        let max = self.max_page_height;

        if total <= max {
            debug!("Document fits on one page");
            return Pagination {
                boundaries: vec![PageBoundary::new(0, total)],
                degradations: Vec::new(),
            };
        }

        let breakpoints = &plan.breakpoints;
        let mut boundaries = Vec::new();
        let mut degradations = Vec::new();
        let mut cursor = 0u32;

        while total - cursor > max {
            let target = cursor + max;
            let limit = target.saturating_sub(self.safety_margin);

            // Breakpoints in (cursor, target], re-derived for every page.
            let first = breakpoints.partition_point(|bp| bp.y <= cursor);
            let past = breakpoints.partition_point(|bp| bp.y <= target);
            let window = &breakpoints[first..past];

            let free = last_at_or_below(window, limit, false)
                .or_else(|| last_at_or_below(window, target, false));
            let held = last_at_or_below(window, limit, true)
                .or_else(|| last_at_or_below(window, target, true));

            let end = match (free, held) {
                (Some(y), _) => y,
                (None, Some(y)) => {
                    warn!(cut = y, "Keep-with group exceeds one page, breaking inside it");
                    degradations.push(Degradation::KeepWithDissolved { cut: y });
                    y
                }
                (None, None) => {
                    let order = blocks
                        .iter()
                        .filter(|b| b.straddles(target))
                        .last()
                        .map(|b| b.order);
                    warn!(
                        cut = target,
                        block = ?order,
                        "No safe breakpoint in page window, hard cut through oversized block"
                    );
                    degradations.push(Degradation::OversizedBlock { order, cut: target });
                    target
                }
            };

            debug!(start = cursor, end, "Page closed");
            boundaries.push(PageBoundary::new(cursor, end));
            cursor = end;
        }
        boundaries.push(PageBoundary::new(cursor, total));

        info!(
            pages = boundaries.len(),
            degraded = degradations.len(),
            "Pagination complete"
        );

        Pagination {
            boundaries,
            degradations,
        }
    }
}
