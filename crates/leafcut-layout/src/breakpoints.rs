// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Breakpoint planner — derives the offsets at which a page may end.
//
// Every paragraph, list item, and top-level list contributes the bottom of its
// extent (SafeEnd); every heading contributes its top (ForcedStart). A heading
// and up to `keep_with_window` following siblings form a keep-with group, and
// breakpoints strictly inside a group are marked `held`.

use leafcut_core::types::{BlockKind, BreakKind, Breakpoint, PlacedBlock};
use tracing::{debug, instrument};

/// A heading together with the siblings that must share its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepWithGroup {
    /// `order` of the heading block.
    pub heading: usize,
    /// Number of siblings kept with the heading.
    pub members: usize,
    pub start: u32,
    pub end: u32,
}

impl KeepWithGroup {
    pub fn contains_strictly(&self, y: u32) -> bool {
        self.start < y && y < self.end
    }

    pub fn height(&self) -> u32 {
        self.end - self.start
    }
}

/// Ascending, de-duplicated breakpoints over `(0, total_height)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakPlan {
    pub total_height: u32,
    pub breakpoints: Vec<Breakpoint>,
    pub groups: Vec<KeepWithGroup>,
}

/// Plan breakpoints for blocks laid out in document order.
#[instrument(skip(blocks), fields(blocks = blocks.len()))]
pub fn plan_breakpoints(
    blocks: &[PlacedBlock],
    total_height: u32,
    keep_with_window: usize,
) -> BreakPlan {
    let groups = keep_with_groups(blocks, keep_with_window);

    let mut raw: Vec<(u32, BreakKind)> = blocks
        .iter()
        .filter_map(|block| match block.kind {
            BlockKind::Heading { .. } => Some((block.top, BreakKind::ForcedStart)),
            BlockKind::Paragraph | BlockKind::ListItem => {
                Some((block.bottom(), BreakKind::SafeEnd))
            }
            BlockKind::List { .. } if block.depth == 0 => {
                Some((block.bottom(), BreakKind::SafeEnd))
            }
            BlockKind::List { .. } => None,
        })
        .filter(|&(y, _)| y > 0 && y < total_height)
        .collect();

    // ForcedStart sorts before SafeEnd at the same offset so it survives dedup.
    raw.sort_by_key(|&(y, kind)| (y, kind == BreakKind::SafeEnd));

    let mut breakpoints: Vec<Breakpoint> = Vec::with_capacity(raw.len());
    for (y, kind) in raw {
        let held = groups.iter().any(|g| g.contains_strictly(y));
        match breakpoints.last_mut() {
            Some(last) if last.y == y => {
                last.held &= held;
            }
            _ => breakpoints.push(Breakpoint { y, kind, held }),
        }
    }

    debug!(
        breakpoints = breakpoints.len(),
        held = breakpoints.iter().filter(|b| b.held).count(),
        groups = groups.len(),
        tallest_group = groups.iter().map(KeepWithGroup::height).max().unwrap_or(0),
        "Breakpoints planned"
    );

    BreakPlan {
        total_height,
        breakpoints,
        groups,
    }
}

/// Group each heading with up to `window` following siblings, stopping early
/// at the next heading or when the parent container ends.
fn keep_with_groups(blocks: &[PlacedBlock], window: usize) -> Vec<KeepWithGroup> {
    let mut groups = Vec::new();
    for (index, heading) in blocks.iter().enumerate() {
        if !heading.kind.is_heading() {
            continue;
        }
        let mut end = heading.bottom();
        let mut members = 0;
        for next in &blocks[index + 1..] {
            if members == window || next.depth < heading.depth {
                break;
            }
            if next.depth > heading.depth {
                continue;
            }
            if next.kind.is_heading() {
                break;
            }
            end = next.bottom();
            members += 1;
        }
        groups.push(KeepWithGroup {
            heading: heading.order,
            members,
            start: heading.top,
            end,
        });
    }
    groups
}
