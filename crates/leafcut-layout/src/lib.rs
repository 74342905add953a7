// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// leafcut-layout — Geometry side of the export engine.
//
// Lays a document out in a fixed-width virtual column using a real text
// shaping backend, derives the offsets at which it is safe to cut, and walks
// those offsets to assign page boundaries.

pub mod breakpoints;
pub mod paginate;
pub mod prober;
pub mod shaper;

pub use breakpoints::{BreakPlan, KeepWithGroup, plan_breakpoints};
pub use paginate::{Pagination, Paginator};
pub use prober::{DocumentLayout, ImageMetrics, LayoutProber, Paint};
pub use shaper::{FixedShaper, FontStyle, GlyphShaper, TextShaper};
