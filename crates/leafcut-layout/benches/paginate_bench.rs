// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the geometry pipeline in the leafcut-layout crate.
// Probes a long synthetic report with the fixed-advance shaper, then plans
// breakpoints and paginates it for A4.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::collections::HashMap;

use leafcut_core::{Block, Document, ExportConfig, PageSetup};
use leafcut_layout::{FixedShaper, LayoutProber, Paginator, plan_breakpoints};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A report of 200 sections, each a heading, two paragraphs, and a list.
fn synthetic_report() -> Document {
    let mut blocks = Vec::new();
    for section in 0..200 {
        blocks.push(Block::heading(2, format!("Section {section}")));
        blocks.push(Block::paragraph("Observation text. ".repeat(20)));
        blocks.push(Block::paragraph("Follow-up text. ".repeat(12)));
        blocks.push(Block::list(false, ["first", "second", "third"]));
    }
    Document::new(blocks)
}

fn bench_probe_and_paginate(c: &mut Criterion) {
    let doc = synthetic_report();
    let config = ExportConfig::default();
    let shaper = FixedShaper::default();
    let images: HashMap<String, (u32, u32)> = HashMap::new();
    let max = PageSetup::default().max_page_height_px(config.canvas_width);

    c.bench_function("probe (800 blocks)", |b| {
        b.iter(|| {
            let layout = LayoutProber::new(&shaper, &config).probe(black_box(&doc), &images);
            black_box(layout.total_height);
        });
    });

    let layout = LayoutProber::new(&shaper, &config).probe(&doc, &images);
    c.bench_function("plan + paginate (800 blocks)", |b| {
        b.iter(|| {
            let plan = plan_breakpoints(black_box(&layout.blocks), layout.total_height, 3);
            let pages = Paginator::new(max, config.safety_margin).paginate(&plan, &layout.blocks);
            black_box(pages.page_count());
        });
    });
}

criterion_group!(benches, bench_probe_and_paginate);
criterion_main!(benches);
