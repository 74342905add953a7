// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the output side of the export engine: rasterising
// a probed layout, slicing it into A4 pages, and assembling the PDF.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::collections::HashMap;

use leafcut_core::{Block, Document, ExportConfig, PageSetup};
use leafcut_export::{LoadedImages, PdfWriter, Rasterizer, encode_jpeg, slice_pages};
use leafcut_layout::{FixedShaper, LayoutProber, Paginator, plan_breakpoints};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A report of 20 sections, roughly five A4 pages.
fn synthetic_report() -> Document {
    let mut blocks = Vec::new();
    for section in 0..20 {
        blocks.push(Block::heading(2, format!("Section {section}")));
        blocks.push(Block::paragraph("Observation text. ".repeat(30)));
        blocks.push(Block::list(false, ["first", "second", "third"]));
    }
    Document::new(blocks)
}

fn bench_raster_and_assemble(c: &mut Criterion) {
    let doc = synthetic_report();
    let config = ExportConfig::default();
    let shaper = FixedShaper::default();
    let metrics: HashMap<String, (u32, u32)> = HashMap::new();
    let images = LoadedImages::default();
    let setup = PageSetup::default();

    let layout = LayoutProber::new(&shaper, &config).probe(&doc, &metrics);
    let plan = plan_breakpoints(&layout.blocks, layout.total_height, config.keep_with_window);
    let pagination = Paginator::new(setup.max_page_height_px(config.canvas_width), config.safety_margin)
        .paginate(&plan, &layout.blocks);

    let rasterizer = Rasterizer::new(&shaper, config.scale);
    c.bench_function("rasterize (60 blocks, 2x)", |b| {
        b.iter(|| {
            let surface = rasterizer.rasterize(black_box(&layout), &images).unwrap();
            black_box(surface.height());
        });
    });

    let surface = rasterizer.rasterize(&layout, &images).unwrap();
    c.bench_function("slice + PDF assembly", |b| {
        b.iter(|| {
            let slices = slice_pages(&surface, &pagination.boundaries, layout.total_height).unwrap();
            let bytes = PdfWriter::new(setup).create_from_pages(&slices).unwrap();
            black_box(bytes.len());
        });
    });

    c.bench_function("jpeg encode (q95)", |b| {
        b.iter(|| {
            let bytes = encode_jpeg(black_box(&surface), config.jpeg_quality).unwrap();
            black_box(bytes.len());
        });
    });
}

criterion_group!(benches, bench_raster_and_assemble);
criterion_main!(benches);
