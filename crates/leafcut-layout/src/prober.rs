// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout prober — lays a document out in a fixed-width virtual column and
// reads back the geometry of every block.
//
// Box model (layout pixels, body font 16 px):
//   paragraph   margin 0 / 16
//   list        margin 16 / 16, content indented 32
//   list item   margin 0 / 12, content indented 8
//   heading     margin 24 / 16 (top dropped for a container's first child)
// Adjacent sibling margins collapse to the larger of the two. Margins never
// collapse through a parent.

use std::collections::HashMap;

use leafcut_core::config::ExportConfig;
use leafcut_core::document::{Block, Document, Inline};
use leafcut_core::types::{BlockKind, PlacedBlock};
use tracing::{debug, instrument};

use crate::shaper::{FontStyle, TextShaper};

/// Placeholder edge for an image that could not be loaded and declares no size.
const BROKEN_IMAGE_EDGE: u32 = 24;

/// Heading font sizes for levels 1-4, in em.
const HEADING_SCALE: [f32; 4] = [2.0, 1.5, 1.17, 1.0];

/// Intrinsic pixel sizes of embedded images, as resolved by the loader.
/// `None` means the image is unavailable and a placeholder is laid out.
pub trait ImageMetrics {
    fn intrinsic_size(&self, src: &str) -> Option<(u32, u32)>;
}

impl ImageMetrics for HashMap<String, (u32, u32)> {
    fn intrinsic_size(&self, src: &str) -> Option<(u32, u32)> {
        self.get(src).copied()
    }
}

/// One drawing instruction, in layout pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// A run of text with the top of its glyph box at `(x, y)`.
    Text {
        x: f32,
        y: f32,
        text: String,
        style: FontStyle,
        letter_spacing: f32,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        src: String,
    },
    /// Space reserved for an image that did not load.
    Placeholder {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Result of probing: block geometry plus the display list that produced it.
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    pub width: u32,
    pub total_height: u32,
    pub blocks: Vec<PlacedBlock>,
    pub paint: Vec<Paint>,
}

impl DocumentLayout {
    pub fn is_empty(&self) -> bool {
        self.total_height == 0
    }
}

/// Lays documents out with a given shaper and stylesheet.
pub struct LayoutProber<'a> {
    shaper: &'a dyn TextShaper,
    config: &'a ExportConfig,
}

impl<'a> LayoutProber<'a> {
    pub fn new(shaper: &'a dyn TextShaper, config: &'a ExportConfig) -> Self {
        Self { shaper, config }
    }

    /// Lay out `document` and return block geometry in document order.
    #[instrument(skip_all, fields(blocks = document.blocks.len()))]
    pub fn probe(&self, document: &Document, images: &dyn ImageMetrics) -> DocumentLayout {
        let width = self.config.canvas_width;
        if document.is_empty() {
            debug!("Empty document, nothing to lay out");
            return DocumentLayout {
                width,
                total_height: 0,
                blocks: Vec::new(),
                paint: Vec::new(),
            };
        }

        let mut pass = Pass {
            shaper: self.shaper,
            config: self.config,
            images,
            blocks: Vec::new(),
            paint: Vec::new(),
            lists: Vec::new(),
        };
        let padding = self.config.padding as f32;
        let bottom = pass.flow(
            &document.blocks,
            padding,
            self.config.content_width() as f32,
            0,
            padding,
        );
        let total_height = (bottom + padding).ceil() as u32;

        debug!(
            total_height,
            placed = pass.blocks.len(),
            "Layout probe complete"
        );

        DocumentLayout {
            width,
            total_height,
            blocks: pass.blocks,
            paint: pass.paint,
        }
    }
}

/// State for one layout run.
struct Pass<'a> {
    shaper: &'a dyn TextShaper,
    config: &'a ExportConfig,
    images: &'a dyn ImageMetrics,
    blocks: Vec<PlacedBlock>,
    paint: Vec<Paint>,
    /// `ordered` flag of every list currently being laid out, innermost last.
    lists: Vec<bool>,
}

/// Vertical margins of a block, in layout pixels.
struct Margins {
    top: f32,
    bottom: f32,
}

impl Pass<'_> {
    fn em(&self) -> f32 {
        self.config.font_size
    }

    fn margins(&self, block: &Block, first_child: bool) -> Margins {
        let em = self.em();
        match block {
            Block::Heading { .. } => Margins {
                top: if first_child { 0.0 } else { 1.5 * em },
                bottom: em,
            },
            Block::Paragraph { .. } => Margins {
                top: 0.0,
                bottom: em,
            },
            Block::List { .. } => Margins {
                top: em,
                bottom: em,
            },
            Block::ListItem { .. } => Margins {
                top: 0.0,
                bottom: 0.75 * em,
            },
        }
    }

    /// Lay out a run of sibling blocks starting at `y`. Returns the offset just
    /// past the last block's bottom margin.
    fn flow(&mut self, siblings: &[Block], x: f32, width: f32, depth: u32, y: f32) -> f32 {
        let mut cursor = y;
        let mut pending_margin = 0.0f32;
        let mut placed: Vec<usize> = Vec::with_capacity(siblings.len());
        let mut last_border_bottom = y;

        for (index, block) in siblings.iter().enumerate() {
            let margins = self.margins(block, index == 0);
            let top = cursor + pending_margin.max(margins.top);

            let slot = self.blocks.len();
            self.blocks.push(PlacedBlock {
                order: slot,
                kind: block_kind(block),
                depth,
                top: top.round() as u32,
                height: 0,
            });
            placed.push(slot);

            let border_height = self.block_body(block, x, width, depth, top, index);
            last_border_bottom = top + border_height;
            cursor = last_border_bottom;
            pending_margin = margins.bottom;
        }

        let end = cursor + pending_margin;

        // Each extent runs to the next sibling's top; the last one to `end`.
        for pair in placed.windows(2) {
            let next_top = self.blocks[pair[1]].top;
            let block = &mut self.blocks[pair[0]];
            block.height = next_top.saturating_sub(block.top);
        }
        if let Some(&last) = placed.last() {
            let block = &mut self.blocks[last];
            block.height = (end.round() as u32).saturating_sub(block.top);
        }

        debug!(depth, siblings = siblings.len(), last_border_bottom, end, "Flowed siblings");
        end
    }

    /// Lay out the inside of one block; returns its border-box height.
    fn block_body(
        &mut self,
        block: &Block,
        x: f32,
        width: f32,
        depth: u32,
        top: f32,
        index: usize,
    ) -> f32 {
        let em = self.em();
        match block {
            Block::Heading { level, content } => {
                let level = (*level).clamp(1, 4) as usize;
                let style = FontStyle::bold(em * HEADING_SCALE[level - 1]);
                self.inline_flow(content, x, width, top, style, self.config.heading_line_height)
            }
            Block::Paragraph { content } => self.inline_flow(
                content,
                x,
                width,
                top,
                FontStyle::regular(em),
                self.config.line_height,
            ),
            Block::List { ordered, items } => {
                let indent = 2.0 * em;
                self.lists.push(*ordered);
                let bottom = self.flow(items, x + indent, width - indent, depth + 1, top);
                self.lists.pop();
                bottom - top
            }
            Block::ListItem { content, children } => {
                let indent = 0.5 * em;
                let style = FontStyle::regular(em);
                self.list_marker(index, x, top, style);
                let text_height = self.inline_flow(
                    content,
                    x + indent,
                    width - indent,
                    top,
                    style,
                    self.config.line_height,
                );
                if children.is_empty() {
                    text_height
                } else {
                    let bottom =
                        self.flow(children, x + indent, width - indent, depth + 1, top + text_height);
                    bottom - top
                }
            }
        }
    }

    /// Paint the bullet or number for the `index`-th item of the innermost list.
    fn list_marker(&mut self, index: usize, item_x: f32, top: f32, style: FontStyle) {
        let ordered = self.lists.last().copied().unwrap_or(false);
        let marker = if ordered {
            format!("{}.", index + 1)
        } else {
            "\u{2022}".to_string()
        };
        let spacing = self.config.letter_spacing * style.size;
        let marker_width = self.shaper.measure(&marker, style, spacing);
        let line_box = style.size * self.config.line_height;
        let glyph_top = top + (line_box - self.shaper.line_extent(style)) / 2.0;
        self.paint.push(Paint::Text {
            x: item_x - marker_width - 0.5 * self.em(),
            y: glyph_top,
            text: marker,
            style,
            letter_spacing: spacing,
        });
    }

    /// Greedy line breaking of inline content. Returns the total line height.
    fn inline_flow(
        &mut self,
        content: &[Inline],
        x: f32,
        width: f32,
        top: f32,
        base: FontStyle,
        line_height: f32,
    ) -> f32 {
        let spacing = self.config.letter_spacing * base.size;
        let line_box = base.size * line_height;
        let mut lines: Vec<Vec<Item>> = vec![Vec::new()];
        let mut line_width = 0.0f32;
        let mut pending_space = false;

        for inline in content {
            match inline {
                Inline::Text { text, bold, .. } => {
                    let style = FontStyle {
                        bold: base.bold || *bold,
                        ..base
                    };
                    let spacing = if *bold {
                        self.config.bold_letter_spacing * base.size
                    } else {
                        spacing
                    };
                    let space = self.shaper.measure(" ", style, spacing);
                    if text.starts_with(char::is_whitespace) {
                        pending_space = true;
                    }
                    for (n, word) in text.split_whitespace().enumerate() {
                        if n > 0 {
                            pending_space = true;
                        }
                        for piece in self.split_overlong(word, style, spacing, width) {
                            let w = self.shaper.measure(&piece, style, spacing);
                            let gap = if pending_space && line_width > 0.0 { space } else { 0.0 };
                            if line_width > 0.0 && line_width + gap + w > width {
                                lines.push(Vec::new());
                                line_width = 0.0;
                            }
                            let at = if line_width > 0.0 { line_width + gap } else { 0.0 };
                            if let Some(line) = lines.last_mut() {
                                line.push(Item::word(piece, style, spacing, at, w));
                            }
                            line_width = at + w;
                            pending_space = false;
                        }
                    }
                    if text.ends_with(char::is_whitespace) {
                        pending_space = true;
                    }
                }
                Inline::Image {
                    src,
                    width: declared_w,
                    height: declared_h,
                    ..
                } => {
                    let (w, h, loaded) = self.image_box(src, *declared_w, *declared_h, width);
                    if line_width > 0.0 && line_width + w > width {
                        lines.push(Vec::new());
                        line_width = 0.0;
                    }
                    let at = line_width;
                    if let Some(line) = lines.last_mut() {
                        line.push(Item {
                            x: at,
                            width: w,
                            height: h,
                            kind: ItemKind::Image {
                                src: src.clone(),
                                loaded,
                            },
                        });
                    }
                    line_width = at + w;
                    pending_space = false;
                }
                Inline::LineBreak => {
                    lines.push(Vec::new());
                    line_width = 0.0;
                    pending_space = false;
                }
            }
        }

        // A block with no inline content at all has no line box.
        if lines.iter().all(Vec::is_empty) && !content.iter().any(|i| matches!(i, Inline::LineBreak)) {
            return 0.0;
        }

        let extent = self.shaper.line_extent(base);
        let mut y = top;
        for line in lines {
            let tallest_image = line
                .iter()
                .filter(|item| matches!(item.kind, ItemKind::Image { .. }))
                .map(|item| item.height)
                .fold(0.0f32, f32::max);
            let height = line_box.max(tallest_image);
            // Text sits on the line's bottom text box; images hang from the top.
            let text_top = y + (height - line_box) + (line_box - extent) / 2.0;
            for item in line {
                match item.kind {
                    ItemKind::Word {
                        text,
                        style,
                        spacing,
                    } => self.paint.push(Paint::Text {
                        x: x + item.x,
                        y: text_top,
                        text,
                        style,
                        letter_spacing: spacing,
                    }),
                    ItemKind::Image { src, loaded: true } => self.paint.push(Paint::Image {
                        x: x + item.x,
                        y: y + (height - item.height),
                        width: item.width,
                        height: item.height,
                        src,
                    }),
                    ItemKind::Image { loaded: false, .. } => self.paint.push(Paint::Placeholder {
                        x: x + item.x,
                        y: y + (height - item.height),
                        width: item.width,
                        height: item.height,
                    }),
                }
            }
            y += height;
        }
        y - top
    }

    /// Break a word wider than the line into line-sized pieces.
    fn split_overlong(&self, word: &str, style: FontStyle, spacing: f32, width: f32) -> Vec<String> {
        if self.shaper.measure(word, style, spacing) <= width {
            return vec![word.to_string()];
        }
        let mut pieces = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0f32;
        for ch in word.chars() {
            let w = self.shaper.advance(ch, style) + spacing;
            if !current.is_empty() && current_width + w > width {
                pieces.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            current.push(ch);
            current_width += w;
        }
        if !current.is_empty() {
            pieces.push(current);
        }
        pieces
    }

    /// Resolve an image's laid-out size, scaled down to the column width.
    fn image_box(
        &self,
        src: &str,
        declared_w: Option<u32>,
        declared_h: Option<u32>,
        column: f32,
    ) -> (f32, f32, bool) {
        let (w, h, loaded) = match self.images.intrinsic_size(src) {
            Some((iw, ih)) => {
                let (w, h) = match (declared_w, declared_h) {
                    (Some(w), Some(h)) => (w, h),
                    (Some(w), None) if iw > 0 => (w, (w as u64 * ih as u64 / iw as u64) as u32),
                    (None, Some(h)) if ih > 0 => ((h as u64 * iw as u64 / ih as u64) as u32, h),
                    _ => (iw, ih),
                };
                (w as f32, h as f32, true)
            }
            None => (
                declared_w.unwrap_or(BROKEN_IMAGE_EDGE) as f32,
                declared_h.unwrap_or(BROKEN_IMAGE_EDGE) as f32,
                false,
            ),
        };
        if w > column && w > 0.0 {
            let ratio = column / w;
            (column, h * ratio, loaded)
        } else {
            (w, h, loaded)
        }
    }
}

struct Item {
    /// Offset from the line start.
    x: f32,
    width: f32,
    height: f32,
    kind: ItemKind,
}

enum ItemKind {
    Word {
        text: String,
        style: FontStyle,
        spacing: f32,
    },
    Image { src: String, loaded: bool },
}

impl Item {
    fn word(text: String, style: FontStyle, spacing: f32, x: f32, width: f32) -> Self {
        Self {
            x,
            width,
            height: 0.0,
            kind: ItemKind::Word {
                text,
                style,
                spacing,
            },
        }
    }
}

fn block_kind(block: &Block) -> BlockKind {
    match block {
        Block::Heading { level, .. } => BlockKind::Heading { level: *level },
        Block::Paragraph { .. } => BlockKind::Paragraph,
        Block::List { ordered, .. } => BlockKind::List { ordered: *ordered },
        Block::ListItem { .. } => BlockKind::ListItem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaper::FixedShaper;

    fn probe(blocks: Vec<Block>) -> DocumentLayout {
        let shaper = FixedShaper::default();
        let config = ExportConfig::default();
        let prober = LayoutProber::new(&shaper, &config);
        prober.probe(&Document::new(blocks), &HashMap::new())
    }

    #[test]
    fn empty_document_has_zero_height() {
        let layout = probe(Vec::new());
        assert_eq!(layout.total_height, 0);
        assert!(layout.blocks.is_empty());
    }

    #[test]
    fn single_line_paragraph_geometry() {
        let layout = probe(vec![Block::paragraph("Short line")]);
        let block = layout.blocks[0];
        assert_eq!(block.top, 32);
        // One 28.8 px line box plus the 16 px bottom margin.
        assert_eq!(block.height, 45);
        assert_eq!(layout.total_height, 32 + 45 + 32);
    }

    #[test]
    fn long_paragraph_wraps_onto_several_lines() {
        // 736 px column, 9.6 px per char: 76 chars per line.
        let text = "word ".repeat(60);
        let layout = probe(vec![Block::paragraph(text)]);
        // 300 chars -> 4+ lines of 28.8 px.
        assert!(layout.blocks[0].height >= 4 * 28 + 16, "{:?}", layout.blocks[0]);
    }

    #[test]
    fn blocks_are_monotone_and_non_overlapping() {
        let layout = probe(vec![
            Block::heading(1, "Summary"),
            Block::paragraph("First paragraph."),
            Block::list(true, ["one", "two", "three"]),
            Block::heading(2, "Plan"),
            Block::paragraph("Second paragraph."),
        ]);
        let top_level: Vec<_> = layout.blocks.iter().filter(|b| b.depth == 0).collect();
        for pair in top_level.windows(2) {
            assert!(pair[0].top <= pair[1].top);
            assert_eq!(pair[0].bottom(), pair[1].top, "extents must abut");
        }
        // List items sit inside their list.
        let list = layout
            .blocks
            .iter()
            .find(|b| matches!(b.kind, BlockKind::List { .. }))
            .unwrap();
        for item in layout.blocks.iter().filter(|b| b.kind == BlockKind::ListItem) {
            assert!(item.top >= list.top && item.bottom() <= list.bottom());
        }
    }

    #[test]
    fn first_heading_drops_its_top_margin() {
        let layout = probe(vec![Block::heading(1, "Title"), Block::heading(2, "Sub")]);
        assert_eq!(layout.blocks[0].top, 32);
        // h1: 32 px * 1.4 line height = 44.8; gap collapses to 24.
        assert_eq!(layout.blocks[1].top, (32.0f32 + 44.8 + 24.0).round() as u32);
    }

    #[test]
    fn missing_image_gets_placeholder_space() {
        let layout = probe(vec![Block::Paragraph {
            content: vec![Inline::Image {
                src: "missing.png".into(),
                alt: None,
                width: None,
                height: Some(120),
            }],
        }]);
        assert!(layout.paint.iter().any(|p| matches!(
            p,
            Paint::Placeholder { height, .. } if (*height - 120.0).abs() < 1e-3
        )));
        assert_eq!(layout.blocks[0].height, 120 + 16);
    }

    #[test]
    fn loaded_image_is_scaled_to_the_column() {
        let shaper = FixedShaper::default();
        let config = ExportConfig::default();
        let mut sizes = HashMap::new();
        sizes.insert("wide.png".to_string(), (1472u32, 400u32));
        let doc = Document::new(vec![Block::Paragraph {
            content: vec![Inline::Image {
                src: "wide.png".into(),
                alt: None,
                width: None,
                height: None,
            }],
        }]);
        let layout = LayoutProber::new(&shaper, &config).probe(&doc, &sizes);
        let image = layout
            .paint
            .iter()
            .find_map(|p| match p {
                Paint::Image { width, height, .. } => Some((*width, *height)),
                _ => None,
            })
            .unwrap();
        assert!((image.0 - 736.0).abs() < 1e-3);
        assert!((image.1 - 200.0).abs() < 1e-3);
    }

    #[test]
    fn ordered_list_numbers_its_items() {
        let layout = probe(vec![Block::list(true, ["a", "b"])]);
        let markers: Vec<_> = layout
            .paint
            .iter()
            .filter_map(|p| match p {
                Paint::Text { text, .. } if text.ends_with('.') => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(markers, vec!["1.".to_string(), "2.".to_string()]);
    }

    #[test]
    fn bold_runs_are_tracked_tighter_than_regular_text() {
        let layout = probe(vec![Block::Paragraph {
            content: vec![Inline::text("plain "), Inline::bold("strong")],
        }]);
        let spacings: Vec<(String, f32)> = layout
            .paint
            .iter()
            .filter_map(|op| match op {
                Paint::Text {
                    text,
                    letter_spacing,
                    ..
                } => Some((text.clone(), *letter_spacing)),
                _ => None,
            })
            .collect();
        // 0.1 em and 0.05 em of a 16 px font.
        assert_eq!(
            spacings,
            vec![("plain".to_string(), 1.6), ("strong".to_string(), 0.8)]
        );
    }
}
