// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rich-text document model handed to the export engine.
//
// A document is a frozen snapshot: an ordered list of blocks, each holding
// inline runs. It is deserialised from JSON by the producing collaborator and
// never mutated by the engine.

use serde::{Deserialize, Serialize};

use crate::error::{LeafcutError, Result};

/// An immutable rich-text document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: Option<String>,
    pub blocks: Vec<Block>,
}

/// One block-level content unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    Paragraph {
        content: Vec<Inline>,
    },
    List {
        #[serde(default)]
        ordered: bool,
        items: Vec<Block>,
    },
    ListItem {
        content: Vec<Inline>,
        /// Nested blocks, typically sub-lists.
        #[serde(default)]
        children: Vec<Block>,
    },
}

/// Inline content inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text {
        text: String,
        #[serde(default)]
        bold: bool,
        #[serde(default)]
        italic: bool,
    },
    Image {
        src: String,
        #[serde(default)]
        alt: Option<String>,
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        height: Option<u32>,
    },
    LineBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            content: vec![Inline::text(text)],
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph {
            content: vec![Inline::text(text)],
        }
    }

    pub fn list(ordered: bool, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::List {
            ordered,
            items: items
                .into_iter()
                .map(|text| Self::ListItem {
                    content: vec![Inline::text(text)],
                    children: Vec::new(),
                })
                .collect(),
        }
    }

    /// Inline content held directly by this block (lists hold none).
    pub fn content(&self) -> &[Inline] {
        match self {
            Self::Heading { content, .. }
            | Self::Paragraph { content }
            | Self::ListItem { content, .. } => content,
            Self::List { .. } => &[],
        }
    }

    /// Child blocks (list items, or nested blocks inside an item).
    pub fn children(&self) -> &[Block] {
        match self {
            Self::List { items, .. } => items,
            Self::ListItem { children, .. } => children,
            _ => &[],
        }
    }
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            title: None,
            blocks,
        }
    }

    /// Parse a document from its JSON form and validate it.
    pub fn from_json(raw: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(raw)?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Check structural rules the layout relies on.
    pub fn validate(&self) -> Result<()> {
        fn walk(blocks: &[Block], inside_list: bool) -> Result<()> {
            for block in blocks {
                match block {
                    Block::Heading { level, .. } if !(1..=4).contains(level) => {
                        return Err(LeafcutError::InvalidDocument(format!(
                            "heading level {level} is outside 1-4"
                        )));
                    }
                    Block::List { items, .. } => {
                        if let Some(stray) =
                            items.iter().find(|b| !matches!(b, Block::ListItem { .. }))
                        {
                            return Err(LeafcutError::InvalidDocument(format!(
                                "list contains a non-item block: {stray:?}"
                            )));
                        }
                        walk(items, true)?;
                    }
                    Block::ListItem { children, .. } => {
                        if !inside_list {
                            return Err(LeafcutError::InvalidDocument(
                                "list item outside of a list".into(),
                            ));
                        }
                        walk(children, false)?;
                    }
                    _ => {}
                }
            }
            Ok(())
        }
        walk(&self.blocks, false)
    }

    /// Every embedded image source, in document order, without duplicates.
    pub fn image_sources(&self) -> Vec<String> {
        fn walk(blocks: &[Block], out: &mut Vec<String>) {
            for block in blocks {
                for inline in block.content() {
                    if let Inline::Image { src, .. } = inline {
                        if !out.contains(src) {
                            out.push(src.clone());
                        }
                    }
                }
                walk(block.children(), out);
            }
        }
        let mut out = Vec::new();
        walk(&self.blocks, &mut out);
        out
    }

    /// Plain-text projection: one line per block, images by alt text.
    pub fn plain_text(&self) -> String {
        fn walk(blocks: &[Block], lines: &mut Vec<String>) {
            for block in blocks {
                let content = block.content();
                if !content.is_empty() || !matches!(block, Block::List { .. }) {
                    let mut line = String::new();
                    for inline in content {
                        match inline {
                            Inline::Text { text, .. } => line.push_str(text),
                            Inline::Image { alt: Some(alt), .. } => line.push_str(alt),
                            Inline::Image { .. } => {}
                            Inline::LineBreak => line.push('\n'),
                        }
                    }
                    lines.push(line);
                }
                walk(block.children(), lines);
            }
        }
        let mut lines = Vec::new();
        walk(&self.blocks, &mut lines);
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_json() {
        let raw = r#"{
            "title": "Discharge summary",
            "blocks": [
                { "type": "heading", "level": 2, "content": [{ "type": "text", "text": "Findings" }] },
                { "type": "paragraph", "content": [
                    { "type": "text", "text": "Stable. ", "bold": true },
                    { "type": "image", "src": "ecg.png", "width": 200 }
                ] },
                { "type": "list", "ordered": true, "items": [
                    { "type": "list_item", "content": [{ "type": "text", "text": "Rest" }] }
                ] }
            ]
        }"#;
        let doc = Document::from_json(raw).unwrap();
        assert_eq!(doc.blocks.len(), 3);
        assert_eq!(doc.image_sources(), vec!["ecg.png".to_string()]);
        assert_eq!(doc.title.as_deref(), Some("Discharge summary"));
    }

    #[test]
    fn rejects_heading_level_five() {
        let doc = Document::new(vec![Block::heading(5, "Too deep")]);
        assert!(matches!(doc.validate(), Err(LeafcutError::InvalidDocument(_))));
    }

    #[test]
    fn rejects_paragraph_directly_inside_list() {
        let doc = Document::new(vec![Block::List {
            ordered: false,
            items: vec![Block::paragraph("stray")],
        }]);
        assert!(doc.validate().is_err());
    }

    #[test]
    fn plain_text_joins_blocks() {
        let doc = Document::new(vec![
            Block::heading(1, "Title"),
            Block::paragraph("Body"),
            Block::list(false, ["one", "two"]),
        ]);
        assert_eq!(doc.plain_text(), "Title\nBody\none\ntwo");
    }
}
