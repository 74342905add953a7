// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Leafcut — Core types and error definitions shared across all crates.

pub mod config;
pub mod document;
pub mod error;
pub mod types;

pub use config::{ExportConfig, PageSetup};
pub use document::{Block, Document, Inline};
pub use error::LeafcutError;
pub use types::*;
