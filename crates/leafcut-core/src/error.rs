// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Leafcut.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all Leafcut operations.
#[derive(Debug, Error)]
pub enum LeafcutError {
    // -- Export errors --
    /// The rasterised surface came out with a zero width or height. Fatal for
    /// the current export; no partial artifact is produced.
    #[error("rendering failed: {0}")]
    RenderFailed(String),

    /// An embedded resource did not finish loading within the bound.
    /// The engine substitutes a placeholder and carries on.
    #[error("resource {source_ref} did not load within {after:?}")]
    Timeout { source_ref: String, after: Duration },

    // -- Input errors --
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("font could not be loaded: {0}")]
    Font(String),

    // -- Encoding errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LeafcutError {
    /// Whether the engine recovers from this error locally (placeholder
    /// substitution) instead of failing the export.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ImageError(_) | Self::Io(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LeafcutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_recoverable_render_failure_is_not() {
        let timeout = LeafcutError::Timeout {
            source_ref: "chart.png".into(),
            after: Duration::from_secs(15),
        };
        assert!(timeout.is_recoverable());
        assert!(!LeafcutError::RenderFailed("zero height".into()).is_recoverable());
        assert!(!LeafcutError::InvalidDocument("bad".into()).is_recoverable());
    }

    #[test]
    fn timeout_message_names_the_resource() {
        let err = LeafcutError::Timeout {
            source_ref: "scan.jpg".into(),
            after: Duration::from_millis(250),
        };
        let msg = err.to_string();
        assert!(msg.contains("scan.jpg"), "got {msg}");
        assert!(msg.contains("250ms"), "got {msg}");
    }
}
