// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export artifacts and their deterministic file names.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use leafcut_core::error::Result;
use leafcut_core::types::{ExportDiagnostics, PageBoundary};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Base name used when the caller's name sanitises to nothing.
pub const FALLBACK_BASE_NAME: &str = "summary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Jpeg,
    Pdf,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Turn a caller-supplied name (often an uploaded file name) into a safe
/// base name: drop the final extension, replace whitespace runs with `_`, and
/// keep only ASCII alphanumerics, `_` and `-`.
pub fn download_base_name(raw: &str) -> String {
    let without_ext = match raw.rfind('.') {
        Some(dot) if dot + 1 < raw.len() && !raw[dot + 1..].contains('/') => &raw[..dot],
        _ => raw,
    };

    let collapsed = without_ext.split_whitespace().collect::<Vec<_>>().join("_");
    let safe: String = collapsed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    if safe.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        safe
    }
}

/// `<sanitised base>_summary.<ext>`
pub fn file_name(base: &str, format: ArtifactFormat) -> String {
    format!("{}_summary.{}", download_base_name(base), format.extension())
}

fn write_artifact(
    dir: &Path,
    file_name: &str,
    format: ArtifactFormat,
    bytes: &[u8],
) -> Result<PathBuf> {
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;
    info!(
        mime = format.mime_type(),
        "Wrote {} ({} bytes)",
        path.display(),
        bytes.len()
    );
    Ok(path)
}

/// A single JPEG of the whole document.
#[derive(Debug, Clone)]
pub struct ImageArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Device pixel dimensions of the encoded image.
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Utc>,
    pub diagnostics: ExportDiagnostics,
}

impl ImageArtifact {
    pub fn format(&self) -> ArtifactFormat {
        ArtifactFormat::Jpeg
    }

    /// Write the bytes into `dir` under the artifact's file name.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        write_artifact(dir.as_ref(), &self.file_name, self.format(), &self.bytes)
    }
}

/// A multi-page PDF, one page per boundary.
#[derive(Debug, Clone)]
pub struct DocumentArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Page boundaries in layout pixels, one per PDF page.
    pub boundaries: Vec<PageBoundary>,
    pub created_at: DateTime<Utc>,
    pub diagnostics: ExportDiagnostics,
}

impl DocumentArtifact {
    pub fn format(&self) -> ArtifactFormat {
        ArtifactFormat::Pdf
    }

    pub fn page_count(&self) -> usize {
        self.boundaries.len()
    }

    /// Write the bytes into `dir` under the artifact's file name.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        write_artifact(dir.as_ref(), &self.file_name, self.format(), &self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_extension_and_unsafe_characters() {
        assert_eq!(download_base_name("Lab Results (March).pdf"), "Lab_Results_March");
        assert_eq!(download_base_name("  spaced   out  .txt"), "spaced_out");
        assert_eq!(download_base_name("v1.2-notes.md"), "v12-notes");
        assert_eq!(download_base_name("plain"), "plain");
    }

    #[test]
    fn base_name_falls_back_when_nothing_survives() {
        assert_eq!(download_base_name(""), FALLBACK_BASE_NAME);
        assert_eq!(download_base_name("ÄÖÜ.docx"), FALLBACK_BASE_NAME);
        assert_eq!(download_base_name(".hidden"), FALLBACK_BASE_NAME);
    }

    #[test]
    fn file_names_share_the_base() {
        assert_eq!(file_name("scan 01.png", ArtifactFormat::Jpeg), "scan_01_summary.jpg");
        assert_eq!(file_name("scan 01.png", ArtifactFormat::Pdf), "scan_01_summary.pdf");
        assert_eq!(ArtifactFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ArtifactFormat::Pdf.mime_type(), "application/pdf");
    }

    #[test]
    fn writes_under_its_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ImageArtifact {
            file_name: "x_summary.jpg".into(),
            bytes: vec![1, 2, 3],
            width: 1,
            height: 1,
            created_at: Utc::now(),
            diagnostics: ExportDiagnostics::default(),
        };
        let path = artifact.write_to(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "x_summary.jpg");
        assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
    }
}
