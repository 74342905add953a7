// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export session — the per-call owner of every intermediate resource.
//
// Each export builds its own session, so concurrent exports share nothing but
// the exporter's read-only configuration. Dropping the session releases the
// loaded images, the layout, and the render surface on every exit path,
// including early returns through `?`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use image::RgbaImage;
use leafcut_core::types::{ExportDiagnostics, SessionId};
use leafcut_layout::DocumentLayout;
use tracing::debug;

use crate::artifact::ArtifactFormat;
use crate::resources::LoadedImages;

pub struct ExportSession {
    pub id: SessionId,
    pub format: ArtifactFormat,
    pub created_at: DateTime<Utc>,
    pub images: LoadedImages,
    pub layout: Option<DocumentLayout>,
    /// Full-document raster at device resolution.
    pub surface: Option<RgbaImage>,
    pub diagnostics: ExportDiagnostics,
    live: Arc<AtomicUsize>,
}

impl ExportSession {
    /// Open a session and count it against `live` until dropped.
    pub fn open(format: ArtifactFormat, live: Arc<AtomicUsize>) -> Self {
        let active = live.fetch_add(1, Ordering::SeqCst) + 1;
        let session = Self {
            id: SessionId::new(),
            format,
            created_at: Utc::now(),
            images: LoadedImages::default(),
            layout: None,
            surface: None,
            diagnostics: ExportDiagnostics::default(),
            live,
        };
        debug!(session = %session.id, ?format, active, "Export session opened");
        session
    }
}

impl Drop for ExportSession {
    fn drop(&mut self) {
        self.surface = None;
        self.layout = None;
        let remaining = self.live.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        debug!(
            session = %self.id,
            format = ?self.format,
            degraded = self.diagnostics.is_degraded(),
            remaining,
            "Export session released"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_tracks_open_sessions() {
        let live = Arc::new(AtomicUsize::new(0));
        let a = ExportSession::open(ArtifactFormat::Jpeg, live.clone());
        let b = ExportSession::open(ArtifactFormat::Pdf, live.clone());
        assert_ne!(a.id, b.id);
        assert_eq!(live.load(Ordering::SeqCst), 2);
        drop(a);
        assert_eq!(live.load(Ordering::SeqCst), 1);
        drop(b);
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }
}
