// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Embedded image loading with a per-image time bound.
//
// Loading never fails an export: an image that times out, cannot be read, or
// cannot be decoded is reported as a degradation and laid out as a
// placeholder. One deadline covers every image of an export.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use image::DynamicImage;
use leafcut_core::error::{LeafcutError, Result};
use leafcut_core::types::{Degradation, ExportDiagnostics};
use leafcut_layout::ImageMetrics;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Fetches the raw bytes behind an image `src`.
pub trait ResourceLoader: Send + Sync {
    fn fetch(&self, src: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Reads images from a directory. Sources are relative paths below `root`.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `src` below the root, refusing absolute paths and `..`.
    fn resolve(&self, src: &str) -> Result<PathBuf> {
        let relative = Path::new(src);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(LeafcutError::ImageError(format!(
                "image source {src} points outside the resource root"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl ResourceLoader for FsLoader {
    async fn fetch(&self, src: &str) -> Result<Vec<u8>> {
        let path = self.resolve(src)?;
        Ok(tokio::fs::read(&path).await?)
    }
}

/// Serves images from memory, for callers that already hold the bytes.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, src: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(src.into(), bytes);
    }
}

impl ResourceLoader for MemoryLoader {
    async fn fetch(&self, src: &str) -> Result<Vec<u8>> {
        self.entries.get(src).cloned().ok_or_else(|| {
            LeafcutError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no in-memory resource named {src}"),
            ))
        })
    }
}

/// Decoded images keyed by their `src`.
#[derive(Debug, Default)]
pub struct LoadedImages {
    images: HashMap<String, DynamicImage>,
}

impl LoadedImages {
    pub fn get(&self, src: &str) -> Option<&DynamicImage> {
        self.images.get(src)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageMetrics for LoadedImages {
    fn intrinsic_size(&self, src: &str) -> Option<(u32, u32)> {
        self.images.get(src).map(|img| (img.width(), img.height()))
    }
}

/// Fetch one resource, failing with `Timeout` once `deadline` passes. `bound`
/// is the overall wait the deadline was derived from.
pub async fn fetch_until<L: ResourceLoader>(
    loader: &L,
    src: &str,
    deadline: Instant,
    bound: Duration,
) -> Result<Vec<u8>> {
    match tokio::time::timeout_at(deadline, loader.fetch(src)).await {
        Ok(result) => result,
        Err(_) => Err(LeafcutError::Timeout {
            source_ref: src.to_string(),
            after: bound,
        }),
    }
}

/// Load and decode every source in document order, all under one shared
/// deadline `bound` from now. Sources still pending when it passes are
/// recorded as timed out; a source that is ready immediately still loads.
#[instrument(skip(loader, sources), fields(count = sources.len()))]
pub async fn load_images<L: ResourceLoader>(
    loader: &L,
    sources: &[String],
    bound: Duration,
) -> (LoadedImages, ExportDiagnostics) {
    let mut loaded = LoadedImages::default();
    let mut diagnostics = ExportDiagnostics::default();
    let deadline = Instant::now() + bound;

    for src in sources {
        let decoded = fetch_until(loader, src, deadline, bound).await.and_then(|bytes| {
            image::load_from_memory(&bytes)
                .map_err(|err| LeafcutError::ImageError(format!("failed to decode {src}: {err}")))
        });
        match decoded {
            Ok(img) => {
                debug!(src = %src, width = img.width(), height = img.height(), "Image loaded");
                loaded.images.insert(src.clone(), img);
            }
            Err(err @ LeafcutError::Timeout { .. }) => {
                warn!(error = %err, "Image load timed out, using placeholder");
                diagnostics.push(Degradation::ImageTimeout { src: src.clone() });
            }
            Err(err) => {
                warn!(src = %src, error = %err, "Image unavailable, using placeholder");
                diagnostics.push(Degradation::ImageUnavailable {
                    src: src.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    (loaded, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 20, 30])));
        let mut buffer = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    /// Never answers within any reasonable bound.
    struct StalledLoader;

    impl ResourceLoader for StalledLoader {
        async fn fetch(&self, _src: &str) -> Result<Vec<u8>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_image_times_out_into_a_placeholder() {
        let sources = vec!["slow.png".to_string()];
        let (loaded, diag) = load_images(&StalledLoader, &sources, Duration::from_secs(15)).await;
        assert!(loaded.is_empty());
        assert_eq!(
            diag.degradations,
            vec![Degradation::ImageTimeout {
                src: "slow.png".into()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_until_reports_timeout_error() {
        let bound = Duration::from_millis(50);
        let err = fetch_until(&StalledLoader, "slow.png", Instant::now() + bound, bound)
            .await
            .unwrap_err();
        assert!(matches!(err, LeafcutError::Timeout { .. }));
        assert!(err.is_recoverable());
    }

    /// Stalls on sources whose name starts with `slow`, serves a PNG otherwise.
    struct MixedLoader;

    impl ResourceLoader for MixedLoader {
        async fn fetch(&self, src: &str) -> Result<Vec<u8>> {
            if src.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Ok(png_bytes(8, 8))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn one_deadline_covers_all_stalled_images() {
        let bound = Duration::from_secs(15);
        let sources: Vec<String> = (0..4).map(|i| format!("slow-{i}.png")).collect();
        let started = Instant::now();

        let (loaded, diag) = load_images(&StalledLoader, &sources, bound).await;

        assert!(started.elapsed() < bound + Duration::from_secs(1));
        assert!(loaded.is_empty());
        assert_eq!(diag.degradations.len(), 4);
        assert!(diag.degradations.iter().all(|d| matches!(d, Degradation::ImageTimeout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn ready_images_still_load_after_the_deadline() {
        let sources = vec!["slow.png".to_string(), "fast.png".to_string()];
        let (loaded, diag) = load_images(&MixedLoader, &sources, Duration::from_secs(15)).await;
        assert_eq!(loaded.intrinsic_size("fast.png"), Some((8, 8)));
        assert_eq!(
            diag.degradations,
            vec![Degradation::ImageTimeout {
                src: "slow.png".into()
            }]
        );
    }

    #[tokio::test]
    async fn decodes_images_and_flags_garbage() {
        let mut loader = MemoryLoader::new();
        loader.insert("ok.png", png_bytes(30, 20));
        loader.insert("bad.png", b"not an image".to_vec());
        let sources = vec!["ok.png".into(), "bad.png".into(), "gone.png".into()];

        let (loaded, diag) = load_images(&loader, &sources, Duration::from_secs(1)).await;
        assert_eq!(loaded.intrinsic_size("ok.png"), Some((30, 20)));
        assert_eq!(loaded.len(), 1);
        assert_eq!(diag.degradations.len(), 2);
        assert!(diag.degradations.iter().all(|d| matches!(d, Degradation::ImageUnavailable { .. })));
    }

    #[tokio::test]
    async fn fs_loader_reads_below_root_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chart.png"), png_bytes(4, 4)).unwrap();
        let loader = FsLoader::new(dir.path());

        assert!(loader.fetch("chart.png").await.is_ok());
        assert!(loader.fetch("../chart.png").await.is_err());
        assert!(loader.fetch("/etc/passwd").await.is_err());
    }
}
