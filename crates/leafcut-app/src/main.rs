// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Leafcut — paginated raster export engine
//
// Entry point. Initialises logging, reads a JSON document, and exports it as
// a single JPEG or a paginated PDF. Embedded images are resolved relative to
// the document's directory.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use leafcut_core::error::Result;
use leafcut_core::{Document, ExportConfig, PageSetup, PaperSize};
use leafcut_export::{Exporter, FsLoader};
use leafcut_layout::{FixedShaper, GlyphShaper, TextShaper};

#[derive(Parser)]
#[command(name = "leafcut")]
#[command(version)]
#[command(about = "Export a rich-text document to JPEG or paginated PDF", long_about = None)]
struct Cli {
    /// Input document (JSON)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Artifact format
    #[arg(short, long, value_enum, default_value = "pdf")]
    format: Format,

    /// Base name for the artifact; defaults to the input file name
    #[arg(long)]
    name: Option<String>,

    /// Regular TrueType/OpenType font
    #[arg(long, value_name = "FONT", env = "LEAFCUT_FONT")]
    font: Option<PathBuf>,

    /// Bold face; synthesised from the regular face when omitted
    #[arg(long, value_name = "FONT", env = "LEAFCUT_BOLD_FONT")]
    bold_font: Option<PathBuf>,

    /// Export configuration (JSON); unset fields keep their defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Paper size for PDF output
    #[arg(long, value_enum, default_value = "a4")]
    paper: Paper,

    /// Page margin in points for PDF output
    #[arg(long, default_value = "40")]
    margin: f32,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JPEG of the whole document
    Jpg,
    /// Multi-page PDF
    Pdf,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Paper {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl From<Paper> for PaperSize {
    fn from(paper: Paper) -> Self {
        match paper {
            Paper::A3 => PaperSize::A3,
            Paper::A4 => PaperSize::A4,
            Paper::A5 => PaperSize::A5,
            Paper::Letter => PaperSize::Letter,
            Paper::Legal => PaperSize::Legal,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "export failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };
    let shaper = load_shaper(cli.font.as_deref(), cli.bold_font.as_deref())?;

    let raw = std::fs::read_to_string(&cli.input)?;
    let document = Document::from_json(&raw)?;

    let resource_root = cli
        .input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let base_name = cli.name.clone().unwrap_or_else(|| {
        cli.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    tracing::info!(
        input = %cli.input.display(),
        blocks = document.blocks.len(),
        "Leafcut starting"
    );

    let exporter = Exporter::new(shaper, FsLoader::new(resource_root), config);
    std::fs::create_dir_all(&cli.out)?;

    let (path, degraded) = match cli.format {
        Format::Jpg => {
            let artifact = exporter.export_as_image(&document, &base_name).await?;
            (artifact.write_to(&cli.out)?, artifact.diagnostics)
        }
        Format::Pdf => {
            let setup = PageSetup {
                paper: cli.paper.into(),
                margin_pt: cli.margin,
            };
            let artifact = exporter
                .export_as_paginated_document(&document, &base_name, setup)
                .await?;
            (artifact.write_to(&cli.out)?, artifact.diagnostics)
        }
    };

    for degradation in &degraded.degradations {
        tracing::warn!(?degradation, "export degraded");
    }
    println!("{}", path.display());
    Ok(())
}

fn load_shaper(font: Option<&Path>, bold: Option<&Path>) -> Result<Box<dyn TextShaper>> {
    match font {
        Some(regular) => Ok(Box::new(GlyphShaper::open(regular, bold)?)),
        None => {
            tracing::warn!("no font given, rendering glyphs as fixed-width boxes");
            Ok(Box::new(FixedShaper::default()))
        }
    }
}
