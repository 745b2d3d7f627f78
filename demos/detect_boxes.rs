//! Annotation Box Detection Demo
//!
//! This demo runs the notes pipeline over rasterized plan-sheet images:
//! it detects color-coded annotation boxes, assembles per-page layouts,
//! fuses optional text spans into note regions, and scores the results.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example detect_boxes -- [OPTIONS] <IMAGES>...
//! ```
//!
//! # Arguments
//!
//! * `-c, --config` - Path to a TOML/JSON pipeline configuration file
//! * `-d, --dpi` - Raster resolution in dots per inch (default: 150)
//! * `-s, --spans` - Path to a JSON file with text spans for fusion
//! * `-o, --output-dir` - Directory to save `document_analysis.json`
//! * `--dump-json` - Dump the full analysis as JSON to stdout
//! * `<IMAGES>...` - Rasterized page images, in page order
//!
//! # Example
//!
//! ```bash
//! cargo run --example detect_boxes -- \
//!     -d 150 -s spans.json -o output/ \
//!     sheet1.png sheet2.png
//! ```

use clap::Parser;
use plannotes::prelude::*;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Command-line arguments for the box detection demo
#[derive(Parser)]
#[command(name = "detect_boxes")]
#[command(about = "Annotation Box Detection Demo - detects color-coded plan-sheet regions")]
struct Args {
    /// Rasterized page images, in page order
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Path to a TOML/JSON pipeline configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Raster resolution in dots per inch
    #[arg(short, long, default_value_t = 150.0)]
    dpi: f32,

    /// Path to a JSON file containing text spans for fusion
    #[arg(short, long)]
    spans: Option<PathBuf>,

    /// Directory to save the analysis JSON
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Dump the full analysis as JSON to stdout
    #[arg(long)]
    dump_json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    plannotes::utils::init_tracing();

    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => {
            info!("Loading pipeline configuration: {:?}", path);
            plannotes::pipeline::ConfigLoader::load_from_file(path)?
        }
        None => NotesPipelineConfig::default(),
    };
    let pipeline = NotesPipeline::new(config)?;

    // Text spans are produced by an external text-layer reader; the demo
    // accepts them as a JSON list of {text, bbox, page_number}.
    let spans: Vec<TextSpan> = match args.spans {
        Some(ref path) => {
            info!("Loading text spans: {:?}", path);
            serde_json::from_str(&std::fs::read_to_string(path)?)?
        }
        None => Vec::new(),
    };

    let mut rasters = Vec::with_capacity(args.images.len());
    for (idx, image_path) in args.images.iter().enumerate() {
        let page_number = idx as u32 + 1;
        let image = match load_image(image_path) {
            Ok(image) => image,
            Err(e) => {
                error!("Failed to load image {:?}: {}", image_path, e);
                continue;
            }
        };
        info!(
            "Page {}: {:?} ({}x{})",
            page_number,
            image_path,
            image.width(),
            image.height()
        );
        rasters.push(PageRaster::new(image, page_number, args.dpi));
    }

    let analysis = pipeline.analyze_document(&rasters, &spans);

    for page in &analysis.pages {
        let layout = &page.layout;
        info!(
            "Page {}: {} columns, {} headers, {} notes, {} legends",
            layout.page_number,
            layout.columns.len(),
            layout.column_headers.len(),
            layout.notes.len(),
            layout.legends.len()
        );
        for note in &page.notes {
            let confidence = note.confidence.unwrap_or(0.0);
            let text = if note.text.is_empty() {
                "<no text>"
            } else {
                note.text.as_str()
            };
            info!("  [{}] {:.2}: {}", note.note_id, confidence, text);
            debug!("    fingerprint: {}", note.fingerprint());
        }
    }
    for failure in &analysis.failures {
        error!("Page {} skipped: {}", failure.page_number, failure.message);
    }

    if args.dump_json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    }

    if let Some(ref output_dir) = args.output_dir {
        analysis.save_json(output_dir)?;
        info!(
            "Analysis saved to: {:?}",
            output_dir.join("document_analysis.json")
        );
    }

    Ok(())
}
