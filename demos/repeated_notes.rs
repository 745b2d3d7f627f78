//! Repeated Notes Report Demo
//!
//! This demo aggregates repeated note text from a saved document analysis
//! (produced by the `detect_boxes` demo) and renders the repeated-notes
//! report as Markdown and JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example repeated_notes -- [OPTIONS] <ANALYSIS>
//! ```
//!
//! # Arguments
//!
//! * `--min-occurrences` - Minimum occurrences for a group (default: 2)
//! * `--min-text-length` - Minimum normalized text length (default: 10)
//! * `-o, --output-dir` - Directory to save `repeated_notes.{json,md}`
//! * `<ANALYSIS>` - Path to a `document_analysis.json` file
//!
//! # Example
//!
//! ```bash
//! cargo run --example repeated_notes -- \
//!     --min-occurrences 2 -o output/ \
//!     output/document_analysis.json
//! ```

use clap::Parser;
use plannotes::prelude::*;
use plannotes::processors::{AggregatorConfig, NoteAggregator};
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for the repeated notes demo
#[derive(Parser)]
#[command(name = "repeated_notes")]
#[command(about = "Repeated Notes Report Demo - groups identical note text across pages")]
struct Args {
    /// Path to a document_analysis.json file
    analysis: PathBuf,

    /// Minimum occurrences for a group to be reported
    #[arg(long, default_value_t = 2)]
    min_occurrences: usize,

    /// Minimum normalized text length for a note to be considered
    #[arg(long, default_value_t = 10)]
    min_text_length: usize,

    /// Directory to save the report files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    plannotes::utils::init_tracing();

    let args = Args::parse();

    info!("Loading analysis: {:?}", args.analysis);
    let analysis: DocumentAnalysis =
        serde_json::from_str(&std::fs::read_to_string(&args.analysis)?)?;
    info!(
        "Loaded {} pages with {} notes",
        analysis.pages.len(),
        analysis.note_count()
    );

    let aggregator = NoteAggregator::new(AggregatorConfig {
        min_occurrences: args.min_occurrences,
        min_text_length: args.min_text_length,
    })?;
    let report = aggregator.aggregate(&analysis.all_notes());

    info!(
        "Found {} repeated note groups across {} notes",
        report.group_count(),
        report.total_notes
    );

    match args.output_dir {
        Some(ref output_dir) => {
            report.save_results(output_dir, true, true)?;
            info!("Report saved to: {:?}", output_dir);
        }
        None => println!("{}", report.to_markdown()),
    }

    Ok(())
}
