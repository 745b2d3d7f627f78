//! # plannotes
//!
//! A Rust library that extracts color-coded annotation regions from
//! rasterized engineering drawings, fuses them with the document's text
//! layer, scores the resulting notes, and aggregates boilerplate text that
//! repeats across a sheet set.
//!
//! ## Features
//!
//! - Color-tolerance pixel classification with connected-component merging
//! - Pixel-space to document-space coordinate conversion at any raster DPI
//! - Per-page layout assembly (columns, headers, notes, legends, sheet info)
//! - Geometric fusion of note regions with externally extracted text spans
//! - Weighted multi-feature confidence scoring with pluggable strategies
//! - Cross-page aggregation of repeated note text with provenance
//! - Parallel multi-page batches with per-page failure isolation
//!
//! ## Components
//!
//! - **ColorRegionDetector**: Find color-coded annotation boxes on a page
//! - **SchemaAssembler**: Group detected boxes into a per-page layout
//! - **VisualTextFuser**: Attach text spans to note regions in reading order
//! - **WeightedScorer**: Score each fused note's trustworthiness
//! - **RepeatedNoteAggregator**: Collapse identical note text across pages
//!
//! ## Modules
//!
//! * [`core`] - Error handling and input validation
//! * [`domain`] - Domain types: color classes, layouts, notes, reports
//! * [`pipeline`] - The end-to-end pipeline and its configuration
//! * [`processors`] - Detection, assembly, fusion, scoring, aggregation
//! * [`utils`] - Image loading and logging setup
//!
//! ## Quick Start
//!
//! ### Analyzing a rasterized sheet
//!
//! ```rust,no_run
//! use plannotes::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = NotesPipeline::new(NotesPipelineConfig::default())?;
//!
//! // The rasterizer and text-layer reader are external; this crate takes
//! // their in-memory outputs.
//! let image = load_image(Path::new("sheets/a-101.png"))?;
//! let raster = PageRaster::new(image, 1, 150.0);
//! let spans = vec![TextSpan::new(
//!     "1. ALL DIMENSIONS ARE TO FACE OF STUD.",
//!     BBox::new(36.0, 120.0, 290.0, 132.0),
//!     1,
//! )];
//!
//! let analysis = pipeline.analyze_page(&raster, &spans)?;
//! for note in &analysis.notes {
//!     println!("{} [{:?}]: {}", note.note_id, note.confidence, note.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### TOML Configuration
//!
//! ```rust
//! use plannotes::pipeline::{ConfigLoader, NotesPipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load_from_toml(
//!     r##"
//! [[color_classes]]
//! name = "note"
//! color = "#00F900"
//! tolerance = 40
//!
//! [aggregator]
//! min_occurrences = 3
//! "##,
//! )?;
//! let pipeline = NotesPipeline::new(config)?;
//! # let _ = pipeline;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod core;
pub mod domain;

pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use plannotes::prelude::*;
/// ```
///
/// Included items focus on the most common tasks:
/// - Pipeline (`NotesPipeline`, `NotesPipelineConfig`, `PageAnalysis`, `DocumentAnalysis`)
/// - Inputs (`PageRaster`, `TextSpan`, `ColorClass`, `ColorClassSet`, `BBox`)
/// - Outputs (`PageLayout`, `DetectedBox`, `FusedNote`, `RepeatedNotesReport`)
/// - Essential error and result types (`NotesError`, `NotesResult`)
/// - Basic image loading (`load_image`)
///
/// For advanced customization (scoring strategies, individual stages),
/// import directly from the respective modules (e.g., `plannotes::processors`,
/// `plannotes::pipeline`).
pub mod prelude {
    // Pipeline (essential)
    pub use crate::pipeline::{
        DocumentAnalysis, NotesPipeline, NotesPipelineConfig, PageAnalysis, PageFailure,
    };

    // Domain types
    pub use crate::domain::{
        ColorClass, ColorClassSet, DetectedBox, FusedNote, NoteGroup, PageLayout, PageRaster,
        RepeatedNotesReport, TextSpan,
    };

    // Geometry
    pub use crate::processors::BBox;

    // Error Handling (essential)
    pub use crate::core::{NotesError, NotesResult};

    // Image Utility (minimal)
    pub use crate::utils::load_image;
}
