//! Processing stages for annotation extraction.
//!
//! This module holds the algorithmic core of the pipeline: pixel
//! classification and region detection, layout assembly, text fusion,
//! confidence scoring, and cross-page aggregation, plus the geometric
//! primitives they share.
//!
//! # Modules
//!
//! * `aggregate` - Grouping of repeated note text across pages
//! * `assemble` - Per-page layout assembly from detected boxes
//! * `color_detect` - Color-class pixel detection and component extraction
//! * `fuse` - Fusion of note regions with extracted text spans
//! * `geometry` - Bounding boxes in pixel and document space
//! * `scoring` - Weighted confidence scoring for fused notes
//! * `sorting` - Reading-order sorting for text spans

pub mod aggregate;
pub mod assemble;
pub mod color_detect;
pub mod fuse;
pub mod geometry;
pub mod scoring;
pub mod sorting;

pub use aggregate::{normalize_text, AggregatorConfig, NoteAggregator};
pub use assemble::{AssemblerConfig, SchemaAssembler, UnknownClassPolicy};
pub use color_detect::{ColorRegionDetector, DetectorConfig};
pub use fuse::{FuserConfig, VisualTextFuser};
pub use geometry::{BBox, PixelBox};
pub use scoring::{
    NoteScore, ScoreWeights, ScorerConfig, ScoringStrategy, WeightedScorer,
    FEATURE_BOUNDING_BOX_RATIO, FEATURE_BULLET_PATTERN, FEATURE_COLOR_MATCH,
    FEATURE_LEFT_INDENT_ALIGNMENT, FEATURE_TEXT_PRESENCE,
};
pub use sorting::sort_spans_reading_order;
