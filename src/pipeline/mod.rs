//! The notes pipeline module.
//!
//! This module provides the pipeline that combines color-region detection,
//! layout assembly, text fusion, confidence scoring, and repeated-note
//! aggregation, plus the configuration types that drive it.

mod config;
pub mod notes;

// Re-export the main pipeline components for easier access
pub use config::{ConfigFormat, ConfigLoader, NotesPipelineConfig};
pub use notes::{DocumentAnalysis, NotesPipeline, PageAnalysis, PageFailure};
