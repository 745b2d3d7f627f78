//! Error types for the note-extraction pipeline.
//!
//! This module defines the error types that can occur while detecting
//! annotation regions, assembling page layouts, fusing text, scoring notes,
//! and aggregating repeated text. It also provides utility functions for
//! creating these errors with appropriate context.

use thiserror::Error;

/// Enum representing different stages of the note-extraction pipeline.
///
/// This enum is used to identify which stage of the pipeline an error
/// occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during color-region detection.
    Detection,
    /// Error occurred while assembling a page layout.
    Assembly,
    /// Error occurred while fusing text spans into note regions.
    Fusion,
    /// Error occurred while scoring fused notes.
    Scoring,
    /// Error occurred while aggregating repeated notes.
    Aggregation,
    /// Error occurred while rendering or saving a report.
    ReportGeneration,
    /// Generic processing error.
    Generic,
}

/// Implementation of Display for ProcessingStage.
///
/// This allows ProcessingStage to be converted to a string representation.
impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Detection => write!(f, "detection"),
            ProcessingStage::Assembly => write!(f, "assembly"),
            ProcessingStage::Fusion => write!(f, "fusion"),
            ProcessingStage::Scoring => write!(f, "scoring"),
            ProcessingStage::Aggregation => write!(f, "aggregation"),
            ProcessingStage::ReportGeneration => write!(f, "report generation"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the note-extraction
/// pipeline.
///
/// Configuration errors are fatal for the whole run and are surfaced before
/// any detection is attempted. Invalid-input errors are fatal for the page
/// that produced them; the batch entry points catch them, log the page
/// identity, and continue with the remaining pages.
#[derive(Error, Debug)]
pub enum NotesError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input (malformed raster or span data).
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from JSON serialization or deserialization.
    #[error("serialization")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Implementation of NotesError with utility functions for creating errors.
impl NotesError {
    /// Creates a NotesError for a processing failure at a given stage.
    ///
    /// # Arguments
    ///
    /// * `kind` - The stage of processing where the error occurred.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    ///
    /// # Returns
    ///
    /// A NotesError instance.
    pub fn processing_error(
        kind: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a NotesError for invalid input.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the invalid input.
    ///
    /// # Returns
    ///
    /// A NotesError instance.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a NotesError for configuration errors.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the configuration error.
    ///
    /// # Returns
    ///
    /// A NotesError instance.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a NotesError for configuration errors with field context.
    ///
    /// # Arguments
    ///
    /// * `field` - The field where the error occurred.
    /// * `value` - The value of the field.
    /// * `reason` - The reason for the error.
    ///
    /// # Returns
    ///
    /// A NotesError instance.
    pub fn config_error_with_context(field: &str, value: &str, reason: &str) -> Self {
        Self::ConfigError {
            message: format!(
                "Configuration error in field '{}' with value '{}': {}",
                field, value, reason
            ),
        }
    }

}

/// A type alias for Results that use NotesError as the error type.
pub type NotesResult<T> = Result<T, NotesError>;
