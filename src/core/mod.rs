//! The core module of the note-extraction pipeline.
//!
//! This module contains the fundamental components shared by every stage:
//! - Error handling
//! - Per-page input validation utilities
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod errors;
pub mod validation;

pub use errors::{NotesError, NotesResult, ProcessingStage};
pub use validation::{validate_finite, validate_image_dimensions, validate_positive};
