//! Text spans and fused notes.
//!
//! Text spans come from the external text-layer reader. The fuser pairs
//! them with detected note boxes to produce [`FusedNote`] records, which the
//! scorer then annotates with a confidence score and feature breakdown.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::core::{validate_finite, NotesResult};
use crate::domain::region::DetectedBox;
use crate::processors::aggregate::normalize_text;
use crate::processors::geometry::BBox;

/// One piece of extracted text with its document-space position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The extracted text.
    pub text: String,
    /// Bounding box in document coordinates.
    pub bbox: BBox,
    /// 1-based page number.
    pub page_number: u32,
}

impl TextSpan {
    /// Creates a span.
    pub fn new(text: impl Into<String>, bbox: BBox, page_number: u32) -> Self {
        Self {
            text: text.into(),
            bbox,
            page_number,
        }
    }

    /// Checks the span's box coordinates are finite. Failures are per-page
    /// input errors.
    pub fn validate(&self) -> NotesResult<()> {
        validate_finite(self.bbox.x0, "span bbox x0")?;
        validate_finite(self.bbox.y0, "span bbox y0")?;
        validate_finite(self.bbox.x1, "span bbox x1")?;
        validate_finite(self.bbox.y1, "span bbox y1")?;
        Ok(())
    }
}

/// A detected note region fused with the text found inside it.
///
/// `note_id` is the id of the originating [`DetectedBox`], carried as an
/// explicit foreign key so downstream joins never rely on positional
/// alignment. The fuser creates the record; the scorer mutates it exactly
/// once via [`FusedNote::set_score`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedNote {
    /// Id of the originating note box, e.g. `note_2`.
    pub note_id: String,
    /// Bounding box of the originating note box.
    pub bbox: BBox,
    /// 1-based page number.
    pub page_number: u32,
    /// Class name of the originating box (always `note`).
    pub class_name: String,
    /// Representative color as `#RRGGBB`.
    pub color: String,
    /// Concatenated span text in reading order; empty when no span matched.
    pub text: String,
    /// Id of the column whose box contains the note center, when any.
    pub column_id: Option<String>,
    /// Confidence score in [0,1], present after scoring.
    pub confidence: Option<f32>,
    /// Per-feature score breakdown, present after scoring.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, f32>,
}

impl FusedNote {
    /// Creates a fused note from its originating box and concatenated text.
    pub fn from_box(source: &DetectedBox, text: String, column_id: Option<String>) -> Self {
        Self {
            note_id: source.id.clone(),
            bbox: source.bbox,
            page_number: source.page_number,
            class_name: source.class_name.clone(),
            color: source.color.clone(),
            text,
            column_id,
            confidence: None,
            features: BTreeMap::new(),
        }
    }

    /// Whether the note has any text after trimming whitespace.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Attaches the scoring results. Called once by the scorer.
    pub fn set_score(&mut self, confidence: f32, features: BTreeMap<String, f32>) {
        self.confidence = Some(confidence);
        self.features = features;
    }

    /// Normalized text (trimmed, whitespace collapsed), the aggregation key.
    pub fn normalized_text(&self) -> String {
        normalize_text(&self.text)
    }

    /// A page-scoped fingerprint for exported records: `"{page}-{hash:012}"`
    /// over the normalized text. Stable within a process run.
    pub fn fingerprint(&self) -> String {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.normalized_text().hash(&mut hasher);
        let digits = hasher.finish() % 1_000_000_000_000;
        format!("{}-{:012}", self.page_number, digits)
    }
}
