//! Confidence scoring for fused notes.
//!
//! Each note is scored by a weighted sum of five independent features, all
//! normalized to [0, 1]. The strategy is pluggable through
//! [`ScoringStrategy`] so weights or individual features can be replaced
//! without touching detection or fusion.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{NotesError, NotesResult};
use crate::domain::note::FusedNote;
use crate::domain::region::DetectedBox;
use crate::processors::geometry::BBox;

/// Feature key: note color equals the configured note-class color.
pub const FEATURE_COLOR_MATCH: &str = "color_match";
/// Feature key: fused text is non-empty after trimming.
pub const FEATURE_TEXT_PRESENCE: &str = "text_presence";
/// Feature key: fused text starts with an enumerator such as `1.` or `(A)`.
pub const FEATURE_BULLET_PATTERN: &str = "bullet_pattern";
/// Feature key: box left edge is clear of the page's left boundary.
pub const FEATURE_LEFT_INDENT_ALIGNMENT: &str = "left_indent_alignment";
/// Feature key: box height/width ratio is plausible for a note.
pub const FEATURE_BOUNDING_BOX_RATIO: &str = "bounding_box_ratio";

/// Inclusive height/width range considered plausible for a note box.
const MIN_ASPECT_RATIO: f32 = 0.3;
const MAX_ASPECT_RATIO: f32 = 3.0;

/// Leading enumerator: `1.`, `(2)`, `A.` or `(A)`.
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+\.|\(\d+\)|[A-Z]\.|\([A-Z]\))").expect("static regex"));

/// Weights for the five scoring features. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_color_match")]
    pub color_match: f32,
    #[serde(default = "default_text_presence")]
    pub text_presence: f32,
    #[serde(default = "default_bullet_pattern")]
    pub bullet_pattern: f32,
    #[serde(default = "default_left_indent_alignment")]
    pub left_indent_alignment: f32,
    #[serde(default = "default_bounding_box_ratio")]
    pub bounding_box_ratio: f32,
}

fn default_color_match() -> f32 {
    0.25
}

fn default_text_presence() -> f32 {
    0.25
}

fn default_bullet_pattern() -> f32 {
    0.20
}

fn default_left_indent_alignment() -> f32 {
    0.15
}

fn default_bounding_box_ratio() -> f32 {
    0.15
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            color_match: default_color_match(),
            text_presence: default_text_presence(),
            bullet_pattern: default_bullet_pattern(),
            left_indent_alignment: default_left_indent_alignment(),
            bounding_box_ratio: default_bounding_box_ratio(),
        }
    }
}

impl ScoreWeights {
    /// Validates that every weight is finite and non-negative and that the
    /// weights sum to 1.0 within a small epsilon.
    pub fn validate(&self) -> NotesResult<()> {
        let weights = [
            (FEATURE_COLOR_MATCH, self.color_match),
            (FEATURE_TEXT_PRESENCE, self.text_presence),
            (FEATURE_BULLET_PATTERN, self.bullet_pattern),
            (FEATURE_LEFT_INDENT_ALIGNMENT, self.left_indent_alignment),
            (FEATURE_BOUNDING_BOX_RATIO, self.bounding_box_ratio),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(NotesError::config_error_with_context(
                    name,
                    &weight.to_string(),
                    "must be finite and non-negative",
                ));
            }
        }
        let sum: f32 = weights.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > 1e-3 {
            return Err(NotesError::config_error_with_context(
                "weights",
                &sum.to_string(),
                "feature weights must sum to 1.0",
            ));
        }
        Ok(())
    }
}

/// Scorer parameters beyond the weights themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Boxes whose left edge lies within this many document units of x = 0
    /// are treated as page-border artifacts.
    #[serde(default = "default_edge_margin")]
    pub edge_margin: f32,
    #[serde(default)]
    pub weights: ScoreWeights,
}

fn default_edge_margin() -> f32 {
    5.0
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            edge_margin: default_edge_margin(),
            weights: ScoreWeights::default(),
        }
    }
}

impl ScorerConfig {
    pub fn validate(&self) -> NotesResult<()> {
        self.weights.validate()?;
        if !self.edge_margin.is_finite() || self.edge_margin < 0.0 {
            return Err(NotesError::config_error_with_context(
                "edge_margin",
                &self.edge_margin.to_string(),
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Result of scoring one fused note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteScore {
    /// Weighted sum of all features, in [0, 1].
    pub confidence: f32,
    /// Per-feature values, keyed by the `FEATURE_*` constants.
    pub features: BTreeMap<String, f32>,
}

/// A scoring policy for fused notes.
///
/// The original note box is passed alongside the fused note; geometry
/// features read the box while text features read the fused note, so a
/// strategy never depends on positional alignment between the two lists.
pub trait ScoringStrategy: Send + Sync + std::fmt::Debug {
    fn score(&self, note_box: &DetectedBox, note: &FusedNote) -> NoteScore;
}

/// The default weighted-sum scorer.
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    config: ScorerConfig,
    /// Hex color of the configured note class, when one exists. Compared
    /// case-insensitively against each note's recorded color.
    expected_color: Option<String>,
}

impl WeightedScorer {
    /// Creates a scorer.
    ///
    /// `expected_color` is the hex color of the note color class; when
    /// `None`, the color-match feature always scores 0.0.
    pub fn new(config: ScorerConfig, expected_color: Option<String>) -> NotesResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            expected_color,
        })
    }

    fn color_match(&self, note: &FusedNote) -> f32 {
        match &self.expected_color {
            Some(expected) if expected.eq_ignore_ascii_case(&note.color) => 1.0,
            _ => 0.0,
        }
    }

    fn text_presence(note: &FusedNote) -> f32 {
        if note.text.trim().is_empty() {
            0.0
        } else {
            1.0
        }
    }

    fn bullet_pattern(note: &FusedNote) -> f32 {
        if BULLET_RE.is_match(note.text.trim_start()) {
            1.0
        } else {
            0.0
        }
    }

    fn left_indent_alignment(&self, bbox: &BBox) -> f32 {
        if bbox.x0 > self.config.edge_margin {
            1.0
        } else {
            0.0
        }
    }

    fn bounding_box_ratio(bbox: &BBox) -> f32 {
        let width = bbox.width();
        let height = bbox.height();
        if width <= 0.0 || height <= 0.0 {
            return 0.0;
        }
        let ratio = height / width;
        if (MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO).contains(&ratio) {
            1.0
        } else {
            0.0
        }
    }
}

impl ScoringStrategy for WeightedScorer {
    fn score(&self, note_box: &DetectedBox, note: &FusedNote) -> NoteScore {
        let color_match = self.color_match(note);
        let text_presence = Self::text_presence(note);
        let bullet_pattern = Self::bullet_pattern(note);
        let left_indent = self.left_indent_alignment(&note_box.bbox);
        let box_ratio = Self::bounding_box_ratio(&note_box.bbox);

        let mut features = BTreeMap::new();
        features.insert(FEATURE_COLOR_MATCH.to_string(), color_match);
        features.insert(FEATURE_TEXT_PRESENCE.to_string(), text_presence);
        features.insert(FEATURE_BULLET_PATTERN.to_string(), bullet_pattern);
        features.insert(FEATURE_LEFT_INDENT_ALIGNMENT.to_string(), left_indent);
        features.insert(FEATURE_BOUNDING_BOX_RATIO.to_string(), box_ratio);

        let weights = &self.config.weights;
        let confidence = (weights.color_match * color_match
            + weights.text_presence * text_presence
            + weights.bullet_pattern * bullet_pattern
            + weights.left_indent_alignment * left_indent
            + weights.bounding_box_ratio * box_ratio)
            .clamp(0.0, 1.0);

        NoteScore {
            confidence,
            features,
        }
    }
}
