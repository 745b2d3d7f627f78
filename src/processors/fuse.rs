//! Fusion of detected note regions with extracted text spans.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{NotesError, NotesResult};
use crate::domain::layout::PageLayout;
use crate::domain::note::{FusedNote, TextSpan};
use crate::processors::sorting::sort_spans_reading_order;

/// Fusion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuserConfig {
    /// Fraction of a span's area that must lie inside a note box for the
    /// span to count toward that note.
    #[serde(default = "default_containment_threshold")]
    pub containment_threshold: f32,
    /// Same-line tolerance for reading order, in document units.
    #[serde(default = "default_line_tolerance")]
    pub line_tolerance: f32,
}

fn default_containment_threshold() -> f32 {
    0.6
}

fn default_line_tolerance() -> f32 {
    5.0
}

impl Default for FuserConfig {
    fn default() -> Self {
        Self {
            containment_threshold: default_containment_threshold(),
            line_tolerance: default_line_tolerance(),
        }
    }
}

impl FuserConfig {
    /// Validates the configuration. Failures are fatal for the run.
    pub fn validate(&self) -> NotesResult<()> {
        if !self.containment_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.containment_threshold)
        {
            return Err(NotesError::config_error_with_context(
                "containment_threshold",
                &self.containment_threshold.to_string(),
                "must be within [0.0, 1.0]",
            ));
        }
        if !self.line_tolerance.is_finite() || self.line_tolerance < 0.0 {
            return Err(NotesError::config_error_with_context(
                "line_tolerance",
                &self.line_tolerance.to_string(),
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Fuses text spans into note regions, one [`FusedNote`] per note box.
///
/// Output order follows the layout's note order, and every fused note
/// carries its originating box id, so consumers may join either way.
/// Re-running on identical inputs yields byte-identical text.
#[derive(Debug, Clone)]
pub struct VisualTextFuser {
    config: FuserConfig,
}

impl VisualTextFuser {
    /// Creates a fuser.
    pub fn new(config: FuserConfig) -> NotesResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Fuses one page's spans into its note boxes.
    ///
    /// Spans from other pages are ignored. A note box with no matching
    /// spans yields a fused note with empty text; that is valid output and
    /// is preserved so the scorer can penalize it.
    pub fn fuse(&self, layout: &PageLayout, spans: &[TextSpan]) -> Vec<FusedNote> {
        let page_spans: Vec<&TextSpan> = spans
            .iter()
            .filter(|s| s.page_number == layout.page_number)
            .collect();

        let mut fused = Vec::with_capacity(layout.notes.len());
        for note_box in &layout.notes {
            let matched: Vec<&TextSpan> = page_spans
                .iter()
                .copied()
                .filter(|span| {
                    let ratio = span.bbox.overlap_ratio(&note_box.bbox);
                    // A span with no overlap never fuses, whatever the
                    // configured threshold.
                    ratio > 0.0 && ratio >= self.config.containment_threshold
                })
                .collect();

            let ordered = sort_spans_reading_order(&matched, self.config.line_tolerance);
            let text = ordered.iter().map(|s| s.text.as_str()).join(" ");

            let (cx, cy) = note_box.center();
            let column_id = layout.column_for_point(cx, cy).map(|c| c.id.clone());

            if matched.is_empty() {
                debug!(
                    page = layout.page_number,
                    note = %note_box.id,
                    "note box fused with no text spans"
                );
            }
            fused.push(FusedNote::from_box(note_box, text, column_id));
        }
        fused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::region::DetectedBox;
    use crate::processors::geometry::BBox;

    fn note_box(id: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> DetectedBox {
        DetectedBox::new(id, BBox::new(x0, y0, x1, y1), 1, "note", "#00F900")
    }

    fn layout_with_notes(notes: Vec<DetectedBox>) -> PageLayout {
        let mut layout = PageLayout::new(1);
        layout.notes = notes;
        layout
    }

    fn fuser() -> VisualTextFuser {
        VisualTextFuser::new(FuserConfig::default()).unwrap()
    }

    #[test]
    fn test_fully_contained_span_is_fused() {
        let layout = layout_with_notes(vec![note_box("note_1", 10.0, 10.0, 110.0, 50.0)]);
        let spans = vec![TextSpan::new(
            "PROVIDE BLOCKING",
            BBox::new(15.0, 15.0, 80.0, 25.0),
            1,
        )];
        let fused = fuser().fuse(&layout, &spans);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].text, "PROVIDE BLOCKING");
        assert_eq!(fused[0].note_id, "note_1");
    }

    #[test]
    fn test_disjoint_span_is_never_fused() {
        let layout = layout_with_notes(vec![note_box("note_1", 10.0, 10.0, 110.0, 50.0)]);
        let spans = vec![TextSpan::new(
            "ELSEWHERE",
            BBox::new(300.0, 300.0, 350.0, 310.0),
            1,
        )];
        let fused = fuser().fuse(&layout, &spans);
        assert_eq!(fused[0].text, "");
        assert!(!fused[0].has_text());
    }

    #[test]
    fn test_disjoint_span_excluded_even_at_zero_threshold() {
        let config = FuserConfig {
            containment_threshold: 0.0,
            ..FuserConfig::default()
        };
        let layout = layout_with_notes(vec![note_box("note_1", 10.0, 10.0, 110.0, 50.0)]);
        let spans = vec![TextSpan::new(
            "ELSEWHERE",
            BBox::new(300.0, 300.0, 350.0, 310.0),
            1,
        )];
        let fused = VisualTextFuser::new(config).unwrap().fuse(&layout, &spans);
        assert_eq!(fused[0].text, "");
    }

    #[test]
    fn test_partial_overlap_respects_threshold() {
        // Span (0,0)-(10,10); 70% of its width inside the first note box,
        // 50% inside the second.
        let span = TextSpan::new("EDGE", BBox::new(0.0, 0.0, 10.0, 10.0), 1);

        let seventy = layout_with_notes(vec![note_box("note_1", 3.0, 0.0, 60.0, 10.0)]);
        assert_eq!(fuser().fuse(&seventy, &[span.clone()])[0].text, "EDGE");

        let fifty = layout_with_notes(vec![note_box("note_1", 5.0, 0.0, 60.0, 10.0)]);
        assert_eq!(fuser().fuse(&fifty, &[span])[0].text, "");
    }

    #[test]
    fn test_threshold_boundary_inclusive() {
        // Exactly 60% of the span lies inside the note box.
        let span = TextSpan::new("BOUNDARY", BBox::new(0.0, 0.0, 10.0, 10.0), 1);
        let layout = layout_with_notes(vec![note_box("note_1", 4.0, 0.0, 60.0, 10.0)]);
        assert_eq!(fuser().fuse(&layout, &[span])[0].text, "BOUNDARY");
    }

    #[test]
    fn test_reading_order_concatenation() {
        let layout = layout_with_notes(vec![note_box("note_1", 0.0, 0.0, 200.0, 100.0)]);
        let spans = vec![
            TextSpan::new("BLOCKING", BBox::new(60.0, 10.0, 110.0, 18.0), 1),
            TextSpan::new("AT 24\" O.C.", BBox::new(5.0, 30.0, 60.0, 38.0), 1),
            TextSpan::new("1. PROVIDE", BBox::new(5.0, 10.0, 55.0, 18.0), 1),
        ];
        let fused = fuser().fuse(&layout, &spans);
        assert_eq!(fused[0].text, "1. PROVIDE BLOCKING AT 24\" O.C.");
    }

    #[test]
    fn test_spans_from_other_pages_ignored() {
        let layout = layout_with_notes(vec![note_box("note_1", 10.0, 10.0, 110.0, 50.0)]);
        let spans = vec![TextSpan::new(
            "WRONG PAGE",
            BBox::new(15.0, 15.0, 80.0, 25.0),
            2,
        )];
        assert_eq!(fuser().fuse(&layout, &spans)[0].text, "");
    }

    #[test]
    fn test_output_aligns_with_note_order_and_ids() {
        let layout = layout_with_notes(vec![
            note_box("note_1", 0.0, 0.0, 50.0, 20.0),
            note_box("note_2", 0.0, 40.0, 50.0, 60.0),
        ]);
        let spans = vec![
            TextSpan::new("SECOND", BBox::new(5.0, 45.0, 45.0, 55.0), 1),
            TextSpan::new("FIRST", BBox::new(5.0, 5.0, 45.0, 15.0), 1),
        ];
        let fused = fuser().fuse(&layout, &spans);
        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].note_id, "note_1");
        assert_eq!(fused[0].text, "FIRST");
        assert_eq!(fused[1].note_id, "note_2");
        assert_eq!(fused[1].text, "SECOND");
    }

    #[test]
    fn test_column_assignment_by_center() {
        let mut layout = layout_with_notes(vec![
            note_box("note_1", 120.0, 20.0, 180.0, 40.0),
            note_box("note_2", 400.0, 20.0, 460.0, 40.0),
        ]);
        layout.columns = vec![
            DetectedBox::new("column_1", BBox::new(0.0, 0.0, 100.0, 500.0), 1, "column", "#00FDFF"),
            DetectedBox::new(
                "column_2",
                BBox::new(100.0, 0.0, 200.0, 500.0),
                1,
                "column",
                "#00FDFF",
            ),
        ];
        let fused = fuser().fuse(&layout, &[]);
        assert_eq!(fused[0].column_id.as_deref(), Some("column_2"));
        assert_eq!(fused[1].column_id, None);
    }

    #[test]
    fn test_fusion_is_deterministic() {
        let layout = layout_with_notes(vec![note_box("note_1", 0.0, 0.0, 200.0, 100.0)]);
        let spans = vec![
            TextSpan::new("B", BBox::new(40.0, 10.0, 60.0, 18.0), 1),
            TextSpan::new("A", BBox::new(5.0, 10.0, 35.0, 18.0), 1),
            TextSpan::new("C", BBox::new(70.0, 10.0, 90.0, 18.0), 1),
        ];
        let f = fuser();
        let first = f.fuse(&layout, &spans);
        let second = f.fuse(&layout, &spans);
        assert_eq!(first[0].text, "A B C");
        assert_eq!(first, second);
    }

    #[test]
    fn test_config_validation() {
        assert!(VisualTextFuser::new(FuserConfig {
            containment_threshold: 1.5,
            ..FuserConfig::default()
        })
        .is_err());
        assert!(VisualTextFuser::new(FuserConfig {
            line_tolerance: f32::NAN,
            ..FuserConfig::default()
        })
        .is_err());
    }
}
