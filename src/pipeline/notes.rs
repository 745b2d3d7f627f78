//! The end-to-end notes extraction pipeline.
//!
//! Wires detection, assembly, fusion, and scoring per page, isolates
//! per-page input failures, and runs multi-page batches in parallel.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::NotesResult;
use crate::domain::color_class::CLASS_NOTE;
use crate::domain::layout::PageLayout;
use crate::domain::note::{FusedNote, TextSpan};
use crate::domain::raster::PageRaster;
use crate::domain::report::RepeatedNotesReport;
use crate::pipeline::config::NotesPipelineConfig;
use crate::processors::aggregate::NoteAggregator;
use crate::processors::assemble::SchemaAssembler;
use crate::processors::color_detect::ColorRegionDetector;
use crate::processors::fuse::VisualTextFuser;
use crate::processors::scoring::{ScoringStrategy, WeightedScorer};

/// One page's extraction output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    /// The assembled per-page layout.
    pub layout: PageLayout,
    /// Fused, scored notes in note-box order.
    pub notes: Vec<FusedNote>,
}

/// A page the batch entry point had to skip, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFailure {
    pub page_number: u32,
    pub message: String,
}

/// Whole-document extraction output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Per-page results in input order; failed pages are omitted here.
    #[serde(default)]
    pub pages: Vec<PageAnalysis>,
    /// Pages skipped by per-page error isolation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PageFailure>,
}

impl DocumentAnalysis {
    /// All fused notes across successful pages, in page order.
    pub fn all_notes(&self) -> Vec<FusedNote> {
        self.pages
            .iter()
            .flat_map(|page| page.notes.iter().cloned())
            .collect()
    }

    /// Total fused notes across successful pages.
    pub fn note_count(&self) -> usize {
        self.pages.iter().map(|page| page.notes.len()).sum()
    }

    /// Writes `document_analysis.json` into `output_dir`, creating the
    /// directory when needed. The file round-trips through serde and can be
    /// reloaded as a cached detection result.
    pub fn save_json(&self, output_dir: &Path) -> NotesResult<()> {
        std::fs::create_dir_all(output_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(output_dir.join("document_analysis.json"), json)?;
        Ok(())
    }
}

/// The notes extraction pipeline.
///
/// Holds the validated configuration and the constructed stage components.
/// All stages are deterministic and stateless between calls, so one
/// pipeline instance can serve many pages, including in parallel.
#[derive(Debug, Clone)]
pub struct NotesPipeline {
    config: NotesPipelineConfig,
    detector: ColorRegionDetector,
    assembler: SchemaAssembler,
    fuser: VisualTextFuser,
    scorer: Arc<dyn ScoringStrategy>,
    aggregator: NoteAggregator,
}

impl NotesPipeline {
    /// Creates a pipeline from a validated configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The pipeline configuration
    ///
    /// # Returns
    ///
    /// A Result containing the NotesPipeline instance or a NotesError
    pub fn new(config: NotesPipelineConfig) -> NotesResult<Self> {
        config.validate()?;
        info!(
            classes = config.color_classes.len(),
            "initializing notes pipeline"
        );

        let classes = config.color_class_set()?;
        let note_color = classes.get(CLASS_NOTE).map(|class| class.hex());
        if note_color.is_none() {
            warn!("no 'note' color class configured; color-match feature disabled");
        }

        let detector = ColorRegionDetector::new(classes, config.detector.clone())?;
        let assembler = SchemaAssembler::new(config.assembler.clone());
        let fuser = VisualTextFuser::new(config.fuser.clone())?;
        let scorer: Arc<dyn ScoringStrategy> =
            Arc::new(WeightedScorer::new(config.scorer.clone(), note_color)?);
        let aggregator = NoteAggregator::new(config.aggregator)?;

        Ok(Self {
            config,
            detector,
            assembler,
            fuser,
            scorer,
            aggregator,
        })
    }

    /// Replaces the scoring strategy, keeping every other stage.
    pub fn with_scoring_strategy(mut self, scorer: Arc<dyn ScoringStrategy>) -> Self {
        self.scorer = scorer;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &NotesPipelineConfig {
        &self.config
    }

    /// Runs detect → assemble → fuse → score for one page.
    ///
    /// `spans` may cover the whole document; only spans on this raster's
    /// page are validated and fused. Errors here are per-page input
    /// failures; the batch entry point turns them into [`PageFailure`]
    /// records instead of aborting.
    pub fn analyze_page(
        &self,
        raster: &PageRaster,
        spans: &[TextSpan],
    ) -> NotesResult<PageAnalysis> {
        for span in spans.iter().filter(|s| s.page_number == raster.page_number) {
            span.validate()?;
        }

        let boxes = self.detector.detect_boxes(raster)?;
        let layout = self.assembler.assemble(raster.page_number, boxes);
        let mut notes = self.fuser.fuse(&layout, spans);
        for note in &mut notes {
            if let Some(original) = layout.note_by_id(&note.note_id) {
                let score = self.scorer.score(original, note);
                note.set_score(score.confidence, score.features);
            }
        }

        debug!(
            page = raster.page_number,
            boxes = layout.total_boxes(),
            notes = notes.len(),
            "analyzed page"
        );
        Ok(PageAnalysis { layout, notes })
    }

    /// Analyzes a batch of pages in parallel.
    ///
    /// Pages are independent, so the batch runs across the rayon thread
    /// pool; output order is input order. A page that fails input
    /// validation is logged and recorded in `failures` while the rest of
    /// the batch proceeds.
    pub fn analyze_document(
        &self,
        rasters: &[PageRaster],
        spans: &[TextSpan],
    ) -> DocumentAnalysis {
        info!(
            pages = rasters.len(),
            spans = spans.len(),
            "analyzing document"
        );

        let results: Vec<(u32, NotesResult<PageAnalysis>)> = rasters
            .par_iter()
            .map(|raster| (raster.page_number, self.analyze_page(raster, spans)))
            .collect();

        let mut analysis = DocumentAnalysis::default();
        for (page_number, result) in results {
            match result {
                Ok(page) => analysis.pages.push(page),
                Err(error) => {
                    warn!(page = page_number, %error, "skipping page");
                    analysis.failures.push(PageFailure {
                        page_number,
                        message: error.to_string(),
                    });
                }
            }
        }

        info!(
            ok = analysis.pages.len(),
            failed = analysis.failures.len(),
            notes = analysis.note_count(),
            "document analysis complete"
        );
        analysis
    }

    /// Aggregates repeated note text across an analyzed document.
    pub fn aggregate(&self, analysis: &DocumentAnalysis) -> RepeatedNotesReport {
        self.aggregator.aggregate(&analysis.all_notes())
    }

    /// Aggregates an arbitrary fused-note corpus.
    pub fn aggregate_notes(&self, notes: &[FusedNote]) -> RepeatedNotesReport {
        self.aggregator.aggregate(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::geometry::BBox;
    use crate::processors::scoring::NoteScore;
    use image::{Rgb, RgbImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;
    use std::collections::BTreeMap;

    const NOTE_GREEN: Rgb<u8> = Rgb([0x00, 0xF9, 0x00]);
    const COLUMN_CYAN: Rgb<u8> = Rgb([0x00, 0xFD, 0xFF]);
    const SHEET_INFO_BLUE: Rgb<u8> = Rgb([0x04, 0x33, 0xFF]);

    fn white_page(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    fn pipeline() -> NotesPipeline {
        NotesPipeline::new(NotesPipelineConfig::default()).unwrap()
    }

    /// A 400x300 page at 72 dpi: one column, two notes inside it, and a
    /// sheet-info block in the corner.
    fn sample_raster(page_number: u32) -> PageRaster {
        let mut image = white_page(400, 300);
        draw_filled_rect_mut(&mut image, Rect::at(30, 20).of_size(140, 260), COLUMN_CYAN);
        draw_filled_rect_mut(&mut image, Rect::at(50, 40).of_size(100, 50), NOTE_GREEN);
        draw_filled_rect_mut(&mut image, Rect::at(50, 120).of_size(100, 50), NOTE_GREEN);
        draw_filled_rect_mut(
            &mut image,
            Rect::at(300, 250).of_size(80, 40),
            SHEET_INFO_BLUE,
        );
        PageRaster::new(image, page_number, 72.0)
    }

    fn sample_spans(page_number: u32) -> Vec<TextSpan> {
        vec![
            TextSpan::new(
                "1. REFER SHEET FOR DESIGN CRITERIA.",
                BBox::new(55.0, 45.0, 140.0, 60.0),
                page_number,
            ),
            TextSpan::new(
                "CONSTRUCTION DOCUMENTS",
                BBox::new(55.0, 125.0, 140.0, 140.0),
                page_number,
            ),
        ]
    }

    #[test]
    fn test_analyze_page_end_to_end() {
        let analysis = pipeline()
            .analyze_page(&sample_raster(1), &sample_spans(1))
            .unwrap();

        assert_eq!(analysis.layout.columns.len(), 1);
        assert_eq!(analysis.layout.notes.len(), 2);
        assert!(analysis.layout.sheet_info.is_some());
        assert!(analysis.layout.whole_sheet.is_none());

        assert_eq!(analysis.notes.len(), 2);
        let first = &analysis.notes[0];
        assert_eq!(first.note_id, "note_1");
        assert_eq!(first.text, "1. REFER SHEET FOR DESIGN CRITERIA.");
        assert_eq!(first.column_id.as_deref(), Some("column_1"));
        // Every feature fires for the first note.
        let confidence = first.confidence.unwrap();
        assert!((confidence - 1.0).abs() < 1e-6, "confidence {confidence}");

        let second = &analysis.notes[1];
        assert_eq!(second.note_id, "note_2");
        assert_eq!(second.text, "CONSTRUCTION DOCUMENTS");
        // No bullet: the score drops by exactly that weight.
        let confidence = second.confidence.unwrap();
        assert!((confidence - 0.8).abs() < 1e-6, "confidence {confidence}");
    }

    #[test]
    fn test_blank_page_yields_empty_layout() {
        let raster = PageRaster::new(white_page(200, 200), 1, 72.0);
        let analysis = pipeline().analyze_page(&raster, &[]).unwrap();
        assert!(analysis.layout.is_empty());
        assert!(analysis.notes.is_empty());
    }

    #[test]
    fn test_invalid_span_fails_page() {
        let spans = vec![TextSpan::new(
            "BAD",
            BBox::new(f32::NAN, 0.0, 10.0, 10.0),
            1,
        )];
        assert!(pipeline().analyze_page(&sample_raster(1), &spans).is_err());
    }

    #[test]
    fn test_other_page_span_does_not_fail_page() {
        let spans = vec![TextSpan::new(
            "BAD",
            BBox::new(f32::NAN, 0.0, 10.0, 10.0),
            7,
        )];
        assert!(pipeline().analyze_page(&sample_raster(1), &spans).is_ok());
    }

    #[test]
    fn test_analyze_document_isolates_bad_pages() {
        let rasters = vec![
            sample_raster(1),
            PageRaster::new(white_page(100, 100), 2, f32::NAN),
            sample_raster(3),
        ];
        let analysis = pipeline().analyze_document(&rasters, &[]);

        assert_eq!(analysis.pages.len(), 2);
        assert_eq!(analysis.pages[0].layout.page_number, 1);
        assert_eq!(analysis.pages[1].layout.page_number, 3);
        assert_eq!(analysis.failures.len(), 1);
        assert_eq!(analysis.failures[0].page_number, 2);
        assert!(analysis.failures[0].message.contains("dpi"));
    }

    #[test]
    fn test_document_aggregation_scenario() {
        let rasters = vec![sample_raster(1), sample_raster(2)];
        let spans: Vec<TextSpan> = sample_spans(1)
            .into_iter()
            .chain(sample_spans(2))
            .collect();
        let p = pipeline();
        let analysis = p.analyze_document(&rasters, &spans);
        assert_eq!(analysis.note_count(), 4);

        let report = p.aggregate(&analysis);
        assert_eq!(report.group_count(), 2);
        // Both texts repeat once per page; count ties keep first-seen order.
        assert_eq!(report.groups[0].count, 2);
        assert_eq!(report.groups[0].pages, vec![1, 2]);
        let texts: Vec<&str> = report.groups.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "1. REFER SHEET FOR DESIGN CRITERIA.",
                "CONSTRUCTION DOCUMENTS"
            ]
        );
    }

    #[test]
    fn test_custom_scoring_strategy() {
        #[derive(Debug)]
        struct Flat;

        impl ScoringStrategy for Flat {
            fn score(
                &self,
                _note_box: &crate::domain::region::DetectedBox,
                _note: &FusedNote,
            ) -> NoteScore {
                NoteScore {
                    confidence: 0.5,
                    features: BTreeMap::new(),
                }
            }
        }

        let p = pipeline().with_scoring_strategy(Arc::new(Flat));
        let analysis = p.analyze_page(&sample_raster(1), &[]).unwrap();
        for note in &analysis.notes {
            assert_eq!(note.confidence, Some(0.5));
            assert!(note.features.is_empty());
        }
    }

    #[test]
    fn test_save_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = pipeline().analyze_document(&[sample_raster(1)], &sample_spans(1));
        analysis.save_json(dir.path()).unwrap();

        let path = dir.path().join("document_analysis.json");
        let loaded: DocumentAnalysis =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(loaded, analysis);
    }
}
