//! Assembly of detected boxes into a per-page layout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::domain::color_class::{
    CLASS_COLUMN, CLASS_COLUMN_HEADER, CLASS_LEGEND, CLASS_NOTE, CLASS_SHEET_INFO,
    CLASS_WHOLE_SHEET,
};
use crate::domain::layout::PageLayout;
use crate::domain::region::DetectedBox;

/// What to do with boxes whose class is not part of the known layout shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownClassPolicy {
    /// Pass the box through into the layout's marker map (default).
    #[default]
    Keep,
    /// Drop the box, logging the class name.
    Reject,
}

/// Assembly parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Singleton classes allowed to keep surplus boxes. Surplus boxes for
    /// listed classes are retained in the marker map; otherwise only the
    /// first-detected box survives.
    #[serde(default)]
    pub allow_multiple: Vec<String>,
    /// Policy for boxes of classes outside the layout shape.
    #[serde(default)]
    pub unknown_classes: UnknownClassPolicy,
}

/// Groups detected boxes by class into a [`PageLayout`].
///
/// A deterministic, side-effect-free transform: multi-instance classes
/// preserve detection order; singleton classes follow first-detected-wins
/// unless configured otherwise.
#[derive(Debug, Clone, Default)]
pub struct SchemaAssembler {
    config: AssemblerConfig,
}

impl SchemaAssembler {
    /// Creates an assembler.
    pub fn new(config: AssemblerConfig) -> Self {
        Self { config }
    }

    /// Builds the layout for one page from its boxes in detection order.
    pub fn assemble(&self, page_number: u32, boxes: Vec<DetectedBox>) -> PageLayout {
        let mut layout = PageLayout::new(page_number);
        for detected in boxes {
            match detected.class_name.as_str() {
                CLASS_COLUMN => layout.columns.push(detected),
                CLASS_COLUMN_HEADER => layout.column_headers.push(detected),
                CLASS_NOTE => layout.notes.push(detected),
                CLASS_LEGEND => layout.legends.push(detected),
                CLASS_WHOLE_SHEET => self.place_singleton(
                    &mut layout.whole_sheet,
                    &mut layout.markers,
                    detected,
                ),
                CLASS_SHEET_INFO => self.place_singleton(
                    &mut layout.sheet_info,
                    &mut layout.markers,
                    detected,
                ),
                _ => match self.config.unknown_classes {
                    UnknownClassPolicy::Keep => {
                        debug!(
                            page = page_number,
                            class = %detected.class_name,
                            "unknown class kept as marker"
                        );
                        layout
                            .markers
                            .entry(detected.class_name.clone())
                            .or_default()
                            .push(detected);
                    }
                    UnknownClassPolicy::Reject => {
                        warn!(
                            page = page_number,
                            class = %detected.class_name,
                            id = %detected.id,
                            "unknown class rejected"
                        );
                    }
                },
            }
        }
        layout
    }

    fn place_singleton(
        &self,
        slot: &mut Option<DetectedBox>,
        markers: &mut BTreeMap<String, Vec<DetectedBox>>,
        detected: DetectedBox,
    ) {
        if slot.is_none() {
            *slot = Some(detected);
            return;
        }
        if self
            .config
            .allow_multiple
            .iter()
            .any(|c| c == &detected.class_name)
        {
            markers
                .entry(detected.class_name.clone())
                .or_default()
                .push(detected);
        } else {
            debug!(
                page = detected.page_number,
                class = %detected.class_name,
                id = %detected.id,
                "surplus singleton box dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::geometry::BBox;

    fn make_box(id: &str, class: &str, y0: f32) -> DetectedBox {
        DetectedBox::new(id, BBox::new(10.0, y0, 100.0, y0 + 20.0), 1, class, "#00F900")
    }

    #[test]
    fn test_groups_known_classes_in_order() {
        let assembler = SchemaAssembler::default();
        let layout = assembler.assemble(
            1,
            vec![
                make_box("column_1", "column", 0.0),
                make_box("note_1", "note", 10.0),
                make_box("note_2", "note", 40.0),
                make_box("column_header_1", "column_header", 0.0),
                make_box("legend_1", "legend", 300.0),
                make_box("whole_sheet_1", "whole_sheet", 0.0),
                make_box("sheet_info_1", "sheet_info", 700.0),
            ],
        );
        assert_eq!(layout.columns.len(), 1);
        assert_eq!(layout.column_headers.len(), 1);
        assert_eq!(layout.legends.len(), 1);
        assert_eq!(
            layout.notes.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
            vec!["note_1", "note_2"]
        );
        assert!(layout.whole_sheet.is_some());
        assert!(layout.sheet_info.is_some());
        assert!(layout.markers.is_empty());
    }

    #[test]
    fn test_singleton_first_detected_wins() {
        let assembler = SchemaAssembler::default();
        let layout = assembler.assemble(
            1,
            vec![
                make_box("sheet_info_1", "sheet_info", 700.0),
                make_box("sheet_info_2", "sheet_info", 750.0),
            ],
        );
        assert_eq!(layout.sheet_info.as_ref().unwrap().id, "sheet_info_1");
        assert!(layout.markers.is_empty());
    }

    #[test]
    fn test_allow_multiple_retains_surplus_in_markers() {
        let assembler = SchemaAssembler::new(AssemblerConfig {
            allow_multiple: vec!["sheet_info".to_string()],
            ..AssemblerConfig::default()
        });
        let layout = assembler.assemble(
            1,
            vec![
                make_box("sheet_info_1", "sheet_info", 700.0),
                make_box("sheet_info_2", "sheet_info", 750.0),
                make_box("sheet_info_3", "sheet_info", 770.0),
            ],
        );
        assert_eq!(layout.sheet_info.as_ref().unwrap().id, "sheet_info_1");
        let surplus = &layout.markers["sheet_info"];
        assert_eq!(
            surplus.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
            vec!["sheet_info_2", "sheet_info_3"]
        );
    }

    #[test]
    fn test_unknown_class_kept_by_default() {
        let assembler = SchemaAssembler::default();
        let layout = assembler.assemble(1, vec![make_box("detail_tag_1", "detail_tag", 50.0)]);
        assert_eq!(layout.markers["detail_tag"].len(), 1);
    }

    #[test]
    fn test_unknown_class_rejected_when_configured() {
        let assembler = SchemaAssembler::new(AssemblerConfig {
            unknown_classes: UnknownClassPolicy::Reject,
            ..AssemblerConfig::default()
        });
        let layout = assembler.assemble(1, vec![make_box("detail_tag_1", "detail_tag", 50.0)]);
        assert!(layout.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_layout() {
        let layout = SchemaAssembler::default().assemble(9, Vec::new());
        assert_eq!(layout.page_number, 9);
        assert!(layout.is_empty());
    }
}
