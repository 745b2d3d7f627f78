//! Per-page layout of detected annotation boxes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::region::DetectedBox;

/// All annotation boxes detected on one page, grouped by class.
///
/// Multi-instance classes preserve detection order. The whole-sheet and
/// sheet-info slots hold at most one box each under the default assembly
/// policy; surplus singleton boxes and boxes of unknown or extension
/// classes live in `markers`, keyed by class name. Serializable so a
/// layout can be persisted and reloaded as a cached detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// 1-based page number.
    pub page_number: u32,
    /// Frame around the full sheet, when annotated.
    pub whole_sheet: Option<DetectedBox>,
    /// Title block / stamp area, when annotated.
    pub sheet_info: Option<DetectedBox>,
    /// Note columns in detection order.
    #[serde(default)]
    pub columns: Vec<DetectedBox>,
    /// Column header bands in detection order.
    #[serde(default)]
    pub column_headers: Vec<DetectedBox>,
    /// Note regions in detection order.
    #[serde(default)]
    pub notes: Vec<DetectedBox>,
    /// Legend blocks in detection order.
    #[serde(default)]
    pub legends: Vec<DetectedBox>,
    /// Extension-class and overflow boxes, keyed by class name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub markers: BTreeMap<String, Vec<DetectedBox>>,
}

impl PageLayout {
    /// An empty layout for the given page.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            whole_sheet: None,
            sheet_info: None,
            columns: Vec::new(),
            column_headers: Vec::new(),
            notes: Vec::new(),
            legends: Vec::new(),
            markers: BTreeMap::new(),
        }
    }

    /// Whether the page has no detected boxes of any class.
    pub fn is_empty(&self) -> bool {
        self.total_boxes() == 0
    }

    /// Total number of boxes across all classes.
    pub fn total_boxes(&self) -> usize {
        self.iter_boxes().count()
    }

    /// Iterates every box on the page, grouped classes first, then markers
    /// in class-name order.
    pub fn iter_boxes(&self) -> impl Iterator<Item = &DetectedBox> {
        self.whole_sheet
            .iter()
            .chain(self.sheet_info.iter())
            .chain(self.columns.iter())
            .chain(self.column_headers.iter())
            .chain(self.notes.iter())
            .chain(self.legends.iter())
            .chain(self.markers.values().flatten())
    }

    /// Looks up a note box by its id.
    pub fn note_by_id(&self, id: &str) -> Option<&DetectedBox> {
        self.notes.iter().find(|b| b.id == id)
    }

    /// First column whose box contains the point, in detection order.
    pub fn column_for_point(&self, x: f32, y: f32) -> Option<&DetectedBox> {
        self.columns.iter().find(|c| c.bbox.contains_point(x, y))
    }
}
