//! Repeated-note groups and the rendered report.
//!
//! The aggregator produces [`NoteGroup`] records; [`RepeatedNotesReport`]
//! wraps them with the run parameters and renders to Markdown or JSON for
//! human review or persistence.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{NotesError, NotesResult, ProcessingStage};

/// Maximum characters of group text shown in the Markdown preview.
const PREVIEW_CHAR_LIMIT: usize = 200;

/// One member of a note group: where a repeated note was seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteOccurrence {
    /// 1-based page number.
    pub page_number: u32,
    /// Containing column id, when the page had column boxes.
    pub column_id: Option<String>,
    /// Originating note box id, when known.
    pub note_id: Option<String>,
    /// Bounding box rendered as `x0, y0, x1, y1`, when known.
    pub region: Option<String>,
}

/// A group of notes sharing identical normalized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteGroup {
    /// The normalized text key.
    pub text: String,
    /// Raw text of the first-seen member, used for display.
    pub sample_text: String,
    /// Number of member occurrences.
    pub count: usize,
    /// Sorted distinct pages the note appears on.
    pub pages: Vec<u32>,
    /// Per-instance provenance in discovery order.
    pub occurrences: Vec<NoteOccurrence>,
}

/// The full repeated-notes report for a document set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatedNotesReport {
    /// Minimum occurrences a group needed to survive.
    pub min_occurrences: usize,
    /// Minimum normalized text length a note needed to be considered.
    pub min_text_length: usize,
    /// Number of notes in the input corpus.
    pub total_notes: usize,
    /// Surviving groups, ordered by occurrence count descending.
    pub groups: Vec<NoteGroup>,
}

impl RepeatedNotesReport {
    /// Number of surviving groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Renders the report as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.push("# Repeated Notes Report".to_string());
        lines.push(String::new());
        lines.push(format!("**Minimum occurrences:** {}", self.min_occurrences));
        lines.push(format!("**Minimum text length:** {}", self.min_text_length));
        lines.push(format!("**Notes considered:** {}", self.total_notes));
        lines.push(format!("**Repeated notes found:** {}", self.group_count()));
        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());

        for (idx, group) in self.groups.iter().enumerate() {
            lines.push(format!(
                "## Note {} (occurrences: {}, pages: {:?})",
                idx + 1,
                group.count,
                group.pages
            ));
            lines.push(String::new());
            lines.push("**Text:**".to_string());
            lines.push(String::new());
            lines.push("```".to_string());
            lines.push(preview(&group.sample_text));
            lines.push("```".to_string());
            lines.push(String::new());
            lines.push("**Instances:**".to_string());
            lines.push(String::new());
            lines.push("| Page | Column | Note ID | Region |".to_string());
            lines.push("|------|--------|---------|--------|".to_string());
            for occurrence in &group.occurrences {
                lines.push(format!(
                    "| {} | {} | {} | {} |",
                    occurrence.page_number,
                    occurrence.column_id.as_deref().unwrap_or("-"),
                    occurrence.note_id.as_deref().unwrap_or("-"),
                    occurrence.region.as_deref().unwrap_or("-"),
                ));
            }
            lines.push(String::new());
            lines.push("---".to_string());
            lines.push(String::new());
        }

        lines.join("\n")
    }

    /// Converts the report to a JSON Value.
    pub fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Writes `repeated_notes.json` and/or `repeated_notes.md` into
    /// `output_dir`, creating the directory when needed.
    pub fn save_results(
        &self,
        output_dir: &Path,
        save_json: bool,
        save_markdown: bool,
    ) -> NotesResult<()> {
        std::fs::create_dir_all(output_dir).map_err(|e| {
            NotesError::processing_error(
                ProcessingStage::ReportGeneration,
                "create output directory",
                e,
            )
        })?;
        if save_json {
            let json = serde_json::to_string_pretty(self)?;
            std::fs::write(output_dir.join("repeated_notes.json"), json).map_err(|e| {
                NotesError::processing_error(
                    ProcessingStage::ReportGeneration,
                    "write repeated_notes.json",
                    e,
                )
            })?;
        }
        if save_markdown {
            std::fs::write(output_dir.join("repeated_notes.md"), self.to_markdown()).map_err(
                |e| {
                    NotesError::processing_error(
                        ProcessingStage::ReportGeneration,
                        "write repeated_notes.md",
                        e,
                    )
                },
            )?;
        }
        Ok(())
    }
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if text.chars().count() > PREVIEW_CHAR_LIMIT {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> RepeatedNotesReport {
        RepeatedNotesReport {
            min_occurrences: 2,
            min_text_length: 10,
            total_notes: 9,
            groups: vec![NoteGroup {
                text: "CONSTRUCTION DOCUMENTS".to_string(),
                sample_text: "CONSTRUCTION DOCUMENTS".to_string(),
                count: 2,
                pages: vec![1, 4],
                occurrences: vec![
                    NoteOccurrence {
                        page_number: 1,
                        column_id: Some("column_1".to_string()),
                        note_id: Some("note_3".to_string()),
                        region: Some("10.0, 20.0, 110.0, 60.0".to_string()),
                    },
                    NoteOccurrence {
                        page_number: 4,
                        column_id: None,
                        note_id: Some("note_1".to_string()),
                        region: None,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_markdown_contains_header_and_group() {
        let md = sample_report().to_markdown();
        assert!(md.starts_with("# Repeated Notes Report"));
        assert!(md.contains("**Repeated notes found:** 1"));
        assert!(md.contains("## Note 1 (occurrences: 2, pages: [1, 4])"));
        assert!(md.contains("CONSTRUCTION DOCUMENTS"));
        assert!(md.contains("| 1 | column_1 | note_3 | 10.0, 20.0, 110.0, 60.0 |"));
        // Missing provenance renders as dashes.
        assert!(md.contains("| 4 | - | note_1 | - |"));
    }

    #[test]
    fn test_to_json_value_round_trips() {
        let report = sample_report();
        let value = report.to_json_value().unwrap();
        assert_eq!(value["total_notes"], 9);
        let back: RepeatedNotesReport = serde_json::from_value(value).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_markdown_preview_truncates_long_text() {
        let mut report = sample_report();
        report.groups[0].sample_text = "X".repeat(250);
        let md = report.to_markdown();
        assert!(md.contains(&("X".repeat(200) + "...")));
        assert!(!md.contains(&"X".repeat(201)));
    }

    #[test]
    fn test_save_results_writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();
        report.save_results(dir.path(), true, true).unwrap();
        let json_path = dir.path().join("repeated_notes.json");
        let md_path = dir.path().join("repeated_notes.md");
        assert!(json_path.exists());
        assert!(md_path.exists());

        let loaded: RepeatedNotesReport =
            serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(loaded, report);
    }
}
