//! Cross-page aggregation of repeated note text.
//!
//! Notes are keyed by their normalized text; identical keys across the
//! corpus collapse into one [`NoteGroup`] carrying per-instance provenance.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{NotesError, NotesResult};
use crate::domain::note::FusedNote;
use crate::domain::report::{NoteGroup, NoteOccurrence, RepeatedNotesReport};

/// Trims and collapses all internal whitespace runs to single spaces.
///
/// This is the canonical deduplication key for note text.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().join(" ")
}

/// Aggregation thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Minimum member count for a group to survive.
    #[serde(default = "default_min_occurrences")]
    pub min_occurrences: usize,
    /// Minimum normalized text length (in characters) for a note to be
    /// considered at all.
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,
}

fn default_min_occurrences() -> usize {
    2
}

fn default_min_text_length() -> usize {
    10
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            min_occurrences: default_min_occurrences(),
            min_text_length: default_min_text_length(),
        }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> NotesResult<()> {
        if self.min_occurrences == 0 {
            return Err(NotesError::config_error_with_context(
                "min_occurrences",
                "0",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Groups identical normalized note text across a document set.
///
/// Aggregation is pure: re-running on the same corpus yields identical
/// group membership, ordering, and counts.
#[derive(Debug, Clone)]
pub struct NoteAggregator {
    config: AggregatorConfig,
}

impl NoteAggregator {
    /// Creates an aggregator.
    pub fn new(config: AggregatorConfig) -> NotesResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Aggregates a note corpus into a repeated-notes report.
    ///
    /// Notes whose normalized text is shorter than `min_text_length` are
    /// excluded entirely, both as members and from occurrence counts.
    /// Surviving groups are ordered by occurrence count descending, with
    /// ties kept in first-seen order.
    pub fn aggregate(&self, notes: &[FusedNote]) -> RepeatedNotesReport {
        let mut order: Vec<String> = Vec::new();
        let mut members: HashMap<String, Vec<&FusedNote>> = HashMap::new();

        for note in notes {
            let key = normalize_text(&note.text);
            if key.chars().count() < self.config.min_text_length {
                continue;
            }
            match members.entry(key) {
                Entry::Occupied(mut entry) => entry.get_mut().push(note),
                Entry::Vacant(entry) => {
                    order.push(entry.key().clone());
                    entry.insert(vec![note]);
                }
            }
        }

        let mut groups: Vec<NoteGroup> = Vec::new();
        for key in &order {
            let Some(instances) = members.get(key) else {
                continue;
            };
            if instances.len() < self.config.min_occurrences {
                continue;
            }
            let occurrences: Vec<NoteOccurrence> = instances
                .iter()
                .map(|note| NoteOccurrence {
                    page_number: note.page_number,
                    column_id: note.column_id.clone(),
                    note_id: Some(note.note_id.clone()),
                    region: Some(format!(
                        "{:.1}, {:.1}, {:.1}, {:.1}",
                        note.bbox.x0, note.bbox.y0, note.bbox.x1, note.bbox.y1
                    )),
                })
                .collect();
            let pages: Vec<u32> = instances
                .iter()
                .map(|note| note.page_number)
                .sorted()
                .dedup()
                .collect();
            groups.push(NoteGroup {
                text: key.clone(),
                sample_text: instances[0].text.clone(),
                count: instances.len(),
                pages,
                occurrences,
            });
        }

        // Stable sort: ties keep first-seen order.
        groups.sort_by_key(|group| std::cmp::Reverse(group.count));

        debug!(
            notes = notes.len(),
            distinct = order.len(),
            repeated = groups.len(),
            "aggregated note corpus"
        );

        RepeatedNotesReport {
            min_occurrences: self.config.min_occurrences,
            min_text_length: self.config.min_text_length,
            total_notes: notes.len(),
            groups,
        }
    }
}
