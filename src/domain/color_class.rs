//! Color classes: the palette that gives annotation boxes their meaning.
//!
//! Plan sheets are marked up with solid color-coded rectangles; each color
//! class maps a target RGB value (plus a per-channel tolerance) to a named
//! region kind. The ordered set of classes is the read-only configuration
//! shared by every detection run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::{NotesError, NotesResult};

/// Class name for note columns.
pub const CLASS_COLUMN: &str = "column";
/// Class name for column header bands.
pub const CLASS_COLUMN_HEADER: &str = "column_header";
/// Class name for individual note regions.
pub const CLASS_NOTE: &str = "note";
/// Class name for legend blocks.
pub const CLASS_LEGEND: &str = "legend";
/// Class name for the sheet-info block (title block / stamp area).
pub const CLASS_SHEET_INFO: &str = "sheet_info";
/// Class name for the whole-sheet frame.
pub const CLASS_WHOLE_SHEET: &str = "whole_sheet";

fn default_tolerance() -> u8 {
    40
}

/// A named target color plus the per-channel tolerance used to classify
/// pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorClass {
    /// Unique class name (e.g. `note`, `column_header`).
    pub name: String,
    /// Target color, serialized as a `#RRGGBB` hex string.
    #[serde(with = "hex_color")]
    pub color: [u8; 3],
    /// Maximum per-channel distance for a pixel to match (inclusive).
    #[serde(default = "default_tolerance")]
    pub tolerance: u8,
}

impl ColorClass {
    /// Creates a class from a name and an RGB triple.
    pub fn new(name: impl Into<String>, color: [u8; 3], tolerance: u8) -> Self {
        Self {
            name: name.into(),
            color,
            tolerance,
        }
    }

    /// Creates a class from a `#RRGGBB` hex string (leading `#` optional,
    /// case-insensitive).
    pub fn from_hex(name: impl Into<String>, hex: &str, tolerance: u8) -> NotesResult<Self> {
        Ok(Self {
            name: name.into(),
            color: parse_hex(hex)?,
            tolerance,
        })
    }

    /// The target color as an uppercase `#RRGGBB` string.
    pub fn hex(&self) -> String {
        format_hex(self.color)
    }

    /// Maximum per-channel absolute distance between the target and `rgb`.
    pub fn channel_distance(&self, rgb: [u8; 3]) -> u8 {
        self.color
            .iter()
            .zip(rgb.iter())
            .map(|(a, b)| a.abs_diff(*b))
            .max()
            .unwrap_or(0)
    }

    /// Whether `rgb` falls within this class's tolerance (boundary
    /// inclusive: a distance equal to the tolerance matches).
    pub fn matches(&self, rgb: [u8; 3]) -> bool {
        self.channel_distance(rgb) <= self.tolerance
    }
}

/// Parses a `#RRGGBB` hex string into an RGB triple.
pub fn parse_hex(hex: &str) -> NotesResult<[u8; 3]> {
    let trimmed = hex.trim().trim_start_matches('#');
    if trimmed.len() != 6 || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(NotesError::config_error_with_context(
            "color",
            hex,
            "expected a 6-digit hex color such as #00F900",
        ));
    }
    let channel = |range: std::ops::Range<usize>| -> NotesResult<u8> {
        u8::from_str_radix(&trimmed[range], 16).map_err(|_| {
            NotesError::config_error_with_context("color", hex, "invalid hex digits")
        })
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// Formats an RGB triple as an uppercase `#RRGGBB` string.
pub fn format_hex(color: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

mod hex_color {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &[u8; 3], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hex(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 3], D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// The ordered, validated collection of color classes for one run.
///
/// Declaration order is significant: when a pixel sits at equal distance
/// from two admitting classes, the earlier class wins. Construction rejects
/// empty sets and duplicate names so detection never has to revalidate.
#[derive(Debug, Clone)]
pub struct ColorClassSet {
    classes: Vec<ColorClass>,
}

impl ColorClassSet {
    /// Builds a validated set from classes in declaration order.
    pub fn new(classes: Vec<ColorClass>) -> NotesResult<Self> {
        if classes.is_empty() {
            return Err(NotesError::config_error(
                "color class set cannot be empty",
            ));
        }
        let mut seen = HashSet::new();
        for class in &classes {
            if class.name.trim().is_empty() {
                return Err(NotesError::config_error(
                    "color class names cannot be blank",
                ));
            }
            if !seen.insert(class.name.as_str()) {
                return Err(NotesError::config_error_with_context(
                    "name",
                    &class.name,
                    "duplicate color class name",
                ));
            }
        }
        Ok(Self { classes })
    }

    /// The default plan-sheet palette.
    pub fn default_palette() -> Self {
        let classes = vec![
            ColorClass::new(CLASS_COLUMN, [0x00, 0xFD, 0xFF], default_tolerance()),
            ColorClass::new(CLASS_COLUMN_HEADER, [0xFF, 0x26, 0x00], default_tolerance()),
            ColorClass::new(CLASS_NOTE, [0x00, 0xF9, 0x00], default_tolerance()),
            ColorClass::new(CLASS_LEGEND, [0xAA, 0x79, 0x42], default_tolerance()),
            ColorClass::new(CLASS_SHEET_INFO, [0x04, 0x33, 0xFF], default_tolerance()),
            ColorClass::new(CLASS_WHOLE_SHEET, [0xFF, 0x93, 0x00], default_tolerance()),
        ];
        // The palette above has unique, non-blank names.
        Self { classes }
    }

    /// Classifies a pixel: index of the nearest class whose tolerance
    /// admits it, or `None` when no class matches. Ties go to the earliest
    /// declared class.
    pub fn classify(&self, rgb: [u8; 3]) -> Option<usize> {
        let mut best: Option<(usize, u8)> = None;
        for (idx, class) in self.classes.iter().enumerate() {
            let distance = class.channel_distance(rgb);
            if distance > class.tolerance {
                continue;
            }
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((idx, distance)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Looks up a class by name.
    pub fn get(&self, name: &str) -> Option<&ColorClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// The class at a classification index.
    pub fn class_at(&self, idx: usize) -> Option<&ColorClass> {
        self.classes.get(idx)
    }

    /// Iterates classes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ColorClass> {
        self.classes.iter()
    }

    /// Consumes the set, returning the classes in declaration order.
    pub fn into_classes(self) -> Vec<ColorClass> {
        self.classes
    }

    /// Number of classes in the set.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the set is empty (never true for a constructed set).
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
