//! Domain-level structures shared across the note-extraction pipeline.
//!
//! This module groups the types that represent the system's vocabulary:
//! color classes, rasterized pages, detected regions, per-page layouts,
//! text spans, fused notes, and the repeated-note report.

pub mod color_class;
pub mod layout;
pub mod note;
pub mod raster;
pub mod region;
pub mod report;

pub use color_class::{
    ColorClass, ColorClassSet, CLASS_COLUMN, CLASS_COLUMN_HEADER, CLASS_LEGEND, CLASS_NOTE,
    CLASS_SHEET_INFO, CLASS_WHOLE_SHEET,
};
pub use layout::PageLayout;
pub use note::{FusedNote, TextSpan};
pub use raster::PageRaster;
pub use region::{DetectedBox, PixelRegion};
pub use report::{NoteGroup, NoteOccurrence, RepeatedNotesReport};
