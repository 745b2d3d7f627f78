//! Detected annotation regions.
//!
//! [`PixelRegion`] is the detector's intermediate product: one connected
//! component of same-class pixels with its tight pixel-space bounding box.
//! [`DetectedBox`] is its document-space projection with a stable per-page
//! id, the form the rest of the pipeline consumes.

use serde::{Deserialize, Serialize};

use crate::processors::geometry::{BBox, PixelBox};

/// A connected component of same-class pixels found on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelRegion {
    /// Color class the component's pixels were classified as.
    pub class_name: String,
    /// Tight pixel-space bounding box (half-open max edges).
    pub bbox: PixelBox,
    /// 1-based page number the component was found on.
    pub page_number: u32,
    /// Source resolution: pixels per document unit.
    pub pixels_per_unit: f32,
    /// Number of pixels in the component (not the bbox area).
    pub pixel_count: u32,
}

impl PixelRegion {
    /// Projects the pixel bounding box into document coordinates using the
    /// region's own scale factor.
    pub fn to_document(&self) -> BBox {
        self.bbox.to_document(self.pixels_per_unit)
    }
}

/// A detected annotation box in document coordinates.
///
/// Ids follow `"{class}_{n}"` with `n` starting at 1 per class per page;
/// the color is the configured class target as an uppercase hex string.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedBox {
    /// Stable per-page id, e.g. `note_3`.
    pub id: String,
    /// Bounding box in document coordinates.
    pub bbox: BBox,
    /// 1-based page number.
    pub page_number: u32,
    /// Color class name, e.g. `note`.
    pub class_name: String,
    /// Representative color as `#RRGGBB`.
    pub color: String,
}

impl DetectedBox {
    /// Creates a detected box.
    pub fn new(
        id: impl Into<String>,
        bbox: BBox,
        page_number: u32,
        class_name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            bbox,
            page_number,
            class_name: class_name.into(),
            color: color.into(),
        }
    }

    /// Center point of the box, used for column assignment.
    pub fn center(&self) -> (f32, f32) {
        self.bbox.center()
    }
}
