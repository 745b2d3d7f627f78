//! Geometric primitives for annotation detection.
//!
//! This module provides the axis-aligned boxes used throughout the pipeline:
//! pixel-space boxes produced by connected-component labelling and
//! document-space boxes carried by detected regions, text spans, and fused
//! notes, together with the overlap and conversion math between the two
//! spaces.

use serde::{Deserialize, Serialize};

/// An axis-aligned box in document coordinates (points, 1/72 inch).
///
/// Fields follow the `x0 < x1`, `y0 < y1` convention with the origin at the
/// top-left of the page. Boxes produced by detection always satisfy the
/// convention; externally supplied boxes (text spans) may be degenerate, and
/// every operation on `BBox` yields well-defined results for those.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge.
    pub x0: f32,
    /// Top edge.
    pub y0: f32,
    /// Right edge.
    pub x1: f32,
    /// Bottom edge.
    pub y1: f32,
}

impl BBox {
    /// Creates a box from its four edges.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box (may be zero or negative for degenerate input).
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box (may be zero or negative for degenerate input).
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Area of the box; degenerate boxes have zero area.
    pub fn area(&self) -> f32 {
        let w = self.width().max(0.0);
        let h = self.height().max(0.0);
        w * h
    }

    /// Center point of the box.
    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Whether the box has no usable extent on either axis.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Whether the point lies inside the box (edges inclusive).
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Area of the intersection with another box.
    pub fn intersection_area(&self, other: &BBox) -> f32 {
        let x1 = self.x0.max(other.x0);
        let y1 = self.y0.max(other.y0);
        let x2 = self.x1.min(other.x1);
        let y2 = self.y1.min(other.y1);

        let intersection_width = (x2 - x1).max(0.0);
        let intersection_height = (y2 - y1).max(0.0);
        intersection_width * intersection_height
    }

    /// Fraction of this box's area covered by `other`.
    ///
    /// Returns `intersection_area / self.area()`, or 0.0 when this box has
    /// no area. This is the containment measure used by text fusion: a span
    /// counts toward a note when `span.overlap_ratio(note_box)` reaches the
    /// configured threshold.
    pub fn overlap_ratio(&self, other: &BBox) -> f32 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        self.intersection_area(other) / area
    }

    /// Clamps all four edges into the `[0, width] x [0, height]` rectangle.
    pub fn clamp_to(&self, width: f32, height: f32) -> BBox {
        BBox {
            x0: self.x0.clamp(0.0, width),
            y0: self.y0.clamp(0.0, height),
            x1: self.x1.clamp(0.0, width),
            y1: self.y1.clamp(0.0, height),
        }
    }

    /// Converts the box back to pixel space with the given scale factor
    /// (pixels per document unit), rounding to the nearest pixel.
    pub fn to_pixels(&self, scale: f32) -> PixelBox {
        PixelBox {
            x0: (self.x0 * scale).round().max(0.0) as u32,
            y0: (self.y0 * scale).round().max(0.0) as u32,
            x1: (self.x1 * scale).round().max(0.0) as u32,
            y1: (self.y1 * scale).round().max(0.0) as u32,
        }
    }
}

/// An axis-aligned box in pixel coordinates.
///
/// The max edges are half-open: a component occupying a single pixel at
/// `(3, 7)` has the box `(3, 7, 4, 8)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    /// Left column.
    pub x0: u32,
    /// Top row.
    pub y0: u32,
    /// One past the right column.
    pub x1: u32,
    /// One past the bottom row.
    pub y1: u32,
}

impl PixelBox {
    /// Creates a pixel box from its edges.
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    /// Pixel area of the box.
    pub fn area(&self) -> u32 {
        self.width() * self.height()
    }

    /// Converts the box to document coordinates with the given scale factor
    /// (pixels per document unit).
    ///
    /// `doc_coord = pixel_coord / scale`; a pure function of the inputs.
    pub fn to_document(&self, scale: f32) -> BBox {
        BBox {
            x0: self.x0 as f32 / scale,
            y0: self.y0 as f32 / scale,
            x1: self.x1 as f32 / scale,
            y1: self.y1 as f32 / scale,
        }
    }
}
