//! Rasterized page input.
//!
//! The rasterizer that produces page images is an external collaborator; the
//! pipeline receives one [`PageRaster`] per page and never performs I/O on
//! its own.

use image::RgbImage;

use crate::core::{validate_finite, validate_image_dimensions, validate_positive, NotesResult};

/// One rasterized page: an RGB pixel buffer plus the resolution metadata
/// needed to convert pixel boxes back to document coordinates.
#[derive(Debug, Clone)]
pub struct PageRaster {
    /// The page pixels.
    pub image: RgbImage,
    /// 1-based page number within the source document.
    pub page_number: u32,
    /// Rendering resolution in dots per inch.
    pub dpi: f32,
}

impl PageRaster {
    /// Wraps an image with its page identity and resolution.
    pub fn new(image: RgbImage, page_number: u32, dpi: f32) -> Self {
        Self {
            image,
            page_number,
            dpi,
        }
    }

    /// Scale factor: pixels per document unit (document units are points,
    /// 1/72 inch).
    pub fn pixels_per_unit(&self) -> f32 {
        self.dpi / 72.0
    }

    /// Page width in document units.
    pub fn page_width(&self) -> f32 {
        self.image.width() as f32 / self.pixels_per_unit()
    }

    /// Page height in document units.
    pub fn page_height(&self) -> f32 {
        self.image.height() as f32 / self.pixels_per_unit()
    }

    /// Checks the raster is usable: positive finite dpi and non-degenerate
    /// pixel dimensions. Failures are per-page input errors.
    pub fn validate(&self) -> NotesResult<()> {
        let context = format!("page {} raster", self.page_number);
        validate_image_dimensions(self.image.height(), self.image.width(), &context)?;
        validate_finite(self.dpi, "dpi")?;
        validate_positive(self.dpi, "dpi")?;
        Ok(())
    }
}
