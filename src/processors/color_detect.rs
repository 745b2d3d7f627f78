//! Color-region detection over a rasterized page.
//!
//! Every pixel is classified against the configured color classes, same-class
//! pixels are grouped into 8-connected components, noise components are
//! filtered by pixel area, and the surviving components are projected into
//! document coordinates as [`DetectedBox`] values with stable per-page ids.

use image::{GrayImage, Luma, RgbImage};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::HashMap;
use tracing::debug;

use crate::core::{NotesError, NotesResult};
use crate::domain::color_class::ColorClassSet;
use crate::domain::raster::PageRaster;
use crate::domain::region::{DetectedBox, PixelRegion};
use crate::processors::geometry::PixelBox;

/// Sentinel for pixels no class admits.
const UNCLASSIFIED: u16 = u16::MAX;

/// Detection parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetectorConfig {
    /// Connected components with fewer pixels than this are discarded as
    /// antialiasing noise.
    #[serde(default = "default_min_component_pixels")]
    pub min_component_pixels: u32,
    /// Projected boxes narrower or shorter than this many document units
    /// are dropped as degenerate.
    #[serde(default = "default_min_box_units")]
    pub min_box_units: f32,
}

fn default_min_component_pixels() -> u32 {
    16
}

fn default_min_box_units() -> f32 {
    2.0
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_component_pixels: default_min_component_pixels(),
            min_box_units: default_min_box_units(),
        }
    }
}

impl DetectorConfig {
    /// Validates the configuration. Failures are fatal for the run.
    pub fn validate(&self) -> NotesResult<()> {
        if !self.min_box_units.is_finite() || self.min_box_units < 0.0 {
            return Err(NotesError::config_error_with_context(
                "min_box_units",
                &self.min_box_units.to_string(),
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Detects color-coded annotation regions on rasterized pages.
///
/// The detector is stateless between calls; id counters are scoped to a
/// single [`ColorRegionDetector::detect_boxes`] call, so pages may be
/// processed in parallel with one shared detector.
#[derive(Debug, Clone)]
pub struct ColorRegionDetector {
    classes: ColorClassSet,
    config: DetectorConfig,
}

impl ColorRegionDetector {
    /// Creates a detector over a validated class set.
    pub fn new(classes: ColorClassSet, config: DetectorConfig) -> NotesResult<Self> {
        config.validate()?;
        if classes.len() >= UNCLASSIFIED as usize {
            return Err(NotesError::config_error(format!(
                "too many color classes: {} (maximum {})",
                classes.len(),
                UNCLASSIFIED as usize - 1
            )));
        }
        Ok(Self { classes, config })
    }

    /// The color classes this detector was built with.
    pub fn classes(&self) -> &ColorClassSet {
        &self.classes
    }

    /// Finds connected components of classified pixels.
    ///
    /// Regions are ordered by class declaration order, then top-to-bottom,
    /// left-to-right by bounding-box origin. An all-background raster
    /// yields an empty list, not an error.
    pub fn detect(&self, raster: &PageRaster) -> NotesResult<Vec<PixelRegion>> {
        raster.validate()?;

        let width = raster.image.width();
        let height = raster.image.height();
        let scale = raster.pixels_per_unit();
        let (class_map, class_counts) = self.classify_pixels(&raster.image);

        let mut regions = Vec::new();
        let mut noise_dropped = 0usize;
        for (idx, class) in self.classes.iter().enumerate() {
            if class_counts[idx] == 0 {
                continue;
            }
            let mask = class_mask(&class_map, width, height, idx as u16);
            let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

            let mut components: HashMap<u32, ComponentStats> = HashMap::new();
            for (x, y, label) in labels.enumerate_pixels() {
                let label = label[0];
                if label == 0 {
                    continue;
                }
                components.entry(label).or_insert_with(ComponentStats::new).push(x, y);
            }

            let mut class_regions: Vec<PixelRegion> = components
                .into_values()
                .filter(|stats| {
                    let keep = stats.count >= self.config.min_component_pixels;
                    if !keep {
                        noise_dropped += 1;
                    }
                    keep
                })
                .map(|stats| PixelRegion {
                    class_name: class.name.clone(),
                    bbox: stats.bbox(),
                    page_number: raster.page_number,
                    pixels_per_unit: scale,
                    pixel_count: stats.count,
                })
                .collect();
            class_regions.sort_by_key(|r| (r.bbox.y0, r.bbox.x0, r.bbox.y1, r.bbox.x1));
            regions.extend(class_regions);
        }

        if noise_dropped > 0 {
            debug!(
                page = raster.page_number,
                dropped = noise_dropped,
                "components below min_component_pixels discarded"
            );
        }
        Ok(regions)
    }

    /// Detects regions and projects them into document coordinates with
    /// stable `"{class}_{n}"` ids (1-based per class, counters reset per
    /// call).
    pub fn detect_boxes(&self, raster: &PageRaster) -> NotesResult<Vec<DetectedBox>> {
        let regions = self.detect(raster)?;
        let page_width = raster.page_width();
        let page_height = raster.page_height();

        let mut counters: HashMap<String, u32> = HashMap::new();
        let mut boxes = Vec::with_capacity(regions.len());
        for region in regions {
            let Some(class) = self.classes.get(&region.class_name) else {
                continue;
            };
            let doc = region.to_document().clamp_to(page_width, page_height);
            if doc.width() < self.config.min_box_units || doc.height() < self.config.min_box_units
            {
                debug!(
                    page = region.page_number,
                    class = %region.class_name,
                    "projected box below min_box_units dropped"
                );
                continue;
            }
            let counter = counters.entry(region.class_name.clone()).or_insert(0);
            *counter += 1;
            boxes.push(DetectedBox::new(
                format!("{}_{}", region.class_name, counter),
                doc,
                region.page_number,
                region.class_name.clone(),
                class.hex(),
            ));
        }
        Ok(boxes)
    }

    /// Classifies every pixel, returning the per-pixel class index map and
    /// the pixel count per class.
    fn classify_pixels(&self, image: &RgbImage) -> (Vec<u16>, Vec<u64>) {
        let mut class_map = vec![UNCLASSIFIED; (image.width() * image.height()) as usize];
        let mut class_counts = vec![0u64; self.classes.len()];
        for (i, pixel) in image.pixels().enumerate() {
            if let Some(idx) = self.classes.classify(pixel.0) {
                class_map[i] = idx as u16;
                class_counts[idx] += 1;
            }
        }
        (class_map, class_counts)
    }
}

/// Binary mask of pixels classified as `class_idx`.
fn class_mask(class_map: &[u16], width: u32, height: u32, class_idx: u16) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let i = (y * width + x) as usize;
        if class_map[i] == class_idx {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

struct ComponentStats {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    count: u32,
}

impl ComponentStats {
    fn new() -> Self {
        Self {
            min_x: u32::MAX,
            min_y: u32::MAX,
            max_x: 0,
            max_y: 0,
            count: 0,
        }
    }

    fn push(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.count += 1;
    }

    fn bbox(&self) -> PixelBox {
        // Half-open convention: max edges are one past the last pixel.
        PixelBox::new(self.min_x, self.min_y, self.max_x + 1, self.max_y + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::color_class::ColorClass;
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    const NOTE_GREEN: Rgb<u8> = Rgb([0x00, 0xF9, 0x00]);
    const COLUMN_CYAN: Rgb<u8> = Rgb([0x00, 0xFD, 0xFF]);

    fn palette() -> ColorClassSet {
        ColorClassSet::new(vec![
            ColorClass::new("column", [0x00, 0xFD, 0xFF], 40),
            ColorClass::new("note", [0x00, 0xF9, 0x00], 40),
        ])
        .unwrap()
    }

    fn detector() -> ColorRegionDetector {
        ColorRegionDetector::new(palette(), DetectorConfig::default()).unwrap()
    }

    fn white_page(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_blank_page_yields_no_regions() {
        let raster = PageRaster::new(white_page(200, 200), 1, 72.0);
        let regions = detector().detect(&raster).unwrap();
        assert!(regions.is_empty());
        let boxes = detector().detect_boxes(&raster).unwrap();
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_single_note_region_box_and_id() {
        let mut image = white_page(200, 200);
        draw_filled_rect_mut(&mut image, Rect::at(36, 72).of_size(72, 36), NOTE_GREEN);
        let raster = PageRaster::new(image, 3, 72.0);

        let boxes = detector().detect_boxes(&raster).unwrap();
        assert_eq!(boxes.len(), 1);
        let b = &boxes[0];
        assert_eq!(b.id, "note_1");
        assert_eq!(b.class_name, "note");
        assert_eq!(b.color, "#00F900");
        assert_eq!(b.page_number, 3);
        // At 72 dpi the scale is 1.0: pixel and document coordinates agree.
        assert!((b.bbox.x0 - 36.0).abs() < 1.0);
        assert!((b.bbox.y0 - 72.0).abs() < 1.0);
        assert!((b.bbox.x1 - 108.0).abs() < 1.0);
        assert!((b.bbox.y1 - 108.0).abs() < 1.0);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let mut image = white_page(300, 300);
        draw_filled_rect_mut(&mut image, Rect::at(10, 10).of_size(40, 20), NOTE_GREEN);
        draw_filled_rect_mut(&mut image, Rect::at(10, 60).of_size(40, 20), NOTE_GREEN);
        draw_filled_rect_mut(&mut image, Rect::at(100, 10).of_size(30, 200), COLUMN_CYAN);
        let raster = PageRaster::new(image, 1, 72.0);

        let d = detector();
        let first = d.detect_boxes(&raster).unwrap();
        let second = d.detect_boxes(&raster).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ids_are_per_class_in_reading_order() {
        let mut image = white_page(300, 300);
        // Two notes, lower one drawn first; ids must follow position, not
        // draw order.
        draw_filled_rect_mut(&mut image, Rect::at(20, 150).of_size(60, 30), NOTE_GREEN);
        draw_filled_rect_mut(&mut image, Rect::at(20, 20).of_size(60, 30), NOTE_GREEN);
        draw_filled_rect_mut(&mut image, Rect::at(150, 20).of_size(40, 250), COLUMN_CYAN);
        let raster = PageRaster::new(image, 1, 72.0);

        let boxes = detector().detect_boxes(&raster).unwrap();
        let ids: Vec<&str> = boxes.iter().map(|b| b.id.as_str()).collect();
        // Column class is declared first.
        assert_eq!(ids, vec!["column_1", "note_1", "note_2"]);
        assert!(boxes[1].bbox.y0 < boxes[2].bbox.y0);
    }

    #[test]
    fn test_noise_components_filtered() {
        let mut image = white_page(200, 200);
        // 3x3 = 9 pixels, below the default threshold of 16.
        draw_filled_rect_mut(&mut image, Rect::at(50, 50).of_size(3, 3), NOTE_GREEN);
        let raster = PageRaster::new(image, 1, 72.0);
        assert!(detector().detect(&raster).unwrap().is_empty());

        // 5x5 = 25 pixels survives.
        let mut image = white_page(200, 200);
        draw_filled_rect_mut(&mut image, Rect::at(50, 50).of_size(5, 5), NOTE_GREEN);
        let raster = PageRaster::new(image, 1, 72.0);
        let regions = detector().detect(&raster).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].pixel_count, 25);
    }

    #[test]
    fn test_tolerance_boundary_at_pixel_level() {
        let classes =
            ColorClassSet::new(vec![ColorClass::new("note", [100, 100, 100], 10)]).unwrap();
        let d = ColorRegionDetector::new(classes, DetectorConfig::default()).unwrap();

        let mut image = white_page(100, 100);
        draw_filled_rect_mut(&mut image, Rect::at(10, 10).of_size(10, 10), Rgb([110, 100, 100]));
        let raster = PageRaster::new(image, 1, 72.0);
        assert_eq!(d.detect(&raster).unwrap().len(), 1);

        let mut image = white_page(100, 100);
        draw_filled_rect_mut(&mut image, Rect::at(10, 10).of_size(10, 10), Rgb([111, 100, 100]));
        let raster = PageRaster::new(image, 1, 72.0);
        assert!(d.detect(&raster).unwrap().is_empty());
    }

    #[test]
    fn test_diagonal_blocks_merge_with_eight_connectivity() {
        let mut image = white_page(100, 100);
        draw_filled_rect_mut(&mut image, Rect::at(10, 10).of_size(3, 3), NOTE_GREEN);
        // Touches the first block only at the (12,12)/(13,13) corner.
        draw_filled_rect_mut(&mut image, Rect::at(13, 13).of_size(3, 3), NOTE_GREEN);
        let raster = PageRaster::new(image, 1, 72.0);

        let config = DetectorConfig {
            min_component_pixels: 10,
            ..DetectorConfig::default()
        };
        let d = ColorRegionDetector::new(palette(), config).unwrap();
        let regions = d.detect(&raster).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].pixel_count, 18);
        assert_eq!(regions[0].bbox, PixelBox::new(10, 10, 16, 16));
    }

    #[test]
    fn test_dpi_invariant_document_boxes() {
        // The same drawing rendered at 72 and 144 dpi projects to the same
        // document box within one unit.
        let mut low = white_page(200, 200);
        draw_filled_rect_mut(&mut low, Rect::at(36, 36).of_size(72, 36), NOTE_GREEN);
        let mut high = white_page(400, 400);
        draw_filled_rect_mut(&mut high, Rect::at(72, 72).of_size(144, 72), NOTE_GREEN);

        let d = detector();
        let low_boxes = d
            .detect_boxes(&PageRaster::new(low, 1, 72.0))
            .unwrap();
        let high_boxes = d
            .detect_boxes(&PageRaster::new(high, 1, 144.0))
            .unwrap();
        assert_eq!(low_boxes.len(), 1);
        assert_eq!(high_boxes.len(), 1);
        let (a, b) = (low_boxes[0].bbox, high_boxes[0].bbox);
        assert!((a.x0 - b.x0).abs() <= 1.0);
        assert!((a.y0 - b.y0).abs() <= 1.0);
        assert!((a.x1 - b.x1).abs() <= 1.0);
        assert!((a.y1 - b.y1).abs() <= 1.0);
    }

    #[test]
    fn test_thin_strip_kept_as_region_but_dropped_as_box() {
        let mut image = white_page(200, 200);
        // 1 pixel wide, 40 tall: 40 pixels of area but under 2 units wide.
        draw_filled_rect_mut(&mut image, Rect::at(50, 20).of_size(1, 40), NOTE_GREEN);
        let raster = PageRaster::new(image, 1, 72.0);

        let d = detector();
        assert_eq!(d.detect(&raster).unwrap().len(), 1);
        assert!(d.detect_boxes(&raster).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_raster_is_input_error() {
        let raster = PageRaster::new(white_page(100, 100), 1, f32::NAN);
        let err = detector().detect(&raster).unwrap_err();
        assert!(matches!(err, NotesError::InvalidInput { .. }));
    }

    #[test]
    fn test_overlapping_tolerances_use_declaration_order() {
        // Identical targets: every matching pixel ties; first class wins.
        let classes = ColorClassSet::new(vec![
            ColorClass::new("first", [50, 50, 50], 20),
            ColorClass::new("second", [50, 50, 50], 20),
        ])
        .unwrap();
        let d = ColorRegionDetector::new(classes, DetectorConfig::default()).unwrap();

        let mut image = white_page(100, 100);
        draw_filled_rect_mut(&mut image, Rect::at(10, 10).of_size(10, 10), Rgb([50, 50, 50]));
        let raster = PageRaster::new(image, 1, 72.0);
        let regions = d.detect(&raster).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].class_name, "first");
    }
}
