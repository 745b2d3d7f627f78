//! Utility functions for image handling.
//!
//! This module provides helpers for loading rasterized page images from
//! disk and converting them into the RGB buffers the detector consumes.

use crate::core::NotesError;
use image::{DynamicImage, RgbImage};

/// Converts a DynamicImage to an RgbImage.
///
/// # Arguments
///
/// * `img` - The DynamicImage to convert
///
/// # Returns
///
/// * `RgbImage` - The converted RGB image
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// This function opens an image from the specified file path and converts it
/// to an RgbImage. It handles any image format supported by the image crate.
///
/// # Arguments
///
/// * `path` - A reference to the path of the image file to load
///
/// # Returns
///
/// * `Ok(RgbImage)` - The loaded and converted RGB image
/// * `Err(NotesError)` - An error if the image could not be loaded
///
/// # Errors
///
/// This function will return a `NotesError::ImageLoad` error if the image
/// cannot be loaded from the specified path.
pub fn load_image(path: &std::path::Path) -> Result<RgbImage, NotesError> {
    let img = image::open(path).map_err(NotesError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}
