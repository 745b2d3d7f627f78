//! Utility functions for the notes pipeline.
//!
//! This module provides image loading helpers used by the demo binaries
//! and the logging setup shared by demos and tests.

pub mod image;

// Re-export image helpers
pub use image::{dynamic_to_rgb, load_image};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
