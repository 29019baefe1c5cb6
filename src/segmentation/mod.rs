mod color_model;
mod preprocess;
mod seed;
pub mod types;

pub use color_model::{ColorModelSegmenter, DEFAULT_ITERATIONS};
pub use preprocess::Preprocessor;
pub use seed::SeedRect;
pub use types::{Label, LabelMap, Segmenter};

/// Create the default segmentation backend
pub fn create_default_segmenter(iterations: usize) -> Box<dyn Segmenter> {
    tracing::debug!("Using color-model segmenter with {} iterations", iterations);
    Box::new(ColorModelSegmenter::new(iterations))
}
