use anyhow::Result;
use image::RgbImage;
use ndarray::Array2;

use super::seed::SeedRect;

/// Per-pixel classification produced by a segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    DefiniteBackground,
    ProbableBackground,
    ProbableForeground,
    DefiniteForeground,
}

impl Label {
    /// True for the two labels that count as "object"
    pub fn is_foreground(self) -> bool {
        matches!(self, Label::ProbableForeground | Label::DefiniteForeground)
    }
}

/// Label grid indexed as `[[y, x]]`, shape `(height, width)`
pub type LabelMap = Array2<Label>;

/// Trait for segmentation backends
/// Allows swapping the rectangle-seeded labeling without touching refinement or compositing
pub trait Segmenter {
    /// Label every pixel of `image`, using `seed` as the initial foreground hint
    ///
    /// # Arguments
    /// * `image` - Input RGB image
    /// * `seed` - Non-degenerate rectangle strictly inside the image
    ///
    /// # Returns
    /// * Label map with the same dimensions as `image`
    fn segment(&self, image: &RgbImage, seed: &SeedRect) -> Result<LabelMap>;

    /// Short backend name for logging
    fn name(&self) -> &str;
}
