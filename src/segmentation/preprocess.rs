use std::borrow::Cow;

use image::{imageops, RgbImage};
use ndarray::Array2;

use super::seed::SeedRect;
use super::types::LabelMap;

/// Scales images down to a working resolution for segmentation and
/// maps the resulting labels back to the source dimensions
pub struct Preprocessor {
    max_side: Option<u32>,
}

impl Preprocessor {
    pub fn new(max_side: Option<u32>) -> Self {
        Self { max_side }
    }

    /// Downscale `image` so its longer side is at most `max_side`
    ///
    /// Images already within the limit (or with no limit configured) are borrowed unchanged,
    /// as are images whose downscaled size would be too small for an interior seed.
    pub fn preprocess<'a>(&self, image: &'a RgbImage) -> Cow<'a, RgbImage> {
        let _span = tracing::debug_span!("preprocess").entered();

        let (width, height) = image.dimensions();
        let longest = width.max(height);
        let max_side = match self.max_side {
            Some(max_side) if max_side > 0 && longest > max_side => max_side,
            _ => return Cow::Borrowed(image),
        };

        let scale = max_side as f64 / longest as f64;
        let target_width = ((width as f64 * scale).round() as u32).max(1);
        let target_height = ((height as f64 * scale).round() as u32).max(1);

        if SeedRect::from_dimensions(target_width, target_height).is_degenerate() {
            tracing::debug!(
                "{}x{} leaves no interior seed, segmenting {}x{} at full resolution",
                target_width,
                target_height,
                width,
                height
            );
            return Cow::Borrowed(image);
        }

        tracing::debug!(
            "Working resolution {}x{} -> {}x{}",
            width,
            height,
            target_width,
            target_height
        );

        Cow::Owned(imageops::resize(
            image,
            target_width,
            target_height,
            imageops::FilterType::Triangle,
        ))
    }

    /// Resample a label map to `target_width`×`target_height` using nearest-neighbour lookup
    pub fn postprocess_labels(
        labels: &LabelMap,
        target_width: u32,
        target_height: u32,
    ) -> LabelMap {
        let _span = tracing::debug_span!("postprocess").entered();

        let (label_height, label_width) = labels.dim();
        if label_width == target_width as usize && label_height == target_height as usize {
            return labels.clone();
        }

        Array2::from_shape_fn(
            (target_height as usize, target_width as usize),
            |(y, x)| {
                let sy = (y * label_height / target_height as usize).min(label_height - 1);
                let sx = (x * label_width / target_width as usize).min(label_width - 1);
                labels[[sy, sx]]
            },
        )
    }
}
