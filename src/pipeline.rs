use anyhow::anyhow;
use image::{GrayImage, RgbImage};

use crate::compose::{compose, CompositeMode, Placement};
use crate::error::ProcessError;
use crate::refine::refine;
use crate::segmentation::{Preprocessor, SeedRect, Segmenter};

/// What happened to one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The object was found and re-placed at the canvas centre
    Centered(Placement),
    /// Segmentation found no foreground; the output is the input
    NoForegroundFound,
    /// Too small for an interior seed; the output is the input
    DegenerateImage,
}

impl Outcome {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Outcome::Centered(_))
    }
}

#[derive(Debug, Clone)]
pub struct Processed {
    pub canvas: RgbImage,
    /// Feathered object mask (all zero on fallback)
    pub mask: GrayImage,
    pub outcome: Outcome,
}

/// Seed -> segment -> refine -> compose for a single image
pub struct Pipeline<'a> {
    segmenter: &'a dyn Segmenter,
    preprocessor: Preprocessor,
    mode: CompositeMode,
}

impl<'a> Pipeline<'a> {
    pub fn new(segmenter: &'a dyn Segmenter, max_side: Option<u32>, mode: CompositeMode) -> Self {
        Self {
            segmenter,
            preprocessor: Preprocessor::new(max_side),
            mode,
        }
    }

    /// Process one decoded image
    ///
    /// Degenerate images and images without foreground are not errors: they
    /// come back unchanged with a fallback [`Outcome`].
    pub fn run(&self, image: &RgbImage) -> Result<Processed, ProcessError> {
        let (width, height) = image.dimensions();

        let fallback = |outcome: Outcome| Processed {
            canvas: image.clone(),
            mask: GrayImage::new(width, height),
            outcome,
        };

        if SeedRect::from_dimensions(width, height).is_degenerate() {
            tracing::debug!("{}x{} is too small for a seed rectangle", width, height);
            return Ok(fallback(Outcome::DegenerateImage));
        }

        let working = self.preprocessor.preprocess(image);
        let (work_width, work_height) = working.dimensions();
        let seed = SeedRect::from_dimensions(work_width, work_height);

        let labels = {
            let _span = tracing::debug_span!("segment", backend = self.segmenter.name()).entered();
            self.segmenter
                .segment(&working, &seed)
                .map_err(ProcessError::Segmentation)?
        };
        if labels.is_empty() {
            return Err(ProcessError::Segmentation(anyhow!(
                "{} returned an empty label map",
                self.segmenter.name()
            )));
        }
        let labels = Preprocessor::postprocess_labels(&labels, width, height);

        let refined = refine(&labels);
        if refined.is_empty() {
            return Ok(fallback(Outcome::NoForegroundFound));
        }
        if refined.region_count > 1 {
            tracing::debug!("Discarded {} smaller regions", refined.region_count - 1);
        }

        let composition = compose(image, &refined.mask, self.mode)?;
        let outcome = match composition.placement {
            Some(placement) => Outcome::Centered(placement),
            None => Outcome::NoForegroundFound,
        };

        Ok(Processed {
            canvas: composition.canvas,
            mask: refined.mask,
            outcome,
        })
    }
}
