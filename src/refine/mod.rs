//! mask refinement: label map -> single feathered object mask

mod components;
mod feather;

pub use components::{fill_region, label_regions, largest_region, Region};
pub use feather::feather;

use image::{GrayImage, Luma};

use crate::segmentation::LabelMap;

pub const MASK_MIN: u8 = 0;
pub const MASK_MAX: u8 = u8::MAX;

/// Output of [`refine`]
#[derive(Debug, Clone)]
pub struct RefinedMask {
    /// Feathered membership values, same dimensions as the label map
    pub mask: GrayImage,
    /// The kept region, or `None` when the label map had no foreground
    pub region: Option<Region>,
    /// Number of regions found before selection
    pub region_count: usize,
}

impl RefinedMask {
    /// True when no foreground was found; the mask is then all `MASK_MIN`
    pub fn is_empty(&self) -> bool {
        self.region.is_none()
    }
}

/// Foreground/background split of a label map as a `MASK_MAX`/`MASK_MIN` image
pub fn binarize(labels: &LabelMap) -> GrayImage {
    let (height, width) = labels.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        if labels[[y as usize, x as usize]].is_foreground() {
            Luma([MASK_MAX])
        } else {
            Luma([MASK_MIN])
        }
    })
}

/// Reduce a label map to one clean, feathered object mask
///
/// 1. Binarizes probable/definite foreground
/// 2. Keeps only the largest 8-connected region (first in scan order on ties)
/// 3. Fills the region's holes
/// 4. Feathers the boundary with a 7×7 Gaussian
///
/// Never fails: a label map without foreground yields an all-zero mask and `region: None`.
pub fn refine(labels: &LabelMap) -> RefinedMask {
    let _span = tracing::debug_span!("refine").entered();

    let binary = binarize(labels);
    let (region_labels, regions) = label_regions(&binary);

    let Some(region) = largest_region(&regions).cloned() else {
        tracing::debug!("No foreground regions");
        return RefinedMask {
            mask: GrayImage::new(binary.width(), binary.height()),
            region: None,
            region_count: 0,
        };
    };

    tracing::debug!(
        "Keeping region {} of {} (area {}, first cell {:?})",
        region.label,
        regions.len(),
        region.area,
        region.origin
    );

    let filled = fill_region(&region_labels, region.label);

    RefinedMask {
        mask: feather(&filled),
        region: Some(region),
        region_count: regions.len(),
    }
}
