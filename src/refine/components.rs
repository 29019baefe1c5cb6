use std::collections::VecDeque;

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::refine::{MASK_MAX, MASK_MIN};

/// Per-pixel component labels; 0 is background
pub type RegionLabels = ImageBuffer<Luma<u32>, Vec<u32>>;

/// One 8-connected group of object cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    /// Non-zero label in the image returned by [`label_regions`]
    pub label: u32,
    /// Number of cells
    pub area: usize,
    /// First cell reached in row-major scan order, as `(x, y)`
    pub origin: (u32, u32),
}

impl Region {
    fn scan_key(&self) -> (u32, u32) {
        (self.origin.1, self.origin.0)
    }
}

const NEIGHBOURS_4: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Label every 8-connected group of `MASK_MAX` cells.
///
/// Background cells stay 0. The returned regions are sorted by the
/// row-major position of their first cell.
pub fn label_regions(mask: &GrayImage) -> (RegionLabels, Vec<Region>) {
    let labels = connected_components(mask, Connectivity::Eight, Luma([MASK_MIN]));

    let mut regions: Vec<Region> = Vec::new();
    for (x, y, pixel) in labels.enumerate_pixels() {
        let label = pixel[0];
        if label == 0 {
            continue;
        }
        let index = label as usize - 1;
        if index >= regions.len() {
            regions.resize(index + 1, Region::default());
        }
        let region = &mut regions[index];
        if region.area == 0 {
            region.label = label;
            region.origin = (x, y);
        }
        region.area += 1;
    }
    regions.retain(|region| region.area > 0);
    regions.sort_by_key(Region::scan_key);

    (labels, regions)
}

/// Region with the largest area; ties go to the earliest region in scan order
pub fn largest_region(regions: &[Region]) -> Option<&Region> {
    regions.iter().max_by(|a, b| {
        a.area
            .cmp(&b.area)
            .then_with(|| b.scan_key().cmp(&a.scan_key()))
    })
}

/// Mask of the cells carrying `label`, with every enclosed hole filled in
///
/// A cell is outside the region only if a 4-connected path of non-region cells
/// links it to the image border.
pub fn fill_region(labels: &RegionLabels, label: u32) -> GrayImage {
    let (width, height) = labels.dimensions();
    let mut filled = GrayImage::from_pixel(width, height, Luma([MASK_MAX]));
    if width == 0 || height == 0 {
        return filled;
    }

    let mut queue = VecDeque::new();
    let visit = |x: u32, y: u32, filled: &mut GrayImage, queue: &mut VecDeque<(u32, u32)>| {
        if labels.get_pixel(x, y)[0] != label && filled.get_pixel(x, y)[0] == MASK_MAX {
            filled.put_pixel(x, y, Luma([MASK_MIN]));
            queue.push_back((x, y));
        }
    };
    for x in 0..width {
        visit(x, 0, &mut filled, &mut queue);
        visit(x, height - 1, &mut filled, &mut queue);
    }
    for y in 0..height {
        visit(0, y, &mut filled, &mut queue);
        visit(width - 1, y, &mut filled, &mut queue);
    }

    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in NEIGHBOURS_4 {
            let (nx, ny) = (x as i64 + dx, y as i64 + dy);
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            visit(nx as u32, ny as u32, &mut filled, &mut queue);
        }
    }

    filled
}
