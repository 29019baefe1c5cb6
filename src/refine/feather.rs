use image::{GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;

use crate::refine::{MASK_MAX, MASK_MIN};

/// Half-width of the smoothing kernel (7×7 neighbourhood)
pub const FEATHER_RADIUS: u32 = 3;

/// 7-tap binomial-style Gaussian used for size-only 7×7 smoothing.
///
/// Taps are multiples of 1/64 and sum to exactly 1, so saturated areas stay saturated.
pub const FEATHER_KERNEL: [f32; 7] = [
    0.031_25, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.031_25,
];

type FloatMask = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Mirror an out-of-range index back into `0..len` without repeating the edge cell
fn reflect_101(index: i64, len: u32) -> u32 {
    if len == 1 {
        return 0;
    }
    let last = len as i64 - 1;
    let mut i = index;
    while i < 0 || i > last {
        i = if i < 0 { -i } else { 2 * last - i };
    }
    i as u32
}

/// Blur a binary mask into graded 0..=255 membership values
///
/// Borders are mirrored (reflect-101) before filtering. Cells further than
/// [`FEATHER_RADIUS`] from the boundary saturate to `MASK_MAX` inside and
/// `MASK_MIN` outside.
pub fn feather(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return mask.clone();
    }
    let pad = FEATHER_RADIUS;

    let padded = FloatMask::from_fn(width + 2 * pad, height + 2 * pad, |x, y| {
        let sx = reflect_101(x as i64 - pad as i64, width);
        let sy = reflect_101(y as i64 - pad as i64, height);
        Luma([mask.get_pixel(sx, sy)[0] as f32])
    });
    let blurred = separable_filter_equal(&padded, &FEATHER_KERNEL);

    GrayImage::from_fn(width, height, |x, y| {
        let value = blurred.get_pixel(x + pad, y + pad)[0];
        Luma([value.round().clamp(MASK_MIN as f32, MASK_MAX as f32) as u8])
    })
}
