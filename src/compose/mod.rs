mod bounds;

pub use bounds::Bounds;

use clap::ValueEnum;
use image::{GrayImage, Rgb, RgbImage};

use crate::error::ProcessError;

/// Canvas colour around the placed object
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// How masked cells are written onto the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CompositeMode {
    /// Copy the source pixel wherever the mask is non-zero
    #[default]
    Threshold,
    /// Blend the source pixel over white using the mask as alpha
    Alpha,
}

/// Where the object came from and where it landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub source: Bounds,
    pub origin: (u32, u32),
}

#[derive(Debug, Clone)]
pub struct Composition {
    pub canvas: RgbImage,
    /// `None` when the mask was empty and `canvas` is the unmodified input
    pub placement: Option<Placement>,
}

/// Crop the masked object out of `image` and centre it on a white canvas of the same size
///
/// An all-zero mask returns the input unchanged.
pub fn compose(
    image: &RgbImage,
    mask: &GrayImage,
    mode: CompositeMode,
) -> Result<Composition, ProcessError> {
    let _span = tracing::debug_span!("compose").entered();

    if image.dimensions() != mask.dimensions() {
        return Err(ProcessError::MaskMismatch {
            image: image.dimensions(),
            mask: mask.dimensions(),
        });
    }

    let Some(source) = Bounds::of_mask(mask) else {
        tracing::debug!("Empty mask, nothing to center");
        return Ok(Composition {
            canvas: image.clone(),
            placement: None,
        });
    };

    let (width, height) = image.dimensions();
    let (origin_x, origin_y) = source.centered_origin(width, height);
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

    tracing::debug!(
        "Object {}x{} at ({}, {}) -> ({}, {})",
        source.width,
        source.height,
        source.x,
        source.y,
        origin_x,
        origin_y
    );

    for local_y in 0..source.height {
        for local_x in 0..source.width {
            let (sx, sy) = (source.x + local_x, source.y + local_y);
            let coverage = mask.get_pixel(sx, sy)[0];
            if coverage == 0 {
                continue;
            }

            let pixel = image.get_pixel(sx, sy);
            let out = match mode {
                CompositeMode::Threshold => *pixel,
                CompositeMode::Alpha => blend_over_background(pixel, coverage),
            };
            canvas.put_pixel(origin_x + local_x, origin_y + local_y, out);
        }
    }

    Ok(Composition {
        canvas,
        placement: Some(Placement {
            source,
            origin: (origin_x, origin_y),
        }),
    })
}

fn blend_over_background(pixel: &Rgb<u8>, coverage: u8) -> Rgb<u8> {
    let alpha = coverage as f32 / 255.0;
    let mut out = BACKGROUND;
    for c in 0..3 {
        let value = pixel[c] as f32 * alpha + BACKGROUND[c] as f32 * (1.0 - alpha);
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Render a mask as a grayscale RGB image for inspection
pub fn mask_to_rgb(mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let value = mask.get_pixel(x, y)[0];
        Rgb([value, value, value])
    })
}
