//! Per-file failures. None of these abort a batch.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("segmentation failed: {0:#}")]
    Segmentation(anyhow::Error),

    #[error("mask is {mask:?} but image is {image:?}")]
    MaskMismatch { image: (u32, u32), mask: (u32, u32) },

    #[error("no encoder for output file {0}")]
    UnsupportedFormat(PathBuf),

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
