mod directory;

pub use directory::DirectoryOutput;

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::ProcessError;

/// Trait for output destinations
pub trait OutputSink {
    /// Write `image` under `file_name`, returning where it went
    fn write_image(&mut self, file_name: &Path, image: &RgbImage) -> Result<PathBuf, ProcessError>;
}
