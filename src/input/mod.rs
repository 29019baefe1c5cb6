mod directory;

pub use directory::DirectorySource;

use std::path::PathBuf;

use image::RgbImage;

use crate::error::ProcessError;

/// One candidate file, decoded or not
pub struct SourceImage {
    pub path: PathBuf,
    pub image: Result<RgbImage, ProcessError>,
}

/// Trait for image sources
pub trait ImageSource {
    /// Load the next candidate, or `None` once every candidate has been returned
    fn next_image(&mut self) -> Option<SourceImage>;

    /// Candidates not yet returned
    fn remaining(&self) -> usize;
}
