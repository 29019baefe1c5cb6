use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};

use super::OutputSink;
use crate::error::ProcessError;

/// Writes images into one directory, keeping the source file names
pub struct DirectoryOutput {
    dir: PathBuf,
}

impl DirectoryOutput {
    /// Use `dir` as the destination, creating it if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        tracing::info!("Writing results to {}", dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Encode to memory first so a failed encode leaves nothing on disk
    fn encode(path: &Path, image: &RgbImage) -> Result<Vec<u8>, ProcessError> {
        let format = ImageFormat::from_path(path)
            .map_err(|_| ProcessError::UnsupportedFormat(path.to_path_buf()))?;

        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), format)
            .map_err(|source| ProcessError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(bytes)
    }
}

impl OutputSink for DirectoryOutput {
    fn write_image(&mut self, file_name: &Path, image: &RgbImage) -> Result<PathBuf, ProcessError> {
        let path = self.dir.join(file_name);
        let bytes = Self::encode(&path, image)?;

        fs::write(&path, bytes).map_err(|source| ProcessError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}
