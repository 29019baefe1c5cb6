use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{ImageSource, SourceImage};
use crate::error::ProcessError;

/// File extensions picked up from the input directory (compared case-insensitively)
pub const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// True when the path ends in one of [`EXTENSIONS`]
pub fn is_candidate(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Images from a single directory, in lexicographic file-name order
pub struct DirectorySource {
    pending: VecDeque<PathBuf>,
}

impl DirectorySource {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!("Scanning {}", dir.display());

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Failed to read input directory {}", dir.display()))?
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                (path.is_file() && is_candidate(&path)).then_some(path)
            })
            .collect();
        paths.sort();

        tracing::info!("Found {} candidate images", paths.len());

        Ok(Self {
            pending: paths.into(),
        })
    }
}

impl ImageSource for DirectorySource {
    fn next_image(&mut self) -> Option<SourceImage> {
        let path = self.pending.pop_front()?;
        let image = image::open(&path)
            .map(|decoded| decoded.into_rgb8())
            .map_err(|source| ProcessError::Decode {
                path: path.clone(),
                source,
            });
        Some(SourceImage { path, image })
    }

    fn remaining(&self) -> usize {
        self.pending.len()
    }
}
