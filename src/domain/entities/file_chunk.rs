//! File chunk entity - one upload's worth of changed build files

use std::path::{Path, PathBuf};

/// A file paired with its size on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

impl SizedFile {
    pub fn new(path: impl Into<PathBuf>, bytes: u64) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

/// An ordered, non-empty group of files uploaded in a single commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChunk {
    files: Vec<PathBuf>,
    /// Cumulative budget usage (files, bytes or units depending on the policy)
    weight: u64,
}

impl FileChunk {
    pub(crate) fn new() -> Self {
        Self {
            files: Vec::new(),
            weight: 0,
        }
    }

    pub(crate) fn push(&mut self, path: PathBuf, weight: u64) {
        self.files.push(path);
        self.weight = self.weight.saturating_add(weight);
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn weight(&self) -> u64 {
        self.weight
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }

    pub fn into_files(self) -> Vec<PathBuf> {
        self.files
    }
}
