//! Deploy Result
//!
//! Result types for deploy operations.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::entities::FileChunk;

/// State handed from the setup phases to the upload loop
#[derive(Debug, Clone, Default)]
pub struct SetupOutcome {
    /// Changed files grouped into uploads, in upload order
    pub chunked_files: Vec<FileChunk>,
    /// Number of changed files across all chunks
    pub total_changes: usize,
    /// Deploy branch HEAD before this run touched it
    pub abort_ref: String,
}

impl SetupOutcome {
    pub fn has_changes(&self) -> bool {
        !self.chunked_files.is_empty()
    }
}

/// Result of a complete iterative deploy
#[derive(Debug, Clone, Default)]
pub struct DeployOutcome {
    /// Files uploaded, one list per chunk
    pub chunked_files: Vec<Vec<PathBuf>>,
    pub total_changes: usize,
    pub elapsed: Duration,
}

impl DeployOutcome {
    pub fn chunk_count(&self) -> usize {
        self.chunked_files.len()
    }
}
