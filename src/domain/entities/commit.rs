//! Commit entity - a deploy-branch commit and the messages this tool writes

use chrono::{DateTime, SecondsFormat, Utc};

/// Every full-build commit message starts with this marker
pub const FULL_BUILD_COMMIT_MARKER: &str = "add all build output";

/// A commit hash paired with its message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
}

impl CommitInfo {
    pub fn new(hash: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            message: message.into(),
        }
    }

    /// Whether this commit holds a complete build output
    pub fn is_full_build(&self) -> bool {
        self.message.starts_with(FULL_BUILD_COMMIT_MARKER)
    }

    /// First seven characters of the hash, for display
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

/// Message for a new full-build commit
pub fn full_build_commit_message(at: DateTime<Utc>) -> String {
    format!(
        "{} {}",
        FULL_BUILD_COMMIT_MARKER,
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Message for the commit that uploads one chunk
///
/// `index` is zero-based; the message reports the last index rather than the
/// chunk count so operators can see "index 2 of 2" on the final upload.
pub fn chunk_commit_message(
    index: usize,
    chunk_count: usize,
    files_in_chunk: usize,
    total_files: usize,
) -> String {
    format!(
        "adding built files from index \"{}\" of \"{}\" with \"{}\" files (\"{}\" total files).",
        index,
        chunk_count.saturating_sub(1),
        files_in_chunk,
        total_files
    )
}
