//! Change-set partitioning service
//!
//! Splits an ordered list of changed files into ordered upload chunks bounded
//! by a [`PartitionPolicy`] budget. Pure: file sizes are resolved by the caller.

use crate::domain::entities::{FileChunk, SizedFile};
use crate::domain::value_objects::PartitionPolicy;

/// Partition `files` into chunks that respect `policy`
///
/// - Concatenating the chunks yields `files` in the original order.
/// - A chunk never exceeds the budget unless it holds a single file that is
///   over budget on its own; such a file is never subdivided.
/// - No input yields no chunks.
pub fn partition(files: &[SizedFile], policy: &PartitionPolicy) -> Vec<FileChunk> {
    let budget = policy.budget();
    let mut chunks = Vec::new();
    let mut current = FileChunk::new();

    for file in files {
        let weight = policy.weight_of(file.bytes);

        if !current.is_empty() && current.weight().saturating_add(weight) > budget {
            chunks.push(std::mem::replace(&mut current, FileChunk::new()));
        }

        current.push(file.path.clone(), weight);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
