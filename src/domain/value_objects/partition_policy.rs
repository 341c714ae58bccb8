//! Partition policy value object - bounds how many changed files go into one upload
//!
//! Three generations of budget exist and all are supported:
//! - `MaxItems`: a plain file count per chunk
//! - `MaxBytes`: a cumulative byte-size ceiling per chunk
//! - `ChunkUnits`: each file weighs `ceil(bytes / min_chunk_bytes)` units (at least 1)

/// 30 MiB, the per-deploy byte budget Fleek handles reliably.
pub const DEFAULT_MAX_BYTES_PER_CHUNK: u64 = 31_457_280;

/// Budget applied when splitting the changed-file set into upload chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionPolicy {
    /// At most this many files per chunk
    MaxItems(usize),
    /// At most this many bytes per chunk (a single larger file is kept alone)
    MaxBytes(u64),
    /// At most `max_units` units per chunk, where a file weighs
    /// `ceil(bytes / min_chunk_bytes)` units
    ChunkUnits { min_chunk_bytes: u64, max_units: u64 },
}

impl PartitionPolicy {
    /// Weight a single file contributes towards the chunk budget
    pub fn weight_of(&self, bytes: u64) -> u64 {
        match self {
            PartitionPolicy::MaxItems(_) => 1,
            PartitionPolicy::MaxBytes(_) => bytes,
            PartitionPolicy::ChunkUnits {
                min_chunk_bytes, ..
            } => {
                let unit = (*min_chunk_bytes).max(1);
                bytes.div_ceil(unit).max(1)
            }
        }
    }

    /// Maximum cumulative weight of a chunk
    pub fn budget(&self) -> u64 {
        match self {
            PartitionPolicy::MaxItems(max) => *max as u64,
            PartitionPolicy::MaxBytes(max) => *max,
            PartitionPolicy::ChunkUnits { max_units, .. } => *max_units,
        }
    }

    /// Unit name used when reporting chunk weights
    pub fn unit_label(&self) -> &'static str {
        match self {
            PartitionPolicy::MaxItems(_) => "files",
            PartitionPolicy::MaxBytes(_) => "bytes",
            PartitionPolicy::ChunkUnits { .. } => "units",
        }
    }

    /// A zero budget can never be satisfied by any non-empty chunk
    pub fn is_valid(&self) -> bool {
        match self {
            PartitionPolicy::MaxItems(max) => *max > 0,
            PartitionPolicy::MaxBytes(max) => *max > 0,
            PartitionPolicy::ChunkUnits {
                min_chunk_bytes,
                max_units,
            } => *min_chunk_bytes > 0 && *max_units > 0,
        }
    }
}

impl Default for PartitionPolicy {
    fn default() -> Self {
        PartitionPolicy::MaxBytes(DEFAULT_MAX_BYTES_PER_CHUNK)
    }
}

impl std::fmt::Display for PartitionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartitionPolicy::MaxItems(max) => write!(f, "at most {} files per upload", max),
            PartitionPolicy::MaxBytes(max) => write!(f, "at most {} bytes per upload", max),
            PartitionPolicy::ChunkUnits {
                min_chunk_bytes,
                max_units,
            } => write!(
                f,
                "at most {} units of {} bytes per upload",
                max_units, min_chunk_bytes
            ),
        }
    }
}
