//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod branch_scope;
mod commit_markers;
mod config_warning;
mod deploy_phase;
mod partition_policy;

pub use branch_scope::{ref_base_name, BranchScope};
pub use commit_markers::{CommitMarkers, DEFAULT_FORCE_DEPLOY_MARKERS, DEFAULT_NO_BUILD_MARKERS};
pub use config_warning::ConfigWarning;
pub use deploy_phase::DeployPhase;
pub use partition_policy::{PartitionPolicy, DEFAULT_MAX_BYTES_PER_CHUNK};
