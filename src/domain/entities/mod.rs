//! Domain Entities
//!
//! - `ChangeRecord` - A working-tree change reported by git
//! - `CommitInfo` - A deploy-branch commit
//! - `DeployRecord` - A remote deploy tracked by the hosting service
//! - `FileChunk` - A group of changed files uploaded together

mod change_record;
mod commit;
mod deploy_record;
mod file_chunk;

pub use change_record::{parse_porcelain_z, ChangeParseError, ChangeRecord, ChangeType};
pub use commit::{
    chunk_commit_message, full_build_commit_message, CommitInfo, FULL_BUILD_COMMIT_MARKER,
};
pub use deploy_record::{DeployRecord, DeployStatus, Site};
pub use file_chunk::{FileChunk, SizedFile};
