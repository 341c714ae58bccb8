//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod build_files;
pub mod build_runner;
pub mod clock;
pub mod deploy_events;
pub mod deploy_status;
pub mod git_repository;

pub use build_files::{BuildFiles, FsError, FsResult};
pub use build_runner::{BuildOutput, BuildRunner};
pub use clock::Clock;
pub use deploy_events::{
    BranchOrigin, DeployEvent, DeployEventSink, NoopEventSink, OutputStream, PollTarget,
};
pub use deploy_status::{DeployApiError, DeployStatusApi};
pub use git_repository::{
    CherryPickOptions, CommitOptions, DeleteBranchOptions, GitError, GitRepository, GitResult,
};
