//! Error types for fleek-iterative-deploy
//!
//! Uses `thiserror` for library errors. The binary wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::{DeployApiError, FsError, GitError};

/// Result type alias for deploy operations
pub type FleekDeployResult<T> = Result<T, FleekDeployError>;

/// Main error type for deploy operations
#[derive(Error, Debug)]
pub enum FleekDeployError {
    /// The trigger branch resolved to the deploy branch itself
    #[error("cannot deploy branch '{branch}' onto itself; run from a different branch")]
    SelfDeploy { branch: String },

    /// Neither GITHUB_REF nor the current checkout named a branch
    #[error("could not determine the trigger branch (no GITHUB_REF and HEAD is detached)")]
    UnknownTriggerBranch,

    /// Required environment variable is not set
    #[error("missing required environment variable {name}")]
    MissingEnv { name: &'static str },

    /// Configuration value failed validation
    #[error("invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    /// Trigger commit opted out of deploying
    #[error("commit {hash} contains '{marker}'; skipping build and deploy")]
    NoBuildRequested { hash: String, marker: String },

    /// HEAD changed after hard-resetting the trigger branch onto itself
    #[error("HEAD moved from {expected} to {actual} while preparing branch '{branch}'")]
    HeadMoved {
        branch: String,
        expected: String,
        actual: String,
    },

    /// Build command exited unsuccessfully
    #[error("build command `{command}` failed ({status}): {stderr}")]
    BuildFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Git command failure
    #[error("git error: {0}")]
    Git(#[from] GitError),

    /// Fleek API failure
    #[error(transparent)]
    Api(#[from] DeployApiError),

    /// No deploy started within the start timeout
    #[error("no deploy started within {timeout_secs}s after {since}")]
    DeployNotStarted { since: String, timeout_secs: u64 },

    /// Tracked deploy disappeared from the deploy listing
    #[error("deploy '{deploy_id}' is no longer listed for site '{site_id}'")]
    DeployVanished { deploy_id: String, site_id: String },

    /// Tracked deploy was cancelled on the hosting side
    #[error("deploy '{deploy_id}' was cancelled")]
    DeployCancelled { deploy_id: String },

    /// Tracked deploy failed on the hosting side
    #[error("deploy '{deploy_id}' failed")]
    DeployFailed { deploy_id: String },

    /// A file to copy does not live under the structure root
    #[error("file {path} is outside of {root}")]
    OutsideStructureRoot { path: PathBuf, root: PathBuf },

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File system port failure
    #[error(transparent)]
    Fs(FsError),
}

impl From<FsError> for FleekDeployError {
    fn from(err: FsError) -> Self {
        match err {
            FsError::OutsideRoot { path, root } => {
                FleekDeployError::OutsideStructureRoot { path, root }
            }
            other => FleekDeployError::Fs(other),
        }
    }
}
