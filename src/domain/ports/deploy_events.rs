//! Deploy Event Port
//!
//! Provides an observable interface for deploy operations.
//! Operators rely on this stream to debug deploy runs: every phase transition,
//! branch name, commit hash, file count and elapsed time is reported here.

use crate::domain::value_objects::DeployPhase;
use std::path::PathBuf;

/// Which output stream a build line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// How the deploy branch was made available locally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOrigin {
    /// Already existed locally
    Local,
    /// Created from the remote copy
    Remote,
    /// Created fresh from the trigger branch tip
    Created,
}

/// What the poller is currently waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTarget {
    /// A deploy started at or after the push
    Start,
    /// The tracked deploy (and any concurrent one) to resolve
    Finish { deploy_id: String },
}

/// Event emitted during deploy operations
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// A new phase of the state machine started
    PhaseStarted { phase: DeployPhase },

    /// Trigger branch resolved from the CI ref or the current checkout
    TriggerResolved {
        ci_ref: Option<String>,
        current_branch: Option<String>,
        trigger_branch: String,
    },

    /// Dedicated git identity configured for deploy commits
    GitUserConfigured { name: String, email: String },

    /// Fetching from the remote failed; continuing with local refs
    RemoteSyncFailed { error: String },

    /// HEAD of the trigger branch
    TriggerHead { hash: String, message: String },

    /// The trigger commit asked for a full redeploy
    ForceDeployRequested { marker: String },

    /// Diagnostic listing of the most recent commits on HEAD
    RecentCommits { commits: Vec<String> },

    /// Deploy branch checked out
    DeployBranchCheckedOut {
        branch: String,
        origin: BranchOrigin,
        hash: String,
        message: String,
    },

    /// Commits on the deploy branch that the trigger branch does not have
    BranchUniqueCommits { commits: Vec<String> },

    /// Full-build commits selected for replay
    FullBuildCommitsFound { count: usize },

    /// Current branch hard-reset
    BranchReset {
        branch: String,
        target: String,
        hash: String,
    },

    /// Replaying one full-build commit
    CherryPicking {
        hash: String,
        message: String,
        squash: bool,
    },

    /// Build command started
    BuildStarted { command: String },

    /// One line of build output
    BuildOutput { stream: OutputStream, line: String },

    /// Build command finished successfully
    BuildFinished {
        public_dir: PathBuf,
        entry_count: usize,
    },

    /// Public directory removed from `.gitignore`
    GitIgnoreUpdated { public_dir: String, removed: bool },

    /// Changed files detected in the build output
    ChangesDetected {
        changed: Vec<PathBuf>,
        unchanged_count: usize,
        forced: bool,
    },

    /// Nothing changed since the previous full build
    NoChanges,

    /// Full-build commit created
    FullBuildCommitted { hash: String, message: String },

    /// Changed files split into upload chunks
    ChunksPlanned {
        chunk_count: usize,
        total_files: usize,
        budget: u64,
        unit: &'static str,
    },

    /// Upload of one chunk started
    ChunkStarted {
        index: usize,
        chunk_count: usize,
        files: Vec<PathBuf>,
        total_files: usize,
    },

    /// Chunk committed and pushed
    ChunkPushed {
        index: usize,
        hash: String,
        branch: String,
    },

    /// Deploy list queried without reaching the wait condition
    DeployPollPending { target: PollTarget, pending: usize },

    /// Remote deploy for the pushed chunk detected
    RemoteDeployStarted { deploy_id: String },

    /// Remote deploy for the pushed chunk finished
    RemoteDeployFinished { deploy_id: String, elapsed_secs: f64 },

    /// Upload failed; restoring the deploy branch
    RollingBack {
        branch: String,
        abort_ref: String,
        reason: String,
    },

    /// Deploy branch pushed without uploading chunks
    BranchPushed { branch: String, remote: String },

    /// Run completed
    Completed {
        chunk_count: usize,
        total_files: usize,
        elapsed_secs: f64,
    },
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - ConsoleEventSink: Progress display in terminal
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);

    /// Check if this sink wants detailed events (per-file lists, poll attempts)
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
