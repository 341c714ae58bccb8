//! Git Repository Port
//!
//! The version-control operations the deploy flow consumes. Implementations
//! shell out to `git` (see `infrastructure::git::ShellGit`); tests use an
//! in-memory history.

use crate::domain::entities::ChangeRecord;
use crate::domain::value_objects::BranchScope;

/// Result type for git operations
pub type GitResult<T> = Result<T, GitError>;

/// Error from a git operation
#[derive(Debug)]
pub enum GitError {
    /// The git binary could not be started
    Spawn {
        command: String,
        source: std::io::Error,
    },
    /// git exited unsuccessfully
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    /// git succeeded but printed something we could not interpret
    UnexpectedOutput { command: String, message: String },
    /// A command failed and so did the cleanup run after it
    CleanupFailed {
        error: Box<GitError>,
        cleanup: Box<GitError>,
    },
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::Spawn { command, source } => {
                write!(f, "failed to run `{}`: {}", command, source)
            }
            GitError::CommandFailed {
                command,
                code,
                stderr,
            } => match code {
                Some(code) => write!(
                    f,
                    "`{}` exited with code {}: {}",
                    command,
                    code,
                    stderr.trim()
                ),
                None => write!(
                    f,
                    "`{}` was terminated by a signal: {}",
                    command,
                    stderr.trim()
                ),
            },
            GitError::UnexpectedOutput { command, message } => {
                write!(f, "unexpected output from `{}`: {}", command, message)
            }
            GitError::CleanupFailed { error, cleanup } => {
                write!(f, "{} (cleanup also failed: {})", error, cleanup)
            }
        }
    }
}

impl std::error::Error for GitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GitError::Spawn { source, .. } => Some(source),
            GitError::CleanupFailed { error, .. } => Some(error.as_ref()),
            _ => None,
        }
    }
}

/// Options for `git commit`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOptions {
    /// Commit message; `None` is only valid together with `no_edit`
    pub message: Option<String>,
    pub amend: bool,
    pub no_edit: bool,
    pub reset_author: bool,
    pub allow_empty: bool,
}

impl CommitOptions {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// `--amend --no-edit --reset-author`: fold staged changes into HEAD
    pub fn amend_no_edit() -> Self {
        Self {
            message: None,
            amend: true,
            no_edit: true,
            reset_author: true,
            allow_empty: false,
        }
    }

    pub fn amend(mut self, amend: bool) -> Self {
        self.amend = amend;
        self
    }

    pub fn reset_author(mut self, reset_author: bool) -> Self {
        self.reset_author = reset_author;
        self
    }

    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }
}

/// Options for `git cherry-pick`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CherryPickOptions {
    /// Keep commits that end up empty on the new base
    pub allow_empty: bool,
    /// Apply to the index and working tree only (`--no-commit`)
    pub stage_only: bool,
    /// Resolve conflicting hunks in favour of the picked commit
    pub prefer_theirs: bool,
    /// Reuse the picked commit's committer date so the same pick onto the
    /// same base produces the same hash
    pub preserve_committer_date: bool,
}

/// Options for deleting a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteBranchOptions {
    pub force: bool,
    pub scope: BranchScope,
}

impl Default for DeleteBranchOptions {
    fn default() -> Self {
        Self {
            force: false,
            scope: BranchScope::Local,
        }
    }
}

/// Git operations used by the deploy flow
///
/// All operations act on the single checkout the orchestrator owns.
pub trait GitRepository {
    /// Short names of branches in `scope` (`main`, `origin/main`)
    fn list_branches(&self, scope: &BranchScope) -> GitResult<Vec<String>>;

    /// Whether `name` exists in every part of `scope`
    fn branch_exists(&self, name: &str, scope: &BranchScope) -> GitResult<bool> {
        let branches = self.list_branches(scope)?;

        if scope.includes_local() && !branches.iter().any(|b| b == name) {
            return Ok(false);
        }
        if let Some(remote_name) = scope.remote_branch_name(name) {
            if !branches.iter().any(|b| *b == remote_name) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Currently checked-out branch, `None` when HEAD is detached
    fn current_branch(&self) -> GitResult<Option<String>>;

    fn checkout(&self, branch: &str) -> GitResult<()>;

    /// Create `name` at HEAD without checking it out
    fn create_branch(&self, name: &str) -> GitResult<()>;

    /// Create `name` at `start_point` without checking it out
    fn create_branch_from(&self, name: &str, start_point: &str) -> GitResult<()>;

    fn delete_branch(&self, name: &str, options: &DeleteBranchOptions) -> GitResult<()>;

    /// `git reset --hard <reference>` on the current branch
    fn hard_reset(&self, reference: &str) -> GitResult<()>;

    fn fetch(&self, remote: &str, reference: &str) -> GitResult<()>;

    /// Fetch every remote ref and prune deleted ones
    fn update_all_from_remote(&self) -> GitResult<()>;

    fn push(&self, remote: &str, branch: &str, force: bool) -> GitResult<()>;

    /// Stage every change in the working tree, including deletions
    fn stage_all(&self) -> GitResult<()>;

    /// Commit and return the new HEAD hash
    fn commit(&self, options: &CommitOptions) -> GitResult<String>;

    /// Working-tree changes relative to HEAD
    fn status(&self) -> GitResult<Vec<ChangeRecord>>;

    fn head_commit_hash(&self) -> GitResult<String>;

    fn commit_message(&self, reference: &str) -> GitResult<String>;

    /// Hashes reachable from `on` but not from `not_on`, most recent first
    fn commit_difference(&self, on: &str, not_on: &str) -> GitResult<Vec<String>>;

    fn cherry_pick(&self, hash: &str, options: &CherryPickOptions) -> GitResult<()>;

    /// Hashes of the last `count` commits on HEAD, most recent first
    fn last_commits(&self, count: usize) -> GitResult<Vec<String>>;

    /// Set a repository-local config value
    fn set_config(&self, key: &str, value: &str) -> GitResult<()>;
}
