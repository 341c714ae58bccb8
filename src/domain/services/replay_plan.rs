//! Replay planning service
//!
//! Decides which branch-unique commits are replayed onto a freshly reset
//! deploy branch, and how. Only full-build commits survive; partial-upload
//! commits are dropped so the branch history stays bounded across runs.

use crate::domain::entities::CommitInfo;

/// How a single commit is replayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayStep {
    /// Cherry-pick into a new commit
    Pick(CommitInfo),
    /// Cherry-pick into the index only, then amend into the previous commit
    Squash(CommitInfo),
}

impl ReplayStep {
    pub fn commit(&self) -> &CommitInfo {
        match self {
            ReplayStep::Pick(commit) | ReplayStep::Squash(commit) => commit,
        }
    }

    pub fn is_squash(&self) -> bool {
        matches!(self, ReplayStep::Squash(_))
    }
}

/// Ordered replay of previous full-build commits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayPlan {
    steps: Vec<ReplayStep>,
}

impl ReplayPlan {
    /// Build a plan from branch-unique commits listed most-recent-first
    /// (the order `git log` reports them in)
    pub fn from_newest_first(commits: Vec<CommitInfo>) -> Self {
        let steps = commits
            .into_iter()
            .filter(CommitInfo::is_full_build)
            .rev()
            .enumerate()
            .map(|(index, commit)| {
                if index == 0 {
                    ReplayStep::Pick(commit)
                } else {
                    ReplayStep::Squash(commit)
                }
            })
            .collect();

        Self { steps }
    }

    pub fn steps(&self) -> &[ReplayStep] {
        &self.steps
    }

    /// No previous full build exists: this is the first deploy of the branch
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}
