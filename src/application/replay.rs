//! History Replay
//!
//! Keeps the deploy branch history bounded. Every run resets the deploy branch
//! onto the trigger branch tip and re-applies the previous full-build commit(s)
//! on top, collapsing them into a single commit. Partial-upload commits from
//! earlier runs are dropped; the full-build commit already contains their files.

use std::sync::Arc;

use crate::domain::entities::CommitInfo;
use crate::domain::ports::{
    CherryPickOptions, CommitOptions, DeployEvent, DeployEventSink, GitRepository, GitResult,
};
use crate::domain::services::{ReplayPlan, ReplayStep};

/// What a replay did to the deploy branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Number of full-build commits re-applied
    pub replayed: usize,
    /// Deploy branch HEAD after the replay
    pub head: String,
}

impl ReplayOutcome {
    /// A previous full build was restored on top of the trigger tip
    pub fn has_full_build(&self) -> bool {
        self.replayed > 0
    }
}

/// Replays previous full-build commits onto the trigger branch tip
pub struct HistoryReplayer<'a, G: GitRepository> {
    git: &'a G,
    events: Arc<dyn DeployEventSink>,
}

impl<'a, G: GitRepository> HistoryReplayer<'a, G> {
    pub fn new(git: &'a G, events: Arc<dyn DeployEventSink>) -> Self {
        Self { git, events }
    }

    /// Replay onto `trigger_branch`; the deploy branch must be checked out
    ///
    /// When the deploy branch has no full-build commit of its own this is
    /// still a reset onto the trigger tip, so the branch always ends up as
    /// `trigger_tip (+ one full-build commit)`.
    pub fn replay(&self, deploy_branch: &str, trigger_branch: &str) -> GitResult<ReplayOutcome> {
        let unique = self.git.commit_difference(deploy_branch, trigger_branch)?;

        let mut commits = Vec::with_capacity(unique.len());
        for hash in unique {
            let message = self.git.commit_message(&hash)?;
            commits.push(CommitInfo::new(hash, message));
        }

        if self.events.wants_detailed_events() {
            self.events.on_event(DeployEvent::BranchUniqueCommits {
                commits: commits
                    .iter()
                    .map(|c| format!("{} {}", c.short_hash(), first_line(&c.message)))
                    .collect(),
            });
        }

        let plan = ReplayPlan::from_newest_first(commits);
        self.events
            .on_event(DeployEvent::FullBuildCommitsFound { count: plan.len() });

        self.git.hard_reset(trigger_branch)?;
        self.events.on_event(DeployEvent::BranchReset {
            branch: deploy_branch.to_string(),
            target: trigger_branch.to_string(),
            hash: self.git.head_commit_hash()?,
        });

        self.apply(&plan)?;

        Ok(ReplayOutcome {
            replayed: plan.len(),
            head: self.git.head_commit_hash()?,
        })
    }

    fn apply(&self, plan: &ReplayPlan) -> GitResult<()> {
        for step in plan.steps() {
            let commit = step.commit();
            self.events.on_event(DeployEvent::CherryPicking {
                hash: commit.hash.clone(),
                message: first_line(&commit.message).to_string(),
                squash: step.is_squash(),
            });

            match step {
                ReplayStep::Pick(commit) => {
                    self.git.cherry_pick(
                        &commit.hash,
                        &CherryPickOptions {
                            allow_empty: true,
                            stage_only: false,
                            prefer_theirs: true,
                            preserve_committer_date: true,
                        },
                    )?;
                }
                ReplayStep::Squash(commit) => {
                    self.git.cherry_pick(
                        &commit.hash,
                        &CherryPickOptions {
                            allow_empty: true,
                            stage_only: true,
                            prefer_theirs: true,
                            preserve_committer_date: false,
                        },
                    )?;
                    self.git.commit(&CommitOptions::amend_no_edit().allow_empty(true))?;
                }
            }
        }
        Ok(())
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}
