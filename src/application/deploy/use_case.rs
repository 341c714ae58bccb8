//! Deploy Use Case
//!
//! Orchestrates an iterative deploy:
//! 1. Resolve the trigger branch and sync with the remote
//! 2. Check out the deploy branch and replay the previous full build onto the trigger tip
//! 3. Build and detect which build files changed since the previous full build
//! 4. Commit the full build, then push the changed files chunk by chunk,
//!    waiting for each remote deploy to finish before pushing the next
//!
//! Any failure while uploading resets the deploy branch to the commit it had
//! before the run and force-pushes it.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::poller::DeployPoller;
use crate::application::replay::{HistoryReplayer, ReplayOutcome};
use crate::domain::entities::{
    chunk_commit_message, full_build_commit_message, SizedFile, Site,
};
use crate::domain::ports::{
    BranchOrigin, BuildFiles, BuildRunner, Clock, CommitOptions, DeployEvent, DeployEventSink,
    DeployStatusApi, GitRepository, NoopEventSink,
};
use crate::domain::services::partition;
use crate::domain::value_objects::{ref_base_name, BranchScope, DeployPhase};
use crate::error::{FleekDeployError, FleekDeployResult};

use super::options::DeployOptions;
use super::result::{DeployOutcome, SetupOutcome};

/// Written to the root of the deploy branch so people browsing it know what it is
pub const DEPLOY_BRANCH_README: &str = "\
# Iterative deploy branch

This branch is generated by `fleek-iterative-deploy`. Do not commit to it.

It contains the trigger branch plus one `add all build output` commit holding the
complete build in `.fleek-iterative-deploy/build-output`. During a deploy, changed
build files are copied into the public directory and pushed in several smaller
commits so each Fleek deploy stays under the upload size limit.

The next deploy resets this branch onto the trigger branch and replays only the
full-build commit, so the partial upload commits disappear again.
";

/// Commits listed in diagnostics
const RECENT_COMMIT_COUNT: usize = 2;

/// Deploy use case - orchestrates the iterative deploy flow
///
/// This use case is parameterized by its dependencies (ports),
/// allowing for easy testing and different implementations.
pub struct DeployUseCase<G, A, B, F, C>
where
    G: GitRepository,
    A: DeployStatusApi,
    B: BuildRunner,
    F: BuildFiles,
    C: Clock,
{
    git: G,
    api: A,
    builder: B,
    files: F,
    clock: C,
    events: Arc<dyn DeployEventSink>,
}

impl<G, A, B, F, C> DeployUseCase<G, A, B, F, C>
where
    G: GitRepository,
    A: DeployStatusApi,
    B: BuildRunner,
    F: BuildFiles,
    C: Clock,
{
    pub fn new(git: G, api: A, builder: B, files: F, clock: C) -> Self {
        Self {
            git,
            api,
            builder,
            files,
            clock,
            events: Arc::new(NoopEventSink),
        }
    }

    /// Report progress to `sink`
    pub fn with_event_sink(mut self, sink: Arc<dyn DeployEventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Sites of a team, for finding the site id to deploy to
    pub fn list_team_sites(&self, team_id: &str) -> FleekDeployResult<Vec<Site>> {
        Ok(self.api.list_sites(team_id)?)
    }

    /// Run every phase up to chunking
    ///
    /// On return the deploy branch is checked out with a fresh full-build
    /// commit on top of the trigger tip, and the public directory holds only
    /// the unchanged build files. When nothing changed the branch has already
    /// been pushed and the outcome has no chunks.
    pub fn setup(&self, options: &DeployOptions) -> FleekDeployResult<SetupOutcome> {
        self.phase(DeployPhase::ResolvingBranches);
        let trigger_branch = self.resolve_trigger_branch(options)?;

        self.phase(DeployPhase::Syncing);
        let force_deploy = self.sync_trigger_branch(&trigger_branch, options)?;

        self.phase(DeployPhase::Replaying);
        let abort_ref = self.checkout_deploy_branch(options)?;
        let replay =
            HistoryReplayer::new(&self.git, self.events.clone())
                .replay(&options.deploy_branch, &trigger_branch)?;
        self.log_recent_commits();

        self.phase(DeployPhase::Building);
        self.build(options)?;
        self.files
            .write(&options.root.join("README.md"), DEPLOY_BRANCH_README)?;

        self.phase(DeployPhase::Diffing);
        let (changed, unchanged) = self.detect_changes(options, force_deploy)?;

        let holding = options.holding_dir_path();
        let public = options.public_dir_path();
        if !unchanged.is_empty() {
            self.files.copy_files_to_dir(&unchanged, &holding, &public)?;
        }

        self.events.on_event(DeployEvent::ChangesDetected {
            changed: changed.clone(),
            unchanged_count: unchanged.len(),
            forced: force_deploy,
        });

        if !force_deploy && changed.is_empty() {
            self.events.on_event(DeployEvent::NoChanges);
            self.git.push(&options.remote, &options.deploy_branch, true)?;
            self.events.on_event(DeployEvent::BranchPushed {
                branch: options.deploy_branch.clone(),
                remote: options.remote.clone(),
            });
            return Ok(SetupOutcome {
                chunked_files: Vec::new(),
                total_changes: 0,
                abort_ref,
            });
        }

        self.commit_full_build(options, &replay)?;

        self.phase(DeployPhase::Chunking);
        let mut sized = Vec::with_capacity(changed.len());
        for path in changed {
            let bytes = self.files.file_size(&path)?;
            sized.push(SizedFile::new(path, bytes));
        }
        let chunked_files = partition(&sized, &options.partition);

        self.events.on_event(DeployEvent::ChunksPlanned {
            chunk_count: chunked_files.len(),
            total_files: sized.len(),
            budget: options.partition.budget(),
            unit: options.partition.unit_label(),
        });

        Ok(SetupOutcome {
            chunked_files,
            total_changes: sized.len(),
            abort_ref,
        })
    }

    /// Run the whole deploy: setup, then upload every chunk
    pub fn deploy_iteratively(&self, options: &DeployOptions) -> FleekDeployResult<DeployOutcome> {
        let started = self.clock.now();
        let setup = self.setup(options)?;

        if setup.has_changes() {
            self.phase(DeployPhase::Uploading);
            if let Err(err) = self.upload_chunks(options, &setup) {
                self.roll_back(options, &setup.abort_ref, &err)?;
                return Err(err);
            }
        }

        self.phase(DeployPhase::Finalizing);
        let elapsed = (self.clock.now() - started).to_std().unwrap_or_default();
        let chunk_count = setup.chunked_files.len();
        self.events.on_event(DeployEvent::Completed {
            chunk_count,
            total_files: setup.total_changes,
            elapsed_secs: elapsed.as_secs_f64(),
        });

        Ok(DeployOutcome {
            chunked_files: setup
                .chunked_files
                .into_iter()
                .map(|chunk| chunk.into_files())
                .collect(),
            total_changes: setup.total_changes,
            elapsed,
        })
    }

    fn phase(&self, phase: DeployPhase) {
        self.events.on_event(DeployEvent::PhaseStarted { phase });
    }

    fn resolve_trigger_branch(&self, options: &DeployOptions) -> FleekDeployResult<String> {
        let current_branch = self.git.current_branch()?;
        let from_ci = options
            .ci_ref
            .as_deref()
            .map(ref_base_name)
            .filter(|name| !name.is_empty());

        let trigger_branch = from_ci
            .or_else(|| current_branch.clone())
            .ok_or(FleekDeployError::UnknownTriggerBranch)?;

        self.events.on_event(DeployEvent::TriggerResolved {
            ci_ref: options.ci_ref.clone(),
            current_branch,
            trigger_branch: trigger_branch.clone(),
        });

        if trigger_branch == options.deploy_branch {
            return Err(FleekDeployError::SelfDeploy {
                branch: trigger_branch,
            });
        }
        Ok(trigger_branch)
    }

    /// Check out the trigger branch and inspect its HEAD; returns the force-deploy flag
    fn sync_trigger_branch(
        &self,
        trigger_branch: &str,
        options: &DeployOptions,
    ) -> FleekDeployResult<bool> {
        self.git.set_config("user.name", &options.git_user_name)?;
        self.git.set_config("user.email", &options.git_user_email)?;
        self.events.on_event(DeployEvent::GitUserConfigured {
            name: options.git_user_name.clone(),
            email: options.git_user_email.clone(),
        });

        if let Err(err) = self.git.update_all_from_remote() {
            self.events.on_event(DeployEvent::RemoteSyncFailed {
                error: err.to_string(),
            });
        }

        if self.git.current_branch()?.as_deref() != Some(trigger_branch) {
            self.git.checkout(trigger_branch)?;
        }

        let hash = self.git.head_commit_hash()?;
        let message = self.git.commit_message(&hash)?;
        self.events.on_event(DeployEvent::TriggerHead {
            hash: hash.clone(),
            message: message.clone(),
        });

        if let Some(marker) = options.no_build_markers.find_in(&message) {
            return Err(FleekDeployError::NoBuildRequested {
                hash,
                marker: marker.to_string(),
            });
        }

        let force_deploy = match options.force_deploy_markers.find_in(&message) {
            Some(marker) => {
                self.events.on_event(DeployEvent::ForceDeployRequested {
                    marker: marker.to_string(),
                });
                true
            }
            None => false,
        };

        self.git.hard_reset(trigger_branch)?;
        let after_reset = self.git.head_commit_hash()?;
        self.events.on_event(DeployEvent::BranchReset {
            branch: trigger_branch.to_string(),
            target: trigger_branch.to_string(),
            hash: after_reset.clone(),
        });
        if after_reset != hash {
            return Err(FleekDeployError::HeadMoved {
                branch: trigger_branch.to_string(),
                expected: hash,
                actual: after_reset,
            });
        }

        Ok(force_deploy)
    }

    /// Check out (creating if needed) the deploy branch; returns its starting HEAD
    fn checkout_deploy_branch(&self, options: &DeployOptions) -> FleekDeployResult<String> {
        let branch = options.deploy_branch.as_str();
        let remote_scope = BranchScope::Remote(options.remote.clone());

        let origin = if self.git.branch_exists(branch, &BranchScope::Local)? {
            BranchOrigin::Local
        } else if self.git.branch_exists(branch, &remote_scope)? {
            let start_point = remote_scope
                .remote_branch_name(branch)
                .unwrap_or_else(|| format!("{}/{}", options.remote, branch));
            self.git.create_branch_from(branch, &start_point)?;
            BranchOrigin::Remote
        } else {
            self.git.create_branch(branch)?;
            BranchOrigin::Created
        };
        self.git.checkout(branch)?;

        let hash = self.git.head_commit_hash()?;
        let message = self.git.commit_message(&hash)?;
        self.events.on_event(DeployEvent::DeployBranchCheckedOut {
            branch: branch.to_string(),
            origin,
            hash: hash.clone(),
            message,
        });
        Ok(hash)
    }

    fn log_recent_commits(&self) {
        if !self.events.wants_detailed_events() {
            return;
        }
        if let Ok(commits) = self.git.last_commits(RECENT_COMMIT_COUNT) {
            self.events.on_event(DeployEvent::RecentCommits { commits });
        }
    }

    fn build(&self, options: &DeployOptions) -> FleekDeployResult<()> {
        self.events.on_event(DeployEvent::BuildStarted {
            command: options.build_command.clone(),
        });

        let output = self
            .builder
            .run(&options.build_command, &options.root, self.events.as_ref())?;
        if !output.is_success() {
            let status = match output.exit_code {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            };
            return Err(FleekDeployError::BuildFailed {
                command: options.build_command.clone(),
                status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let public = options.public_dir_path();
        let entry_count = self.files.entry_count(&public)?;
        self.events.on_event(DeployEvent::BuildFinished {
            public_dir: public,
            entry_count,
        });
        Ok(())
    }

    /// Move the build into the holding directory and split it into
    /// `(changed, unchanged)` absolute paths inside the holding directory
    fn detect_changes(
        &self,
        options: &DeployOptions,
        force_deploy: bool,
    ) -> FleekDeployResult<(Vec<PathBuf>, Vec<PathBuf>)> {
        let holding = options.holding_dir_path();
        let public = options.public_dir_path();

        self.files.clear_dir(&holding)?;
        self.files.copy_dir(&public, &holding)?;
        self.files.clear_dir(&public)?;

        self.git.stage_all()?;
        let all_files = self.files.list_files_recursive(&holding)?;

        if force_deploy {
            return Ok((all_files, Vec::new()));
        }

        let holding_git_path = options.holding_dir_git_path();
        let changed: Vec<PathBuf> = self
            .git
            .status()?
            .into_iter()
            .filter(|record| record.is_within(holding_git_path))
            .map(|record| options.root.join(record.path))
            .filter(|path| self.files.exists(path))
            .collect();

        let changed_set: HashSet<&PathBuf> = changed.iter().collect();
        let unchanged = all_files
            .iter()
            .filter(|path| !changed_set.contains(path))
            .cloned()
            .collect();

        Ok((changed, unchanged))
    }

    fn commit_full_build(
        &self,
        options: &DeployOptions,
        replay: &ReplayOutcome,
    ) -> FleekDeployResult<()> {
        let gitignore = options.root.join(".gitignore");
        let public_dir = options.public_dir_pattern();
        let removed = self.files.exists(&gitignore)
            && self.files.remove_match_from_file(&gitignore, &public_dir)?;
        self.events
            .on_event(DeployEvent::GitIgnoreUpdated { public_dir, removed });

        let message = full_build_commit_message(self.clock.now());
        self.git.stage_all()?;
        let hash = self.git.commit(
            &CommitOptions::with_message(message.clone())
                .amend(replay.has_full_build())
                .reset_author(true)
                .allow_empty(true),
        )?;
        self.events
            .on_event(DeployEvent::FullBuildCommitted { hash, message });
        Ok(())
    }

    fn upload_chunks(&self, options: &DeployOptions, setup: &SetupOutcome) -> FleekDeployResult<()> {
        let holding = options.holding_dir_path();
        let public = options.public_dir_path();
        let chunk_count = setup.chunked_files.len();
        let poller = DeployPoller::new(
            &self.api,
            &self.clock,
            &options.site_id,
            options.poll,
            self.events.clone(),
        );

        for (index, chunk) in setup.chunked_files.iter().enumerate() {
            self.events.on_event(DeployEvent::ChunkStarted {
                index,
                chunk_count,
                files: chunk.files().to_vec(),
                total_files: setup.total_changes,
            });

            self.files
                .copy_files_to_dir(chunk.files(), &holding, &public)?;

            let message = chunk_commit_message(index, chunk_count, chunk.len(), setup.total_changes);
            self.git.stage_all()?;
            let hash = self
                .git
                .commit(&CommitOptions::with_message(message).allow_empty(true))?;
            self.git.push(&options.remote, &options.deploy_branch, true)?;
            self.events.on_event(DeployEvent::ChunkPushed {
                index,
                hash,
                branch: options.deploy_branch.clone(),
            });

            let pushed_at = self.clock.now();
            let deploy_id = poller.await_deploy_start(pushed_at)?;
            poller.await_deploy_finish(&deploy_id)?;
        }
        Ok(())
    }

    /// Restore the deploy branch to `abort_ref` locally and on the remote
    fn roll_back(
        &self,
        options: &DeployOptions,
        abort_ref: &str,
        cause: &FleekDeployError,
    ) -> FleekDeployResult<()> {
        if self.git.current_branch()?.as_deref() != Some(options.deploy_branch.as_str()) {
            return Ok(());
        }

        self.phase(DeployPhase::RollingBack);
        self.events.on_event(DeployEvent::RollingBack {
            branch: options.deploy_branch.clone(),
            abort_ref: abort_ref.to_string(),
            reason: cause.to_string(),
        });
        self.git.hard_reset(abort_ref)?;
        self.git.push(&options.remote, &options.deploy_branch, true)?;
        Ok(())
    }
}
