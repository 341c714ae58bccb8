//! Deploy Options
//!
//! Configuration types for deploy operations.

use std::path::{Path, PathBuf};

use crate::application::poller::PollSettings;
use crate::domain::value_objects::{CommitMarkers, PartitionPolicy};

/// Deploy branch used when nothing else is configured
pub const DEFAULT_DEPLOY_BRANCH: &str = "FLEEK_ITERATIVE_DEPLOY";
/// Git remote used when nothing else is configured
pub const DEFAULT_REMOTE: &str = "origin";
/// Build command used when nothing else is configured
pub const DEFAULT_BUILD_COMMAND: &str = "npm run build";
/// Public directory used when nothing else is configured
pub const DEFAULT_PUBLIC_DIR: &str = "build";
/// Git identity for commits made by the deploy flow
pub const DEFAULT_GIT_USER_NAME: &str = "fleek-iterative-deploy runner";
pub const DEFAULT_GIT_USER_EMAIL: &str = "N/A";

/// Holding directory for the complete build output, relative to the checkout root
pub const HOLDING_DIR: &str = ".fleek-iterative-deploy/build-output";

/// Options for the deploy use case
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Checkout root; the build runs here and every relative path resolves against it
    pub root: PathBuf,
    /// Shell command that produces the static site
    pub build_command: String,
    /// Build output directory, relative to `root`
    pub public_dir: PathBuf,
    /// Branch the hosting service deploys from
    pub deploy_branch: String,
    /// Remote the deploy branch is pushed to
    pub remote: String,
    /// How changed files are split into uploads
    pub partition: PartitionPolicy,
    /// Branch ref provided by CI (`refs/heads/main`); wins over the current checkout
    pub ci_ref: Option<String>,
    /// HEAD commit markers that abort the run
    pub no_build_markers: CommitMarkers,
    /// HEAD commit markers that redeploy every file
    pub force_deploy_markers: CommitMarkers,
    pub git_user_name: String,
    pub git_user_email: String,
    /// Site whose deploys are polled
    pub site_id: String,
    pub poll: PollSettings,
}

impl DeployOptions {
    pub fn new(root: impl Into<PathBuf>, site_id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            build_command: DEFAULT_BUILD_COMMAND.to_string(),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            deploy_branch: DEFAULT_DEPLOY_BRANCH.to_string(),
            remote: DEFAULT_REMOTE.to_string(),
            partition: PartitionPolicy::default(),
            ci_ref: None,
            no_build_markers: CommitMarkers::no_build_defaults(),
            force_deploy_markers: CommitMarkers::force_deploy_defaults(),
            git_user_name: DEFAULT_GIT_USER_NAME.to_string(),
            git_user_email: DEFAULT_GIT_USER_EMAIL.to_string(),
            site_id: site_id.into(),
            poll: PollSettings::default(),
        }
    }

    pub fn with_build_command(mut self, command: impl Into<String>) -> Self {
        self.build_command = command.into();
        self
    }

    pub fn with_public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_dir = dir.into();
        self
    }

    pub fn with_deploy_branch(mut self, branch: impl Into<String>) -> Self {
        self.deploy_branch = branch.into();
        self
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_partition(mut self, policy: PartitionPolicy) -> Self {
        self.partition = policy;
        self
    }

    pub fn with_ci_ref(mut self, ci_ref: Option<String>) -> Self {
        self.ci_ref = ci_ref;
        self
    }

    pub fn with_no_build_markers(mut self, markers: CommitMarkers) -> Self {
        self.no_build_markers = markers;
        self
    }

    pub fn with_force_deploy_markers(mut self, markers: CommitMarkers) -> Self {
        self.force_deploy_markers = markers;
        self
    }

    pub fn with_git_user(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.git_user_name = name.into();
        self.git_user_email = email.into();
        self
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// Absolute public directory
    pub fn public_dir_path(&self) -> PathBuf {
        self.root.join(&self.public_dir)
    }

    /// Absolute holding directory
    pub fn holding_dir_path(&self) -> PathBuf {
        self.root.join(HOLDING_DIR)
    }

    /// Holding directory as git reports it (relative, `/`-separated)
    pub fn holding_dir_git_path(&self) -> &'static str {
        HOLDING_DIR
    }

    /// Public directory as it appears in `.gitignore`
    pub fn public_dir_pattern(&self) -> String {
        to_git_path(&self.public_dir)
    }
}

fn to_git_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
