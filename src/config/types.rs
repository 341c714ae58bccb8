//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::deploy::{
    DeployOptions, DEFAULT_BUILD_COMMAND, DEFAULT_DEPLOY_BRANCH, DEFAULT_GIT_USER_EMAIL,
    DEFAULT_GIT_USER_NAME, DEFAULT_PUBLIC_DIR, DEFAULT_REMOTE,
};
use crate::application::poller::PollSettings;
use crate::domain::value_objects::{
    CommitMarkers, ConfigWarning, PartitionPolicy, DEFAULT_FORCE_DEPLOY_MARKERS,
    DEFAULT_MAX_BYTES_PER_CHUNK, DEFAULT_NO_BUILD_MARKERS,
};
use crate::error::{FleekDeployError, FleekDeployResult};
use crate::infrastructure::DEFAULT_API_URL;

use super::loader;

/// Which budget splits changed files into uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PartitionStrategy {
    /// Cumulative byte size per upload
    #[default]
    Bytes,
    /// File count per upload
    Files,
    /// Size units of `min_chunk_bytes` per upload
    Units,
}

impl PartitionStrategy {
    /// Names accepted in config files and FLEEK_DEPLOY_PARTITION
    pub const VALID_VALUES: &'static [&'static str] = &["bytes", "files", "units"];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "bytes" | "size" => Some(PartitionStrategy::Bytes),
            "files" | "count" => Some(PartitionStrategy::Files),
            "units" => Some(PartitionStrategy::Units),
            _ => None,
        }
    }
}

impl std::fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PartitionStrategy::Bytes => "bytes",
            PartitionStrategy::Files => "files",
            PartitionStrategy::Units => "units",
        };
        f.write_str(name)
    }
}

/// `[deploy.partition]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    #[serde(default)]
    pub strategy: PartitionStrategy,

    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    #[serde(default = "default_files_per_upload")]
    pub files_per_upload: usize,

    #[serde(default = "default_min_chunk_bytes")]
    pub min_chunk_bytes: u64,

    #[serde(default = "default_max_units")]
    pub max_units: u64,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            strategy: PartitionStrategy::default(),
            max_bytes: default_max_bytes(),
            files_per_upload: default_files_per_upload(),
            min_chunk_bytes: default_min_chunk_bytes(),
            max_units: default_max_units(),
        }
    }
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES_PER_CHUNK
}

fn default_files_per_upload() -> usize {
    100
}

fn default_min_chunk_bytes() -> u64 {
    1_048_576
}

fn default_max_units() -> u64 {
    30
}

impl PartitionConfig {
    /// Policy for the selected strategy; zero budgets are rejected
    pub fn policy(&self) -> FleekDeployResult<PartitionPolicy> {
        let (key, policy) = match self.strategy {
            PartitionStrategy::Bytes => (
                "deploy.partition.max_bytes",
                PartitionPolicy::MaxBytes(self.max_bytes),
            ),
            PartitionStrategy::Files => (
                "deploy.partition.files_per_upload",
                PartitionPolicy::MaxItems(self.files_per_upload),
            ),
            PartitionStrategy::Units => (
                "deploy.partition.max_units",
                PartitionPolicy::ChunkUnits {
                    min_chunk_bytes: self.min_chunk_bytes,
                    max_units: self.max_units,
                },
            ),
        };

        if !policy.is_valid() {
            return Err(FleekDeployError::InvalidConfig {
                key: key.to_string(),
                message: "upload budget must be greater than zero".to_string(),
            });
        }
        Ok(policy)
    }
}

/// `[deploy]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default = "default_build_command")]
    pub build_command: String,

    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub partition: PartitionConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            build_command: default_build_command(),
            public_dir: default_public_dir(),
            branch: default_branch(),
            remote: default_remote(),
            partition: PartitionConfig::default(),
        }
    }
}

fn default_build_command() -> String {
    DEFAULT_BUILD_COMMAND.to_string()
}

fn default_public_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PUBLIC_DIR)
}

fn default_branch() -> String {
    DEFAULT_DEPLOY_BRANCH.to_string()
}

fn default_remote() -> String {
    DEFAULT_REMOTE.to_string()
}

/// `[triggers]`: commit-message markers checked on the trigger HEAD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggersConfig {
    #[serde(default = "default_no_build")]
    pub no_build: Vec<String>,

    #[serde(default = "default_force_deploy")]
    pub force_deploy: Vec<String>,
}

impl Default for TriggersConfig {
    fn default() -> Self {
        Self {
            no_build: default_no_build(),
            force_deploy: default_force_deploy(),
        }
    }
}

fn default_no_build() -> Vec<String> {
    DEFAULT_NO_BUILD_MARKERS.iter().map(|m| m.to_string()).collect()
}

fn default_force_deploy() -> Vec<String> {
    DEFAULT_FORCE_DEPLOY_MARKERS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

/// `[fleek]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleekConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_initial_delay")]
    pub poll_initial_delay_secs: u64,

    #[serde(default = "default_retry_delay")]
    pub poll_retry_delay_secs: u64,

    #[serde(default = "default_start_timeout")]
    pub deploy_start_timeout_secs: u64,
}

impl Default for FleekConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            poll_initial_delay_secs: default_initial_delay(),
            poll_retry_delay_secs: default_retry_delay(),
            deploy_start_timeout_secs: default_start_timeout(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_initial_delay() -> u64 {
    PollSettings::default().initial_delay.as_secs()
}

fn default_retry_delay() -> u64 {
    PollSettings::default().retry_delay.as_secs()
}

fn default_start_timeout() -> u64 {
    PollSettings::default().start_timeout.as_secs()
}

impl FleekConfig {
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings::default()
            .with_initial_delay(Duration::from_secs(self.poll_initial_delay_secs))
            .with_retry_delay(Duration::from_secs(self.poll_retry_delay_secs))
            .with_start_timeout(Duration::from_secs(self.deploy_start_timeout_secs))
    }
}

/// `[git_user]`: identity for commits on the deploy branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitUserConfig {
    #[serde(default = "default_git_user_name")]
    pub name: String,

    #[serde(default = "default_git_user_email")]
    pub email: String,
}

impl Default for GitUserConfig {
    fn default() -> Self {
        Self {
            name: default_git_user_name(),
            email: default_git_user_email(),
        }
    }
}

fn default_git_user_name() -> String {
    DEFAULT_GIT_USER_NAME.to_string()
}

fn default_git_user_email() -> String {
    DEFAULT_GIT_USER_EMAIL.to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub deploy: DeployConfig,

    #[serde(default)]
    pub triggers: TriggersConfig,

    #[serde(default)]
    pub fleek: FleekConfig,

    #[serde(default)]
    pub git_user: GitUserConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> FleekDeployResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> FleekDeployResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load an explicit config file, else the project config, else the user
    /// config, else defaults; then apply environment overrides
    pub fn load_layered(
        project_root: &Path,
        explicit: Option<&Path>,
    ) -> FleekDeployResult<(Self, Vec<ConfigWarning>)> {
        loader::load_layered(project_root, explicit)
    }

    /// Apply FLEEK_DEPLOY_* environment overrides
    pub fn with_env_overrides(self) -> FleekDeployResult<Self> {
        loader::with_env_overrides(self, |name| std::env::var(name).ok(), &mut std::io::stderr())
    }

    /// Deploy options for a checkout, validating the partition budget
    pub fn deploy_options(
        &self,
        root: impl Into<PathBuf>,
        site_id: impl Into<String>,
        ci_ref: Option<String>,
    ) -> FleekDeployResult<DeployOptions> {
        Ok(DeployOptions::new(root, site_id)
            .with_build_command(self.deploy.build_command.clone())
            .with_public_dir(self.deploy.public_dir.clone())
            .with_deploy_branch(self.deploy.branch.clone())
            .with_remote(self.deploy.remote.clone())
            .with_partition(self.deploy.partition.policy()?)
            .with_ci_ref(ci_ref)
            .with_no_build_markers(CommitMarkers::new(self.triggers.no_build.iter().cloned()))
            .with_force_deploy_markers(CommitMarkers::new(
                self.triggers.force_deploy.iter().cloned(),
            ))
            .with_git_user(self.git_user.name.clone(), self.git_user.email.clone())
            .with_poll_settings(self.fleek.poll_settings()))
    }
}
