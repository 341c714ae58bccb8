//! Configuration loading

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::ConfigWarning;
use crate::error::{FleekDeployError, FleekDeployResult};

use super::env_validator::{closest_match, EnvVarValidator};
use super::types::{Config, PartitionStrategy};

/// Project config file, relative to the checkout root
pub const PROJECT_CONFIG_FILE: &str = ".fleek-deploy.toml";
/// Directory under the platform config dir holding `config.toml`
pub const USER_CONFIG_DIR: &str = "fleek-iterative-deploy";

pub const BRANCH_ENV: &str = "FLEEK_DEPLOY_BRANCH";
pub const REMOTE_ENV: &str = "FLEEK_DEPLOY_REMOTE";
pub const PARTITION_ENV: &str = "FLEEK_DEPLOY_PARTITION";
pub const FILES_PER_UPLOAD_ENV: &str = "FLEEK_DEPLOY_FILES_PER_UPLOAD";
pub const MAX_BYTES_ENV: &str = "FLEEK_DEPLOY_MAX_BYTES";

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> FleekDeployResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;
    parse_with_warnings(&content, path)
}

fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> FleekDeployResult<(Config, Vec<ConfigWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| FleekDeployError::InvalidConfig {
        key: path.display().to_string(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|key| {
            let leaf = key.rsplit('.').next().unwrap_or(key.as_str()).to_string();
            ConfigWarning {
                line: find_line_number(content, &leaf),
                suggestion: suggest_key(&leaf),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(USER_CONFIG_DIR).join("config.toml"))
}

/// First config file found wins; environment overrides apply on top
pub fn load_layered(
    project_root: &Path,
    explicit: Option<&Path>,
) -> FleekDeployResult<(Config, Vec<ConfigWarning>)> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => [Some(project_config_path(project_root)), user_config_path()]
            .into_iter()
            .flatten()
            .find(|path| path.is_file()),
    };

    let (config, warnings) = match candidate {
        Some(path) => load_with_warnings(&path)?,
        None => (Config::default(), Vec::new()),
    };

    Ok((config.with_env_overrides()?, warnings))
}

fn parse_budget<T: std::str::FromStr>(name: &str, value: &str) -> FleekDeployResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| FleekDeployError::InvalidConfig {
            key: name.to_string(),
            message: format!("expected a positive integer, got '{}'", value),
        })
}

/// Apply FLEEK_DEPLOY_* overrides read through `lookup`
///
/// A budget variable also selects its strategy unless FLEEK_DEPLOY_PARTITION
/// names one explicitly.
pub fn with_env_overrides<F, W>(
    mut config: Config,
    lookup: F,
    warnings: &mut W,
) -> FleekDeployResult<Config>
where
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    if let Some(branch) = lookup(BRANCH_ENV).filter(|v| !v.trim().is_empty()) {
        config.deploy.branch = branch.trim().to_string();
    }

    if let Some(remote) = lookup(REMOTE_ENV).filter(|v| !v.trim().is_empty()) {
        config.deploy.remote = remote.trim().to_string();
    }

    let partition = &mut config.deploy.partition;

    if let Some(files) = lookup(FILES_PER_UPLOAD_ENV) {
        partition.files_per_upload = parse_budget(FILES_PER_UPLOAD_ENV, &files)?;
        partition.strategy = PartitionStrategy::Files;
    }

    if let Some(bytes) = lookup(MAX_BYTES_ENV) {
        partition.max_bytes = parse_budget(MAX_BYTES_ENV, &bytes)?;
        partition.strategy = PartitionStrategy::Bytes;
    }

    if let Some(strategy) = lookup(PARTITION_ENV) {
        let validator = EnvVarValidator::new(PARTITION_ENV, PartitionStrategy::VALID_VALUES);
        partition.strategy = validator.parse_with_writer(
            &strategy,
            PartitionStrategy::parse,
            partition.strategy,
            warnings,
        );
    }

    Ok(config)
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.trim_start().starts_with(needle) || line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "deploy",
        "build_command",
        "public_dir",
        "branch",
        "remote",
        "partition",
        "strategy",
        "max_bytes",
        "files_per_upload",
        "min_chunk_bytes",
        "max_units",
        "triggers",
        "no_build",
        "force_deploy",
        "fleek",
        "api_url",
        "poll_initial_delay_secs",
        "poll_retry_delay_secs",
        "deploy_start_timeout_secs",
        "git_user",
        "name",
        "email",
    ];

    closest_match(unknown, CANDIDATES).map(str::to_string)
}

#[cfg(test)]
pub(super) fn parse_str(content: &str) -> FleekDeployResult<(Config, Vec<ConfigWarning>)> {
    parse_with_warnings(content, Path::new(PROJECT_CONFIG_FILE))
}
