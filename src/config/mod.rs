//! Configuration module for fleek-iterative-deploy
//!
//! Configuration hierarchy:
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (FLEEK_DEPLOY_*)
//! 3. Project config (.fleek-deploy.toml)
//! 4. User config (<config dir>/fleek-iterative-deploy/config.toml)
//! 5. Built-in defaults (lowest priority)
//!
//! Credentials (FLEEK_API_KEY, FLEEK_TEAM_ID, FLEEK_SITE_ID) only ever come from
//! the environment.

mod credentials;
mod env_validator;
mod loader;
mod types;

pub use crate::domain::value_objects::ConfigWarning;

pub use credentials::{
    require_env, Credentials, API_KEY_ENV, CI_REF_ENV, SITE_ID_ENV, TEAM_ID_ENV,
};
pub use env_validator::{closest_match, levenshtein, EnvVarValidator};
pub use loader::{
    project_config_path, user_config_path, PROJECT_CONFIG_FILE, USER_CONFIG_DIR,
};
pub use types::{
    Config, DeployConfig, FleekConfig, GitUserConfig, PartitionConfig, PartitionStrategy,
    TriggersConfig,
};
