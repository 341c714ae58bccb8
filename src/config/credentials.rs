//! Credentials and CI inputs read from the environment

use crate::error::{FleekDeployError, FleekDeployResult};

pub const API_KEY_ENV: &str = "FLEEK_API_KEY";
pub const TEAM_ID_ENV: &str = "FLEEK_TEAM_ID";
pub const SITE_ID_ENV: &str = "FLEEK_SITE_ID";
/// Branch ref set by GitHub Actions (`refs/heads/main`)
pub const CI_REF_ENV: &str = "GITHUB_REF";

/// Read a required variable; blank counts as missing
pub fn require_env<F>(lookup: F, name: &'static str) -> FleekDeployResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(FleekDeployError::MissingEnv { name })
}

/// Fleek API credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub team_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("team_id", &self.team_id)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> FleekDeployResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> FleekDeployResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: require_env(&lookup, API_KEY_ENV)?,
            team_id: require_env(&lookup, TEAM_ID_ENV)?,
        })
    }
}
