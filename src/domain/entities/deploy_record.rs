//! Deploy record entity - read-only view of a remote Fleek deploy

use chrono::{DateTime, Utc};

/// Status of a remote deploy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployStatus {
    InProgress,
    Succeeded,
    Failed,
    Cancelled,
    /// Any status the API reports that the poller does not wait on
    Other(String),
}

impl DeployStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, DeployStatus::InProgress)
    }
}

impl std::fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployStatus::InProgress => write!(f, "in progress"),
            DeployStatus::Succeeded => write!(f, "succeeded"),
            DeployStatus::Failed => write!(f, "failed"),
            DeployStatus::Cancelled => write!(f, "cancelled"),
            DeployStatus::Other(status) => write!(f, "{}", status.to_lowercase()),
        }
    }
}

/// One deploy of a site, owned by the hosting service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRecord {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: DeployStatus,
}

/// A site hosted by the team
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub slug: Option<String>,
}
