//! Deploy Status Port
//!
//! Read-only queries against the hosting service's deploy API.

use crate::domain::entities::{DeployRecord, Site};
use thiserror::Error;

/// Errors from the deploy-status API
#[derive(Debug, Error)]
pub enum DeployApiError {
    /// The request could not be sent or the response body could not be read
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    /// Non-success HTTP status
    #[error("Fleek API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// GraphQL-level errors in an otherwise successful response
    #[error("Fleek API error: {0}")]
    GraphQl(String),

    /// The response did not contain the expected data
    #[error("Fleek API response is missing {0}")]
    MissingData(String),

    #[error("deploy '{id}' has an invalid {field} timestamp '{value}'")]
    InvalidTimestamp {
        id: String,
        field: &'static str,
        value: String,
    },
}

/// Queries the deploy poller and the `sites` command rely on
pub trait DeployStatusApi {
    /// Sites owned by a team
    fn list_sites(&self, team_id: &str) -> Result<Vec<Site>, DeployApiError>;

    /// Deploys of a site, most recent first
    fn list_deploys(&self, site_id: &str) -> Result<Vec<DeployRecord>, DeployApiError>;
}
