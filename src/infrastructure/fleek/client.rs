//! Fleek GraphQL client.
//!
//! Read-only queries for sites and deploys, authenticated with a team API key.

use crate::domain::entities::{DeployRecord, DeployStatus, Site};
use crate::domain::ports::{DeployApiError, DeployStatusApi};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Public Fleek GraphQL endpoint
pub const DEFAULT_API_URL: &str = "https://api.fleek.co/graphql";

const SITES_QUERY: &str = r#"
query getSitesByTeam($teamId: ID!) {
    getSitesByTeam(teamId: $teamId) {
        sites {
            id
            name
            slug
        }
    }
}
"#;

const DEPLOYS_QUERY: &str = r#"
query getDeploysBySite($siteId: ID!) {
    getDeploysBySite(siteId: $siteId) {
        deploys {
            ... on Deploy {
                id
                startedAt
                completedAt
                status
            }
        }
    }
}
"#;

/// Fleek client configuration.
#[derive(Debug, Clone)]
pub struct FleekClientConfig {
    /// GraphQL endpoint.
    pub api_url: String,

    /// Team API key, sent verbatim in the `authorization` header.
    pub api_key: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl FleekClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            timeout_secs: 30,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Fleek API client.
#[derive(Debug, Clone)]
pub struct FleekClient {
    client: Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SitesData {
    get_sites_by_team: Option<SiteList>,
}

#[derive(Debug, Deserialize)]
struct SiteList {
    #[serde(default)]
    sites: Vec<RawSite>,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    id: String,
    name: String,
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploysData {
    get_deploys_by_site: Option<DeployList>,
}

#[derive(Debug, Deserialize)]
struct DeployList {
    #[serde(default)]
    deploys: Vec<RawDeploy>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeploy {
    id: String,
    started_at: String,
    completed_at: Option<String>,
    status: String,
}

impl RawDeploy {
    fn into_record(self) -> Result<DeployRecord, DeployApiError> {
        let started_at = parse_timestamp(&self.id, "startedAt", &self.started_at)?;
        // Informational only; unreadable values are dropped
        let completed_at = self
            .completed_at
            .as_deref()
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map(|t| t.with_timezone(&Utc));
        let status = parse_status(self.status);

        Ok(DeployRecord {
            id: self.id,
            started_at,
            completed_at,
            status,
        })
    }
}

fn parse_timestamp(
    id: &str,
    field: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, DeployApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| DeployApiError::InvalidTimestamp {
            id: id.to_string(),
            field,
            value: value.to_string(),
        })
}

fn parse_status(status: String) -> DeployStatus {
    match status.as_str() {
        "IN_PROGRESS" => DeployStatus::InProgress,
        "DEPLOYED" | "SUCCEEDED" => DeployStatus::Succeeded,
        "FAILED" => DeployStatus::Failed,
        "CANCELLED" => DeployStatus::Cancelled,
        _ => DeployStatus::Other(status),
    }
}

/// Decode a GraphQL response body, surfacing GraphQL-level errors
fn decode<T: DeserializeOwned>(body: &str, endpoint: &str) -> Result<T, DeployApiError> {
    let response: GraphQlResponse<T> =
        serde_json::from_str(body).map_err(|e| DeployApiError::Request {
            endpoint: endpoint.to_string(),
            message: format!("failed to parse response: {}", e),
        })?;

    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(DeployApiError::GraphQl(messages.join("; ")));
    }

    response
        .data
        .ok_or_else(|| DeployApiError::MissingData("data".to_string()))
}

fn sites_from_body(body: &str) -> Result<Vec<Site>, DeployApiError> {
    let data: SitesData = decode(body, "getSitesByTeam")?;
    let list = data
        .get_sites_by_team
        .ok_or_else(|| DeployApiError::MissingData("getSitesByTeam".to_string()))?;

    Ok(list
        .sites
        .into_iter()
        .map(|site| Site {
            id: site.id,
            name: site.name,
            slug: site.slug,
        })
        .collect())
}

fn deploys_from_body(body: &str) -> Result<Vec<DeployRecord>, DeployApiError> {
    let data: DeploysData = decode(body, "getDeploysBySite")?;
    let list = data
        .get_deploys_by_site
        .ok_or_else(|| DeployApiError::MissingData("getDeploysBySite".to_string()))?;

    list.deploys.into_iter().map(RawDeploy::into_record).collect()
}

impl FleekClient {
    /// Create a new Fleek client.
    pub fn new(config: FleekClientConfig) -> Result<Self, DeployApiError> {
        let mut headers = header::HeaderMap::new();
        let key = header::HeaderValue::from_str(&config.api_key).map_err(|_| {
            DeployApiError::Request {
                endpoint: config.api_url.clone(),
                message: "API key contains characters not allowed in a header".to_string(),
            }
        })?;
        headers.insert(header::AUTHORIZATION, key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DeployApiError::Request {
                endpoint: config.api_url.clone(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_url: config.api_url,
        })
    }

    /// POST a query and return the raw response body.
    fn request(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<String, DeployApiError> {
        let endpoint = format!("{} ({})", self.api_url, operation);
        let response = self
            .client
            .post(&self.api_url)
            .json(&serde_json::json!({
                "operationName": operation,
                "query": query,
                "variables": variables,
            }))
            .send()
            .map_err(|e| DeployApiError::Request {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| DeployApiError::Request {
            endpoint,
            message: format!("failed to read response: {}", e),
        })?;

        if !status.is_success() {
            return Err(DeployApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl DeployStatusApi for FleekClient {
    fn list_sites(&self, team_id: &str) -> Result<Vec<Site>, DeployApiError> {
        let body = self.request(
            "getSitesByTeam",
            SITES_QUERY,
            serde_json::json!({ "teamId": team_id }),
        )?;
        sites_from_body(&body)
    }

    fn list_deploys(&self, site_id: &str) -> Result<Vec<DeployRecord>, DeployApiError> {
        let body = self.request(
            "getDeploysBySite",
            DEPLOYS_QUERY,
            serde_json::json!({ "siteId": site_id }),
        )?;
        deploys_from_body(&body)
    }
}
