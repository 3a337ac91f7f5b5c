//! API access for the list screen.
//!
//! [`ListBackend`] is the seam the screen talks through; [`HttpBackend`] is
//! the reqwest implementation used by the binary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use warden_core::bulk::{BulkAction, BulkRequest};
use warden_core::capability::Capabilities;
use warden_core::list_query::{codec, FilterState, PageResult};
use warden_core::types::{DbId, RecordId, Timestamp};

use crate::config::ConsoleConfig;
use crate::error::ConsoleError;

/// Path of the users data table; pagination links point here.
pub const USERS_PATH: &str = "/api/v1/admin/users";

/// One row of the users table as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub email_verified_at: Option<Timestamp>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserRow {
    pub fn record_id(&self) -> RecordId {
        RecordId::from(self.id)
    }
}

/// The acting user and what they may do.
#[derive(Debug, Clone, Deserialize)]
pub struct Viewer {
    pub user: UserRow,
    pub capabilities: Capabilities,
}

/// Server report for a completed bulk action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkReport {
    pub action: BulkAction,
    pub affected: u64,
    pub skipped_self: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct BulkBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<BulkAction>,
    ids: Vec<&'a RecordId>,
}

/// Where the list screen gets pages from and sends bulk actions to.
#[async_trait]
pub trait ListBackend: Send + Sync {
    /// Fetch the page `state` describes.
    async fn fetch_page(&self, state: &FilterState) -> Result<PageResult<UserRow>, ConsoleError>;

    /// Apply a prepared bulk action.
    async fn bulk(&self, request: &BulkRequest) -> Result<BulkReport, ConsoleError>;
}

/// [`ListBackend`] over the HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    config: ConsoleConfig,
}

impl HttpBackend {
    pub fn new(config: ConsoleConfig) -> Result<Self, ConsoleError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| ConsoleError::Config("WARDEN_TOKEN contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// `GET /api/v1/me`.
    pub async fn me(&self) -> Result<Viewer, ConsoleError> {
        let response = self.client.get(self.config.endpoint("/api/v1/me")).send().await?;
        let envelope: DataEnvelope<Viewer> = parse_response(response).await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl ListBackend for HttpBackend {
    async fn fetch_page(&self, state: &FilterState) -> Result<PageResult<UserRow>, ConsoleError> {
        let url = format!("{}?{}", self.config.endpoint(USERS_PATH), codec::encode(state));
        tracing::debug!(%url, "Fetching users page");
        let response = self.client.get(url).send().await?;
        parse_response(response).await
    }

    async fn bulk(&self, request: &BulkRequest) -> Result<BulkReport, ConsoleError> {
        let (path, action) = match request.action {
            BulkAction::Delete => ("/bulk-delete", None),
            other => ("/bulk-action", Some(other)),
        };
        let body = BulkBody {
            action,
            ids: request.ids.iter().collect(),
        };
        let url = self.config.endpoint(&format!("{USERS_PATH}{path}"));
        tracing::debug!(%url, action = %request.action, count = request.ids.len(), "Sending bulk action");

        let response = self.client.post(url).json(&body).send().await?;
        let envelope: DataEnvelope<BulkReport> = parse_response(response).await?;
        Ok(envelope.data)
    }
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ConsoleError> {
    let status = response.status();
    let text = response.text().await?;
    if status.is_success() {
        Ok(serde_json::from_str(&text)?)
    } else {
        Err(ConsoleError::from_body(status.as_u16(), &text))
    }
}
