//! HTTP remote store
//!
//! Talks to a workspace API over HTTPS:
//!
//! - `GET  {api_url}/workspace/{id}` returns the document (404 when absent)
//! - `PUT  {api_url}/workspace/{id}` replaces it; the `X-Base-Revision`
//!   header carries the revision the upload was based on
//!
//! Every request is signed (see [`super::auth`]).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use tracing::debug;

use super::auth::{Credentials, AUTHORIZATION_HEADER, CONTENT_HASH_HEADER, NONCE_HEADER};
use super::error::SyncError;
use super::remote::RemoteStore;
use crate::config::Config;

/// Header carrying the optimistic-lock revision on uploads
pub const BASE_REVISION_HEADER: &str = "X-Base-Revision";

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

const USER_AGENT_VALUE: &str = concat!("archsync/", env!("CARGO_PKG_VERSION"));

/// Remote store reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    api_url: String,
}

impl HttpRemoteStore {
    /// Create a store for the given API base URL
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| SyncError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a store from the application configuration
    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        Self::new(&config.api_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// URL of a workspace; the id always occupies exactly one path segment
    fn workspace_url(&self, workspace_id: &str) -> Result<Url, SyncError> {
        // Dot segments would be dropped or resolved, addressing another resource
        if workspace_id.is_empty() || workspace_id == "." || workspace_id == ".." {
            return Err(SyncError::InvalidWorkspaceId(workspace_id.to_string()));
        }

        let mut url = Url::parse(&self.api_url).map_err(|e| {
            SyncError::Network(format!("Invalid API URL '{}': {}", self.api_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                SyncError::Network(format!("API URL '{}' cannot have a path", self.api_url))
            })?
            .pop_if_empty()
            .push("workspace")
            .push(workspace_id);
        Ok(url)
    }

    /// Build a signed request
    fn signed(
        &self,
        method: Method,
        url: Url,
        credentials: &Credentials,
        body: &[u8],
        content_type: &str,
    ) -> Result<RequestBuilder, SyncError> {
        let nonce = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let headers = credentials.sign(method.as_str(), url.path(), body, content_type, nonce)?;

        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION_HEADER, headers.authorization)
            .header(NONCE_HEADER, headers.nonce)
            .header(CONTENT_HASH_HEADER, headers.content_hash);
        if !content_type.is_empty() {
            request = request.header(CONTENT_TYPE, content_type);
        }
        Ok(request)
    }

    async fn send(request: RequestBuilder) -> Result<Response, SyncError> {
        request.send().await.map_err(network_error)
    }
}

fn network_error(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Network(format!("Request timed out: {}", err))
    } else {
        SyncError::Network(err.to_string())
    }
}

/// Map a non-success response to an error
async fn error_for_response(workspace_id: &str, response: Response) -> SyncError {
    let status = response.status();
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        _ => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Authentication(message),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => SyncError::Conflict(format!(
            "workspace {} was modified remotely: {}",
            workspace_id, message
        )),
        _ => SyncError::Remote {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get(
        &self,
        workspace_id: &str,
        credentials: &Credentials,
    ) -> Result<Option<String>, SyncError> {
        let url = self.workspace_url(workspace_id)?;
        debug!(url = %url, "Fetching workspace");

        let request = self.signed(Method::GET, url, credentials, b"", "")?;
        let response = Self::send(request).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response.text().await.map_err(network_error)?;
                Ok(Some(body))
            }
            _ => Err(error_for_response(workspace_id, response).await),
        }
    }

    async fn put(
        &self,
        workspace_id: &str,
        credentials: &Credentials,
        json: &str,
        base_revision: Option<u64>,
    ) -> Result<(), SyncError> {
        let url = self.workspace_url(workspace_id)?;
        debug!(url = %url, bytes = json.len(), ?base_revision, "Uploading workspace");

        let mut request = self.signed(
            Method::PUT,
            url,
            credentials,
            json.as_bytes(),
            JSON_CONTENT_TYPE,
        )?;
        if let Some(revision) = base_revision {
            request = request.header(BASE_REVISION_HEADER, revision.to_string());
        }

        let response = Self::send(request.body(json.to_string())).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_for_response(workspace_id, response).await)
        }
    }
}
