//! Low-level Notion HTTP client
//!
//! Owns auth-header injection, endpoint shaping, and response parsing.
//! Never retries; callers decide whether a failed call is worth repeating.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::NotionConfig;
use crate::error::SyncError;

/// Transport seam for everything that talks to the remote service
///
/// A successful call yields the parsed JSON body, or `None` when the body
/// was not valid JSON (a parse failure is a null payload, not a fault).
#[allow(async_fn_in_trait)]
pub trait RemoteTransport {
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, SyncError>;
}

impl<T: RemoteTransport + ?Sized> RemoteTransport for &T {
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, SyncError> {
        (**self).call(method, path, body).await
    }
}

/// HTTP client for the Notion API
pub struct RemoteClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
    api_version: String,
}

impl RemoteClient {
    /// Create a client from connection settings
    ///
    /// Fails fast when the service token is absent rather than producing
    /// a client that can only ever yield 401s.
    pub fn new(config: &NotionConfig) -> Result<Self, SyncError> {
        if config.token.trim().is_empty() {
            return Err(SyncError::Validation(
                "Notion token is not configured".to_string(),
            ));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            token: config.token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        })
    }
}

impl RemoteTransport for RemoteClient {
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, SyncError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("notion call: {} {}", method, path);

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.api_version);

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Read the full body as text first so non-JSON error bodies
        // cannot crash the caller.
        let text = response.text().await?;

        if !status.is_success() {
            warn!("notion call failed: {} {} -> {}", url, status, text);
            return Err(SyncError::from_response(status.as_u16(), &text));
        }

        Ok(serde_json::from_str(&text).ok())
    }
}

/// Normalize a Notion database id into its canonical hyphenated form
///
/// Strips dashes; a bare 32-hex-char id gets the canonical 8-4-4-4-12
/// grouping re-inserted. Anything else passes through unchanged, so both
/// hyphenated and bare inputs are accepted. Idempotent.
pub fn format_database_id(id: &str) -> String {
    let stripped: String = id.chars().filter(|c| *c != '-').collect();

    if stripped.len() == 32 && stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        format!(
            "{}-{}-{}-{}-{}",
            &stripped[0..8],
            &stripped[8..12],
            &stripped[12..16],
            &stripped[16..20],
            &stripped[20..32]
        )
    } else {
        id.to_string()
    }
}
