//! HTTP client utilities for cloudls

use crate::core::ClientSettings;
use crate::paginator::ListError;
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

/// HTTP client wrapper bound to one service endpoint
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: Url,
    token: Option<String>,
    region: Option<String>,
}

impl HttpClient {
    /// Create a client from resolved settings
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let endpoint = Url::parse(&settings.endpoint)
            .with_context(|| format!("Invalid endpoint: {}", settings.endpoint))?;

        let client = Client::builder()
            .user_agent(format!("cloudls/{}", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            token: settings.token.clone(),
            region: settings.region.clone(),
        })
    }

    /// Build the URL for a path below the endpoint
    ///
    /// Segments are percent-encoded, so bucket names and keys may contain
    /// any character.
    pub fn url_for(
        &self,
        segments: &[String],
        query: &[(String, String)],
    ) -> Result<Url, ListError> {
        let mut url = self.endpoint.clone();

        url.path_segments_mut()
            .map_err(|_| {
                ListError::InvalidRequest(format!("endpoint {} cannot have a path", self.endpoint))
            })?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    /// Send a GET request and parse the JSON response
    pub async fn get_json(
        &self,
        segments: &[String],
        query: &[(String, String)],
    ) -> Result<Value, ListError> {
        let url = self.url_for(segments, query)?;
        log::debug!("GET {} (JSON)", url);

        let mut request = self.client.get(url.clone()).header("Accept", "application/json");

        // Add authorization header if token is available
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }
        if let Some(ref region) = self.region {
            request = request.header("x-region", region);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ListError::Transport(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(status, &body));
        }

        response.json::<Value>().await.map_err(|e| {
            ListError::Transport(format!("Failed to decode response from {}: {}", url, e))
        })
    }
}

/// Error body returned by the service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "Code", alias = "code")]
    code: Option<String>,
    #[serde(rename = "Message", alias = "message")]
    message: Option<String>,
}

/// Turn a non-success response into a [`ListError::Service`]
///
/// The service normally answers with `{"Code": ..., "Message": ...}`; when
/// the body is something else (a proxy's HTML page, plain text) the status
/// line stands in for the code and the trimmed body for the message.
pub fn service_error(status: StatusCode, body: &str) -> ListError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let reason = status.canonical_reason().unwrap_or("Unknown");

    let code = parsed
        .as_ref()
        .and_then(|b| b.code.clone())
        .unwrap_or_else(|| reason.replace(' ', ""));
    let message = parsed
        .and_then(|b| b.message)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| truncate(trimmed, 200))
        })
        .unwrap_or_else(|| reason.to_string());

    ListError::Service {
        status: status.as_u16(),
        code,
        message,
    }
}

/// Truncate string to max length
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
