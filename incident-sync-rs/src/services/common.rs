//! Shared HTTP plumbing for service clients

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use url::Url;

use crate::core::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::error::{Result, SyncError};

/// UserAgent structure for identifying the client to the incident service
#[derive(Debug, Clone)]
pub struct UserAgent {
    /// Application name
    pub app_name: String,

    /// Version string
    pub version: String,

    /// Optional extra info
    pub extra: Option<String>,
}

impl Default for UserAgent {
    fn default() -> Self {
        Self {
            app_name: "incident-sync".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            extra: None,
        }
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_name, self.version)?;

        if let Some(ref extra) = self.extra {
            write!(f, " ({})", extra)?;
        }

        Ok(())
    }
}

/// Build a standard HTTP client: JSON headers, user agent and timeout
pub fn build_http_client(
    user_agent: Option<UserAgent>,
    timeout: Option<Duration>,
    extra_headers: &[(String, String)],
) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );

    let ua = user_agent.unwrap_or_default().to_string();
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_str(&ua)
            .map_err(|e| SyncError::configuration(format!("Invalid user agent: {}", e)))?,
    );

    for (name, value) in extra_headers {
        let name = header::HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SyncError::configuration(format!("Invalid header name: {}", e)))?;
        let value = header::HeaderValue::from_str(value)
            .map_err(|e| SyncError::configuration(format!("Invalid header value: {}", e)))?;
        headers.insert(name, value);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout.unwrap_or_else(|| Duration::from_secs(30)))
        .gzip(true)
        .build()
        .map_err(|e| SyncError::configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Join a base URL and a single relative path segment.
///
/// An empty path addresses the base itself; otherwise the segment is
/// percent-encoded and appended.
pub fn join_url(base_url: &str, path: &str) -> Result<String> {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return Ok(base_url.trim_end_matches('/').to_string());
    }

    let mut url = Url::parse(base_url)
        .map_err(|e| SyncError::configuration(format!("Invalid base URL {}: {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| SyncError::configuration(format!("Base URL cannot have a path: {}", base_url)))?
        .pop_if_empty()
        .push(path);

    Ok(url.to_string())
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = join_url(&self.base_url, &request.path)?;

        let mut builder = match request.method {
            Method::Get => self.http_client.get(&url),
            Method::Put => self.http_client.put(&url),
        };
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        // Builder errors (bad URL) come back as Configuration and are not retried
        let response = builder.send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ApiResponse::new(status, body))
    }
}
