//! Client builder implementation
//!
//! Provides a builder for assembling an `ApiClient` from configuration or
//! explicit settings.

use std::sync::Arc;
use std::time::Duration;

use super::{ApiClient, HttpTransport};
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::resilience::RetryConfig;
use crate::services::common::{build_http_client, ReqwestTransport, UserAgent};

/// Builder for the incident service client
pub struct ClientBuilder {
    /// Base URL for the service
    base_url: Option<String>,

    /// Custom headers to include with all requests
    custom_headers: Vec<(String, String)>,

    /// Per-attempt request timeout
    timeout: Option<Duration>,

    /// Retry configuration
    retry_config: Option<RetryConfig>,

    /// User agent
    user_agent: Option<UserAgent>,

    /// Transport override, mainly for tests
    transport: Option<Arc<dyn HttpTransport>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            custom_headers: Vec::new(),
            timeout: Some(Duration::from_secs(30)),
            retry_config: Some(RetryConfig::default()),
            user_agent: None,
            transport: None,
        }
    }
}

impl ClientBuilder {
    /// Create a new client builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new()
            .base_url(config.base_url.clone())
            .timeout(config.timeout())
            .retry_config(config.retry_config())
    }

    /// Set the base URL for the service
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Add a custom header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((key.into(), value.into()));
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configure retry behavior
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = Some(config);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: UserAgent) -> Self {
        self.user_agent = Some(user_agent);
        self
    }

    /// Use a custom transport instead of reqwest
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient> {
        let retry_config = self.retry_config.unwrap_or_default();

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let base_url = self
                    .base_url
                    .ok_or_else(|| SyncError::configuration("Base URL is required"))?;
                let http_client =
                    build_http_client(self.user_agent, self.timeout, &self.custom_headers)?;
                Arc::new(ReqwestTransport::new(http_client, base_url)) as Arc<dyn HttpTransport>
            }
        };

        Ok(ApiClient::new(transport, retry_config))
    }
}
