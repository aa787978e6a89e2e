//! Logical request execution over an `HttpTransport`

use std::sync::Arc;

use serde_json::Value;

use super::{ApiRequest, HttpTransport, Method};
use crate::error::{mapping, ErrorContext, Result, SyncError};
use crate::resilience::{RetryConfig, RetryExecutor};
use crate::util::{generate_request_id, measure_time_async};

/// Client for the incident service. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    retry: RetryExecutor,
}

impl ApiClient {
    /// Create a client over any transport
    pub fn new(transport: Arc<dyn HttpTransport>, retry_config: RetryConfig) -> Self {
        Self {
            transport,
            retry: RetryExecutor::new(retry_config),
        }
    }

    /// Retry configuration in use
    pub fn retry_config(&self) -> &RetryConfig {
        self.retry.config()
    }

    /// Issue one logical request and return the parsed JSON body.
    ///
    /// Network failures and 5xx responses are retried; 4xx responses fail
    /// immediately. An empty success body parses as `null`.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            body,
        };
        let request_id = generate_request_id();
        let mut attempt = 0u32;

        self.retry
            .execute(|| {
                attempt += 1;
                self.attempt(&request, &request_id, attempt)
            })
            .await
    }

    /// GET and return the parsed body
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::Get, path, None).await
    }

    /// PUT a JSON body and return the parsed response
    pub async fn put(&self, path: &str, body: Value) -> Result<Value> {
        self.request(Method::Put, path, Some(body)).await
    }

    async fn attempt(&self, request: &ApiRequest, request_id: &str, attempt: u32) -> Result<Value> {
        let context = || {
            ErrorContext::for_request(request.method.as_str(), format!("/{}", request.path))
                .request_id(request_id)
                .with("attempt", attempt)
        };

        log::debug!(
            "{} /{} (request {}, attempt {})",
            request.method,
            request.path,
            request_id,
            attempt
        );

        let (result, elapsed) = measure_time_async(|| self.transport.send(request)).await;
        let response = result.map_err(|err| err.with_context(context()))?;

        log::debug!(
            "{} /{} -> {} in {:.1}ms",
            request.method,
            request.path,
            response.status,
            elapsed.as_secs_f64() * 1000.0
        );

        if !response.is_success() {
            let error = mapping::map_http_error(response.status, &response.body);
            return Err(error.with_context(context().status_code(response.status)));
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response.body).map_err(|e| {
            SyncError::decode(format!("Failed to parse response: {}", e))
                .with_context(context().status_code(response.status))
        })
    }
}
