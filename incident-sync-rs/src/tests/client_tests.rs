//! Tests for the API client and its builder
//!
//! These tests use an in-memory transport that records every attempt.

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::config::SyncConfig;
    use crate::core::{ApiClient, ApiRequest, ApiResponse, ClientBuilder, HttpTransport, Method};
    use crate::error::{Result, SyncError};
    use crate::resilience::RetryConfig;

    /// Plays back scripted results and records the requests it saw
    #[derive(Default)]
    struct RecordingTransport {
        script: Mutex<VecDeque<Result<ApiResponse>>>,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl RecordingTransport {
        fn scripted(script: Vec<Result<ApiResponse>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<ApiRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
            self.seen.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ApiResponse::new(200, "")))
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            initial_interval: Duration::from_millis(1),
            ..RetryConfig::default()
        }
    }

    #[tokio::test]
    async fn test_get_parses_json_body() {
        let transport = RecordingTransport::scripted(vec![Ok(ApiResponse::new(
            200,
            r#"{"incidents":[]}"#,
        ))]);
        let client = ApiClient::new(transport.clone(), fast_retry());

        let body = client.get("").await.unwrap();

        assert_eq!(body, json!({ "incidents": [] }));
        assert_eq!(transport.seen(), vec![ApiRequest::get("")]);
    }

    #[tokio::test]
    async fn test_put_sends_body() {
        let transport = RecordingTransport::scripted(vec![Ok(ApiResponse::new(
            200,
            r#"{"id":"INC-1","status":"Resolved"}"#,
        ))]);
        let client = ApiClient::new(transport.clone(), fast_retry());

        let body = client
            .put("INC-1", json!({ "status": "Resolved" }))
            .await
            .unwrap();

        assert_eq!(body["status"], "Resolved");
        let seen = transport.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, Method::Put);
        assert_eq!(seen[0].path, "INC-1");
        assert_eq!(seen[0].body, Some(json!({ "status": "Resolved" })));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let transport = RecordingTransport::scripted(vec![Ok(ApiResponse::new(204, ""))]);
        let client = ApiClient::new(transport, fast_retry());

        assert_eq!(client.put("INC-1", json!({})).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_decode_error() {
        let transport = RecordingTransport::scripted(vec![Ok(ApiResponse::new(200, "<html>"))]);
        let client = ApiClient::new(transport.clone(), fast_retry());

        let err = client.get("").await.unwrap_err();

        assert!(matches!(err.root(), SyncError::Decode(_)));
        assert!(!err.is_retryable());
        assert_eq!(transport.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_error_message_comes_from_body() {
        let transport = RecordingTransport::scripted(vec![
            Ok(ApiResponse::new(422, r#"{"error":"title must not be empty"}"#)),
        ]);
        let client = ApiClient::new(transport, fast_retry());

        let err = client.put("INC-1", json!({ "title": "" })).await.unwrap_err();

        assert_eq!(err.to_string(), "HTTP 422: title must not be empty");
    }

    #[tokio::test]
    async fn test_final_attempt_carries_context() {
        let transport = RecordingTransport::scripted(vec![
            Ok(ApiResponse::new(500, "")),
            Err(SyncError::network("connection reset")),
            Ok(ApiResponse::new(503, "")),
            Ok(ApiResponse::new(500, "")),
        ]);
        let client = ApiClient::new(transport.clone(), fast_retry());

        let err = client.get("INC-1").await.unwrap_err();

        assert_eq!(transport.seen().len(), 4);
        let context = err.context().unwrap();
        assert_eq!(context.status_code, Some(500));
        assert!(context.request_id.is_some());
        assert_eq!(err.to_string(), "HTTP 500: server response");
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let transport = RecordingTransport::scripted(vec![
            Ok(ApiResponse::new(502, "Bad Gateway")),
            Ok(ApiResponse::new(200, r#"{"id":"INC-1"}"#)),
        ]);
        let client = ApiClient::new(transport.clone(), fast_retry());

        let body = client.get("INC-1").await.unwrap();

        assert_eq!(body["id"], "INC-1");
        assert_eq!(transport.seen().len(), 2);
    }

    #[test]
    fn test_builder_requires_base_url() {
        let err = ClientBuilder::new().build().err().unwrap();
        assert!(matches!(err, SyncError::Configuration(_)));
    }

    #[test]
    fn test_builder_from_config() {
        let config = SyncConfig {
            max_retries: 5,
            initial_backoff_ms: 250,
            ..SyncConfig::default()
        };

        let client = ClientBuilder::from_config(&config).build().unwrap();

        assert_eq!(client.retry_config().max_retries, 5);
        assert_eq!(client.retry_config().initial_interval, Duration::from_millis(250));
        assert_eq!(client.retry_config().multiplier, 2.0);
    }

    #[test]
    fn test_builder_rejects_bad_header() {
        let result = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .header("bad header", "value")
            .build();

        assert!(matches!(result, Err(SyncError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_builder_uses_custom_transport() {
        let transport = RecordingTransport::scripted(vec![Ok(ApiResponse::new(200, "[]"))]);
        let client = crate::client()
            .retry_config(RetryConfig::no_retry())
            .transport(transport.clone())
            .build()
            .unwrap();

        assert_eq!(client.get("").await.unwrap(), json!([]));
        assert_eq!(transport.seen().len(), 1);
    }
}
