//! Error handling for the incident sync engine
//!
//! This module provides the error system shared by every layer:
//! - Categorizes errors by origin (network, HTTP status, decoding, lookup)
//! - Adds request context (method, endpoint, request id) for debugging
//! - Classifies which failures the transport may retry
//! - Provides a convenient Result type alias

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub mod mapping;

/// Result type for incident sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Main error type for the incident sync engine
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// No response was received (connection refused, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// A response was received with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A wire record could not be decoded into the domain model
    #[error("Decode error: {0}")]
    Decode(String),

    /// The requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A change would break a record invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A request body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors with additional context
    #[error("{inner}")]
    WithContext {
        inner: Box<SyncError>,
        context: ErrorContext,
    },
}

impl SyncError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        SyncError::Network(message.into())
    }

    /// Create an HTTP status error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        SyncError::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        SyncError::Decode(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        SyncError::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        SyncError::Validation(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        SyncError::Configuration(message.into())
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        SyncError::Serialization(message.into())
    }

    /// Add context to an existing error
    pub fn with_context(self, context: ErrorContext) -> Self {
        SyncError::WithContext {
            inner: Box::new(self),
            context,
        }
    }

    /// The error without any context wrappers
    pub fn root(&self) -> &SyncError {
        match self {
            SyncError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Get the context if this error carries one
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            SyncError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the HTTP status code if a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SyncError::Http { status, .. } => Some(*status),
            SyncError::WithContext { inner, context } => {
                inner.status_code().or(context.status_code)
            }
            _ => None,
        }
    }

    /// Check if the transport may retry after this error.
    ///
    /// Only a missing response or a server-side status (>= 500) qualifies.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Network(_) => true,
            SyncError::Http { status, .. } => mapping::is_retryable_status(*status),
            SyncError::WithContext { inner, .. } => inner.is_retryable(),
            _ => false,
        }
    }

    /// Check if this error reports a missing record
    pub fn is_not_found(&self) -> bool {
        match self.root() {
            SyncError::NotFound(_) => true,
            SyncError::Http { status, .. } => *status == 404,
            _ => false,
        }
    }
}

/// Error context information
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    /// HTTP method of the failing request
    pub method: Option<String>,

    /// Endpoint that was called
    pub endpoint: Option<String>,

    /// HTTP status code if applicable
    pub status_code: Option<u16>,

    /// Request ID shared by all attempts of one logical request
    pub request_id: Option<String>,

    /// Additional context data
    pub data: HashMap<String, String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a request
    pub fn for_request(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Add an HTTP status code
    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Add a request ID
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Add a context value
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.data.insert(key.into(), value.to_string());
    }

    /// Add a context value and return self (builder pattern)
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.add(key, value);
        self
    }
}

/// Convert reqwest errors to SyncError
impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            SyncError::http(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            SyncError::decode(format!("Response decode error: {}", err))
        } else if err.is_builder() {
            SyncError::configuration(format!("Invalid request: {}", err))
        } else if err.is_timeout() {
            SyncError::network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            SyncError::network(format!("Connection error: {}", err))
        } else {
            SyncError::network(format!("HTTP client error: {}", err))
        }
    }
}

/// Convert serde_json errors to SyncError
impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            SyncError::decode(format!("JSON error: {}", err))
        } else {
            SyncError::serialization(format!("JSON error: {}", err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(SyncError::network("refused").is_retryable());
        assert!(SyncError::http(500, "boom").is_retryable());
        assert!(SyncError::http(503, "unavailable").is_retryable());
        assert!(!SyncError::http(404, "missing").is_retryable());
        assert!(!SyncError::http(429, "slow down").is_retryable());
        assert!(!SyncError::decode("bad").is_retryable());
    }

    #[test]
    fn test_context_is_transparent() {
        let err = SyncError::http(502, "bad gateway")
            .with_context(ErrorContext::for_request("GET", "/").request_id("req-1"));

        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.context().and_then(|c| c.request_id.as_deref()), Some("req-1"));
    }
}
