//! Core transport abstractions
//!
//! - `HttpTransport`: sends a single request attempt
//! - `ApiClient`: one logical request, with retry and error mapping
//! - `ClientBuilder`: builder pattern for creating clients

pub mod builder;
pub mod client;

pub use builder::ClientBuilder;
pub use client::ApiClient;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// HTTP methods used by the incident service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request, relative to the client's base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Empty for the base resource, otherwise a single path segment such as an id
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// A received response of any status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait responsible for sending one request attempt.
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status, and `SyncError::Network` when no response was received.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}
