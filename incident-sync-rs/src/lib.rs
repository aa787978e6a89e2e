//! # Incident Sync
//!
//! Client-side synchronization engine for remotely managed incident records.
//!
//! This crate provides:
//!
//! - A transport client with bounded exponential-backoff retry
//! - A mapper between the service's wire records and domain records
//! - An incident store applying edits optimistically and reconciling them
//!   with the server
//! - Derived views (recency ordering, critical count) over the store
//! - A cached UI content store
//!
//! ## Architecture
//!
//! - `HttpTransport`: sends one request attempt (reqwest in production)
//! - `ApiClient`: one logical request, with retry and error mapping
//! - `IncidentApi`: the incident endpoints, mockable for tests
//! - `IncidentStore`: the authoritative in-memory collection
//! - `SyncError`: the error type shared by every layer

// Re-export core modules
pub mod core;
pub use self::core::{ApiClient, ApiRequest, ApiResponse, ClientBuilder, HttpTransport, Method};

// Re-export error handling
pub mod error;
pub use error::{ErrorContext, Result, SyncError};

// Re-export resilience patterns
pub mod resilience;
pub use resilience::{RetryConfig, RetryExecutor};

// Re-export configuration management
pub mod config;
pub use config::{ConfigProvider, FetchFailurePolicy, SyncConfig, UpdatePolicy};

pub mod mapper;

pub mod models;
pub use models::{Assignee, Incident, IncidentPatch, Severity, Status};

pub mod services;
pub use services::{ContentSource, IncidentApi, IncidentService, StaticContentSource};

pub mod store;
pub use store::{ContentStore, IncidentStore, StoreOptions};

// Utility module for common functionality
mod util;

#[cfg(test)]
mod tests;

use std::sync::Arc;

/// Create a new default client builder
pub fn client() -> ClientBuilder {
    ClientBuilder::new()
}

/// Create an incident store talking to the configured service
pub fn incident_store(config: &SyncConfig) -> Result<IncidentStore> {
    let service = IncidentService::from_config(config)?;
    Ok(IncidentStore::new(Arc::new(service), StoreOptions::from(config)))
}

/// Create a content store over the built-in UI strings
pub fn content_store(config: &SyncConfig) -> ContentStore {
    ContentStore::new(Arc::new(StaticContentSource::new(config.content_latency())))
}
