//! Incident service client
//!
//! Endpoints, relative to the configured base URL:
//! - `GET <base>` returns `{ "incidents": [...] }`
//! - `GET <base>/{id}` returns one wire record
//! - `PUT <base>/{id}` takes a partial wire record and echoes the result

use async_trait::async_trait;
use serde_json::Value;

use crate::config::SyncConfig;
use crate::core::{ApiClient, ClientBuilder};
use crate::error::{Result, SyncError};
use crate::models::{IncidentDto, IncidentDtoPatch, IncidentListDto};

/// Remote operations the store depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncidentApi: Send + Sync {
    /// Fetch every incident the server holds
    async fn list_incidents(&self) -> Result<Vec<IncidentDto>>;

    /// Fetch a single incident
    async fn get_incident(&self, id: &str) -> Result<IncidentDto>;

    /// Send a partial update. The response body is returned undecoded.
    async fn update_incident(&self, id: &str, patch: &IncidentDtoPatch) -> Result<Value>;
}

/// `ApiClient`-backed implementation of `IncidentApi`
#[derive(Clone)]
pub struct IncidentService {
    client: ApiClient,
}

impl IncidentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Build a service talking to the configured endpoint
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        Ok(Self::new(ClientBuilder::from_config(config).build()?))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl IncidentApi for IncidentService {
    async fn list_incidents(&self) -> Result<Vec<IncidentDto>> {
        let body = self.client.get("").await?;
        let list: IncidentListDto = serde_json::from_value(body)
            .map_err(|e| SyncError::decode(format!("Malformed incident list: {}", e)))?;
        Ok(list.incidents)
    }

    async fn get_incident(&self, id: &str) -> Result<IncidentDto> {
        let body = self.client.get(id).await.map_err(|err| {
            if err.is_not_found() {
                SyncError::not_found(format!("Incident {} not found on server", id))
            } else {
                err
            }
        })?;
        serde_json::from_value(body)
            .map_err(|e| SyncError::decode(format!("Malformed incident {}: {}", id, e)))
    }

    async fn update_incident(&self, id: &str, patch: &IncidentDtoPatch) -> Result<Value> {
        let body = serde_json::to_value(patch)
            .map_err(|e| SyncError::serialization(format!("Failed to encode update: {}", e)))?;
        self.client.put(id, body).await
    }
}
