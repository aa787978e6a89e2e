//! Static UI content source

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Supplier of UI strings keyed by a dotted name
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_content(&self) -> Result<HashMap<String, String>>;
}

/// Built-in strings, returned after a simulated delay
#[derive(Debug, Clone)]
pub struct StaticContentSource {
    latency: Duration,
}

impl Default for StaticContentSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl StaticContentSource {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    async fn fetch_content(&self) -> Result<HashMap<String, String>> {
        tokio::time::sleep(self.latency).await;

        let entries = [
            ("incident_list.header", "Incident Inbox"),
            (
                "incident_list.welcome_message",
                "Manage and track system anomalies across all services.",
            ),
            (
                "global.maintenance_banner",
                "⚠️ Scheduled Maintenance: The API gateway will be restarted tonight at 02:00 UTC.",
            ),
        ];

        Ok(entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect())
    }
}
