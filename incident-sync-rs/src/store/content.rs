//! Cached UI strings
//!
//! The first successful non-empty fetch is cached for the life of the store.
//! An empty or failed fetch leaves the cache empty, so the next call tries
//! again.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::services::ContentSource;

/// Message recorded when the content source fails
pub const CONTENT_LOAD_ERROR: &str = "Failed to load content";

#[derive(Debug, Default)]
struct ContentState {
    content: HashMap<String, String>,
    loads_in_flight: usize,
    error: Option<String>,
}

/// Key/value UI content with a fallback lookup
pub struct ContentStore {
    source: Arc<dyn ContentSource>,
    state: RwLock<ContentState>,
}

struct Loading<'a>(&'a RwLock<ContentState>);

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        let mut state = self.0.write().unwrap_or_else(PoisonError::into_inner);
        state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
    }
}

impl ContentStore {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            state: RwLock::new(ContentState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ContentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the content unless a non-empty set is already cached
    pub async fn fetch_content(&self) -> Result<()> {
        {
            let mut state = self.write();
            if !state.content.is_empty() {
                log::debug!("Content already cached, skipping fetch");
                return Ok(());
            }
            state.loads_in_flight += 1;
            state.error = None;
        }
        let _loading = Loading(&self.state);

        match self.source.fetch_content().await {
            Ok(content) => {
                log::info!("Loaded {} content entries", content.len());
                self.write().content = content;
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to load content: {}", err);
                self.write().error = Some(CONTENT_LOAD_ERROR.to_string());
                Err(err)
            }
        }
    }

    /// Look up `key`. Falls back to a non-empty `default`, then to the key itself.
    pub fn get(&self, key: &str, default: Option<&str>) -> String {
        let state = self.read();
        match state.content.get(key) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => match default {
                Some(default) if !default.is_empty() => default.to_string(),
                _ => key.to_string(),
            },
        }
    }

    /// Snapshot of the cached content
    pub fn content(&self) -> HashMap<String, String> {
        self.read().content.clone()
    }

    pub fn loading(&self) -> bool {
        self.read().loads_in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }
}
