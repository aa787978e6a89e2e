//! The incident store
//!
//! Owns the in-memory collection and applies the optimistic update protocol:
//! an edit is merged and written locally before the request goes out, and the
//! server's answer only decides whether an error is reported (and, under
//! `UpdatePolicy::RevertOnFailure`, whether the edit is rolled back).
//!
//! All store operations take `&self`. The state lock is never held across
//! an await, so overlapping calls interleave at their network suspension
//! points. Every write bumps a per-entry revision; a rollback only happens
//! if the entry still carries the revision the failed update wrote.

pub mod content;
pub mod views;

pub use content::ContentStore;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use crate::config::{FetchFailurePolicy, SyncConfig, UpdatePolicy};
use crate::error::{Result, SyncError};
use crate::mapper;
use crate::models::{next_timestamp, Incident, IncidentPatch, Severity};
use crate::services::IncidentApi;

/// Failure handling for store operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub update_policy: UpdatePolicy,
    pub fetch_failure_policy: FetchFailurePolicy,
}

impl From<&SyncConfig> for StoreOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            update_policy: config.update_policy,
            fetch_failure_policy: config.fetch_failure_policy,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    incident: Incident,
    revision: u64,
}

#[derive(Debug, Default)]
struct StoreState {
    incidents: IndexMap<String, Entry>,
    last_revision: u64,
    loads_in_flight: usize,
    updates_in_flight: usize,
    error: Option<String>,
}

impl StoreState {
    fn next_revision(&mut self) -> u64 {
        self.last_revision += 1;
        self.last_revision
    }

    fn entry(&mut self, incident: Incident) -> Entry {
        Entry {
            incident,
            revision: self.next_revision(),
        }
    }

    fn incidents(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.values().map(|entry| &entry.incident)
    }
}

type Counter = fn(&mut StoreState) -> &mut usize;

/// Decrements an in-flight counter on every exit path, including a dropped future
struct InFlight<'a> {
    state: &'a RwLock<StoreState>,
    counter: Counter,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let count = (self.counter)(&mut *state);
        *count = count.saturating_sub(1);
    }
}

/// Authoritative in-memory incident collection
pub struct IncidentStore {
    api: Arc<dyn IncidentApi>,
    options: StoreOptions,
    state: RwLock<StoreState>,
}

impl IncidentStore {
    /// Create an empty store over the given API
    pub fn new(api: Arc<dyn IncidentApi>, options: StoreOptions) -> Self {
        Self {
            api,
            options,
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, counter: Counter) -> InFlight<'_> {
        let mut state = self.write();
        *counter(&mut *state) += 1;
        drop(state);
        InFlight {
            state: &self.state,
            counter,
        }
    }

    fn fail(&self, err: SyncError) -> SyncError {
        self.write().error = Some(err.to_string());
        err
    }

    /// Replace the collection with the server's current set.
    ///
    /// On failure the error message is recorded and the collection is
    /// cleared or retained according to `FetchFailurePolicy`.
    pub async fn fetch_incidents(&self) -> Result<()> {
        let _loading = self.begin(|s| &mut s.loads_in_flight);
        self.write().error = None;

        let result = match self.api.list_incidents().await {
            Ok(dtos) => mapper::to_records(&dtos),
            Err(err) => Err(err),
        };

        let mut state = self.write();
        match result {
            Ok(records) => {
                let mut incidents = IndexMap::with_capacity(records.len());
                for incident in records {
                    let entry = state.entry(incident);
                    if let Some(previous) = incidents.insert(entry.incident.id.clone(), entry) {
                        log::warn!("Server returned incident {} more than once", previous.incident.id);
                    }
                }
                log::info!("Loaded {} incidents", incidents.len());
                state.incidents = incidents;
                state.error = None;
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to fetch incidents: {}", err);
                if self.options.fetch_failure_policy == FetchFailurePolicy::Clear {
                    state.incidents.clear();
                }
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Re-read one incident from the server and replace (or append) its entry
    pub async fn reload_incident(&self, id: &str) -> Result<()> {
        let _loading = self.begin(|s| &mut s.loads_in_flight);

        let result = match self.api.get_incident(id).await {
            Ok(dto) => mapper::to_record(&dto),
            Err(err) => Err(err),
        };

        match result {
            Ok(incident) => {
                let mut state = self.write();
                let entry = state.entry(incident);
                state.incidents.insert(entry.incident.id.clone(), entry);
                Ok(())
            }
            Err(err) => {
                log::warn!("Failed to reload incident {}: {}", id, err);
                Err(self.fail(err))
            }
        }
    }

    /// Apply `patch` to incident `id` optimistically, then send it.
    ///
    /// The merged record, with a fresh `updated_at`, is visible to readers
    /// before the request is sent. If the server call fails the error is
    /// recorded and returned; the local edit stays unless the store uses
    /// `UpdatePolicy::RevertOnFailure`. An unknown id or a patch that would
    /// split the assignee pair fails without contacting the server.
    pub async fn update_incident(&self, id: &str, patch: IncidentPatch) -> Result<()> {
        let _pending = self.begin(|s| &mut s.updates_in_flight);

        let (snapshot, revision, wire) = {
            let mut state = self.write();

            let existing = state.incidents.get(id).map(|entry| entry.incident.clone());
            let snapshot = match existing {
                Some(snapshot) => snapshot,
                None => {
                    drop(state);
                    return Err(self.fail(SyncError::not_found(format!("Incident {} not found", id))));
                }
            };

            let mut updated = match patch.apply_to(&snapshot) {
                Ok(updated) => updated,
                Err(err) => {
                    drop(state);
                    return Err(self.fail(err));
                }
            };
            updated.updated_at = next_timestamp(snapshot.updated_at);

            let wire = mapper::to_wire_partial(&patch.coalesced(&updated));
            let entry = state.entry(updated);
            let revision = entry.revision;
            state.incidents.insert(id.to_string(), entry);

            (snapshot, revision, wire)
        };

        match self.api.update_incident(id, &wire).await {
            Ok(_) => Ok(()),
            Err(err) => {
                log::warn!("Update of incident {} failed: {}", id, err);
                let mut state = self.write();
                state.error = Some(err.to_string());

                if self.options.update_policy == UpdatePolicy::RevertOnFailure {
                    let untouched = state
                        .incidents
                        .get(id)
                        .filter(|entry| entry.revision == revision)
                        .map(|entry| entry.incident.updated_at);
                    if let Some(touched_at) = untouched {
                        // content goes back, the timestamp keeps moving forward
                        let mut reverted = snapshot;
                        reverted.updated_at = next_timestamp(touched_at);
                        let entry = state.entry(reverted);
                        state.incidents.insert(id.to_string(), entry);
                    } else {
                        log::warn!(
                            "Incident {} changed after the failed update; keeping the newer edit",
                            id
                        );
                    }
                }

                Err(err)
            }
        }
    }

    /// Snapshot of the collection in insertion order
    pub fn incidents(&self) -> Vec<Incident> {
        self.read().incidents().cloned().collect()
    }

    /// Look up one incident by id
    pub fn incident(&self, id: &str) -> Option<Incident> {
        self.read().incidents.get(id).map(|entry| entry.incident.clone())
    }

    pub fn len(&self) -> usize {
        self.read().incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().incidents.is_empty()
    }

    /// True while a fetch or reload is running
    pub fn loading(&self) -> bool {
        self.read().loads_in_flight > 0
    }

    /// Number of updates waiting on the server
    pub fn pending_updates(&self) -> usize {
        self.read().updates_in_flight
    }

    /// Message of the most recent failure, if not cleared since
    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// Incidents sorted newest first
    pub fn sorted_incidents(&self) -> Vec<Incident> {
        views::sorted_by_recency(self.read().incidents())
    }

    /// Number of critical incidents
    pub fn critical_count(&self) -> usize {
        views::critical_count(self.read().incidents())
    }

    /// Number of incidents per severity
    pub fn severity_counts(&self) -> BTreeMap<Severity, usize> {
        views::severity_counts(self.read().incidents())
    }

    /// Replace the collection without contacting the server
    pub fn seed(&self, incidents: Vec<Incident>) {
        let mut state = self.write();
        let mut seeded = IndexMap::with_capacity(incidents.len());
        for incident in incidents {
            let entry = state.entry(incident);
            seeded.insert(entry.incident.id.clone(), entry);
        }
        state.incidents = seeded;
    }
}
