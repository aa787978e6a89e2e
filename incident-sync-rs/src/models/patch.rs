//! Sparse field changes for `update_incident`
//!
//! Every field is `None` when the caller did not touch it. The assignee
//! halves are `Option<Option<String>>`: `Some(None)` is an explicit null,
//! which is how an assignment is cleared.

use super::{Assignee, Incident, Severity, Status};
use crate::error::{Result, SyncError};

/// A set of explicitly provided field changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<Status>,
    pub assignee_id: Option<Option<String>>,
    pub assignee_name: Option<Option<String>>,
}

impl IncidentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Set both assignee halves
    pub fn assign(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.assignee_id = Some(Some(id.into()));
        self.assignee_name = Some(Some(name.into()));
        self
    }

    /// Clear the assignment
    pub fn unassign(mut self) -> Self {
        self.assignee_id = Some(None);
        self.assignee_name = Some(None);
        self
    }

    /// Change only the id half; `None` clears the assignment
    pub fn assignee_id(mut self, id: Option<String>) -> Self {
        self.assignee_id = Some(id);
        self
    }

    /// Change only the name half
    pub fn assignee_name(mut self, name: Option<String>) -> Self {
        self.assignee_name = Some(name);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn touches_assignee(&self) -> bool {
        self.assignee_id.is_some() || self.assignee_name.is_some()
    }

    /// Merge the provided fields over `incident`.
    ///
    /// Timestamps are left alone. An explicit null id clears the assignment
    /// regardless of the name; otherwise a missing half is taken from the
    /// current record, and a result with only one half is rejected.
    pub fn apply_to(&self, incident: &Incident) -> Result<Incident> {
        let mut merged = incident.clone();

        if let Some(ref title) = self.title {
            merged.title = title.clone();
        }
        if let Some(ref description) = self.description {
            merged.description = description.clone();
        }
        if let Some(severity) = self.severity {
            merged.severity = severity;
        }
        if let Some(status) = self.status {
            merged.status = status;
        }

        if self.touches_assignee() {
            merged.assignee = self.merged_assignee(incident)?;
        }

        Ok(merged)
    }

    fn merged_assignee(&self, incident: &Incident) -> Result<Option<Assignee>> {
        if let Some(None) = self.assignee_id {
            return Ok(None);
        }

        let id = match self.assignee_id {
            Some(ref id) => id.clone(),
            None => incident.assignee_id().map(str::to_string),
        };
        let name = match self.assignee_name {
            Some(ref name) => name.clone(),
            None => incident.assignee_name().map(str::to_string),
        };

        match (id, name) {
            (Some(id), Some(name)) => Ok(Some(Assignee { id, name })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(SyncError::validation(
                "assignee id provided without an assignee name",
            )),
            (None, Some(_)) => Err(SyncError::validation(
                "assignee name provided without an assignee id",
            )),
        }
    }

    /// Copy of this patch with both assignee halves taken from `merged`
    /// whenever either half was provided.
    pub fn coalesced(&self, merged: &Incident) -> IncidentPatch {
        let mut patch = self.clone();
        if self.touches_assignee() {
            patch.assignee_id = Some(merged.assignee_id().map(str::to_string));
            patch.assignee_name = Some(merged.assignee_name().map(str::to_string));
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn incident(assignee: Option<Assignee>) -> Incident {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        Incident {
            id: "INC-1".to_string(),
            title: "Login failures".to_string(),
            description: "Users cannot sign in".to_string(),
            severity: Severity::High,
            status: Status::Open,
            service_id: "svc-1".to_string(),
            service_name: "Auth Service".to_string(),
            created_at: at,
            updated_at: at,
            assignee,
        }
    }

    #[test]
    fn test_apply_merges_only_provided_fields() {
        let base = incident(None);
        let merged = IncidentPatch::new()
            .status(Status::Resolved)
            .apply_to(&base)
            .unwrap();

        assert_eq!(merged.status, Status::Resolved);
        assert_eq!(merged.title, base.title);
        assert_eq!(merged.severity, base.severity);
        assert_eq!(merged.updated_at, base.updated_at);
    }

    #[test]
    fn test_name_only_completes_from_record() {
        let base = incident(Some(Assignee::new("u1", "Ann")));
        let patch = IncidentPatch::new().assignee_name(Some("Ann B.".to_string()));
        let merged = patch.apply_to(&base).unwrap();

        assert_eq!(merged.assignee, Some(Assignee::new("u1", "Ann B.")));

        let coalesced = patch.coalesced(&merged);
        assert_eq!(coalesced.assignee_id, Some(Some("u1".to_string())));
        assert_eq!(coalesced.assignee_name, Some(Some("Ann B.".to_string())));
    }

    #[test]
    fn test_null_id_clears_both_halves() {
        let base = incident(Some(Assignee::new("u1", "Ann")));
        let merged = IncidentPatch::new()
            .assignee_id(None)
            .apply_to(&base)
            .unwrap();

        assert_eq!(merged.assignee, None);
    }

    #[test]
    fn test_half_assignment_is_rejected() {
        let base = incident(None);
        let err = IncidentPatch::new()
            .assignee_name(Some("Ann".to_string()))
            .apply_to(&base)
            .unwrap_err();

        assert!(matches!(err, SyncError::Validation(_)));
    }
}
