//! Domain and wire models for incidents
//!
//! - `Incident`: the in-memory record held by the store
//! - `dto`: the JSON shapes exchanged with the incident service
//! - `patch`: sparse field changes used by updates

pub mod dto;
pub mod patch;

pub use dto::{AssigneeDto, IncidentDto, IncidentDtoPatch, IncidentListDto, ServiceRefDto};
pub use patch::IncidentPatch;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::error::SyncError;

/// Incident severity, ordered so that `Critical` ranks highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All variants, most severe first
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// The highest-ranked variant
    pub fn highest() -> Self {
        Severity::Critical
    }

    /// Wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Critical" => Ok(Severity::Critical),
            "High" => Ok(Severity::High),
            "Medium" => Ok(Severity::Medium),
            "Low" => Ok(Severity::Low),
            other => Err(SyncError::decode(format!("unknown severity '{}'", other))),
        }
    }
}

/// Incident workflow status. No transition graph is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Open,
    InProgress,
    Acknowledged,
    Resolved,
}

impl Status {
    /// Wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::InProgress => "InProgress",
            Status::Acknowledged => "Acknowledged",
            Status::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(Status::Open),
            "InProgress" => Ok(Status::InProgress),
            "Acknowledged" => Ok(Status::Acknowledged),
            "Resolved" => Ok(Status::Resolved),
            other => Err(SyncError::decode(format!("unknown status '{}'", other))),
        }
    }
}

/// The person an incident is assigned to. Id and name travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignee {
    pub id: String,
    pub name: String,
}

impl Assignee {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// In-memory incident record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    /// Immutable identifier
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub status: Status,
    /// Owning service, read-only from this side
    pub service_id: String,
    pub service_name: String,
    pub created_at: DateTime<Utc>,
    /// Strictly increases with every local mutation
    pub updated_at: DateTime<Utc>,
    pub assignee: Option<Assignee>,
}

impl Incident {
    pub fn assignee_id(&self) -> Option<&str> {
        self.assignee.as_ref().map(|a| a.id.as_str())
    }

    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee.as_ref().map(|a| a.name.as_str())
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::highest()
    }
}

/// Timestamp for a new mutation of a record last touched at `previous`.
///
/// Uses the wall clock, bumped to `previous + 1ms` when the clock has not
/// moved past it.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
