//! Wire shapes exchanged with the incident service

use serde::{Deserialize, Serialize};

/// Owning service reference as sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRefDto {
    pub id: String,
    pub name: String,
}

/// Assignee as sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeDto {
    pub id: String,
    pub display_name: String,
}

/// Full wire record. Enum fields and dates stay strings until mapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub status: String,
    pub service: ServiceRefDto,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub assignee: Option<AssigneeDto>,
}

/// Envelope returned by `GET <base>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentListDto {
    pub incidents: Vec<IncidentDto>,
}

/// Partial update payload for `PUT <base>/{id}`.
///
/// Absent fields are omitted from the JSON. `assignee: Some(None)` is sent
/// as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncidentDtoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Option<AssigneeDto>>,
}

impl IncidentDtoPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
