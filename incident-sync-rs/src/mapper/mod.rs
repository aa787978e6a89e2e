//! Translation between wire records and domain records
//!
//! `to_record` and `to_wire` are inverses for every valid record.
//! `to_wire_partial` emits only the fields a patch provides, and always emits
//! the assignee halves as one nested object (or an explicit null).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use crate::error::{Result, SyncError};
use crate::models::{
    Assignee, AssigneeDto, Incident, IncidentDto, IncidentDtoPatch, IncidentPatch, ServiceRefDto,
};

/// Decode a wire record. Unknown enum spellings and unparsable dates fail.
pub fn to_record(dto: &IncidentDto) -> Result<Incident> {
    let context = |err: SyncError| match err {
        SyncError::Decode(message) => SyncError::decode(format!("incident {}: {}", dto.id, message)),
        other => other,
    };

    Ok(Incident {
        id: dto.id.clone(),
        title: dto.title.clone(),
        description: dto.description.clone(),
        severity: dto.severity.parse().map_err(context)?,
        status: dto.status.parse().map_err(context)?,
        service_id: dto.service.id.clone(),
        service_name: dto.service.name.clone(),
        created_at: parse_timestamp(&dto.created_at).map_err(context)?,
        updated_at: parse_timestamp(&dto.updated_at).map_err(context)?,
        assignee: dto
            .assignee
            .as_ref()
            .map(|a| Assignee::new(a.id.clone(), a.display_name.clone())),
    })
}

/// Decode a list of wire records, failing on the first bad one
pub fn to_records(dtos: &[IncidentDto]) -> Result<Vec<Incident>> {
    dtos.iter().map(to_record).collect()
}

/// Encode a record as a full wire record
pub fn to_wire(incident: &Incident) -> IncidentDto {
    IncidentDto {
        id: incident.id.clone(),
        title: incident.title.clone(),
        description: incident.description.clone(),
        severity: incident.severity.as_str().to_string(),
        status: incident.status.as_str().to_string(),
        service: ServiceRefDto {
            id: incident.service_id.clone(),
            name: incident.service_name.clone(),
        },
        created_at: format_timestamp(&incident.created_at),
        updated_at: format_timestamp(&incident.updated_at),
        assignee: incident.assignee.as_ref().map(|a| AssigneeDto {
            id: a.id.clone(),
            display_name: a.name.clone(),
        }),
    }
}

/// Encode the explicitly provided fields of a patch.
///
/// If either assignee half is present: an explicit null id emits
/// `assignee: null`, two present values emit the nested object, and a lone
/// half emits nothing (the store completes lone halves before calling this).
pub fn to_wire_partial(patch: &IncidentPatch) -> IncidentDtoPatch {
    let mut wire = IncidentDtoPatch {
        title: patch.title.clone(),
        description: patch.description.clone(),
        severity: patch.severity.map(|s| s.as_str().to_string()),
        status: patch.status.map(|s| s.as_str().to_string()),
        assignee: None,
    };

    if patch.touches_assignee() {
        wire.assignee = match (&patch.assignee_id, &patch.assignee_name) {
            (Some(None), _) => Some(None),
            (Some(Some(id)), Some(Some(name))) => Some(Some(AssigneeDto {
                id: id.clone(),
                display_name: name.clone(),
            })),
            _ => None,
        };
    }

    wire
}

/// Parse an ISO-8601 timestamp into UTC.
///
/// RFC 3339 with an offset is the normal form. A date-time without an offset
/// (`2026-01-01T12:00:00`) or a bare date (`2026-01-01`) is read as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc())
        })
        .or_else(|_| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        })
        .map_err(|e| SyncError::decode(format!("invalid timestamp '{}': {}", value, e)))
}

/// Format a timestamp in ISO-8601 UTC, keeping sub-second precision
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
