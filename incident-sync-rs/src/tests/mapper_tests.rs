//! Tests for the record mapper
//!
//! These tests verify decoding of wire records, the full encode path and the
//! assignee coalescing of partial updates.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::SyncError;
    use crate::mapper::{format_timestamp, parse_timestamp, to_record, to_records, to_wire, to_wire_partial};
    use crate::models::{Assignee, IncidentDto, IncidentPatch, Severity, Status};
    use crate::tests::fixtures;

    #[test]
    fn test_maps_full_wire_record() {
        let dto: IncidentDto = serde_json::from_value(json!({
            "id": "INC-123",
            "title": "Test Incident",
            "description": "Something bad happened",
            "severity": "High",
            "status": "Open",
            "service": { "id": "svc-1", "name": "Auth Service" },
            "createdAt": "2026-01-01T12:00:00Z",
            "updatedAt": "2026-01-02T12:00:00Z",
            "assignee": { "id": "usr-1", "displayName": "John Doe" }
        }))
        .unwrap();

        let incident = to_record(&dto).unwrap();

        assert_eq!(incident.id, "INC-123");
        assert_eq!(incident.title, "Test Incident");
        assert_eq!(incident.severity, Severity::High);
        assert_eq!(incident.status, Status::Open);
        assert_eq!(incident.service_id, "svc-1");
        assert_eq!(incident.service_name, "Auth Service");
        assert_eq!(format_timestamp(&incident.created_at), "2026-01-01T12:00:00Z");
        assert_eq!(incident.updated_at, fixtures::at(2, 12));
        assert_eq!(incident.assignee_id(), Some("usr-1"));
        assert_eq!(incident.assignee_name(), Some("John Doe"));
    }

    #[test]
    fn test_null_and_missing_assignee() {
        let mut value = json!({
            "id": "INC-124",
            "title": "Unassigned",
            "description": "No one is here",
            "severity": "Low",
            "status": "Acknowledged",
            "service": { "id": "svc-2", "name": "Database" },
            "createdAt": "2026-01-01T10:00:00Z",
            "updatedAt": "2026-01-01T10:00:00Z",
            "assignee": null
        });

        let dto: IncidentDto = serde_json::from_value(value.clone()).unwrap();
        let incident = to_record(&dto).unwrap();
        assert_eq!(incident.assignee, None);
        assert_eq!(incident.assignee_id(), None);
        assert_eq!(incident.assignee_name(), None);

        value.as_object_mut().unwrap().remove("assignee");
        let dto: IncidentDto = serde_json::from_value(value).unwrap();
        assert_eq!(to_record(&dto).unwrap().assignee, None);
    }

    #[test]
    fn test_wire_round_trip() {
        let mut dto = fixtures::dto("INC-7", "Critical", "InProgress", "2026-01-05T08:30:15.250Z");
        dto.assignee = Some(crate::models::AssigneeDto {
            id: "usr-9".to_string(),
            display_name: "Grace".to_string(),
        });

        let incident = to_record(&dto).unwrap();
        assert_eq!(to_wire(&incident), dto);
        assert_eq!(to_record(&to_wire(&incident)).unwrap(), incident);
    }

    #[test]
    fn test_unknown_enum_spelling_is_a_decode_error() {
        let dto = fixtures::dto("INC-8", "Catastrophic", "Open", "2026-01-01T00:00:00Z");
        let err = to_record(&dto).unwrap_err();

        assert!(matches!(err, SyncError::Decode(_)));
        assert!(err.to_string().contains("INC-8"));
        assert!(err.to_string().contains("Catastrophic"));

        let dto = fixtures::dto("INC-9", "Low", "open", "2026-01-01T00:00:00Z");
        assert!(matches!(to_record(&dto), Err(SyncError::Decode(_))));
    }

    #[test]
    fn test_bad_timestamp_is_a_decode_error() {
        let dto = fixtures::dto("INC-10", "Low", "Open", "yesterday");
        assert!(matches!(to_record(&dto), Err(SyncError::Decode(_))));

        assert!(parse_timestamp("2026-01-01T12:00:00+02:00").is_ok());
        assert_eq!(
            parse_timestamp("2026-01-01T12:00:00+02:00").unwrap(),
            fixtures::at(1, 10)
        );
    }

    #[test]
    fn test_timestamp_without_offset_is_utc() {
        assert_eq!(parse_timestamp("2026-01-01T12:00:00").unwrap(), fixtures::at(1, 12));
        assert_eq!(
            parse_timestamp("2026-01-01T12:00:00.250").unwrap(),
            fixtures::at(1, 12) + chrono::Duration::milliseconds(250)
        );
        assert_eq!(parse_timestamp("2026-01-01").unwrap(), fixtures::at(1, 0));

        let dto = fixtures::dto("INC-11", "Low", "Open", "2026-01-01T12:00:00");
        assert_eq!(to_record(&dto).unwrap().created_at, fixtures::at(1, 12));

        assert!(parse_timestamp("2026-01-01T12").is_err());
    }

    #[test]
    fn test_one_bad_record_fails_the_list() {
        let mut dtos = fixtures::server_incidents();
        assert_eq!(to_records(&dtos).unwrap().len(), 4);

        dtos[2].status = "Closed".to_string();
        assert!(to_records(&dtos).is_err());
    }

    #[test]
    fn test_partial_only_emits_provided_fields() {
        let wire = to_wire_partial(&IncidentPatch::new().status(Status::Acknowledged));

        assert_eq!(serde_json::to_value(&wire).unwrap(), json!({ "status": "Acknowledged" }));
    }

    #[test]
    fn test_partial_assignee_object() {
        let wire = to_wire_partial(&IncidentPatch::new().assign("u1", "Ann"));

        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            json!({ "assignee": { "id": "u1", "displayName": "Ann" } })
        );
    }

    #[test]
    fn test_partial_null_assignee() {
        let wire = to_wire_partial(&IncidentPatch::new().unassign());
        assert_eq!(serde_json::to_value(&wire).unwrap(), json!({ "assignee": null }));

        // a null id wins over any name
        let wire = to_wire_partial(
            &IncidentPatch::new()
                .assignee_id(None)
                .assignee_name(Some("Ann".to_string())),
        );
        assert_eq!(serde_json::to_value(&wire).unwrap(), json!({ "assignee": null }));
    }

    #[test]
    fn test_partial_lone_half_emits_nothing() {
        let wire = to_wire_partial(&IncidentPatch::new().assignee_name(Some("Ann".to_string())));

        assert!(wire.is_empty());
        assert_eq!(serde_json::to_value(&wire).unwrap(), json!({}));
    }

    #[test]
    fn test_coalesced_patch_carries_both_halves() {
        let current = fixtures::assigned(
            fixtures::incident("INC-1", Severity::High, Status::Open, fixtures::at(1, 9)),
            "u1",
            "Ann",
        );
        let patch = IncidentPatch::new().assignee_name(Some("Ann Lee".to_string()));
        let merged = patch.apply_to(&current).unwrap();

        assert_eq!(merged.assignee, Some(Assignee::new("u1", "Ann Lee")));
        assert_eq!(
            serde_json::to_value(to_wire_partial(&patch.coalesced(&merged))).unwrap(),
            json!({ "assignee": { "id": "u1", "displayName": "Ann Lee" } })
        );
    }
}
