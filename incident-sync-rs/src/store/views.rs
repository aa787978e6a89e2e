//! Derived views over the incident collection
//!
//! Pure functions, recomputed on every access. Nothing here is cached, so a
//! view always reflects the latest write.

use std::collections::BTreeMap;

use crate::models::{Incident, Severity};

/// All incidents, newest `created_at` first. Ties keep collection order.
pub fn sorted_by_recency<'a, I>(incidents: I) -> Vec<Incident>
where
    I: IntoIterator<Item = &'a Incident>,
{
    let mut sorted: Vec<Incident> = incidents.into_iter().cloned().collect();
    // sort_by is stable
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

/// Number of incidents at the highest severity
pub fn critical_count<'a, I>(incidents: I) -> usize
where
    I: IntoIterator<Item = &'a Incident>,
{
    incidents
        .into_iter()
        .filter(|incident| incident.is_critical())
        .count()
}

/// Number of incidents per severity; every severity has an entry
pub fn severity_counts<'a, I>(incidents: I) -> BTreeMap<Severity, usize>
where
    I: IntoIterator<Item = &'a Incident>,
{
    let mut counts: BTreeMap<Severity, usize> =
        Severity::ALL.iter().map(|severity| (*severity, 0)).collect();
    for incident in incidents {
        *counts.entry(incident.severity).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use chrono::{DateTime, TimeZone, Utc};

    fn incident(id: &str, severity: Severity, created_at: DateTime<Utc>) -> Incident {
        Incident {
            id: id.to_string(),
            title: format!("Incident {}", id),
            description: String::new(),
            severity,
            status: Status::Open,
            service_id: "svc".to_string(),
            service_name: "Service".to_string(),
            created_at,
            updated_at: created_at,
            assignee: None,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_sorted_newest_first_with_stable_ties() {
        let incidents = vec![
            incident("a", Severity::Low, at(9)),
            incident("b", Severity::Low, at(12)),
            incident("c", Severity::Low, at(9)),
            incident("d", Severity::Low, at(10)),
        ];

        let ids: Vec<String> = sorted_by_recency(&incidents)
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_sorted_is_non_increasing() {
        let incidents: Vec<Incident> = [3, 1, 4, 1, 5, 9, 2, 6, 5, 3]
            .iter()
            .enumerate()
            .map(|(i, hour)| incident(&i.to_string(), Severity::Medium, at(*hour)))
            .collect();

        let sorted = sorted_by_recency(&incidents);
        assert_eq!(sorted.len(), incidents.len());
        assert!(sorted.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_counts() {
        let incidents = vec![
            incident("a", Severity::Critical, at(1)),
            incident("b", Severity::Critical, at(2)),
            incident("c", Severity::Low, at(3)),
        ];

        assert_eq!(critical_count(&incidents), 2);

        let counts = severity_counts(&incidents);
        assert_eq!(counts[&Severity::Critical], 2);
        assert_eq!(counts[&Severity::High], 0);
        assert_eq!(counts[&Severity::Medium], 0);
        assert_eq!(counts[&Severity::Low], 1);
    }

    #[test]
    fn test_empty_collection() {
        let incidents: Vec<Incident> = Vec::new();
        assert!(sorted_by_recency(&incidents).is_empty());
        assert_eq!(critical_count(&incidents), 0);
    }
}
