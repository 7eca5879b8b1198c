use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subject-predicate-object fact with a bitemporal validity window.
///
/// Invariant: within a `(subject, predicate)` timeline, validity intervals
/// do not overlap — enforced by closing the prior interval on insert (see
/// `openmemory-storage::queries::temporal_ops`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalFact {
    pub id: String,
    pub user_id: Option<String>,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
}

impl TemporalFact {
    pub fn is_open(&self) -> bool {
        self.valid_to.is_none()
    }

    pub fn overlaps(&self, other_from: DateTime<Utc>, other_to: Option<DateTime<Utc>>) -> bool {
        let self_end = self.valid_to.unwrap_or(DateTime::<Utc>::MAX_UTC);
        let other_end = other_to.unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.valid_from < other_end && other_from < self_end
    }
}

/// A directed edge connecting two temporal facts (e.g. "superseded_by",
/// "caused_by"). Adjacent to the core model; maintained by the (optional)
/// temporal reasoning subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalEdge {
    pub id: String,
    pub user_id: Option<String>,
    pub from_fact_id: String,
    pub to_fact_id: String,
    pub relation: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fact(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> TemporalFact {
        TemporalFact {
            id: "f1".into(),
            user_id: None,
            subject: "s".into(),
            predicate: "p".into(),
            object: "o".into(),
            valid_from: from,
            valid_to: to,
        }
    }

    #[test]
    fn disjoint_intervals_do_not_overlap() {
        let now = Utc::now();
        let a = fact(now, Some(now + Duration::days(1)));
        assert!(!a.overlaps(now + Duration::days(2), None));
    }

    #[test]
    fn overlapping_intervals_detected() {
        let now = Utc::now();
        let a = fact(now, Some(now + Duration::days(5)));
        assert!(a.overlaps(now + Duration::days(1), Some(now + Duration::days(2))));
    }
}
