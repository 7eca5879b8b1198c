use chrono::{DateTime, Utc};

/// Recency score in `[0, 1]`:
/// `max(0, e^(-d/tau) * (1 - d/max_days))` where `d` is days since
/// `last_seen`. Zero once `d >= max_days`.
pub fn recency(last_seen_ms: DateTime<Utc>, now: DateTime<Utc>, tau: f64, max_days: f64) -> f64 {
    let d = (now - last_seen_ms).num_milliseconds().max(0) as f64 / 86_400_000.0;
    if d >= max_days {
        return 0.0;
    }
    ((-d / tau).exp() * (1.0 - d / max_days)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn recency_is_one_at_zero_delay() {
        let now = Utc::now();
        assert!((recency(now, now, 0.5, 60.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn recency_decreases_with_age() {
        let now = Utc::now();
        let recent = recency(now - Duration::days(1), now, 0.5, 60.0);
        let older = recency(now - Duration::days(10), now, 0.5, 60.0);
        assert!(recent > older);
    }

    #[test]
    fn recency_is_zero_past_max_days() {
        let now = Utc::now();
        assert_eq!(recency(now - Duration::days(61), now, 0.5, 60.0), 0.0);
    }
}
