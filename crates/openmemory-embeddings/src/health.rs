//! Advisory provider-health tracking: a 429 response marks a provider
//! unhealthy for 5 minutes (§4.4). Racy by design, per the shared-resource
//! policy in §5 — the worst case of a stale read is one extra failing call.

use std::sync::RwLock;
use std::time::{Duration, Instant};

const UNHEALTHY_DURATION: Duration = Duration::from_secs(5 * 60);

pub struct HealthTracker {
    unhealthy_until: RwLock<Option<Instant>>,
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthTracker {
    pub fn new() -> Self {
        Self { unhealthy_until: RwLock::new(None) }
    }

    pub fn mark_unhealthy(&self) {
        *self.unhealthy_until.write().expect("lock poisoned") = Some(Instant::now() + UNHEALTHY_DURATION);
    }

    pub fn mark_healthy(&self) {
        *self.unhealthy_until.write().expect("lock poisoned") = None;
    }

    pub fn is_healthy(&self) -> bool {
        match *self.unhealthy_until.read().expect("lock poisoned") {
            Some(until) => Instant::now() >= until,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_healthy() {
        assert!(HealthTracker::new().is_healthy());
    }

    #[test]
    fn marked_unhealthy_stays_unhealthy_immediately_after() {
        let h = HealthTracker::new();
        h.mark_unhealthy();
        assert!(!h.is_healthy());
    }

    #[test]
    fn mark_healthy_clears_unhealthy_state() {
        let h = HealthTracker::new();
        h.mark_unhealthy();
        h.mark_healthy();
        assert!(h.is_healthy());
    }
}
