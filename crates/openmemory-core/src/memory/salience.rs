use std::fmt;

use serde::{Deserialize, Serialize};

/// Salience score clamped to `[0.0, 1.0]`. Grows with reinforcement, decays
/// with time. Mirrors the confidence-score newtype pattern used throughout
/// the rest of the system: arithmetic on a `Salience` always re-clamps.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Salience(f64);

impl Salience {
    /// Memories above this are candidates for "consolidate" events on reinforce.
    pub const CONSOLIDATE_THRESHOLD: f64 = 0.8;

    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_consolidation_worthy(self) -> bool {
        self.0 > Self::CONSOLIDATE_THRESHOLD
    }

    /// Boost salience by `delta`, clamping to `[0, 1]`.
    pub fn boosted(self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }
}

impl Default for Salience {
    fn default() -> Self {
        Self(0.5)
    }
}

impl fmt::Display for Salience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl From<f64> for Salience {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Salience> for f64 {
    fn from(s: Salience) -> Self {
        s.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_on_construction() {
        assert_eq!(Salience::new(1.5).value(), 1.0);
        assert_eq!(Salience::new(-0.5).value(), 0.0);
    }

    #[test]
    fn boost_clamps() {
        let s = Salience::new(0.95).boosted(0.5);
        assert_eq!(s.value(), 1.0);
    }
}
