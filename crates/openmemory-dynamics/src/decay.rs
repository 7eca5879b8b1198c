use openmemory_core::constants::{DECAY_THETA, LAMBDA_FAST, LAMBDA_SLOW};

/// Dual-phase exponential decay:
/// `salience * ((1 - theta) * e^(-lambda_fast * delta) + theta * e^(-lambda_slow * delta))`
///
/// `delta` is elapsed time since last access, in days. Two superimposed
/// exponentials model a fast-forgetting phase and a slow-consolidated one,
/// weighted by `theta`.
pub fn dual_phase_decay(salience: f64, delta_days: f64) -> f64 {
    dual_phase_decay_with(salience, delta_days, LAMBDA_FAST, LAMBDA_SLOW, DECAY_THETA)
}

/// Same formula with explicit lambdas/theta, for testing and for
/// per-sector overrides.
pub fn dual_phase_decay_with(
    salience: f64,
    delta_days: f64,
    lambda_fast: f64,
    lambda_slow: f64,
    theta: f64,
) -> f64 {
    let fast = (1.0 - theta) * (-lambda_fast * delta_days).exp();
    let slow = theta * (-lambda_slow * delta_days).exp();
    (salience * (fast + slow)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_at_zero_delta_returns_salience() {
        assert!((dual_phase_decay(0.8, 0.0) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn decay_is_monotonically_nonincreasing() {
        let mut prev = dual_phase_decay(1.0, 0.0);
        for day in 1..200 {
            let cur = dual_phase_decay(1.0, day as f64);
            assert!(cur <= prev + 1e-12);
            prev = cur;
        }
    }

    #[test]
    fn decay_never_exceeds_salience() {
        for day in [0.0, 1.0, 30.0, 365.0] {
            assert!(dual_phase_decay(0.5, day) <= 0.5 + 1e-12);
        }
    }

    #[test]
    fn decay_approaches_theta_weighted_slow_tail() {
        let far = dual_phase_decay(1.0, 10_000.0);
        assert!(far >= 0.0 && far < 0.01);
    }
}
