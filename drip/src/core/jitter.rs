//! Jittered wait bounds.
//!
//! Waits are drawn uniformly from a band around the nominal interval:
//! `[max(0.05, 1 - jitter) * nominal, (1 + jitter) * nominal]`, then clamped
//! below by the configured minimum wait. `jitter = 0` collapses the band to
//! the nominal interval itself.

/// The lower band factor never reaches zero, so hyper-fast bursts stay
/// bounded even with `jitter >= 1`.
const LOW_FACTOR_FLOOR: f64 = 0.05;

/// Sampling parameters for jittered waits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterParams {
    /// Width of the uniform band around the nominal interval.
    pub factor: f64,
    /// Floor for sampled waits, in seconds.
    pub min_wait_secs: f64,
}

impl JitterParams {
    /// Inclusive sampling band in seconds for a given nominal interval.
    pub fn band(&self, nominal_secs: f64) -> (f64, f64) {
        let low = LOW_FACTOR_FLOOR.max(1.0 - self.factor.abs()) * nominal_secs;
        let high = (1.0 + self.factor.abs()) * nominal_secs;
        (low, high)
    }

    /// Clamp a sampled wait to the configured floor, never below zero.
    pub fn clamp(&self, wait_secs: f64) -> f64 {
        wait_secs.max(self.min_wait_secs).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_is_centered_on_nominal() {
        let params = JitterParams {
            factor: 0.5,
            min_wait_secs: 0.0,
        };
        assert_eq!(params.band(100.0), (50.0, 150.0));
    }

    #[test]
    fn zero_factor_collapses_band() {
        let params = JitterParams {
            factor: 0.0,
            min_wait_secs: 0.0,
        };
        assert_eq!(params.band(60.0), (60.0, 60.0));
    }

    #[test]
    fn large_factor_keeps_lower_bound_positive() {
        let params = JitterParams {
            factor: 2.0,
            min_wait_secs: 0.0,
        };
        let (low, high) = params.band(100.0);
        assert_eq!(low, 5.0);
        assert_eq!(high, 300.0);
    }

    #[test]
    fn clamp_enforces_floor() {
        let params = JitterParams {
            factor: 0.5,
            min_wait_secs: 15.0,
        };
        assert_eq!(params.clamp(3.0), 15.0);
        assert_eq!(params.clamp(40.0), 40.0);
    }

    #[test]
    fn clamp_never_returns_negative() {
        let params = JitterParams {
            factor: 0.5,
            min_wait_secs: 0.0,
        };
        assert_eq!(params.clamp(-1.0), 0.0);
    }
}
