// src/checker/timeout.rs
// =============================================================================
// Resolves and validates the per-check timeout.
//
// A caller may omit the timeout, in which case the configured default is
// used. An explicit value is always validated as given: zero, negative,
// NaN and infinite values are rejected rather than replaced by the default.
// =============================================================================

use std::time::Duration;

use super::error::CheckFailure;

/// Smallest accepted timeout, in milliseconds
pub const MIN_TIMEOUT_MS: u64 = 500;

/// Largest accepted timeout, in milliseconds
pub const MAX_TIMEOUT_MS: u64 = 20_000;

/// Default used when neither the caller nor the environment provides one
pub const DEFAULT_TIMEOUT_MS: u64 = 4_000;

pub const TIMEOUT_OUT_OF_RANGE: &str = "timeoutMs must be between 500 and 20000.";

// Picks the effective timeout and checks it lies in [500, 20000] ms
//
// Parameters:
//   requested: the caller's value, if any (JSON numbers arrive as f64)
//   default_ms: the configured default
//
// Fractional values inside the range are rounded to the nearest millisecond.
pub fn resolve_timeout(requested: Option<f64>, default_ms: u64) -> Result<Duration, CheckFailure> {
    let ms = match requested {
        Some(value) => {
            if !value.is_finite()
                || value < MIN_TIMEOUT_MS as f64
                || value > MAX_TIMEOUT_MS as f64
            {
                return Err(CheckFailure::validation(TIMEOUT_OUT_OF_RANGE));
            }
            value.round() as u64
        }
        None => default_ms,
    };

    validate_timeout_ms(ms)?;
    Ok(Duration::from_millis(ms))
}

// Range check for an integer millisecond value
//
// Also used at startup to reject a bad DEFAULT_TIMEOUT_MS.
pub fn validate_timeout_ms(ms: u64) -> Result<u64, CheckFailure> {
    if (MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&ms) {
        Ok(ms)
    } else {
        Err(CheckFailure::validation(TIMEOUT_OUT_OF_RANGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_uses_default() {
        let timeout = resolve_timeout(None, DEFAULT_TIMEOUT_MS).unwrap();
        assert_eq!(timeout, Duration::from_millis(4_000));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        for ms in [500.0, 501.0, 4_000.0, 19_999.0, 20_000.0] {
            let timeout = resolve_timeout(Some(ms), DEFAULT_TIMEOUT_MS).unwrap();
            assert_eq!(timeout, Duration::from_millis(ms as u64));
        }
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        for ms in [499.0, 499.9, 20_000.5, 20_001.0, 1e12] {
            let err = resolve_timeout(Some(ms), DEFAULT_TIMEOUT_MS).unwrap_err();
            assert_eq!(err, CheckFailure::validation(TIMEOUT_OUT_OF_RANGE));
        }
    }

    #[test]
    fn test_zero_and_negative_are_rejected_not_defaulted() {
        for ms in [0.0, -1.0, -4_000.0] {
            assert!(resolve_timeout(Some(ms), DEFAULT_TIMEOUT_MS).is_err());
        }
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        for ms in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(resolve_timeout(Some(ms), DEFAULT_TIMEOUT_MS).is_err());
        }
    }

    #[test]
    fn test_fraction_is_rounded() {
        let timeout = resolve_timeout(Some(1_234.6), DEFAULT_TIMEOUT_MS).unwrap();
        assert_eq!(timeout, Duration::from_millis(1_235));
    }

    #[test]
    fn test_bad_default_is_rejected() {
        assert!(resolve_timeout(None, 100).is_err());
        assert!(validate_timeout_ms(30_000).is_err());
        assert_eq!(validate_timeout_ms(500).unwrap(), 500);
    }
}
