//! Acceptance rules for raw location fixes.
//!
//! Degraded fixes are dropped, not surfaced as errors: the tracker keeps
//! its last good location and the failing-search watchdog is the only
//! user-visible signal. The rejection reasons exist for tracing and tests.

use std::fmt;

use crate::core::types::LocationFix;

/// Bounds a fix must satisfy before the tracker accepts it
#[derive(Debug, Clone, Copy)]
pub struct FixValidationConfig {
    /// Maximum fix age in milliseconds
    pub max_fix_age_ms: u64,
    /// Maximum horizontal accuracy radius in meters
    pub max_horizontal_accuracy_m: f64,
}

impl Default for FixValidationConfig {
    fn default() -> Self {
        Self {
            max_fix_age_ms: 30_000,
            max_horizontal_accuracy_m: 500.0,
        }
    }
}

/// Why a fix was dropped
#[derive(Debug, Clone, PartialEq)]
pub enum FixRejection {
    StaleFix { age_ms: u64, max_age_ms: u64 },
    NegativeAccuracy { accuracy_m: f64 },
    InaccurateFix { accuracy_m: f64, max_accuracy_m: f64 },
    InvalidCoordinate { lat: f64, lon: f64 },
}

impl fmt::Display for FixRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixRejection::StaleFix { age_ms, max_age_ms } => {
                write!(f, "fix is {} ms old, limit {} ms", age_ms, max_age_ms)
            }
            FixRejection::NegativeAccuracy { accuracy_m } => {
                write!(f, "fix reports negative accuracy {:.1} m", accuracy_m)
            }
            FixRejection::InaccurateFix {
                accuracy_m,
                max_accuracy_m,
            } => {
                write!(
                    f,
                    "fix accuracy {:.1} m exceeds limit {:.1} m",
                    accuracy_m, max_accuracy_m
                )
            }
            FixRejection::InvalidCoordinate { lat, lon } => {
                write!(f, "fix coordinate ({}, {}) is invalid", lat, lon)
            }
        }
    }
}

impl std::error::Error for FixRejection {}

/// Stateless validator applying [`FixValidationConfig`]
#[derive(Debug, Clone, Default)]
pub struct FixValidator {
    config: FixValidationConfig,
}

impl FixValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FixValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FixValidationConfig {
        &self.config
    }

    /// Check a fix against the configured bounds at time `now_ms`
    pub fn validate(&self, fix: &LocationFix, now_ms: u64) -> Result<(), FixRejection> {
        if !fix.location.is_valid() {
            return Err(FixRejection::InvalidCoordinate {
                lat: fix.location.lat,
                lon: fix.location.lon,
            });
        }

        let age_ms = fix.age_ms(now_ms);
        if age_ms > self.config.max_fix_age_ms {
            return Err(FixRejection::StaleFix {
                age_ms,
                max_age_ms: self.config.max_fix_age_ms,
            });
        }

        if fix.horizontal_accuracy_m < 0.0 {
            return Err(FixRejection::NegativeAccuracy {
                accuracy_m: fix.horizontal_accuracy_m,
            });
        }

        if fix.horizontal_accuracy_m > self.config.max_horizontal_accuracy_m {
            return Err(FixRejection::InaccurateFix {
                accuracy_m: fix.horizontal_accuracy_m,
                max_accuracy_m: self.config.max_horizontal_accuracy_m,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Location;

    fn fix_at(timestamp_ms: u64, accuracy_m: f64) -> LocationFix {
        LocationFix::new(Location::new(45.0, 16.0), accuracy_m, timestamp_ms)
    }

    #[test]
    fn test_fresh_accurate_fix_accepted() {
        let validator = FixValidator::new();
        // 20 s old, well within the 30 s limit
        let fix = fix_at(100_000, 10.0);
        assert!(validator.validate(&fix, 120_000).is_ok());
    }

    #[test]
    fn test_stale_fix_rejected() {
        let validator = FixValidator::new();
        // 40 s old
        let fix = fix_at(100_000, 10.0);
        let result = validator.validate(&fix, 140_000);
        assert!(matches!(result, Err(FixRejection::StaleFix { age_ms: 40_000, .. })));
    }

    #[test]
    fn test_age_boundary_is_inclusive() {
        let validator = FixValidator::new();
        let fix = fix_at(100_000, 10.0);
        // Exactly 30 s old still passes; one millisecond more does not
        assert!(validator.validate(&fix, 130_000).is_ok());
        assert!(validator.validate(&fix, 130_001).is_err());
    }

    #[test]
    fn test_negative_accuracy_rejected() {
        let validator = FixValidator::new();
        let fix = fix_at(100_000, -1.0);
        let result = validator.validate(&fix, 100_000);
        assert!(matches!(result, Err(FixRejection::NegativeAccuracy { .. })));
    }

    #[test]
    fn test_inaccurate_fix_rejected() {
        let validator = FixValidator::new();
        let fix = fix_at(100_000, 501.0);
        let result = validator.validate(&fix, 100_000);
        assert!(matches!(result, Err(FixRejection::InaccurateFix { .. })));
    }

    #[test]
    fn test_accuracy_boundary_is_inclusive() {
        let validator = FixValidator::new();
        let fix = fix_at(100_000, 500.0);
        assert!(validator.validate(&fix, 100_000).is_ok());
    }

    #[test]
    fn test_invalid_coordinate_rejected() {
        let validator = FixValidator::new();
        let fix = LocationFix::new(Location::new(f64::NAN, 0.0), 10.0, 100_000);
        let result = validator.validate(&fix, 100_000);
        assert!(matches!(result, Err(FixRejection::InvalidCoordinate { .. })));
    }

    #[test]
    fn test_custom_bounds() {
        let validator = FixValidator::with_config(FixValidationConfig {
            max_fix_age_ms: 1_000,
            max_horizontal_accuracy_m: 50.0,
        });
        let fix = fix_at(100_000, 60.0);
        assert!(validator.validate(&fix, 100_500).is_err());

        let fix = fix_at(100_000, 40.0);
        assert!(validator.validate(&fix, 100_500).is_ok());
        assert!(validator.validate(&fix, 102_000).is_err());
    }
}
