//! Tests for the statistics engine.
//!
//! ## Test Organization
//!
//! 1. **Known Values** - Mean, population std dev, extremes
//! 2. **Missing Readings** - Empty and all-missing input, gaps
//! 3. **Display** - Formatted dashboard fields

use approx::assert_relative_eq;

use climate_viewer::{StatisticsSummary, compute_statistics};

// ============================================================================
// Known Values
// ============================================================================

/// Population variance divides by the count of valid readings.
#[test]
fn test_statistics_known_values() {
    let summary = compute_statistics(&[Some(2.0), Some(4.0), Some(6.0)]);

    assert_relative_eq!(summary.mean().unwrap(), 4.0);
    assert_relative_eq!(summary.std_dev().unwrap(), (8.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    assert_relative_eq!(summary.std_dev().unwrap(), 1.633, epsilon = 1e-3);
    assert_eq!(summary.min(), Some(2.0));
    assert_eq!(summary.max(), Some(6.0));
}

#[test]
fn test_statistics_single_reading() {
    let summary = compute_statistics(&[Some(-0.42)]);
    assert_eq!(
        summary,
        StatisticsSummary::Defined {
            count: 1,
            mean: -0.42,
            std_dev: 0.0,
            min: -0.42,
            max: -0.42,
        }
    );
}

#[test]
fn test_statistics_negative_anomalies() {
    let summary = compute_statistics(&[Some(-0.3), Some(-0.1), Some(0.4)]);
    assert_eq!(summary.min(), Some(-0.3));
    assert_eq!(summary.max(), Some(0.4));
    assert_relative_eq!(summary.mean().unwrap(), 0.0, epsilon = 1e-12);
}

// ============================================================================
// Missing Readings
// ============================================================================

/// No readings at all is the undefined state, not zero and not NaN.
#[test]
fn test_statistics_empty_is_undefined() {
    let summary = compute_statistics(&[]);
    assert_eq!(summary, StatisticsSummary::Undefined);
    assert!(!summary.is_defined());
    assert_eq!(summary.mean(), None);
    assert_eq!(summary.std_dev(), None);
    assert_eq!(summary.min(), None);
    assert_eq!(summary.max(), None);
}

#[test]
fn test_statistics_all_missing_is_undefined() {
    assert_eq!(compute_statistics(&[None, None, None]), StatisticsSummary::Undefined);
}

/// Missing readings are skipped, not counted as zero.
#[test]
fn test_statistics_skip_missing() {
    let summary = compute_statistics(&[None, Some(2.0), None, Some(4.0), Some(6.0), None]);
    match summary {
        StatisticsSummary::Defined { count, mean, min, .. } => {
            assert_eq!(count, 3);
            assert_relative_eq!(mean, 4.0);
            assert_eq!(min, 2.0);
        }
        StatisticsSummary::Undefined => panic!("expected defined statistics"),
    }
}

#[test]
fn test_statistics_zero_reading_is_defined() {
    let summary = compute_statistics(&[Some(0.0)]);
    assert!(summary.is_defined());
    assert_eq!(summary.mean(), Some(0.0));
}

// ============================================================================
// Display
// ============================================================================

#[test]
fn test_display_fields() {
    let defined = compute_statistics(&[Some(2.0), Some(4.0), Some(6.0)]);
    assert_eq!(defined.display_fields(), ["4.000", "1.633", "2.000", "6.000"]);

    let undefined = compute_statistics(&[None]);
    assert_eq!(undefined.display_fields(), ["N/A", "N/A", "N/A", "N/A"]);
}
