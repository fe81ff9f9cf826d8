//! Tests for the time-range filter and the time-series invariants.

mod common;

use std::collections::BTreeMap;

use climate_viewer::{DataError, TimeSeries, filter_by_range, full_range};

use common::{sample_series, series};

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_rejects_misaligned_channel() {
    let mut channels = BTreeMap::new();
    channels.insert("giss".to_string(), vec![Some(0.1)]);
    let err = TimeSeries::new(vec![2000, 2001], channels).unwrap_err();
    assert_eq!(
        err,
        DataError::MisalignedChannel {
            channel: "giss".to_string(),
            expected: 2,
            actual: 1,
        }
    );
}

#[test]
fn test_new_rejects_unsorted_or_duplicate_years() {
    assert!(matches!(
        TimeSeries::new(vec![2001, 2000], BTreeMap::new()),
        Err(DataError::YearsNotAscending { previous: 2001, next: 2000 })
    ));
    assert!(TimeSeries::new(vec![2000, 2000], BTreeMap::new()).is_err());
}

#[test]
fn test_new_rejects_non_finite() {
    let mut channels = BTreeMap::new();
    channels.insert("giss".to_string(), vec![Some(f64::NAN)]);
    assert!(matches!(
        TimeSeries::new(vec![2000], channels),
        Err(DataError::NonFiniteReading { index: 0, .. })
    ));
}

// ============================================================================
// Filtering
// ============================================================================

/// The result's years are exactly the source years inside the range, and
/// every channel keeps the same length.
#[test]
fn test_filter_keeps_inclusive_subsequence() {
    let source = sample_series();
    let view = filter_by_range(&source, 2003, 2006);

    assert_eq!(view.years(), &[2003, 2004, 2005, 2006]);
    for key in ["giss", "ghcn", "crutem"] {
        assert_eq!(view.channel(key).unwrap().len(), 4, "{key}");
    }
    assert_eq!(view.channel("ghcn").unwrap()[2], None);
    assert_eq!(view.channel("giss").unwrap()[0], source.channel("giss").unwrap()[3]);
}

#[test]
fn test_filter_every_subrange() {
    let source = sample_series();
    for a in 1995..2012 {
        for b in (a + 1)..2014 {
            let view = filter_by_range(&source, a, b);
            let expected: Vec<i32> = source
                .years()
                .iter()
                .copied()
                .filter(|y| (a..=b).contains(y))
                .collect();
            assert_eq!(view.years(), expected.as_slice());
            for (_, values) in view.channels() {
                assert_eq!(values.len(), expected.len());
            }
        }
    }
}

#[test]
fn test_filter_is_idempotent() {
    let source = sample_series();
    let once = filter_by_range(&source, 2002, 2007);

    assert_eq!(filter_by_range(&once, 2002, 2007), once);
    assert_eq!(filter_by_range(&once, 1990, 2020), once);
}

#[test]
fn test_full_range_equals_unfiltered() {
    let source = sample_series();
    let (start, end) = full_range(&source).unwrap();
    assert_eq!((start, end), (2000, 2009));
    assert_eq!(filter_by_range(&source, start, end), source.clone());
}

#[test]
fn test_filter_does_not_synthesize_channels() {
    let source = series(vec![2000, 2001, 2002], vec![("giss", vec![Some(0.1), None, Some(0.3)])]);
    let view = filter_by_range(&source, 2001, 2002);

    assert_eq!(view.channel_keys().collect::<Vec<_>>(), vec!["giss"]);
    assert!(view.channel("ghcn").is_none());
    assert_eq!(view.channel("giss").unwrap(), &[None, Some(0.3)]);
}

#[test]
fn test_filter_outside_data_is_empty() {
    let view = filter_by_range(&sample_series(), 1900, 1950);
    assert!(view.is_empty());
    assert_eq!(full_range(&view), None);
    assert!(view.channel("giss").unwrap().is_empty());
}
