use crate::error::RangeError;

use super::model::TimeSeries;

// ---------------------------------------------------------------------------
// YearRange – a validated, inclusive bound
// ---------------------------------------------------------------------------

/// An inclusive `[start, end]` year range with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Validate user input. A range whose start is not before its end is
    /// reported back, never swapped or clamped.
    pub fn new(start: i32, end: i32) -> Result<Self, RangeError> {
        if start >= end {
            return Err(RangeError::StartNotBeforeEnd { start, end });
        }
        Ok(YearRange { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Keep the years in `[start_year, end_year]` (inclusive) together with the
/// same-index reading of every channel.
///
/// The caller validates the bounds; an inverted range simply yields an empty
/// view. Channels absent from `source` stay absent.
pub fn filter_by_range(source: &TimeSeries, start_year: i32, end_year: i32) -> TimeSeries {
    let keep: Vec<usize> = source
        .years
        .iter()
        .enumerate()
        .filter(|&(_, &year)| year >= start_year && year <= end_year)
        .map(|(i, _)| i)
        .collect();

    let years = keep.iter().map(|&i| source.years[i]).collect();
    let channels = source
        .channels
        .iter()
        .map(|(name, values)| (name.clone(), keep.iter().map(|&i| values[i]).collect()))
        .collect();

    TimeSeries { years, channels }
}

/// `[min(years), max(years)]`, the bounds of the reset view.
pub fn full_range(source: &TimeSeries) -> Option<(i32, i32)> {
    source.year_bounds()
}
