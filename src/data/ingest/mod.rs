//! Builds anomaly channels from the raw files published by each product.
//!
//! ```text
//!  GHCN v4 .dat + .inv + landmask ──► ghcn::load_ghcn ────┐
//!  GISTEMP monthly CSV ─────────────► gistemp::load_gistemp ├─► combine ─► TimeSeries
//!  CRUTEM5 summary text ────────────► crutem::load_crutem ──┘
//! ```
//!
//! Every product is reduced to one value per calendar year and clipped to
//! [`FIRST_YEAR`]..=`last_year` before the channels are aligned.

use std::collections::{BTreeMap, BTreeSet};

use super::model::TimeSeries;
use crate::error::DataError;

pub mod crutem;
pub mod ghcn;
pub mod gistemp;

/// First year kept by every product.
pub const FIRST_YEAR: i32 = 1900;

/// One anomaly (°C) per year, missing years absent.
pub type AnnualSeries = BTreeMap<i32, f64>;

/// Keep only `first..=last`.
pub fn clip_years(series: AnnualSeries, first: i32, last: i32) -> AnnualSeries {
    series
        .into_iter()
        .filter(|(year, _)| (first..=last).contains(year))
        .collect()
}

/// Align several annual series on the union of their years. A year missing
/// from one product becomes a missing reading in that channel.
pub fn combine(channels: Vec<(String, AnnualSeries)>) -> Result<TimeSeries, DataError> {
    let years: Vec<i32> = channels
        .iter()
        .flat_map(|(_, series)| series.keys().copied())
        .collect::<BTreeSet<i32>>()
        .into_iter()
        .collect();
    if years.is_empty() {
        return Err(DataError::NoYears);
    }

    let aligned = channels
        .into_iter()
        .map(|(key, series)| {
            let readings = years.iter().map(|year| series.get(year).copied()).collect();
            (key, readings)
        })
        .collect();

    TimeSeries::new(years, aligned)
}

/// Byte range `start..end` of a fixed-width line, trimmed. Short lines yield
/// an empty field.
pub(crate) fn fixed_field(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).map_or("", str::trim)
}
