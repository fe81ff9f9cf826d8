use std::collections::BTreeMap;

use eframe::egui::Color32;

use crate::error::DataError;

// ---------------------------------------------------------------------------
// Reading – a single slot in a channel
// ---------------------------------------------------------------------------

/// One anomaly reading. `None` means "no reading for this year", which is
/// never the same thing as an anomaly of zero.
pub type Reading = Option<f64>;

/// Iterate over the present readings of a channel.
pub fn valid_readings(values: &[Reading]) -> impl Iterator<Item = f64> + '_ {
    values.iter().filter_map(|v| *v)
}

// ---------------------------------------------------------------------------
// TimeSeries – the year axis plus aligned channels
// ---------------------------------------------------------------------------

/// A year axis with one or more named channels aligned to it by index.
///
/// Invariants (checked by [`TimeSeries::new`]):
/// * years are strictly ascending, hence unique;
/// * every channel has exactly `years.len()` readings;
/// * present readings are finite.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    pub(crate) years: Vec<i32>,
    pub(crate) channels: BTreeMap<String, Vec<Reading>>,
}

impl TimeSeries {
    /// Build a series, validating the alignment invariants.
    pub fn new(years: Vec<i32>, channels: BTreeMap<String, Vec<Reading>>) -> Result<Self, DataError> {
        for pair in years.windows(2) {
            if pair[1] <= pair[0] {
                return Err(DataError::YearsNotAscending {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        for (name, values) in &channels {
            if values.len() != years.len() {
                return Err(DataError::MisalignedChannel {
                    channel: name.clone(),
                    expected: years.len(),
                    actual: values.len(),
                });
            }
            if let Some(index) = values
                .iter()
                .position(|v| v.is_some_and(|x| !x.is_finite()))
            {
                return Err(DataError::NonFiniteReading {
                    channel: name.clone(),
                    index,
                });
            }
        }
        Ok(TimeSeries { years, channels })
    }

    /// The year axis.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Readings of one channel, if the channel exists.
    pub fn channel(&self, key: &str) -> Option<&[Reading]> {
        self.channels.get(key).map(Vec::as_slice)
    }

    /// Channel names in sorted order.
    pub fn channel_keys(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn channels(&self) -> &BTreeMap<String, Vec<Reading>> {
        &self.channels
    }

    /// Number of years.
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Whether the year axis is empty.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// First and last year, or `None` for an empty series.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        Some((*self.years.first()?, *self.years.last()?))
    }
}

// ---------------------------------------------------------------------------
// DatasetDescriptor – identity and presentation of one channel
// ---------------------------------------------------------------------------

/// Display metadata for one channel. Only the `visible` flag changes during a
/// session, through the state's toggle transition.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDescriptor {
    pub key: String,
    pub label: String,
    pub color: Color32,
    pub visible: bool,
}

impl DatasetDescriptor {
    pub fn new(key: &str, label: &str, color: Color32) -> Self {
        DatasetDescriptor {
            key: key.to_string(),
            label: label.to_string(),
            color,
            visible: true,
        }
    }
}

/// The three built-in anomaly products, in legend order.
pub fn default_descriptors() -> Vec<DatasetDescriptor> {
    vec![
        DatasetDescriptor::new("giss", "NASA GISTEMP", Color32::from_rgb(255, 99, 132)),
        DatasetDescriptor::new("ghcn", "GHCN Raw (Simple)", Color32::from_rgb(54, 162, 235)),
        DatasetDescriptor::new("crutem", "CRUTEM5", Color32::from_rgb(75, 192, 192)),
    ]
}
