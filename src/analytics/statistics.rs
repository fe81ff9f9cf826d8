use crate::data::model::{Reading, valid_readings};

/// Descriptive statistics for one channel over one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatisticsSummary {
    /// The view holds no valid readings for the channel.
    Undefined,
    Defined {
        count: usize,
        mean: f64,
        /// Population standard deviation.
        std_dev: f64,
        min: f64,
        max: f64,
    },
}

impl StatisticsSummary {
    pub fn is_defined(&self) -> bool {
        matches!(self, StatisticsSummary::Defined { .. })
    }

    pub fn mean(&self) -> Option<f64> {
        match self {
            StatisticsSummary::Defined { mean, .. } => Some(*mean),
            StatisticsSummary::Undefined => None,
        }
    }

    pub fn std_dev(&self) -> Option<f64> {
        match self {
            StatisticsSummary::Defined { std_dev, .. } => Some(*std_dev),
            StatisticsSummary::Undefined => None,
        }
    }

    pub fn min(&self) -> Option<f64> {
        match self {
            StatisticsSummary::Defined { min, .. } => Some(*min),
            StatisticsSummary::Undefined => None,
        }
    }

    pub fn max(&self) -> Option<f64> {
        match self {
            StatisticsSummary::Defined { max, .. } => Some(*max),
            StatisticsSummary::Undefined => None,
        }
    }

    /// `[mean, std_dev, min, max]` formatted to three decimals, `"N/A"` when
    /// undefined.
    pub fn display_fields(&self) -> [String; 4] {
        let fmt = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), |x| format!("{x:.3}"));
        [fmt(self.mean()), fmt(self.std_dev()), fmt(self.min()), fmt(self.max())]
    }
}

/// Mean, population standard deviation, min and max of the present readings.
pub fn compute_statistics(values: &[Reading]) -> StatisticsSummary {
    let valid: Vec<f64> = valid_readings(values).collect();
    if valid.is_empty() {
        return StatisticsSummary::Undefined;
    }

    let count = valid.len();
    let mean = valid.iter().sum::<f64>() / count as f64;
    let variance = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
    let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
    let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    StatisticsSummary::Defined {
        count,
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
    }
}
