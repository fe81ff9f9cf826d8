use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::analytics::smoothing::compute_moving_average;
use crate::analytics::trend::compute_linear_trend;
use crate::data::model::{DatasetDescriptor, Reading, TimeSeries};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which layers the chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    pub show_raw: bool,
    pub show_trend: bool,
    pub show_moving_average: bool,
    /// Moving-average window in years.
    pub window: usize,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            show_raw: true,
            show_trend: false,
            show_moving_average: false,
            window: 5,
        }
    }
}

impl OverlayOptions {
    /// Whether any overlay is drawn on top of the raw series.
    pub fn any_overlay(&self) -> bool {
        self.show_trend || self.show_moving_average
    }
}

/// Line widths per series kind. Raw lines thin out to `raw_with_overlay`
/// whenever an overlay is shown, so overlays stay on top visually.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineWeights {
    pub raw: f32,
    pub raw_with_overlay: f32,
    pub trend: f32,
    pub moving_average: f32,
}

impl Default for LineWeights {
    fn default() -> Self {
        Self {
            raw: 2.0,
            raw_with_overlay: 1.5,
            trend: 2.0,
            moving_average: 3.0,
        }
    }
}

impl LineWeights {
    pub fn raw_width(&self, options: &OverlayOptions) -> f32 {
        if options.any_overlay() {
            self.raw_with_overlay
        } else {
            self.raw
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Raw,
    Trend,
    MovingAverage,
}

/// One named line, aligned index-for-index with [`RenderPayload::years`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    /// Key of the descriptor the series was derived from.
    pub key: String,
    pub label: String,
    pub kind: SeriesKind,
    pub color: Color32,
    pub width: f32,
    pub dashed: bool,
    pub values: Vec<Reading>,
}

impl PlotSeries {
    /// Split the series into runs of consecutive present readings, as
    /// `[year, value]` points. Missing readings break the line.
    pub fn segments(&self, years: &[i32]) -> Vec<Vec<[f64; 2]>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (&year, value) in years.iter().zip(&self.values) {
            match value {
                Some(v) => current.push([f64::from(year), *v]),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

/// Slope panel entry for one fitted trend.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSlope {
    pub key: String,
    pub label: String,
    pub color: Color32,
    pub slope_per_decade: f64,
    pub r_squared: f64,
}

/// Everything the chart needs for one frame: the year axis and the ordered
/// series (raw, then trends, then moving averages).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderPayload {
    pub years: Vec<i32>,
    pub series: Vec<PlotSeries>,
    pub trend_slopes: Vec<TrendSlope>,
}

impl RenderPayload {
    pub fn series_of(&self, kind: SeriesKind) -> impl Iterator<Item = &PlotSeries> {
        self.series.iter().filter(move |s| s.kind == kind)
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Assemble the chart series for `view`.
///
/// Only descriptors that are visible and have a channel in `view` take part,
/// in descriptor order. Trend and moving-average series are skipped for
/// channels with too little data.
pub fn compose_series(
    view: &TimeSeries,
    descriptors: &[DatasetDescriptor],
    options: &OverlayOptions,
    weights: &LineWeights,
) -> RenderPayload {
    let active: Vec<(&DatasetDescriptor, &[Reading])> = descriptors
        .iter()
        .filter(|d| d.visible)
        .filter_map(|d| view.channel(&d.key).map(|values| (d, values)))
        .collect();

    let mut series = Vec::new();
    let mut trend_slopes = Vec::new();

    if options.show_raw {
        let width = weights.raw_width(options);
        series.extend(active.iter().map(|(d, values)| PlotSeries {
            key: d.key.clone(),
            label: d.label.clone(),
            kind: SeriesKind::Raw,
            color: d.color,
            width,
            dashed: false,
            values: values.to_vec(),
        }));
    }

    if options.show_trend {
        for (d, values) in &active {
            let Some(trend) = compute_linear_trend(view.years(), values) else {
                log::debug!("no trend for '{}': fewer than two usable points", d.key);
                continue;
            };
            trend_slopes.push(TrendSlope {
                key: d.key.clone(),
                label: d.label.clone(),
                color: d.color,
                slope_per_decade: trend.slope_per_decade(),
                r_squared: trend.r_squared,
            });
            series.push(PlotSeries {
                key: d.key.clone(),
                label: format!("{} Trend", d.label),
                kind: SeriesKind::Trend,
                color: d.color,
                width: weights.trend,
                dashed: true,
                values: trend.fitted.into_iter().map(Some).collect(),
            });
        }
    }

    if options.show_moving_average {
        for (d, values) in &active {
            let Some(smoothed) = compute_moving_average(values, options.window) else {
                continue;
            };
            series.push(PlotSeries {
                key: d.key.clone(),
                label: format!("{} ({}yr avg)", d.label, options.window),
                kind: SeriesKind::MovingAverage,
                color: d.color,
                width: weights.moving_average,
                dashed: false,
                values: smoothed,
            });
        }
    }

    RenderPayload {
        years: view.years().to_vec(),
        series,
        trend_slopes,
    }
}
