//! Core of the temperature-anomaly dashboard.
//!
//! Everything in here is plain data in, plain data out: the desktop shell in
//! `main.rs` owns an [`state::AppState`] and calls its transition methods,
//! which rebuild a [`compose::RenderPayload`] from the current filtered view.

pub mod analytics;
pub mod color;
pub mod compose;
pub mod config;
pub mod data;
pub mod error;
pub mod state;

pub use analytics::statistics::{compute_statistics, StatisticsSummary};
pub use analytics::smoothing::compute_moving_average;
pub use analytics::trend::{compute_linear_trend, TrendResult};
pub use compose::{compose_series, LineWeights, OverlayOptions, PlotSeries, RenderPayload, SeriesKind};
pub use data::filter::{filter_by_range, full_range, YearRange};
pub use data::model::{DatasetDescriptor, Reading, TimeSeries};
pub use error::{AnalysisError, DataError, RangeError};
