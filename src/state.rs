use std::path::Path;

use anyhow::{Result, bail};

use crate::analytics::analysis::{AnalysisReport, AnalysisRequest, analyze};
use crate::analytics::statistics::{StatisticsSummary, compute_statistics};
use crate::color::descriptors_for;
use crate::compose::{LineWeights, OverlayOptions, RenderPayload, compose_series};
use crate::config::AppConfig;
use crate::data::export::export_csv_file;
use crate::data::filter::{YearRange, filter_by_range};
use crate::data::model::{DatasetDescriptor, TimeSeries, default_descriptors};
use crate::error::{AnalysisError, RangeError};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

impl StatusMessage {
    fn new(text: impl Into<String>, level: StatusLevel) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
///
/// All changes go through the `on_*` transitions. Each one rebuilds
/// [`AppState::payload`] from the current view instead of patching the
/// previous payload.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<TimeSeries>,

    /// The dataset narrowed to `range`. Replaced, never edited.
    pub view: Option<TimeSeries>,

    /// Inclusive bounds of the current view.
    pub range: Option<(i32, i32)>,

    /// Identity, colour and visibility per channel, in legend order.
    pub descriptors: Vec<DatasetDescriptor>,

    pub overlays: OverlayOptions,

    pub weights: LineWeights,

    /// Series for the chart, rebuilt on every transition.
    pub payload: RenderPayload,

    /// Result of the last "advanced analysis" request.
    pub analysis: Option<AnalysisReport>,

    /// Status / error message shown in the UI.
    pub status_message: Option<StatusMessage>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            dataset: None,
            view: None,
            range: None,
            descriptors: default_descriptors(),
            overlays: OverlayOptions {
                window: config.moving_average_window,
                ..OverlayOptions::default()
            },
            weights: config.line_weights,
            payload: RenderPayload::default(),
            analysis: None,
            status_message: None,
            loading: false,
        }
    }

    // -- Transitions --

    /// Ingest a newly loaded dataset: full-range view, fresh descriptors.
    pub fn on_data_loaded(&mut self, dataset: TimeSeries) -> &RenderPayload {
        self.descriptors = descriptors_for(&dataset);
        self.range = dataset.year_bounds();
        self.view = Some(dataset.clone());
        self.status_message = Some(StatusMessage::new(
            format!("Data loaded successfully: {} years", dataset.len()),
            StatusLevel::Success,
        ));
        self.dataset = Some(dataset);
        self.analysis = None;
        self.loading = false;
        self.recompute()
    }

    /// Record a failed load. The previous dataset, if any, stays in place.
    pub fn on_load_failed(&mut self, error: &anyhow::Error) {
        log::error!("Failed to load data: {error:#}");
        self.status_message = Some(StatusMessage::new(
            format!("Failed to load data: {error:#}"),
            StatusLevel::Error,
        ));
        self.loading = false;
    }

    /// Narrow the view to `[start, end]`. An invalid range leaves the current
    /// view untouched and is reported in the status line.
    pub fn on_filter_changed(&mut self, start: i32, end: i32) -> Result<&RenderPayload, RangeError> {
        let validated = YearRange::new(start, end).and_then(|range| {
            self.dataset
                .as_ref()
                .map(|source| (range, source))
                .ok_or(RangeError::NoData)
        });
        let (range, source) = match validated {
            Ok(ok) => ok,
            Err(e) => {
                log::warn!("rejected year range {start}-{end}: {e}");
                self.status_message = Some(StatusMessage::new(e.to_string(), StatusLevel::Error));
                return Err(e);
            }
        };

        let view = filter_by_range(source, range.start(), range.end());
        log::info!("Filtered to {start}-{end}: {} years", view.len());
        self.status_message = Some(if view.is_empty() {
            StatusMessage::new(format!("No data between {start} and {end}"), StatusLevel::Info)
        } else {
            StatusMessage::new(format!("Filtered to {start}-{end}"), StatusLevel::Success)
        });
        self.view = Some(view);
        self.range = Some((start, end));
        Ok(self.recompute())
    }

    /// Back to the unfiltered dataset.
    pub fn on_filter_reset(&mut self) -> Result<&RenderPayload, RangeError> {
        let source = self.dataset.as_ref().ok_or(RangeError::NoData)?;
        self.range = source.year_bounds();
        self.view = Some(source.clone());
        self.status_message = Some(StatusMessage::new("Time filter reset", StatusLevel::Success));
        Ok(self.recompute())
    }

    /// Show or hide one dataset. Unknown keys leave the descriptors as they are.
    pub fn on_toggle_changed(&mut self, key: &str, visible: bool) -> &RenderPayload {
        match self.descriptors.iter_mut().find(|d| d.key == key) {
            Some(descriptor) => descriptor.visible = visible,
            None => log::warn!("toggle for unknown dataset '{key}'"),
        }
        self.recompute()
    }

    /// Replace the overlay flags (raw / trend / moving average + window).
    pub fn on_overlay_changed(&mut self, overlays: OverlayOptions) -> &RenderPayload {
        self.overlays = overlays;
        self.recompute()
    }

    fn recompute(&mut self) -> &RenderPayload {
        self.payload = match &self.view {
            Some(view) => compose_series(view, &self.descriptors, &self.overlays, &self.weights),
            None => RenderPayload::default(),
        };
        &self.payload
    }

    // -- Derived values --

    /// Keys of the visible datasets, in legend order.
    pub fn visible_keys(&self) -> Vec<String> {
        self.descriptors
            .iter()
            .filter(|d| d.visible)
            .map(|d| d.key.clone())
            .collect()
    }

    /// Summary statistics of every visible dataset present in the view.
    pub fn statistics(&self) -> Vec<(&DatasetDescriptor, StatisticsSummary)> {
        let Some(view) = &self.view else {
            return Vec::new();
        };
        self.descriptors
            .iter()
            .filter(|d| d.visible)
            .filter_map(|d| view.channel(&d.key).map(|values| (d, compute_statistics(values))))
            .collect()
    }

    /// Parameters for the analysis endpoint: visible keys and the bounds of
    /// the current view.
    pub fn analysis_request(&self) -> Option<AnalysisRequest> {
        let (start, end) = self.view.as_ref()?.year_bounds()?;
        Some(AnalysisRequest {
            datasets: self.visible_keys(),
            start_year: Some(start),
            end_year: Some(end),
        })
    }

    /// Run the analysis locally and keep the report for display.
    pub fn run_analysis(&mut self) -> Result<&AnalysisReport, AnalysisError> {
        let outcome = match (&self.dataset, &self.view) {
            (Some(_), Some(view)) if view.is_empty() => Err(AnalysisError::EmptyRange),
            (Some(source), Some(_)) => match self.analysis_request() {
                Some(request) => analyze(source, &request),
                None => Err(AnalysisError::NoDatasets),
            },
            _ => Err(AnalysisError::NoDatasets),
        };
        match outcome {
            Ok(report) => {
                let report: &AnalysisReport = self.analysis.insert(report);
                Ok(report)
            }
            Err(e) => {
                self.status_message = Some(StatusMessage::new(
                    format!("Analysis Error: {e}"),
                    StatusLevel::Error,
                ));
                Err(e)
            }
        }
    }

    /// Write the current view's visible datasets to `path` as CSV.
    pub fn export_csv(&mut self, path: &Path) -> Result<usize> {
        let Some(view) = &self.view else {
            bail!("No dataset loaded");
        };
        let exportable = self
            .descriptors
            .iter()
            .any(|d| d.visible && view.channel(&d.key).is_some());
        if !exportable {
            self.status_message = Some(StatusMessage::new(
                "No datasets selected for export",
                StatusLevel::Error,
            ));
            bail!("No datasets selected for export");
        }
        let rows = export_csv_file(path, view, &self.descriptors)?;
        self.status_message = Some(StatusMessage::new("CSV exported successfully", StatusLevel::Success));
        Ok(rows)
    }

    /// Show a message in the status line.
    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status_message = Some(StatusMessage::new(text, level));
    }
}
