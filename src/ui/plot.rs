use eframe::egui::Ui;
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints};

use climate_viewer::state::AppState;

// ---------------------------------------------------------------------------
// Anomaly chart (central panel)
// ---------------------------------------------------------------------------

/// Render the composed series in the central panel.
pub fn anomaly_plot(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to view anomalies  (File → Open…)");
        });
        return;
    }

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading("Global Temperature Anomalies (°C relative to 1951-1980)");
    });

    let payload = &state.payload;

    Plot::new("anomaly_plot")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Temperature Anomaly (°C)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &payload.series {
                let style = if series.dashed {
                    LineStyle::dashed_loose()
                } else {
                    LineStyle::Solid
                };
                // Gaps in the data split one series into several lines
                // sharing a legend entry.
                for segment in series.segments(&payload.years) {
                    let line = Line::new(PlotPoints::new(segment))
                        .name(&series.label)
                        .color(series.color)
                        .width(series.width)
                        .style(style);
                    plot_ui.line(line);
                }
            }
        });
}
