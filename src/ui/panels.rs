use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use climate_viewer::state::{AppState, StatusLevel};

use crate::app::{ClimateViewerApp, ShellState};

// ---------------------------------------------------------------------------
// Left side panel – datasets, time range, overlays, statistics
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, shell: &mut ShellState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Datasets");
            ui.separator();
            dataset_toggles(ui, state);
            ui.add_space(8.0);

            ui.heading("Time Range");
            ui.separator();
            time_range(ui, state, shell);
            ui.add_space(8.0);

            ui.heading("Trend Analysis");
            ui.separator();
            overlay_controls(ui, state);
            ui.add_space(8.0);

            ui.heading("Statistics");
            ui.separator();
            statistics(ui, state, shell);
        });
}

fn dataset_toggles(ui: &mut Ui, state: &mut AppState) {
    // Clone what we need so we can mutate state inside the loop.
    let toggles: Vec<(String, String, Color32, bool)> = state
        .descriptors
        .iter()
        .map(|d| (d.key.clone(), d.label.clone(), d.color, d.visible))
        .collect();

    for (key, label, color, visible) in toggles {
        let mut checked = visible;
        if ui
            .checkbox(&mut checked, RichText::new(label).color(color))
            .changed()
        {
            state.on_toggle_changed(&key, checked);
        }
    }
}

fn time_range(ui: &mut Ui, state: &mut AppState, shell: &mut ShellState) {
    let Some((min_year, max_year)) = state.dataset.as_ref().and_then(|ds| ds.year_bounds()) else {
        ui.label("No dataset loaded.");
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Start");
        ui.add(egui::DragValue::new(&mut shell.range_input.0).range(min_year..=max_year));
        ui.label("End");
        ui.add(egui::DragValue::new(&mut shell.range_input.1).range(min_year..=max_year));
    });

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Apply").clicked() {
            let (start, end) = shell.range_input;
            // The state reports a bad range in the status line itself.
            let _ = state.on_filter_changed(start, end);
        }
        if ui.button("Reset").clicked() && state.on_filter_reset().is_ok() {
            shell.range_input = (min_year, max_year);
        }
    });

    if let Some((start, end)) = state.range {
        ui.label(RichText::new(format!("Showing {start}-{end}")).weak());
    }
}

fn overlay_controls(ui: &mut Ui, state: &mut AppState) {
    let mut overlays = state.overlays;

    ui.checkbox(&mut overlays.show_raw, "Show data series");
    ui.checkbox(&mut overlays.show_trend, "Show linear trend");
    ui.checkbox(&mut overlays.show_moving_average, "Show moving average");
    if overlays.show_moving_average {
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Window");
            ui.add(
                egui::DragValue::new(&mut overlays.window)
                    .range(1..=50)
                    .suffix(" yr"),
            );
        });
    }

    if overlays != state.overlays {
        state.on_overlay_changed(overlays);
    }

    if state.overlays.show_trend && !state.payload.trend_slopes.is_empty() {
        ui.add_space(4.0);
        ui.strong("Trend slopes");
        for slope in &state.payload.trend_slopes {
            let per_decade = slope.slope_per_decade;
            let sign = if per_decade > 0.0 { "+" } else { "" };
            ui.label(RichText::new(&slope.label).color(slope.color).strong());
            ui.label(format!("  {sign}{per_decade:.2}°C/decade"));
            ui.label(RichText::new(format!("  R² = {:.4}", slope.r_squared)).weak());
        }
    }
}

fn statistics(ui: &mut Ui, state: &mut AppState, shell: &mut ShellState) {
    let summaries = state.statistics();
    if summaries.is_empty() {
        ui.label(RichText::new("Select datasets to view statistics").weak());
        return;
    }

    for (descriptor, summary) in &summaries {
        let [mean, std_dev, min, max] = summary.display_fields();
        ui.label(RichText::new(&descriptor.label).color(descriptor.color).strong());
        egui::Grid::new(("stats", descriptor.key.as_str()))
            .num_columns(2)
            .show(ui, |ui: &mut Ui| {
                ui.label("Mean");
                ui.label(format!("{mean}°C"));
                ui.end_row();
                ui.label("Std Dev");
                ui.label(format!("{std_dev}°C"));
                ui.end_row();
                ui.label("Range");
                ui.label(format!("{min}°C to {max}°C"));
                ui.end_row();
            });
        ui.add_space(4.0);
    }

    let several_visible = summaries.len() > 1;
    drop(summaries);

    if several_visible && ui.button("Advanced analysis…").clicked() {
        match state.run_analysis() {
            Ok(report) => {
                log::info!(
                    "Analysis over {:?}: {} trends",
                    report.period,
                    report.trends.len()
                );
                shell.show_analysis = true;
            }
            Err(e) => log::warn!("Analysis failed: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Advanced analysis window
// ---------------------------------------------------------------------------

/// Floating window with the correlation and trend tables.
pub fn analysis_window(ctx: &egui::Context, state: &AppState, open: &mut bool) {
    let Some(report) = &state.analysis else {
        *open = false;
        return;
    };
    let label_of = |key: &str| {
        state
            .descriptors
            .iter()
            .find(|d| d.key == key)
            .map_or_else(|| key.to_string(), |d| d.label.clone())
    };

    egui::Window::new("Advanced Statistical Analysis")
        .open(open)
        .default_width(560.0)
        .show(ctx, |ui: &mut Ui| {
            ui.strong(format!(
                "Analysis Period: {} ({} years)",
                report.period.as_deref().unwrap_or("N/A"),
                report.total_years
            ));
            ui.separator();

            if !report.correlations.is_empty() {
                ui.heading("Dataset Correlations");
                let rows: Vec<(String, String, String, usize)> = report
                    .correlations
                    .iter()
                    .flat_map(|(a, row)| {
                        row.iter().map(move |(b, corr)| (a, b, corr))
                    })
                    .map(|(a, b, corr)| {
                        (
                            format!("{} vs {}", label_of(a), label_of(b)),
                            corr.correlation.map_or("N/A".to_string(), |r| format!("{r:.4}")),
                            corr.p_value.map_or("N/A".to_string(), |p| format!("{p:.6}")),
                            corr.n_samples,
                        )
                    })
                    .collect();

                ui.push_id("correlations", |ui: &mut Ui| {
                    TableBuilder::new(ui)
                        .striped(true)
                        .column(Column::auto().at_least(220.0))
                        .columns(Column::auto().at_least(80.0), 3)
                        .header(20.0, |mut header| {
                            for title in ["Dataset Pair", "Correlation", "P-value", "Samples"] {
                                header.col(|ui| {
                                    ui.strong(title);
                                });
                            }
                        })
                        .body(|mut body| {
                            for (pair, r, p, n) in &rows {
                                body.row(18.0, |mut row| {
                                    row.col(|ui| {
                                        ui.label(pair);
                                    });
                                    row.col(|ui| {
                                        ui.label(r);
                                    });
                                    row.col(|ui| {
                                        ui.label(p);
                                    });
                                    row.col(|ui| {
                                        ui.label(n.to_string());
                                    });
                                });
                            }
                        });
                });
                ui.label(
                    RichText::new(
                        "Correlation: -1 = perfect negative, 0 = none, +1 = perfect positive. \
                         P-value < 0.05 typically indicates significance.",
                    )
                    .weak(),
                );
                ui.add_space(8.0);
            }

            if !report.trends.is_empty() {
                ui.heading("Linear Trend Analysis");
                ui.push_id("trends", |ui: &mut Ui| {
                    TableBuilder::new(ui)
                        .striped(true)
                        .column(Column::auto().at_least(160.0))
                        .columns(Column::auto().at_least(80.0), 4)
                        .header(20.0, |mut header| {
                            for title in ["Dataset", "Trend (°C/decade)", "R-squared", "Period", "Samples"] {
                                header.col(|ui| {
                                    ui.strong(title);
                                });
                            }
                        })
                        .body(|mut body| {
                            for (key, trend) in &report.trends {
                                body.row(18.0, |mut row| {
                                    row.col(|ui| {
                                        ui.label(label_of(key));
                                    });
                                    row.col(|ui| {
                                        let sign = if trend.slope_per_decade > 0.0 { "+" } else { "" };
                                        ui.label(format!("{sign}{}°C", trend.slope_per_decade));
                                    });
                                    row.col(|ui| {
                                        ui.label(trend.r_squared.to_string());
                                    });
                                    row.col(|ui| {
                                        ui.label(&trend.period);
                                    });
                                    row.col(|ui| {
                                        ui.label(trend.n_samples.to_string());
                                    });
                                });
                            }
                        });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, app: &mut ClimateViewerApp) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(app);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Export CSV…").clicked() {
                export_csv_dialog(&mut app.state);
                ui.close_menu();
            }
            if ui.button("Export PNG…").clicked() {
                app.shell.screenshot_pending = true;
                ui.ctx()
                    .send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&app.state.dataset, &app.state.view) {
            ui.label(format!("{} years loaded, {} in view", ds.len(), view.len()));
        }

        ui.separator();

        ui.checkbox(&mut app.shell.dark_mode, "Dark mode");

        if app.state.loading {
            ui.spinner();
        }

        if let Some(msg) = &app.state.status_message {
            let color = match msg.level {
                StatusLevel::Error => Color32::RED,
                StatusLevel::Success => Color32::from_rgb(40, 160, 70),
                StatusLevel::Info => ui.visuals().text_color(),
            };
            ui.label(RichText::new(&msg.text).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(app: &mut ClimateViewerApp) {
    let file = rfd::FileDialog::new()
        .set_title("Open anomaly data")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        app.state.set_status(format!("Loading {}…", path.display()), StatusLevel::Info);
        app.open_path(&path);
    }
}

fn export_csv_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_file_name("climate_data.csv")
        .add_filter("CSV Files", &["csv"])
        .save_file()
    else {
        return;
    };

    if let Err(e) = state.export_csv(&path) {
        log::error!("CSV export failed: {e:#}");
        state.set_status(format!("Export failed: {e:#}"), StatusLevel::Error);
    }
}
