use std::path::Path;
use std::sync::Arc;

use eframe::egui;

use climate_viewer::config::AppConfig;
use climate_viewer::data::loader::load_file;
use climate_viewer::state::{AppState, StatusLevel};

use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// Shell-only state (widgets and pending actions, not dashboard data)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ShellState {
    pub dark_mode: bool,
    /// Year fields of the time-range form; applied only on "Apply".
    pub range_input: (i32, i32),
    /// A PNG export is waiting for the next screenshot event.
    pub screenshot_pending: bool,
    pub show_analysis: bool,
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ClimateViewerApp {
    pub state: AppState,
    pub shell: ShellState,
}

impl ClimateViewerApp {
    pub fn new(config: &AppConfig) -> Self {
        let mut app = Self {
            state: AppState::new(config),
            shell: ShellState {
                dark_mode: config.dark_mode,
                ..ShellState::default()
            },
        };
        if let Some(path) = &config.data_file {
            app.open_path(path);
        }
        app
    }

    /// Load a dataset and reset the range form to its bounds.
    pub fn open_path(&mut self, path: &Path) {
        self.state.loading = true;
        match load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} years with channels {:?}",
                    dataset.len(),
                    dataset.channel_keys().collect::<Vec<_>>()
                );
                self.state.on_data_loaded(dataset);
                if let Some(bounds) = self.state.range {
                    self.shell.range_input = bounds;
                }
            }
            Err(e) => self.state.on_load_failed(&e),
        }
    }

    fn handle_screenshot(&mut self, ctx: &egui::Context) {
        if !self.shell.screenshot_pending {
            return;
        }
        let mut screenshot: Option<Arc<egui::ColorImage>> = None;
        ctx.input(|i| {
            for event in &i.raw.events {
                if let egui::Event::Screenshot { image, .. } = event {
                    screenshot = Some(image.clone());
                }
            }
        });
        let Some(image) = screenshot else {
            return;
        };
        self.shell.screenshot_pending = false;

        let Some(path) = rfd::FileDialog::new()
            .set_file_name("climate_chart.png")
            .add_filter("PNG Image", &["png"])
            .save_file()
        else {
            return;
        };

        let rgba: Vec<u8> = image
            .pixels
            .iter()
            .flat_map(|c| [c.r(), c.g(), c.b(), c.a()])
            .collect();
        let saved = image::RgbaImage::from_raw(image.width() as u32, image.height() as u32, rgba)
            .ok_or_else(|| "screenshot buffer has the wrong size".to_string())
            .and_then(|img| img.save(&path).map_err(|e| e.to_string()));
        match saved {
            Ok(()) => {
                log::info!("Saved chart to {}", path.display());
                self.state.set_status("Chart exported as PNG", StatusLevel::Success);
            }
            Err(e) => {
                log::error!("Failed to save chart: {e}");
                self.state.set_status(format!("Failed to save image: {e}"), StatusLevel::Error);
            }
        }
    }
}

impl eframe::App for ClimateViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(if self.shell.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        self.handle_screenshot(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, self);
        });

        // ---- Left side panel: datasets, range, overlays, statistics ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &mut self.shell);
            });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::anomaly_plot(ui, &self.state);
        });

        // ---- Floating window: advanced analysis ----
        if self.shell.show_analysis {
            panels::analysis_window(ctx, &self.state, &mut self.shell.show_analysis);
        }
    }
}
