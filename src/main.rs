mod app;
mod ui;

use app::ClimateViewerApp;
use climate_viewer::config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    // Logging comes up before the config is validated, so keep the error
    // and report it once the logger exists.
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .init();
    if let Some(e) = config_error {
        log::warn!("Ignoring config: {e:#}");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Climate Viewer – Temperature Anomalies",
        options,
        Box::new(move |_cc| Ok(Box::new(ClimateViewerApp::new(&config)))),
    )
}
