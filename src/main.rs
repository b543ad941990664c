mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::Context;
use app::IncidentExplorerApp;
use config::{DashboardConfig, PathSource};
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env();
    if config.path_source == PathSource::Default {
        log::warn!(
            "No dataset given; using {} (pass a path or set {})",
            config.data_path.display(),
            config::DATA_ENV_VAR
        );
    }

    // The dashboard never starts without data.
    let dataset = data::loader::load_file(&config.data_path).inspect_err(|e| {
        log::error!("Failed to load dataset: {e:#}");
    })?;
    log::info!(
        "Loaded {} records ({} incidents) from {}",
        dataset.len(),
        dataset.total_count(),
        config.data_path.display()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    eframe::run_native(
        "Homicidios en Bolívar – Incident Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(IncidentExplorerApp::new(dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("running the dashboard window")
}
