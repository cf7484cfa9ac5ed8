#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod config;
mod error;
mod io;
mod model;
mod ui;

use config::AppSettings;
use io::{FsDocumentStore, JsonFileApi};

fn main() -> eframe::Result<()> {
    let settings_path = config::settings_path();
    let settings = AppSettings::load(&settings_path);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = settings.resolved_data_dir();
    tracing::info!(data_dir = %data_dir.display(), user = %settings.user_email, "starting studio planner");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1360.0, 800.0])
            .with_min_inner_size([900.0, 500.0])
            .with_title("Studio Planner"),
        ..Default::default()
    };

    eframe::run_native(
        "Studio Planner",
        options,
        Box::new(move |cc| {
            let today = chrono::Local::now().date_naive();
            let api = JsonFileApi::open(&data_dir.join("workspace.json"), today, &settings.user_email)?;
            let documents = FsDocumentStore::new(data_dir.join("documents"), settings.storage_base_url.clone());
            Ok(Box::new(app::StudioApp::new(
                cc,
                settings,
                settings_path,
                Box::new(api),
                Box::new(documents),
            )))
        }),
    )
}
