mod backend_bridge;
mod config;
mod controller;
mod media;
mod ui;

use anyhow::Context as _;
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::{
    backend_bridge::{
        commands::BackendCommand,
        runtime::{launch, UiNotifier},
    },
    config::{load_settings, CliArgs},
    controller::events::UiEvent,
    ui::{GalleryApp, PersistedPrefs, PREFS_STORAGE_KEY},
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = CliArgs::parse();
    let settings = load_settings(&args).context("failed to load gallery settings")?;
    tracing::info!(
        api = %settings.api_base_url,
        language = %settings.language,
        "starting vehicle gallery"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Vehicle Gallery")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Vehicle Gallery",
        options,
        Box::new(move |cc| {
            launch(
                cmd_rx,
                UiNotifier::new(ui_tx, Some(cc.egui_ctx.clone())),
                settings.clone(),
            );
            let prefs = cc.storage.and_then(|storage| {
                storage
                    .get_string(PREFS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedPrefs>(&text).ok())
            });
            Ok(Box::new(GalleryApp::new(cmd_tx, ui_rx, &settings, prefs)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("gallery window failed: {err}"))
}
