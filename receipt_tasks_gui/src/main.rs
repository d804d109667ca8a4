mod app;
mod logging;
mod state;

use std::process::ExitCode;

use eframe::{egui, NativeOptions};
use receipt_tasks_settings::{ReceiptSettings, SettingsStore, SETTINGS_FILE};
use tracing::{error, info, warn};

use crate::app::{ReceiptTaskApp, APP_TITLE};

fn main() -> ExitCode {
    let (settings, settings_error) = match SettingsStore::load(SETTINGS_FILE) {
        Ok(store) => (store.into_settings(), None),
        Err(err) => (ReceiptSettings::default(), Some(err)),
    };

    if let Err(err) = logging::init(&settings.log) {
        eprintln!("logging disabled: {err}");
    }
    if let Some(err) = settings_error {
        warn!(error = %err, "falling back to default settings");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "application started");

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([settings.window.width, settings.window.height])
            .with_resizable(true),
        ..Default::default()
    };
    let result = eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Box::new(ReceiptTaskApp::new(&settings))),
    );

    match result {
        Ok(()) => {
            info!("application closed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "failed to start the window");
            eprintln!("Error starting application: {err}");
            ExitCode::FAILURE
        }
    }
}
