#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use color_eyre::eyre::{Result, eyre};
use eframe::egui;

use snapcrop::app::{self, SnapCropApp};
use snapcrop::capture;
use snapcrop::config::Settings;

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::default();
    let raster = capture::capture_display(settings.display)
        .map_err(|e| eyre!("failed to capture the screen: {e}"))?;
    let clipboard_timeout = settings.clipboard_timeout;

    let (ended_tx, ended_rx) = crossbeam_channel::bounded(1);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("SnapCrop")
            .with_decorations(false)
            .with_fullscreen(true),
        ..Default::default()
    };
    let ran = eframe::run_native(
        "SnapCrop",
        options,
        Box::new(move |cc| Ok(Box::new(SnapCropApp::new(cc, raster, settings, ended_tx)))),
    );

    app::conclude(ran, &ended_rx, clipboard_timeout)
}
