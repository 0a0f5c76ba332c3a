use std::path::PathBuf;
use std::time::Duration;

use eframe::egui::{Color32, Stroke};

/// Session settings. There is no config file; these are the built-in values.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Index into the display list reported by the OS.
    pub display: usize,
    pub output_dir: PathBuf,
    /// `chrono` format string for exported file names.
    pub file_name_format: String,
    /// How long the clipboard worker keeps serving the image.
    pub clipboard_hold: Duration,
    /// Upper bound on waiting for the clipboard before exiting.
    pub clipboard_timeout: Duration,
    pub style: Style,
}

impl Default for Settings {
    fn default() -> Self {
        let clipboard_hold = Duration::from_secs(20);
        Self {
            display: 0,
            output_dir: PathBuf::from("."),
            file_name_format: "%Y-%m-%d_%H-%M-%S.png".to_string(),
            clipboard_hold,
            clipboard_timeout: clipboard_hold + Duration::from_secs(5),
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Style {
    /// Overlay painted outside the selection.
    pub shade: Color32,
    /// Outline of the selection box.
    pub selection: Stroke,
    pub markup_color: Color32,
    pub markup_width: f32,
    /// Radius of the spotlight around the pointer before anything is
    /// selected, in device pixels.
    pub marker_radius: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            shade: Color32::from_black_alpha(200),
            selection: Stroke::new(1.0, Color32::WHITE),
            markup_color: Color32::RED,
            markup_width: 2.0,
            marker_radius: 50.0,
        }
    }
}
