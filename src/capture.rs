use image::RgbaImage;
use log::info;
use xcap::Monitor;

use crate::error::CaptureError;

/// Grabs the full contents of display `index`.
pub fn capture_display(index: usize) -> Result<RgbaImage, CaptureError> {
    let monitors = Monitor::all()?;
    let monitor = monitors
        .into_iter()
        .nth(index)
        .ok_or(CaptureError::NoDisplay(index))?;

    let image = monitor.capture_image()?;
    info!(
        "captured display {index} ({}): {}x{}",
        monitor.name().unwrap_or_default(),
        image.width(),
        image.height()
    );
    Ok(image)
}
