use std::borrow::Cow;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use arboard::{Clipboard, ImageData};
use image::ImageFormat;
use log::debug;

use crate::error::ExportError;
use crate::export::{ClipboardCompletion, ClipboardSink};

/// System clipboard backed by arboard.
///
/// The clipboard lives on its own thread so the window can close while the
/// image is still being served.
pub struct ArboardSink {
    hold: Duration,
}

impl ArboardSink {
    /// `hold` bounds how long the worker keeps ownership of the clipboard
    /// on platforms where the owner has to stay alive to serve it.
    pub fn new(hold: Duration) -> Self {
        Self { hold }
    }
}

impl ClipboardSink for ArboardSink {
    fn submit(&self, png: Arc<[u8]>) -> Result<ClipboardCompletion, ExportError> {
        // arboard wants raw RGBA, so decode the shared PNG payload once here.
        let rgba = image::load_from_memory_with_format(&png, ImageFormat::Png)?.into_rgba8();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let (signal, completion) = ClipboardCompletion::channel();
        let hold = self.hold;

        thread::Builder::new()
            .name("clipboard".into())
            .spawn(move || {
                let mut clipboard = match Clipboard::new() {
                    Ok(clipboard) => {
                        let _ = ready_tx.send(Ok(()));
                        clipboard
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let data = ImageData {
                    width: rgba.width() as usize,
                    height: rgba.height() as usize,
                    bytes: Cow::Owned(rgba.into_raw()),
                };
                let result = set_image(&mut clipboard, data, hold);
                debug!("clipboard worker done: {result:?}");
                signal.complete(result.map_err(ExportError::ClipboardWrite));
            })
            .map_err(ExportError::ClipboardThread)?;

        ready_rx
            .recv()
            .map_err(|_| ExportError::ClipboardDisconnected)?
            .map_err(ExportError::ClipboardInit)?;
        Ok(completion)
    }
}

#[cfg(target_os = "linux")]
fn set_image(
    clipboard: &mut Clipboard,
    data: ImageData<'static>,
    hold: Duration,
) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    // X11 and Wayland only serve the selection while its owner is alive.
    clipboard
        .set()
        .wait_until(std::time::Instant::now() + hold)
        .image(data)
}

#[cfg(not(target_os = "linux"))]
fn set_image(
    clipboard: &mut Clipboard,
    data: ImageData<'static>,
    _hold: Duration,
) -> Result<(), arboard::Error> {
    clipboard.set_image(data)
}
