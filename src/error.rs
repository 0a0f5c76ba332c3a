use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no display at index {0}")]
    NoDisplay(usize),

    #[error("screen capture failed: {0}")]
    Screen(#[from] xcap::XCapError),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialize clipboard: {0}")]
    ClipboardInit(#[source] arboard::Error),

    #[error("failed to put image on clipboard: {0}")]
    ClipboardWrite(#[source] arboard::Error),

    #[error("failed to start clipboard thread: {0}")]
    ClipboardThread(#[source] std::io::Error),

    #[error("clipboard did not confirm the write within {0:?}")]
    ClipboardTimeout(Duration),

    #[error("clipboard worker exited without reporting")]
    ClipboardDisconnected,
}
