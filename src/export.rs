//! Cropping the selection and handing it to the file and clipboard sinks.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use eframe::egui::Rect;
use image::{ImageFormat, RgbaImage};
use log::{info, warn};

use crate::error::ExportError;

/// Integer crop bounds inside a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Maps normalized bounds onto the raster grid, or `None` when nothing
/// of the selection is left to crop.
pub fn pixel_region(bounds: Rect, raster_width: u32, raster_height: u32) -> Option<PixelRect> {
    if bounds.min.x == bounds.max.x || bounds.min.y == bounds.max.y {
        return None;
    }

    let clamp = |v: f32, limit: u32| v.round().clamp(0.0, limit as f32) as u32;
    let x0 = clamp(bounds.min.x, raster_width);
    let y0 = clamp(bounds.min.y, raster_height);
    let x1 = clamp(bounds.max.x, raster_width);
    let y1 = clamp(bounds.max.y, raster_height);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(PixelRect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

pub trait FileSink {
    /// Persists the encoded image, returning where it went.
    fn write(&self, png: &[u8]) -> Result<PathBuf, ExportError>;
}

pub trait ClipboardSink {
    /// Starts a clipboard write. Initialization problems are reported here,
    /// the outcome of the write itself through the returned completion.
    fn submit(&self, png: Arc<[u8]>) -> Result<ClipboardCompletion, ExportError>;
}

/// Sending half of a [`ClipboardCompletion`].
pub struct CompletionSignal {
    tx: Sender<Result<(), ExportError>>,
}

impl CompletionSignal {
    pub fn complete(self, result: Result<(), ExportError>) {
        // The waiting side may have given up already.
        let _ = self.tx.send(result);
    }
}

/// One-shot notice that the clipboard holds the image.
pub struct ClipboardCompletion {
    rx: Receiver<Result<(), ExportError>>,
}

impl ClipboardCompletion {
    pub fn channel() -> (CompletionSignal, ClipboardCompletion) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        (CompletionSignal { tx }, ClipboardCompletion { rx })
    }

    pub fn wait(self, timeout: Duration) -> Result<(), ExportError> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ExportError::ClipboardTimeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(ExportError::ClipboardDisconnected),
        }
    }
}

/// A finished crop whose clipboard write may still be in flight.
pub struct Export {
    pub region: PixelRect,
    pub image: RgbaImage,
    pub path: PathBuf,
    pub clipboard: ClipboardCompletion,
}

impl Export {
    /// Blocks until the clipboard write lands or `timeout` passes.
    ///
    /// A timeout only warns: the file is already on disk.
    pub fn finish(self, timeout: Duration) -> Result<(), ExportError> {
        match self.clipboard.wait(timeout) {
            Ok(()) => {
                info!("copied {}x{} image to clipboard", self.image.width(), self.image.height());
                Ok(())
            }
            Err(err @ ExportError::ClipboardTimeout(_)) => {
                warn!("{err}; exiting anyway");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

pub struct Exporter<F, C> {
    file: F,
    clipboard: C,
}

impl<F: FileSink, C: ClipboardSink> Exporter<F, C> {
    pub fn new(file: F, clipboard: C) -> Self {
        Self { file, clipboard }
    }

    /// Crops `bounds` out of `raster`, encodes it once and hands the bytes to
    /// both sinks. Returns `Ok(None)` for an empty selection.
    pub fn request_export(
        &self,
        raster: &RgbaImage,
        bounds: Rect,
    ) -> Result<Option<Export>, ExportError> {
        let Some(region) = pixel_region(bounds, raster.width(), raster.height()) else {
            warn!("selection {bounds:?} is empty, nothing to export");
            return Ok(None);
        };

        let image =
            image::imageops::crop_imm(raster, region.x, region.y, region.width, region.height)
                .to_image();

        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        let png: Arc<[u8]> = png.into();

        let path = self.file.write(&png)?;
        info!("saved {}x{} screenshot to {}", region.width, region.height, path.display());

        let clipboard = self.clipboard.submit(png)?;
        Ok(Some(Export {
            region,
            image,
            path,
            clipboard,
        }))
    }
}

/// Writes each export to a timestamped PNG file.
pub struct PngFileSink {
    dir: PathBuf,
    name_format: String,
}

impl PngFileSink {
    pub fn new(dir: impl AsRef<Path>, name_format: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            name_format: name_format.into(),
        }
    }

    pub fn next_path(&self) -> PathBuf {
        let name = chrono::Local::now().format(&self.name_format).to_string();
        self.dir.join(name)
    }
}

impl FileSink for PngFileSink {
    fn write(&self, png: &[u8]) -> Result<PathBuf, ExportError> {
        let path = self.next_path();
        std::fs::write(&path, png).map_err(|source| ExportError::FileWrite {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::Pos2;
    use image::Rgba;
    use std::cell::RefCell;

    use crate::geometry::Span;
    use crate::interaction::{ButtonKind, Buttons, PointerEvent, PointerKind, Session};

    #[derive(Default)]
    struct MemoryFile {
        writes: RefCell<Vec<Vec<u8>>>,
    }

    impl FileSink for &MemoryFile {
        fn write(&self, png: &[u8]) -> Result<PathBuf, ExportError> {
            self.writes.borrow_mut().push(png.to_vec());
            Ok(PathBuf::from("memory.png"))
        }
    }

    #[derive(Default)]
    struct MemoryClipboard {
        writes: RefCell<Vec<Arc<[u8]>>>,
    }

    impl ClipboardSink for &MemoryClipboard {
        fn submit(&self, png: Arc<[u8]>) -> Result<ClipboardCompletion, ExportError> {
            self.writes.borrow_mut().push(png);
            let (signal, completion) = ClipboardCompletion::channel();
            signal.complete(Ok(()));
            Ok(completion)
        }
    }

    struct FailingFile;

    impl FileSink for FailingFile {
        fn write(&self, _png: &[u8]) -> Result<PathBuf, ExportError> {
            Err(ExportError::FileWrite {
                path: PathBuf::from("/nowhere/x.png"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }
    }

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    #[test]
    fn crops_exactly_the_selection() {
        let raster = gradient(200, 100);
        let file = MemoryFile::default();
        let clipboard = MemoryClipboard::default();
        let exporter = Exporter::new(&file, &clipboard);

        let bounds = Span::new(Pos2::new(100.0, 50.0), Pos2::ZERO).normalize();
        let export = exporter.request_export(&raster, bounds).unwrap().unwrap();

        assert_eq!(
            export.region,
            PixelRect {
                x: 0,
                y: 0,
                width: 100,
                height: 50
            }
        );
        assert_eq!(export.image.dimensions(), (100, 50));
        assert_eq!(export.image.get_pixel(99, 49), &Rgba([99, 49, 7, 255]));

        let files = file.writes.borrow();
        let clips = clipboard.writes.borrow();
        assert_eq!(files.len(), 1);
        assert_eq!(clips.len(), 1);
        assert_eq!(files[0].as_slice(), &*clips[0]);

        let decoded = image::load_from_memory_with_format(&files[0], ImageFormat::Png)
            .unwrap()
            .into_rgba8();
        assert_eq!(decoded, export.image);
        drop((files, clips));

        assert!(export.finish(Duration::from_millis(10)).is_ok());
    }

    #[test]
    fn offset_selection_keeps_source_pixels() {
        let raster = gradient(64, 64);
        let file = MemoryFile::default();
        let clipboard = MemoryClipboard::default();
        let exporter = Exporter::new(&file, &clipboard);

        let bounds = Rect::from_min_max(Pos2::new(10.0, 20.0), Pos2::new(30.0, 25.0));
        let export = exporter.request_export(&raster, bounds).unwrap().unwrap();
        assert_eq!(export.image.dimensions(), (20, 5));
        assert_eq!(export.image.get_pixel(0, 0), &Rgba([10, 20, 7, 255]));
    }

    #[test]
    fn degenerate_selection_writes_nothing() {
        let raster = gradient(50, 50);
        let file = MemoryFile::default();
        let clipboard = MemoryClipboard::default();
        let exporter = Exporter::new(&file, &clipboard);

        let flat = [
            Rect::from_min_max(Pos2::new(5.0, 5.0), Pos2::new(5.0, 40.0)),
            Rect::from_min_max(Pos2::new(5.0, 5.0), Pos2::new(40.0, 5.0)),
            Rect::from_min_max(Pos2::new(60.0, 60.0), Pos2::new(90.0, 90.0)),
        ];
        for bounds in flat {
            assert!(exporter.request_export(&raster, bounds).unwrap().is_none());
        }
        assert!(file.writes.borrow().is_empty());
        assert!(clipboard.writes.borrow().is_empty());
    }

    #[test]
    fn click_without_drag_exports_nothing() {
        let mut session = Session::new();
        let at = Pos2::new(5.0, 5.0);
        session.handle(PointerEvent::new(
            PointerKind::Press,
            at,
            Buttons::only(ButtonKind::Primary),
        ));
        session.handle(PointerEvent::new(PointerKind::Release, at, Buttons::NONE));
        session.commit();

        let file = MemoryFile::default();
        let clipboard = MemoryClipboard::default();
        let exporter = Exporter::new(&file, &clipboard);
        let bounds = session.export_selection().unwrap();
        assert!(exporter.request_export(&gradient(20, 20), bounds).unwrap().is_none());
        assert!(file.writes.borrow().is_empty());
        assert!(clipboard.writes.borrow().is_empty());
    }

    #[test]
    fn file_failure_skips_clipboard() {
        let clipboard = MemoryClipboard::default();
        let exporter = Exporter::new(FailingFile, &clipboard);
        let bounds = Rect::from_min_max(Pos2::ZERO, Pos2::new(10.0, 10.0));
        let err = exporter.request_export(&gradient(20, 20), bounds).err();
        assert!(matches!(err, Some(ExportError::FileWrite { .. })));
        assert!(clipboard.writes.borrow().is_empty());
    }

    #[test]
    fn selection_is_clamped_to_the_raster() {
        let bounds = Rect::from_min_max(Pos2::new(-20.0, 10.4), Pos2::new(150.0, 60.6));
        assert_eq!(
            pixel_region(bounds, 100, 100),
            Some(PixelRect {
                x: 0,
                y: 10,
                width: 100,
                height: 51
            })
        );
    }

    #[test]
    fn completion_wait_is_bounded() {
        let (_signal, completion) = ClipboardCompletion::channel();
        let err = completion.wait(Duration::from_millis(5)).unwrap_err();
        assert!(matches!(err, ExportError::ClipboardTimeout(_)));

        let (signal, completion) = ClipboardCompletion::channel();
        drop(signal);
        let err = completion.wait(Duration::from_millis(5)).unwrap_err();
        assert!(matches!(err, ExportError::ClipboardDisconnected));
    }

    fn pending_export(clipboard: ClipboardCompletion) -> Export {
        Export {
            region: PixelRect {
                x: 0,
                y: 0,
                width: 4,
                height: 4,
            },
            image: gradient(4, 4),
            path: PathBuf::from("memory.png"),
            clipboard,
        }
    }

    #[test]
    fn clipboard_timeout_still_finishes() {
        let (_signal, completion) = ClipboardCompletion::channel();
        assert!(pending_export(completion).finish(Duration::from_millis(5)).is_ok());
    }

    #[test]
    fn clipboard_write_error_is_fatal() {
        let (signal, completion) = ClipboardCompletion::channel();
        signal.complete(Err(ExportError::ClipboardDisconnected));
        let err = pending_export(completion).finish(Duration::from_millis(5)).unwrap_err();
        assert!(matches!(err, ExportError::ClipboardDisconnected));
    }

    #[test]
    fn lost_clipboard_worker_is_fatal() {
        let (signal, completion) = ClipboardCompletion::channel();
        drop(signal);
        let err = pending_export(completion).finish(Duration::from_millis(5)).unwrap_err();
        assert!(matches!(err, ExportError::ClipboardDisconnected));
    }

    #[test]
    fn file_names_follow_the_timestamp_pattern() {
        let sink = PngFileSink::new("shots", "%Y-%m-%d_%H-%M-%S.png");
        let path = sink.next_path();
        assert_eq!(path.parent(), Some(Path::new("shots")));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), "2024-01-31_23-59-59.png".len());
        assert!(name.ends_with(".png"));
        assert!(chrono::NaiveDateTime::parse_from_str(&name[..19], "%Y-%m-%d_%H-%M-%S").is_ok());
    }
}
