use std::fmt::Display;
use std::time::Duration;

use color_eyre::eyre::{self, WrapErr, eyre};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::{CursorIcon, Key};
use image::RgbaImage;
use log::{error, info};

use crate::clipboard::ArboardSink;
use crate::config::Settings;
use crate::error::ExportError;
use crate::export::{Export, Exporter, PngFileSink};
use crate::input::PointerTracker;
use crate::interaction::{Session, Step};
use crate::render::Overlay;

/// How the window's session ended, reported back to `main`.
pub enum SessionEnd {
    Exported(Export),
    /// The selection had no area; nothing was written.
    Empty,
    Cancelled,
    Failed(ExportError),
}

/// Settles the session once the event loop has returned.
///
/// A pending clipboard write is awaited before a loop error is reported, so
/// a failing shutdown cannot cut the copy short.
pub fn conclude<E: Display>(
    ran: Result<(), E>,
    ended: &Receiver<SessionEnd>,
    clipboard_timeout: Duration,
) -> eyre::Result<()> {
    let finished = match ended.try_recv() {
        Ok(SessionEnd::Exported(export)) => {
            let path = export.path.clone();
            export
                .finish(clipboard_timeout)
                .wrap_err_with(|| format!("clipboard copy of {} failed", path.display()))
        }
        Ok(SessionEnd::Failed(err)) => Err(err).wrap_err("export failed"),
        Ok(SessionEnd::Empty) => {
            info!("selection was empty, nothing exported");
            Ok(())
        }
        Ok(SessionEnd::Cancelled) | Err(_) => {
            info!("closed without exporting");
            Ok(())
        }
    };

    ran.map_err(|e| eyre!("event loop failed: {e}"))?;
    finished
}

pub struct SnapCropApp {
    texture: egui::TextureHandle,
    raster: RgbaImage,
    session: Session,
    tracker: PointerTracker,
    exporter: Exporter<PngFileSink, ArboardSink>,
    settings: Settings,
    ended: Option<Sender<SessionEnd>>,
}

impl SnapCropApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        raster: RgbaImage,
        settings: Settings,
        ended: Sender<SessionEnd>,
    ) -> Self {
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [raster.width() as usize, raster.height() as usize],
            raster.as_flat_samples().as_slice(),
        );
        let texture = cc
            .egui_ctx
            .load_texture("screenshot", color_image, Default::default());

        let exporter = Exporter::new(
            PngFileSink::new(&settings.output_dir, settings.file_name_format.clone()),
            ArboardSink::new(settings.clipboard_hold),
        );

        Self {
            texture,
            raster,
            session: Session::new(),
            tracker: PointerTracker::new(),
            exporter,
            settings,
            ended: Some(ended),
        }
    }

    fn end(&mut self, ctx: &egui::Context, outcome: SessionEnd) {
        if let Some(ended) = self.ended.take() {
            let _ = ended.send(outcome);
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn export(&mut self, ctx: &egui::Context) {
        let Some(bounds) = self.session.export_selection() else {
            return;
        };
        let outcome = match self.exporter.request_export(&self.raster, bounds) {
            Ok(Some(export)) => SessionEnd::Exported(export),
            Ok(None) => SessionEnd::Empty,
            Err(err) => {
                error!("export failed: {err}");
                SessionEnd::Failed(err)
            }
        };
        self.end(ctx, outcome);
    }

    fn handle_input(&mut self, ctx: &egui::Context) -> Step {
        let pixels_per_point = ctx.pixels_per_point();
        let (events, commit, cancel) = ctx.input(|i| {
            (
                i.events.clone(),
                i.key_pressed(Key::Enter),
                i.key_pressed(Key::Escape) || i.viewport().close_requested(),
            )
        });

        if cancel {
            info!("session cancelled in {:?} mode", self.session.mode());
            self.end(ctx, SessionEnd::Cancelled);
            return Step::Ignored;
        }

        let mut step = Step::Ignored;
        for event in &events {
            if let Some(pointer) = self.tracker.translate(event, pixels_per_point) {
                match self.session.handle(pointer) {
                    Step::Ignored => {}
                    other => step = other,
                }
            }
        }
        if commit && self.session.commit() == Step::ExportRequested {
            step = Step::ExportRequested;
        }
        step
    }
}

impl eframe::App for SnapCropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.ended.is_none() {
            return;
        }
        if self.handle_input(ctx) == Step::ExportRequested {
            self.export(ctx);
        }
        if self.ended.is_none() {
            return;
        }

        ctx.set_cursor_icon(CursorIcon::Crosshair);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let overlay = Overlay {
                    texture: &self.texture,
                    style: &self.settings.style,
                    pixels_per_point: ctx.pixels_per_point(),
                    canvas: ctx.viewport_rect(),
                };
                ui.painter().extend(overlay.shapes(&self.session));
            });
    }
}
