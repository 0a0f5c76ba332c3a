use eframe::egui::{Event, PointerButton, Pos2};

use crate::interaction::{ButtonKind, Buttons, PointerEvent, PointerKind};

/// Turns egui's raw input into [`PointerEvent`]s in device pixels.
///
/// egui reports moves and button changes separately; the tracker keeps the
/// held-button set so that a move with a button down becomes a drag.
#[derive(Debug, Default)]
pub struct PointerTracker {
    held: Buttons,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &Event, pixels_per_point: f32) -> Option<PointerEvent> {
        match event {
            Event::PointerMoved(pos) => {
                let kind = if self.held.is_empty() {
                    PointerKind::Move
                } else {
                    PointerKind::Drag
                };
                Some(PointerEvent::new(
                    kind,
                    to_device(*pos, pixels_per_point),
                    self.held,
                ))
            }
            Event::PointerButton {
                pos,
                button,
                pressed,
                ..
            } => {
                match button_kind(*button) {
                    Some(kind) => self.held.set(kind, *pressed),
                    None => self.held.other = *pressed,
                }
                let kind = if *pressed {
                    PointerKind::Press
                } else {
                    PointerKind::Release
                };
                Some(PointerEvent::new(
                    kind,
                    to_device(*pos, pixels_per_point),
                    self.held,
                ))
            }
            Event::PointerGone => {
                // Buttons released outside the window never report back.
                self.held = Buttons::NONE;
                None
            }
            _ => None,
        }
    }
}

fn button_kind(button: PointerButton) -> Option<ButtonKind> {
    match button {
        PointerButton::Primary => Some(ButtonKind::Primary),
        PointerButton::Secondary => Some(ButtonKind::Secondary),
        _ => None,
    }
}

fn to_device(pos: Pos2, pixels_per_point: f32) -> Pos2 {
    Pos2::new(pos.x * pixels_per_point, pos.y * pixels_per_point)
}
