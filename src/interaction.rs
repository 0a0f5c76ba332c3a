//! Pointer-driven session state.
//!
//! A [`Session`] is owned by the frame loop and fed one [`PointerEvent`] at a
//! time. It drags out a selection, then collects markups on top of it, and
//! finally flags the selection for export.

use eframe::egui::{Pos2, Rect};
use log::{debug, info};

use crate::geometry::{Cutout, Span};
use crate::markup::{AnnotationStore, Markup, MarkupKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    /// Box selection, rectangle markups.
    Primary,
    /// Save gesture, arrow markups.
    Secondary,
}

/// Set of pointer buttons held down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub primary: bool,
    pub secondary: bool,
    /// Any button other than primary and secondary.
    pub other: bool,
}

impl Buttons {
    pub const NONE: Buttons = Buttons {
        primary: false,
        secondary: false,
        other: false,
    };

    pub fn only(button: ButtonKind) -> Self {
        let mut buttons = Self::NONE;
        buttons.set(button, true);
        buttons
    }

    pub fn set(&mut self, button: ButtonKind, down: bool) {
        match button {
            ButtonKind::Primary => self.primary = down,
            ButtonKind::Secondary => self.secondary = down,
        }
    }

    pub fn contains(&self, button: ButtonKind) -> bool {
        match button {
            ButtonKind::Primary => self.primary,
            ButtonKind::Secondary => self.secondary,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.primary || self.secondary || self.other)
    }

    /// The held button, if exactly one supported button is down.
    pub fn single(&self) -> Option<ButtonKind> {
        match (self.primary, self.secondary, self.other) {
            (true, false, false) => Some(ButtonKind::Primary),
            (false, true, false) => Some(ButtonKind::Secondary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Press,
    Drag,
    Release,
}

/// A pointer event in device pixels.
///
/// For `Press` the button set includes the newly pressed button; for
/// `Release` it holds whatever is still down afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Pos2,
    pub buttons: Buttons,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, position: Pos2, buttons: Buttons) -> Self {
        Self {
            kind,
            position,
            buttons,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    /// The initial box is being dragged with `button`.
    Selecting { button: ButtonKind, span: Span },
    /// Selection is frozen; `drawing` is the button of the markup gesture in
    /// progress, if any.
    Editing {
        selection: Span,
        drawing: Option<ButtonKind>,
    },
    /// Terminal: the selection is waiting to be exported.
    Exporting { selection: Span },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Selecting,
    Editing,
    Exporting,
}

/// What a call into the session did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Ignored,
    Changed,
    ExportRequested,
}

#[derive(Debug)]
pub struct Session {
    cursor: Pos2,
    phase: Phase,
    markups: AnnotationStore,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            cursor: Pos2::ZERO,
            phase: Phase::Idle,
            markups: AnnotationStore::new(),
        }
    }

    pub fn handle(&mut self, event: PointerEvent) -> Step {
        if matches!(self.phase, Phase::Exporting { .. }) {
            return Step::Ignored;
        }
        if matches!(event.kind, PointerKind::Move | PointerKind::Drag) {
            self.cursor = event.position;
        }

        match event.kind {
            PointerKind::Move => Step::Ignored,
            PointerKind::Press => self.press(event.position, event.buttons),
            PointerKind::Drag => self.drag(event.position, event.buttons),
            PointerKind::Release => self.release(event.buttons),
        }
    }

    fn press(&mut self, at: Pos2, buttons: Buttons) -> Step {
        let Some(button) = buttons.single() else {
            return Step::Ignored;
        };

        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Selecting {
                    button,
                    span: Span::at(at),
                };
                Step::Changed
            }
            Phase::Editing {
                selection,
                drawing: None,
            } => {
                self.phase = Phase::Editing {
                    selection,
                    drawing: Some(button),
                };
                let index = self.markups.begin(MarkupKind::from(button), at);
                debug!("started markup #{index} with {button:?}");
                Step::Changed
            }
            _ => Step::Ignored,
        }
    }

    fn drag(&mut self, to: Pos2, buttons: Buttons) -> Step {
        match &mut self.phase {
            Phase::Selecting { button, span } if buttons.contains(*button) => {
                span.end = to;
                Step::Changed
            }
            Phase::Editing {
                drawing: Some(button),
                ..
            } if buttons.contains(*button) => {
                self.markups.extend_active(to);
                Step::Changed
            }
            _ => Step::Ignored,
        }
    }

    fn release(&mut self, buttons: Buttons) -> Step {
        match self.phase {
            Phase::Selecting { button, span } if !buttons.contains(button) => match button {
                ButtonKind::Secondary => {
                    info!("selection saved: {:?}", span.normalize());
                    self.phase = Phase::Exporting { selection: span };
                    Step::ExportRequested
                }
                ButtonKind::Primary => {
                    debug!("selection frozen: {:?}", span.normalize());
                    self.phase = Phase::Editing {
                        selection: span,
                        drawing: None,
                    };
                    Step::Changed
                }
            },
            Phase::Editing {
                selection,
                drawing: Some(button),
            } if !buttons.contains(button) => {
                let index = self.markups.active();
                if let Some(markup) = self.markups.finish_active() {
                    debug!("finished {} markup #{index:?}: {:?}", markup.label(), markup.span);
                }
                self.phase = Phase::Editing {
                    selection,
                    drawing: None,
                };
                Step::Changed
            }
            _ => Step::Ignored,
        }
    }

    /// Finishes annotating and requests export of the frozen selection.
    pub fn commit(&mut self) -> Step {
        match self.phase {
            Phase::Editing {
                selection,
                drawing: None,
            } => {
                info!(
                    "committed {} markups on {:?}",
                    self.markups.len(),
                    selection.normalize()
                );
                self.phase = Phase::Exporting { selection };
                Step::ExportRequested
            }
            _ => Step::Ignored,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        match self.phase {
            Phase::Idle => Mode::Idle,
            Phase::Selecting { .. } => Mode::Selecting,
            Phase::Editing { .. } => Mode::Editing,
            Phase::Exporting { .. } => Mode::Exporting,
        }
    }

    pub fn cursor(&self) -> Pos2 {
        self.cursor
    }

    /// Normalized selection bounds, once a press has anchored them.
    pub fn selection(&self) -> Option<Rect> {
        match self.phase {
            Phase::Idle => None,
            Phase::Selecting { span, .. } => Some(span.normalize()),
            Phase::Editing { selection, .. } | Phase::Exporting { selection } => {
                Some(selection.normalize())
            }
        }
    }

    pub fn export_requested(&self) -> bool {
        self.mode() == Mode::Exporting
    }

    /// Normalized bounds to export, if export has been requested.
    pub fn export_selection(&self) -> Option<Rect> {
        match self.phase {
            Phase::Exporting { selection } => Some(selection.normalize()),
            _ => None,
        }
    }

    /// The spotlight follows the pointer until a selection drag has moved.
    pub fn cutout(&self) -> Cutout {
        match self.phase {
            Phase::Selecting { span, .. } if span.start == span.end => Cutout::Cursor(self.cursor),
            _ => match self.selection() {
                Some(rect) => Cutout::Selection(rect),
                None => Cutout::Cursor(self.cursor),
            },
        }
    }

    pub fn markups(&self) -> &[Markup] {
        self.markups.all()
    }
}
