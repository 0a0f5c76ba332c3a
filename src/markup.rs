use eframe::egui::Pos2;

use crate::geometry::{self, ArrowGeometry, Span};
use crate::interaction::ButtonKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupKind {
    Rectangle,
    Arrow,
}

impl From<ButtonKind> for MarkupKind {
    fn from(button: ButtonKind) -> Self {
        match button {
            ButtonKind::Primary => MarkupKind::Rectangle,
            ButtonKind::Secondary => MarkupKind::Arrow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Markup {
    pub kind: MarkupKind,
    pub span: Span,
}

/// Device-pixel outlines for painting a markup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkupPaths {
    Rectangle([Pos2; 4]),
    Arrow(ArrowGeometry),
}

impl Markup {
    pub fn paths(&self) -> MarkupPaths {
        match self.kind {
            MarkupKind::Rectangle => {
                let bounds = self.span.normalize();
                MarkupPaths::Rectangle(geometry::rectangle_path(bounds.min, bounds.max))
            }
            MarkupKind::Arrow => {
                MarkupPaths::Arrow(geometry::arrow_geometry(self.span.start, self.span.end))
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            MarkupKind::Rectangle => "Box",
            MarkupKind::Arrow => "Arrow",
        }
    }
}

/// Append-only list of markups drawn during one session.
///
/// Only the markup at `active` may still change; once its gesture ends it is
/// frozen. Insertion order is paint order, so later markups land on top.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    markups: Vec<Markup>,
    active: Option<usize>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, kind: MarkupKind, at: Pos2) -> usize {
        self.markups.push(Markup {
            kind,
            span: Span::at(at),
        });
        let index = self.markups.len() - 1;
        self.active = Some(index);
        index
    }

    pub fn extend_active(&mut self, to: Pos2) {
        if let Some(markup) = self.active.and_then(|i| self.markups.get_mut(i)) {
            markup.span.end = to;
        }
    }

    /// Freezes the markup being drawn, if any.
    pub fn finish_active(&mut self) -> Option<&Markup> {
        let index = self.active.take()?;
        self.markups.get(index)
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn all(&self) -> &[Markup] {
        &self.markups
    }

    pub fn len(&self) -> usize {
        self.markups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markups_keep_call_order() {
        let mut store = AnnotationStore::new();
        let kinds = [
            MarkupKind::Arrow,
            MarkupKind::Rectangle,
            MarkupKind::Rectangle,
            MarkupKind::Arrow,
        ];
        for (i, kind) in kinds.iter().enumerate() {
            let at = Pos2::new(i as f32, 0.0);
            assert_eq!(store.begin(*kind, at), i);
            store.extend_active(Pos2::new(i as f32, 10.0));
            store.extend_active(Pos2::new(i as f32, 20.0));
            if i % 2 == 0 {
                store.finish_active();
            }
        }

        assert_eq!(store.len(), kinds.len());
        let stored: Vec<_> = store.all().iter().map(|m| m.kind).collect();
        assert_eq!(stored, kinds);
        for (i, markup) in store.all().iter().enumerate() {
            assert_eq!(markup.span.start, Pos2::new(i as f32, 0.0));
            assert_eq!(markup.span.end, Pos2::new(i as f32, 20.0));
        }
    }

    #[test]
    fn extend_without_active_markup_is_a_no_op() {
        let mut store = AnnotationStore::new();
        store.extend_active(Pos2::new(5.0, 5.0));
        assert!(store.is_empty());

        store.begin(MarkupKind::Arrow, Pos2::new(1.0, 1.0));
        let finished = store.finish_active().copied();
        assert_eq!(finished.map(|m| m.label()), Some("Arrow"));
        store.extend_active(Pos2::new(9.0, 9.0));
        assert_eq!(store.all()[0].span.end, Pos2::new(1.0, 1.0));
        assert_eq!(store.active(), None);
    }

    #[test]
    fn rectangle_markup_is_normalized_for_painting() {
        let markup = Markup {
            kind: MarkupKind::Rectangle,
            span: Span::new(Pos2::new(80.0, 90.0), Pos2::new(40.0, 40.0)),
        };
        assert_eq!(
            markup.paths(),
            MarkupPaths::Rectangle([
                Pos2::new(40.0, 40.0),
                Pos2::new(80.0, 40.0),
                Pos2::new(80.0, 90.0),
                Pos2::new(40.0, 90.0),
            ])
        );
    }

    #[test]
    fn arrow_markup_keeps_its_direction() {
        let markup = Markup {
            kind: MarkupKind::Arrow,
            span: Span::new(Pos2::new(220.0, 70.0), Pos2::new(20.0, 20.0)),
        };
        match markup.paths() {
            MarkupPaths::Arrow(arrow) => {
                assert_eq!(arrow.shaft, [Pos2::new(220.0, 70.0), Pos2::new(20.0, 20.0)]);
                assert_eq!(arrow.tip(), Pos2::new(20.0, 20.0));
            }
            other => panic!("expected an arrow, got {other:?}"),
        }
    }

    #[test]
    fn button_decides_markup_kind() {
        assert_eq!(MarkupKind::from(ButtonKind::Primary), MarkupKind::Rectangle);
        assert_eq!(MarkupKind::from(ButtonKind::Secondary), MarkupKind::Arrow);
    }
}
