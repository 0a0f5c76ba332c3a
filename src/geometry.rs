//! Pure geometry for the selection overlay.
//!
//! All coordinates are device pixels with the origin at the top-left corner.
//! Nothing in here holds state.

use eframe::egui::{Pos2, Rect, Vec2};

/// Distance the arrow head steps back from the tip along the shaft.
pub const ARROW_HEAD_LENGTH: f32 = 30.0;
/// Perpendicular offset of each head corner from the shaft.
pub const ARROW_HEAD_HALF_WIDTH: f32 = 10.0;

const MARKER_SEGMENTS: usize = 48;

/// A chronological pair of corners: `start` is where the press happened,
/// `end` follows the drag. Never assume `start` is the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: Pos2,
    pub end: Pos2,
}

impl Span {
    /// Zero-sized span anchored at `at`.
    pub fn at(at: Pos2) -> Self {
        Self { start: at, end: at }
    }

    pub fn new(start: Pos2, end: Pos2) -> Self {
        Self { start, end }
    }

    pub fn normalize(&self) -> Rect {
        normalize(*self)
    }
}

/// Order-independent (min corner, max corner) view of a span.
pub fn normalize(span: Span) -> Rect {
    Rect {
        min: Pos2::new(span.start.x.min(span.end.x), span.start.y.min(span.end.y)),
        max: Pos2::new(span.start.x.max(span.end.x), span.start.y.max(span.end.y)),
    }
}

/// Closed outline of an axis-aligned rectangle, clockwise on screen.
pub fn rectangle_path(min: Pos2, max: Pos2) -> [Pos2; 4] {
    [
        min,
        Pos2::new(max.x, min.y),
        max,
        Pos2::new(min.x, max.y),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGeometry {
    /// Stroked line from start to end.
    pub shaft: [Pos2; 2],
    /// Filled triangle: tip, left corner, right corner.
    pub head: [Pos2; 3],
}

impl ArrowGeometry {
    pub fn tip(&self) -> Pos2 {
        self.head[0]
    }
}

pub fn arrow_geometry(start: Pos2, end: Pos2) -> ArrowGeometry {
    let angle = if start == end {
        0.0
    } else {
        (end.y - start.y).atan2(end.x - start.x)
    };
    let angle = if angle.is_finite() { angle } else { 0.0 };

    let back = end - Vec2::angled(angle) * ARROW_HEAD_LENGTH;
    let left = back + Vec2::angled(angle + std::f32::consts::FRAC_PI_2) * ARROW_HEAD_HALF_WIDTH;
    let right = back + Vec2::angled(angle - std::f32::consts::FRAC_PI_2) * ARROW_HEAD_HALF_WIDTH;

    ArrowGeometry {
        shaft: [start, end],
        head: [end, left, right],
    }
}

/// What the darkened overlay leaves uncovered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cutout {
    /// A normalized selection rectangle.
    Selection(Rect),
    /// No selection yet: a round spotlight follows the pointer.
    Cursor(Pos2),
}

/// The canvas outline plus an inversely wound hole, suitable for a nonzero
/// or even-odd fill.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskPath {
    pub outer: [Pos2; 4],
    pub hole: Vec<Pos2>,
}

pub fn mask_path(canvas: Vec2, cutout: Cutout, marker_radius: f32) -> MaskPath {
    let outer = rectangle_path(Pos2::ZERO, canvas.to_pos2());

    let hole = match cutout {
        Cutout::Selection(rect) => {
            // Reverse of `rectangle_path`, so the hole winds counter-clockwise.
            let mut hole = rectangle_path(rect.min, rect.max).to_vec();
            hole.reverse();
            hole
        }
        Cutout::Cursor(center) => (0..MARKER_SEGMENTS)
            .map(|i| {
                let t = -(i as f32) * std::f32::consts::TAU / MARKER_SEGMENTS as f32;
                center + Vec2::angled(t) * marker_radius
            })
            .collect(),
    };

    MaskPath { outer, hole }
}

/// Shoelace area. Positive for clockwise-on-screen polygons, negative for
/// the opposite winding.
pub fn signed_area(points: &[Pos2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f32 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice / 2.0
}
