//! Builds the egui shapes for one frame of the overlay.

use eframe::egui::epaint::Vertex;
use eframe::egui::{Color32, Mesh, Pos2, Rect, Shape, Stroke, TextureHandle, Vec2};

use crate::config::Style;
use crate::geometry::{self, MaskPath};
use crate::interaction::Session;
use crate::markup::{Markup, MarkupPaths};

/// Frame painter. Geometry arrives in device pixels and leaves in egui
/// points relative to `canvas`.
pub struct Overlay<'a> {
    pub texture: &'a TextureHandle,
    pub style: &'a Style,
    pub pixels_per_point: f32,
    pub canvas: Rect,
}

impl Overlay<'_> {
    pub fn shapes(&self, session: &Session) -> Vec<Shape> {
        let mut shapes = Vec::with_capacity(session.markups().len() * 2 + 4);

        let mut background = Mesh::with_texture(self.texture.id());
        background.add_rect_with_uv(self.canvas, unit_uv(), Color32::WHITE);
        shapes.push(Shape::mesh(background));

        let canvas_px = self.canvas.size() * self.pixels_per_point;
        let mask = geometry::mask_path(canvas_px, session.cutout(), self.style.marker_radius);
        self.push_mask(&mut shapes, &mask, canvas_px);

        if let Some(selection) = session.selection() {
            let outline = geometry::rectangle_path(selection.min, selection.max);
            shapes.push(Shape::closed_line(
                self.to_points(&outline),
                self.scaled(self.style.selection),
            ));
        }

        for markup in session.markups() {
            self.push_markup(&mut shapes, markup);
        }
        shapes
    }

    /// Darkens the canvas, then paints the screenshot back inside the hole.
    fn push_mask(&self, shapes: &mut Vec<Shape>, mask: &MaskPath, canvas_px: Vec2) {
        shapes.push(Shape::convex_polygon(
            self.to_points(&mask.outer),
            self.style.shade,
            Stroke::NONE,
        ));

        if geometry::signed_area(&mask.hole).abs() < 1.0 {
            return;
        }
        let mut spot = Mesh::with_texture(self.texture.id());
        for p in &mask.hole {
            spot.vertices.push(Vertex {
                pos: self.to_point(*p),
                uv: Pos2::new(p.x / canvas_px.x, p.y / canvas_px.y),
                color: Color32::WHITE,
            });
        }
        // The hole is convex, so a fan from its first corner covers it.
        for i in 1..mask.hole.len() as u32 - 1 {
            spot.add_triangle(0, i, i + 1);
        }
        shapes.push(Shape::mesh(spot));
    }

    fn push_markup(&self, shapes: &mut Vec<Shape>, markup: &Markup) {
        let stroke = self.scaled(Stroke::new(self.style.markup_width, self.style.markup_color));
        match markup.paths() {
            MarkupPaths::Rectangle(outline) => {
                shapes.push(Shape::closed_line(self.to_points(&outline), stroke));
            }
            MarkupPaths::Arrow(arrow) => {
                let [start, _] = arrow.shaft;
                shapes.push(Shape::line_segment(
                    [self.to_point(start), self.to_point(arrow.tip())],
                    stroke,
                ));
                shapes.push(Shape::convex_polygon(
                    self.to_points(&arrow.head),
                    self.style.markup_color,
                    Stroke::NONE,
                ));
            }
        }
    }

    fn to_point(&self, device: Pos2) -> Pos2 {
        self.canvas.min + device.to_vec2() / self.pixels_per_point
    }

    fn to_points(&self, device: &[Pos2]) -> Vec<Pos2> {
        device.iter().map(|p| self.to_point(*p)).collect()
    }

    fn scaled(&self, stroke: Stroke) -> Stroke {
        Stroke::new(stroke.width / self.pixels_per_point, stroke.color)
    }
}

fn unit_uv() -> Rect {
    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0))
}
