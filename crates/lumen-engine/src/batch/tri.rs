use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;

use super::{take_window, Submission};

/// Maximum number of unflushed triangle vertices (a multiple of 3).
pub const MAX_TRI_VERTS: usize = 8192;

/// Shorter segments are dropped.
const MIN_LINE_LEN: f32 = 0.001;

/// Vertex layout (24 bytes): `pos [f32; 2]`, `color [f32; 4]`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TriVertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

impl TriVertex {
    #[inline]
    fn new(p: Vec2, color: [f32; 4]) -> Self {
        Self { pos: [p.x, p.y], color }
    }
}

/// Accumulates thick lines, polygon outlines and fan-filled polygons as a flat
/// triangle list. Glow never applies here.
#[derive(Debug, Default)]
pub struct TriangleBatch {
    vertices: Vec<TriVertex>,
    pending_from: usize,
}

impl TriangleBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.pending_from = 0;
    }

    #[inline]
    pub fn vertices(&self) -> &[TriVertex] {
        &self.vertices
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.vertices.len() - self.pending_from
    }

    /// A `width`-thick segment from `a` to `b`: one quad, two triangles.
    pub fn add_line(&mut self, a: Vec2, b: Vec2, color: Color, width: f32, out: &mut Vec<Submission>) {
        let d = b - a;
        let len = d.length();
        if !(len >= MIN_LINE_LEN) {
            return;
        }

        let n = d.perp() * (width * 0.5 / len);
        let c = color.to_array();

        self.push_triangle([a + n, a - n, b + n], c, out);
        self.push_triangle([a - n, b - n, b + n], c, out);
    }

    /// Strokes consecutive points; `closed` adds the last-to-first segment
    /// when there are more than two points.
    pub fn add_polygon_outline(
        &mut self,
        points: &[Vec2],
        color: Color,
        width: f32,
        closed: bool,
        out: &mut Vec<Submission>,
    ) {
        for pair in points.windows(2) {
            self.add_line(pair[0], pair[1], color, width, out);
        }
        if closed && points.len() > 2 {
            self.add_line(points[points.len() - 1], points[0], color, width, out);
        }
    }

    /// Fan-triangulates from `points[0]`.
    ///
    /// Only convex (or star-shaped about the first point) polygons fill
    /// correctly; concave input produces overlapping or missing triangles.
    pub fn add_filled_polygon(&mut self, points: &[Vec2], color: Color, out: &mut Vec<Submission>) {
        if points.len() < 3 {
            return;
        }
        let c = color.to_array();
        let origin = points[0];
        for pair in points[1..].windows(2) {
            self.push_triangle([origin, pair[0], pair[1]], c, out);
        }
    }

    fn push_triangle(&mut self, tri: [Vec2; 3], color: [f32; 4], out: &mut Vec<Submission>) {
        if self.pending_len() + 3 > MAX_TRI_VERTS {
            log::trace!("triangle batch full ({MAX_TRI_VERTS}); implicit flush");
            self.flush(out);
        }
        self.vertices.extend(tri.iter().map(|&p| TriVertex::new(p, color)));
    }

    pub fn flush(&mut self, out: &mut Vec<Submission>) {
        if let Some(range) = take_window(&mut self.pending_from, self.vertices.len()) {
            out.push(Submission::Triangles(range));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn positions(batch: &TriangleBatch) -> Vec<[f32; 2]> {
        batch.vertices().iter().map(|v| v.pos).collect()
    }

    // ── lines ─────────────────────────────────────────────────────────────

    #[test]
    fn horizontal_line_is_offset_along_perpendicular() {
        let mut batch = TriangleBatch::new();
        let mut out = Vec::new();
        batch.add_line(v(0.0, 10.0), v(10.0, 10.0), Color::WHITE, 4.0, &mut out);

        assert_eq!(
            positions(&batch),
            vec![
                [0.0, 12.0], [0.0, 8.0], [10.0, 12.0],
                [0.0, 8.0], [10.0, 8.0], [10.0, 12.0],
            ]
        );
    }

    #[test]
    fn zero_length_line_emits_nothing() {
        let mut batch = TriangleBatch::new();
        let mut out = Vec::new();
        batch.add_line(v(5.0, 5.0), v(5.0, 5.0), Color::WHITE, 2.0, &mut out);
        batch.add_line(v(5.0, 5.0), v(5.0, 5.0005), Color::WHITE, 2.0, &mut out);
        assert!(batch.vertices().is_empty());
    }

    #[test]
    fn nan_line_emits_nothing() {
        let mut batch = TriangleBatch::new();
        let mut out = Vec::new();
        batch.add_line(v(f32::NAN, 0.0), v(1.0, 1.0), Color::WHITE, 2.0, &mut out);
        assert!(batch.vertices().is_empty());
    }

    // ── outlines ──────────────────────────────────────────────────────────

    #[test]
    fn closed_outline_has_one_segment_per_point() {
        let mut batch = TriangleBatch::new();
        let mut out = Vec::new();
        let square = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)];
        batch.add_polygon_outline(&square, Color::WHITE, 1.0, true, &mut out);
        assert_eq!(batch.vertices().len(), 4 * 6);
    }

    #[test]
    fn open_outline_skips_closing_segment() {
        let mut batch = TriangleBatch::new();
        let mut out = Vec::new();
        let square = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)];
        batch.add_polygon_outline(&square, Color::WHITE, 1.0, false, &mut out);
        assert_eq!(batch.vertices().len(), 3 * 6);
    }

    #[test]
    fn two_point_closed_outline_is_a_single_segment() {
        let mut batch = TriangleBatch::new();
        let mut out = Vec::new();
        batch.add_polygon_outline(&[v(0.0, 0.0), v(5.0, 0.0)], Color::WHITE, 1.0, true, &mut out);
        assert_eq!(batch.vertices().len(), 6);
    }

    // ── fills ─────────────────────────────────────────────────────────────

    #[test]
    fn fill_is_a_fan_from_first_point() {
        let mut batch = TriangleBatch::new();
        let mut out = Vec::new();
        let pentagon = [v(0.0, 0.0), v(2.0, 0.0), v(3.0, 2.0), v(1.0, 3.0), v(-1.0, 2.0)];
        batch.add_filled_polygon(&pentagon, Color::WHITE, &mut out);

        let pos = positions(&batch);
        assert_eq!(pos.len(), 9);
        assert!(pos.chunks(3).all(|tri| tri[0] == [0.0, 0.0]));
    }

    #[test]
    fn fill_needs_three_points() {
        let mut batch = TriangleBatch::new();
        let mut out = Vec::new();
        batch.add_filled_polygon(&[v(0.0, 0.0), v(1.0, 1.0)], Color::WHITE, &mut out);
        assert!(batch.vertices().is_empty());
    }

    // ── capacity ──────────────────────────────────────────────────────────

    #[test]
    fn overflow_flushes_on_triangle_boundary() {
        let mut batch = TriangleBatch::new();
        let mut out = Vec::new();
        let lines = MAX_TRI_VERTS / 6 + 1;
        for i in 0..lines {
            let y = i as f32;
            batch.add_line(v(0.0, y), v(10.0, y), Color::WHITE, 1.0, &mut out);
        }
        batch.flush(&mut out);

        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|s| s.len() % 3 == 0));
        let drawn: u32 = out.iter().map(Submission::len).sum();
        assert_eq!(drawn as usize, lines * 6);
    }
}
