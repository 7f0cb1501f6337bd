use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::batch::Submission;
use crate::paint::Color;

use super::atlas::GlyphAtlas;

/// Maximum text vertices per frame (6 per glyph). Glyphs past it are dropped.
pub const MAX_TEXT_VERTS: usize = 4096;

/// Cursor advance for characters the atlas does not have, in ems.
pub const FALLBACK_ADVANCE: f32 = 0.6;

/// Horizontal anchor of a text run relative to its `x`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl From<&str> for Align {
    fn from(s: &str) -> Self {
        match s {
            "center" => Align::Center,
            "right" => Align::Right,
            _ => Align::Left,
        }
    }
}

/// Vertex layout (32 bytes): `pos [f32; 2]`, `uv [f32; 2]`, `color [f32; 4]`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TextVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// Lays out text against a baked [`GlyphAtlas`] into one vertex array.
#[derive(Debug)]
pub struct TextBatch {
    atlas: Arc<GlyphAtlas>,
    vertices: Vec<TextVertex>,
    pending_from: usize,
    dropped: usize,
}

impl TextBatch {
    pub fn new(atlas: Arc<GlyphAtlas>) -> Self {
        Self { atlas, vertices: Vec::new(), pending_from: 0, dropped: 0 }
    }

    pub fn atlas(&self) -> &Arc<GlyphAtlas> {
        &self.atlas
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.pending_from = 0;
        self.dropped = 0;
    }

    /// Drops text added since the last flush.
    pub fn discard_pending(&mut self) {
        self.vertices.truncate(self.pending_from);
    }

    #[inline]
    pub fn vertices(&self) -> &[TextVertex] {
        &self.vertices
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.vertices.len() - self.pending_from
    }

    /// Glyphs discarded this frame because the vertex budget ran out.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Sum of the scaled advances of the characters present in the atlas.
    ///
    /// This is the width alignment is computed from; missing characters do
    /// not count even though they still move the cursor when drawn.
    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        let preset = GlyphAtlas::closest_size(font_size);
        let scale = font_size / preset as f32;
        text.chars()
            .filter_map(|ch| self.atlas.get(preset, ch))
            .map(|g| g.advance * scale)
            .sum()
    }

    /// Appends one run of text with its top edge at `y`.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color, align: Align) {
        let preset = GlyphAtlas::closest_size(font_size);
        let scale = font_size / preset as f32;
        let c = color.to_array();

        let total = self.measure(text, font_size);
        let mut cursor = match align {
            Align::Left => x,
            Align::Center => x - total / 2.0,
            Align::Right => x - total,
        };

        for ch in text.chars() {
            let Some(g) = self.atlas.get(preset, ch).copied() else {
                cursor += font_size * FALLBACK_ADVANCE;
                continue;
            };

            if self.vertices.len() + 6 > MAX_TEXT_VERTS {
                self.dropped += 1;
                continue;
            }

            let (uv0, uv1) = self.atlas.uv(&g);
            let (x0, y0) = (cursor, y);
            let (x1, y1) = (cursor + g.w as f32 * scale, y + g.h as f32 * scale);

            let vert = |px: f32, py: f32, u: f32, v: f32| TextVertex { pos: [px, py], uv: [u, v], color: c };
            self.vertices.extend_from_slice(&[
                vert(x0, y0, uv0[0], uv0[1]),
                vert(x1, y0, uv1[0], uv0[1]),
                vert(x1, y1, uv1[0], uv1[1]),
                vert(x0, y0, uv0[0], uv0[1]),
                vert(x1, y1, uv1[0], uv1[1]),
                vert(x0, y1, uv0[0], uv1[1]),
            ]);

            cursor += g.advance * scale;
        }
    }

    pub fn flush(&mut self, out: &mut Vec<Submission>) {
        if self.pending_len() == 0 {
            return;
        }
        let range = self.pending_from as u32..self.vertices.len() as u32;
        self.pending_from = self.vertices.len();
        out.push(Submission::Text(range));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::atlas::tests::block_atlas;

    fn batch() -> TextBatch {
        TextBatch::new(Arc::new(block_atlas()))
    }

    /// Left edge of each glyph quad, in draw order.
    fn glyph_lefts(batch: &TextBatch) -> Vec<f32> {
        batch.vertices().chunks(6).map(|q| q[0].pos[0]).collect()
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn left_aligned_run_advances_per_glyph() {
        let mut b = batch();
        b.draw_text("AB", 10.0, 0.0, 16.0, Color::WHITE, Align::Left);
        // A advances 8px at 16px, B 12px.
        assert_eq!(glyph_lefts(&b), vec![10.0, 18.0]);
    }

    #[test]
    fn centered_run_is_centered_on_x() {
        let mut b = batch();
        b.draw_text("AB", 100.0, 0.0, 16.0, Color::WHITE, Align::Center);

        let total = b.measure("A", 16.0) + b.measure("B", 16.0);
        assert_eq!(total, 20.0);
        assert_eq!(glyph_lefts(&b), vec![90.0, 98.0]);

        let left = 90.0;
        let right = 98.0 + b.measure("B", 16.0);
        assert_eq!((left + right) / 2.0, 100.0);
    }

    #[test]
    fn right_aligned_run_ends_at_x() {
        let mut b = batch();
        b.draw_text("AB", 100.0, 0.0, 16.0, Color::WHITE, Align::Right);
        assert_eq!(glyph_lefts(&b), vec![80.0, 88.0]);
    }

    #[test]
    fn off_preset_sizes_scale_the_cell() {
        let mut b = batch();
        // 18 snaps to 16, scale 1.125; A's cell is 10x20 at 16px.
        b.draw_text("A", 0.0, 5.0, 18.0, Color::WHITE, Align::Left);
        let q = &b.vertices()[..6];
        assert_eq!(q[2].pos, [10.0 * 1.125, 5.0 + 20.0 * 1.125]);
    }

    #[test]
    fn missing_glyph_advances_by_fallback() {
        let mut b = batch();
        b.draw_text("A\u{e9}A", 0.0, 0.0, 20.0, Color::WHITE, Align::Left);
        // A = 10px, é missing = 12px.
        let lefts = glyph_lefts(&b);
        assert_eq!(lefts.len(), 2);
        assert!((lefts[1] - 22.0).abs() < 1e-4);
    }

    #[test]
    fn quads_carry_color_and_atlas_uvs() {
        let mut b = batch();
        let red = Color::rgb(1.0, 0.0, 0.0);
        b.draw_text("A", 0.0, 0.0, 12.0, red, Align::Left);

        let atlas = b.atlas().clone();
        let (uv0, uv1) = atlas.uv(atlas.get(12, 'A').unwrap());
        let q = &b.vertices()[..6];
        assert_eq!(q[0].uv, uv0);
        assert_eq!(q[2].uv, uv1);
        assert!(q.iter().all(|v| v.color == red.to_array()));
    }

    #[test]
    fn align_parses_css_names() {
        assert_eq!(Align::from("center"), Align::Center);
        assert_eq!(Align::from("right"), Align::Right);
        assert_eq!(Align::from("start"), Align::Left);
    }

    // ── capacity ──────────────────────────────────────────────────────────

    #[test]
    fn glyphs_past_budget_are_dropped() {
        let mut b = batch();
        let long = "X".repeat(MAX_TEXT_VERTS / 6 + 10);
        b.draw_text(&long, 0.0, 0.0, 12.0, Color::WHITE, Align::Left);
        b.draw_text("more", 0.0, 20.0, 12.0, Color::WHITE, Align::Left);

        assert_eq!(b.vertices().len(), MAX_TEXT_VERTS / 6 * 6);
        assert_eq!(b.dropped(), 10 + 4);
    }

    #[test]
    fn budget_is_per_frame_not_per_flush() {
        let mut b = batch();
        let mut out = Vec::new();
        let long = "X".repeat(MAX_TEXT_VERTS / 6);
        b.draw_text(&long, 0.0, 0.0, 12.0, Color::WHITE, Align::Left);
        b.flush(&mut out);
        b.draw_text("late", 0.0, 20.0, 12.0, Color::WHITE, Align::Left);
        b.flush(&mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(b.dropped(), 4);

        b.clear();
        b.draw_text("late", 0.0, 20.0, 12.0, Color::WHITE, Align::Left);
        assert_eq!(b.vertices().len(), 24);
    }
}
