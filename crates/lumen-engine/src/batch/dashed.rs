use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;

use super::{take_window, Submission};

/// Maximum number of unflushed dashed vertices. Extra dashes are dropped.
pub const MAX_DASHED_VERTS: usize = 512;

/// Shorter segments are dropped (and leave the style untouched).
const MIN_DASHED_LEN: f32 = 0.01;

/// The one dash style shared by every unflushed dashed line.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DashStyle {
    pub color: Color,
    pub dash_len: f32,
    pub gap_len: f32,
}

impl Default for DashStyle {
    fn default() -> Self {
        Self { color: Color::WHITE, dash_len: 8.0, gap_len: 8.0 }
    }
}

/// GPU vertex layout (40 bytes):
///
///  offset  0  pos      [f32; 2]
///  offset  8  pattern  [f32; 4]   distance along line, dash length, gap length, unused
///  offset 24  color    [f32; 4]
///
/// The style fields are stamped when the batch is flushed, not when the line
/// is added.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DashedVertex {
    pub pos: [f32; 2],
    pub pattern: [f32; 4],
    pub color: [f32; 4],
}

impl DashedVertex {
    #[inline]
    pub fn distance(&self) -> f32 {
        self.pattern[0]
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct PendingVertex {
    pos: Vec2,
    distance: f32,
}

/// Accumulates dashed lines.
///
/// Geometry is stored without style. Each call overwrites the shared
/// [`DashStyle`], and a flush paints everything pending with whatever style
/// is current at that moment: two lines added in different colors between
/// flushes both come out in the second color.
#[derive(Debug, Default)]
pub struct DashedBatch {
    pending: Vec<PendingVertex>,
    flushed: Vec<DashedVertex>,
    style: DashStyle,
    dropped: usize,
}

impl DashedBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all geometry. The shared style survives.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.flushed.clear();
        self.dropped = 0;
    }

    /// Vertices flushed this frame, styled.
    #[inline]
    pub fn vertices(&self) -> &[DashedVertex] {
        &self.flushed
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn style(&self) -> DashStyle {
        self.style
    }

    /// Vertices discarded this frame because the batch was full.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn add_dashed_line(&mut self, a: Vec2, b: Vec2, width: f32, style: DashStyle) {
        let d = b - a;
        let len = d.length();
        if !(len >= MIN_DASHED_LEN) {
            return;
        }
        self.style = style;

        let cycle = style.dash_len + style.gap_len;
        if !(cycle > 0.0) {
            return;
        }

        let dir = d * (1.0 / len);
        let n = dir.perp() * (width * 0.5);

        let mut dist = 0.0f32;
        while dist < len {
            if self.pending.len() + 6 > MAX_DASHED_VERTS {
                // Float-to-int casts saturate, so a tiny cycle yields usize::MAX.
                let remaining = ((len - dist) / cycle).ceil() as usize;
                self.dropped = self.dropped.saturating_add(remaining.saturating_mul(6));
                break;
            }

            let end = (dist + style.dash_len).min(len);
            let s = a + dir * dist;
            let e = a + dir * end;

            let quad = [
                (s + n, dist),
                (s - n, dist),
                (e + n, end),
                (s - n, dist),
                (e - n, end),
                (e + n, end),
            ];
            self.pending
                .extend(quad.iter().map(|&(pos, distance)| PendingVertex { pos, distance }));

            dist += cycle;
        }
    }

    /// Stamps the current style onto everything pending and records one draw.
    pub fn flush(&mut self, out: &mut Vec<Submission>) {
        if self.pending.is_empty() {
            return;
        }
        let mut from = self.flushed.len();
        let style = self.style;
        let color = style.color.to_array();
        self.flushed.extend(self.pending.drain(..).map(|v| DashedVertex {
            pos: [v.pos.x, v.pos.y],
            pattern: [v.distance, style.dash_len, style.gap_len, 0.0],
            color,
        }));
        if let Some(range) = take_window(&mut from, self.flushed.len()) {
            out.push(Submission::Dashed(range));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn style(color: Color, dash: f32, gap: f32) -> DashStyle {
        DashStyle { color, dash_len: dash, gap_len: gap }
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn emits_one_quad_per_dash() {
        let mut batch = DashedBatch::new();
        // 0..4, 10..14, 20..24 fit in 25px with a 10px cycle.
        batch.add_dashed_line(v(0.0, 0.0), v(25.0, 0.0), 2.0, style(Color::WHITE, 4.0, 6.0));
        assert_eq!(batch.pending_len(), 3 * 6);
    }

    #[test]
    fn last_dash_is_clamped_to_segment_end() {
        let mut batch = DashedBatch::new();
        let mut out = Vec::new();
        batch.add_dashed_line(v(0.0, 0.0), v(12.0, 0.0), 2.0, style(Color::WHITE, 8.0, 2.0));
        batch.flush(&mut out);

        let last = batch.vertices().last().copied().unwrap();
        assert_eq!(last.pos[0], 12.0);
        assert_eq!(last.distance(), 12.0);
    }

    #[test]
    fn zero_length_line_leaves_style_alone() {
        let mut batch = DashedBatch::new();
        batch.add_dashed_line(v(3.0, 3.0), v(3.0, 3.0), 2.0, style(Color::BLACK, 1.0, 1.0));
        assert_eq!(batch.pending_len(), 0);
        assert_eq!(batch.style(), DashStyle::default());
    }

    #[test]
    fn non_positive_cycle_emits_nothing() {
        let mut batch = DashedBatch::new();
        batch.add_dashed_line(v(0.0, 0.0), v(50.0, 0.0), 2.0, style(Color::WHITE, 0.0, 0.0));
        assert_eq!(batch.pending_len(), 0);
    }

    // ── shared style ──────────────────────────────────────────────────────

    #[test]
    fn last_style_wins_for_all_unflushed_lines() {
        let a = Color::rgb(1.0, 0.0, 0.0);
        let b = Color::rgb(0.0, 0.0, 1.0);
        let mut batch = DashedBatch::new();
        let mut out = Vec::new();
        batch.add_dashed_line(v(0.0, 0.0), v(30.0, 0.0), 2.0, style(a, 5.0, 5.0));
        batch.add_dashed_line(v(0.0, 9.0), v(30.0, 9.0), 2.0, style(b, 3.0, 3.0));
        batch.flush(&mut out);

        assert_eq!(out.len(), 1);
        assert!(batch.vertices().iter().all(|v| v.color == b.to_array()));
        assert!(batch.vertices().iter().all(|v| v.pattern[1] == 3.0 && v.pattern[2] == 3.0));
    }

    #[test]
    fn flush_between_lines_keeps_each_style() {
        let a = Color::rgb(1.0, 0.0, 0.0);
        let b = Color::rgb(0.0, 0.0, 1.0);
        let mut batch = DashedBatch::new();
        let mut out = Vec::new();
        batch.add_dashed_line(v(0.0, 0.0), v(30.0, 0.0), 2.0, style(a, 5.0, 5.0));
        batch.flush(&mut out);
        batch.add_dashed_line(v(0.0, 9.0), v(30.0, 9.0), 2.0, style(b, 5.0, 5.0));
        batch.flush(&mut out);

        assert_eq!(out, vec![Submission::Dashed(0..18), Submission::Dashed(18..36)]);
        assert_eq!(batch.vertices()[0].color, a.to_array());
        assert_eq!(batch.vertices()[18].color, b.to_array());
    }

    // ── capacity ──────────────────────────────────────────────────────────

    #[test]
    fn overflow_truncates_without_flushing() {
        let mut batch = DashedBatch::new();
        let mut out = Vec::new();
        // 1000px / 2px cycle = 500 dashes = 3000 vertices requested.
        batch.add_dashed_line(v(0.0, 0.0), v(1000.0, 0.0), 1.0, style(Color::WHITE, 1.0, 1.0));

        assert!(out.is_empty());
        assert_eq!(batch.pending_len(), MAX_DASHED_VERTS / 6 * 6);
        assert!(batch.dropped() > 0);

        batch.flush(&mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn vanishing_cycle_saturates_drop_count() {
        let mut batch = DashedBatch::new();
        batch.add_dashed_line(v(0.0, 0.0), v(100.0, 0.0), 1.0, style(Color::WHITE, 1e-20, 0.0));
        batch.add_dashed_line(v(0.0, 5.0), v(100.0, 5.0), 1.0, style(Color::WHITE, 1e-20, 0.0));

        assert_eq!(batch.pending_len(), MAX_DASHED_VERTS / 6 * 6);
        assert_eq!(batch.dropped(), usize::MAX);
    }
}
