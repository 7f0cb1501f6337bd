use std::sync::Arc;

use crate::batch::{DashStyle, DashedBatch, Glow, QuadBatch, Submission, TriangleBatch};
use crate::coords::{Vec2, Viewport};
use crate::paint::Color;
use crate::text::{Align, GlyphAtlas, TextBatch};

use super::plan::FramePlan;

/// Records one frame of draw calls.
///
/// Expected call sequence per frame:
///
/// ```text
/// begin_frame → draws → flush_all → begin_text_frame → draw_text… → flush_text → end_frame
/// ```
///
/// Layering across primitive types is decided by flushes, not by call order:
/// `flush_all` always emits quads, then dashed lines, then polygons, and text
/// flushed afterwards lands on top of all three. Call `flush_all` between two
/// draws of different types when exact z-order matters.
pub struct FrameSession {
    clear: Color,
    glow: Glow,

    quads: QuadBatch,
    triangles: TriangleBatch,
    dashed: DashedBatch,
    text: TextBatch,

    submissions: Vec<Submission>,
    text_viewport: Option<Viewport>,
}

impl FrameSession {
    pub fn new(atlas: Arc<GlyphAtlas>) -> Self {
        Self {
            clear: Color::BLACK,
            glow: Glow::NONE,
            quads: QuadBatch::new(),
            triangles: TriangleBatch::new(),
            dashed: DashedBatch::new(),
            text: TextBatch::new(atlas),
            submissions: Vec::new(),
            text_viewport: None,
        }
    }

    /// Starts a frame: drops last frame's geometry and resets glow.
    ///
    /// The clear color is always opaque.
    pub fn begin_frame(&mut self, clear: impl Into<Color>) {
        let clear: Color = clear.into();
        self.clear = Color { a: 1.0, ..clear };
        self.glow = Glow::NONE;
        self.quads.clear();
        self.triangles.clear();
        self.dashed.clear();
        self.text.clear();
        self.submissions.clear();
        self.text_viewport = None;
    }

    // ── glow ──────────────────────────────────────────────────────────────

    /// Sets the glow for quads added from now on; `None` turns it off.
    ///
    /// Lines, polygons and dashed lines ignore glow.
    pub fn set_glow(&mut self, color: Option<Color>, intensity: f32) {
        self.glow = match color {
            Some(c) => Glow::new(c, intensity),
            None => Glow::NONE,
        };
    }

    #[inline]
    pub fn glow(&self) -> Glow {
        self.glow
    }

    // ── quads ─────────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: impl Into<Color>) {
        self.quads.add_rect(x, y, w, h, color.into(), self.glow, &mut self.submissions);
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: impl Into<Color>) {
        self.quads.add_circle(cx, cy, r, color.into(), self.glow, &mut self.submissions);
    }

    // ── triangles ─────────────────────────────────────────────────────────

    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: impl Into<Color>, width: f32) {
        self.triangles.add_line(
            Vec2::new(x1, y1),
            Vec2::new(x2, y2),
            color.into(),
            width,
            &mut self.submissions,
        );
    }

    pub fn stroke_poly(&mut self, points: &[Vec2], color: impl Into<Color>, width: f32, closed: bool) {
        self.triangles
            .add_polygon_outline(points, color.into(), width, closed, &mut self.submissions);
    }

    /// Fills a convex polygon. Concave input is not filled correctly.
    pub fn fill_poly(&mut self, points: &[Vec2], color: impl Into<Color>) {
        self.triangles.add_filled_polygon(points, color.into(), &mut self.submissions);
    }

    // ── dashed ────────────────────────────────────────────────────────────

    /// Adds a dashed line.
    ///
    /// Color, dash and gap are shared by every dashed line not yet flushed:
    /// the last call before a flush decides them for all of them.
    #[allow(clippy::too_many_arguments)]
    pub fn dashed_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: impl Into<Color>,
        width: f32,
        dash_len: f32,
        gap_len: f32,
    ) {
        let style = DashStyle { color: color.into(), dash_len, gap_len };
        self.dashed
            .add_dashed_line(Vec2::new(x1, y1), Vec2::new(x2, y2), width, style);
    }

    // ── flushing ──────────────────────────────────────────────────────────

    /// Flushes quads, dashed lines and polygons, in that order.
    pub fn flush_all(&mut self) {
        self.quads.flush(&mut self.submissions);
        self.dashed.flush(&mut self.submissions);
        self.triangles.flush(&mut self.submissions);
    }

    // ── text ──────────────────────────────────────────────────────────────

    /// Discards text drawn since the last text flush.
    pub fn begin_text_frame(&mut self) {
        let pending = self.text.pending_len();
        if pending > 0 {
            log::debug!("discarding {pending} unflushed text vertices");
            self.text.discard_pending();
        }
    }

    pub fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        color: impl Into<Color>,
        align: Align,
    ) {
        self.text.draw_text(text, x, y, font_size, color.into(), align);
    }

    /// Width `draw_text` would use to align `text`.
    pub fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        self.text.measure(text, font_size)
    }

    /// Flushes text; `width`/`height` are the pixel space the text was laid
    /// out in.
    pub fn flush_text(&mut self, width: f32, height: f32) {
        self.text_viewport = Some(Viewport::new(width, height));
        self.text.flush(&mut self.submissions);
    }

    // ── end ───────────────────────────────────────────────────────────────

    /// Finishes recording and returns the frame for the renderer.
    ///
    /// Geometry that was never flushed is not part of the plan.
    pub fn end_frame(&mut self) -> FramePlan<'_> {
        let unflushed = self.quads.pending_len()
            + self.triangles.pending_len()
            + self.dashed.pending_len()
            + self.text.pending_len();
        if unflushed > 0 {
            log::debug!("end_frame: {unflushed} unflushed primitives/vertices not drawn");
        }

        if self.dashed.dropped() > 0 {
            log::warn!(
                "dashed line batch overflowed; {} vertices dropped (flush more often)",
                self.dashed.dropped()
            );
        }
        if self.text.dropped() > 0 {
            log::warn!("text vertex budget exhausted; {} glyphs dropped", self.text.dropped());
        }

        self.plan()
    }

    /// The frame as recorded so far.
    pub fn plan(&self) -> FramePlan<'_> {
        FramePlan {
            clear: self.clear,
            submissions: &self.submissions,
            quads: self.quads.instances(),
            triangles: self.triangles.vertices(),
            dashed: self.dashed.vertices(),
            text: self.text.vertices(),
            text_viewport: self.text_viewport,
            dropped_dashed_vertices: self.dashed.dropped(),
            dropped_glyphs: self.text.dropped(),
        }
    }
}
