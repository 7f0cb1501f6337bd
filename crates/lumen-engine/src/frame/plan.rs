use crate::batch::{DashedVertex, QuadInstance, Submission, TriVertex};
use crate::coords::Viewport;
use crate::paint::Color;
use crate::text::TextVertex;

/// Everything the renderer needs to encode one frame.
///
/// `submissions` is the draw order; every other slice is a frame-wide array
/// that submissions index into.
#[derive(Debug, Copy, Clone)]
pub struct FramePlan<'a> {
    pub clear: Color,
    pub submissions: &'a [Submission],
    pub quads: &'a [QuadInstance],
    pub triangles: &'a [TriVertex],
    pub dashed: &'a [DashedVertex],
    pub text: &'a [TextVertex],
    /// Size passed to the last text flush; `None` when no text was flushed.
    pub text_viewport: Option<Viewport>,
    /// Dashed vertices cut by the unflushed cap this frame.
    pub dropped_dashed_vertices: usize,
    /// Glyphs cut by the per-frame text budget.
    pub dropped_glyphs: usize,
}

/// Draw counters for one plan.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub quad_instances: u32,
    pub triangle_vertices: u32,
    pub dashed_vertices: u32,
    pub text_vertices: u32,
    pub dropped_dashed_vertices: usize,
    pub dropped_glyphs: usize,
}

impl FramePlan<'_> {
    pub fn stats(&self) -> FrameStats {
        let mut stats = FrameStats {
            dropped_dashed_vertices: self.dropped_dashed_vertices,
            dropped_glyphs: self.dropped_glyphs,
            ..FrameStats::default()
        };
        for s in self.submissions {
            stats.draw_calls += 1;
            match s {
                Submission::Quads(_) => stats.quad_instances += s.len(),
                Submission::Triangles(_) => stats.triangle_vertices += s.len(),
                Submission::Dashed(_) => stats.dashed_vertices += s.len(),
                Submission::Text(_) => stats.text_vertices += s.len(),
            }
        }
        stats
    }
}
