use bytemuck::{Pod, Zeroable};

use crate::paint::Color;

use super::{take_window, Submission};

/// Maximum number of unflushed quad instances.
pub const MAX_INSTANCES: usize = 4096;

/// RGB gain applied by the fragment stage per unit of glow intensity.
pub const GLOW_BOOST: f32 = 0.3;

/// Shape tag read per pixel by the quad fragment shader.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShapeKind {
    Rect,
    Circle,
}

impl ShapeKind {
    #[inline]
    fn tag(self) -> f32 {
        match self {
            ShapeKind::Rect => 0.0,
            ShapeKind::Circle => 1.0,
        }
    }
}

/// Glow applied to quads added while it is current.
///
/// Only `intensity` reaches the GPU; `color` is kept so callers can read back
/// what they set.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glow {
    pub color: Color,
    pub intensity: f32,
}

impl Glow {
    pub const NONE: Glow = Glow { color: Color::BLACK, intensity: 0.0 };

    #[inline]
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity: intensity.max(0.0) }
    }

    #[inline]
    pub fn is_active(self) -> bool {
        self.intensity > 0.0
    }
}

impl Default for Glow {
    fn default() -> Self {
        Glow::NONE
    }
}

/// Instance data layout (48 bytes):
///
///  offset  0  rect    [f32; 4]   x, y, w, h (pixels)
///  offset 16  color   [f32; 4]   straight-alpha rgba
///  offset 32  params  [f32; 4]   shape tag, glow intensity, glow gain, reserved
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadInstance {
    pub rect: [f32; 4],
    pub color: [f32; 4],
    pub params: [f32; 4],
}

impl QuadInstance {
    pub fn new(x: f32, y: f32, w: f32, h: f32, color: Color, shape: ShapeKind, glow: Glow) -> Self {
        Self {
            rect: [x, y, w, h],
            color: color.to_array(),
            params: [shape.tag(), glow.intensity, GLOW_BOOST, 0.0],
        }
    }

    pub fn shape(&self) -> ShapeKind {
        if self.params[0] > 0.5 { ShapeKind::Circle } else { ShapeKind::Rect }
    }

    pub fn glow(&self) -> f32 {
        self.params[1]
    }
}

/// Accumulates rect and circle instances for one frame.
#[derive(Debug, Default)]
pub struct QuadBatch {
    instances: Vec<QuadInstance>,
    pending_from: usize,
}

impl QuadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all instances. Keeps allocated capacity for reuse.
    pub fn clear(&mut self) {
        self.instances.clear();
        self.pending_from = 0;
    }

    /// Every instance recorded this frame, flushed or not.
    #[inline]
    pub fn instances(&self) -> &[QuadInstance] {
        &self.instances
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.instances.len() - self.pending_from
    }

    pub fn add_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
        glow: Glow,
        out: &mut Vec<Submission>,
    ) {
        self.push(QuadInstance::new(x, y, w, h, color, ShapeKind::Rect, glow), out);
    }

    /// Adds a circle as its bounding quad; the fragment stage cuts the disc.
    pub fn add_circle(
        &mut self,
        cx: f32,
        cy: f32,
        r: f32,
        color: Color,
        glow: Glow,
        out: &mut Vec<Submission>,
    ) {
        let d = r * 2.0;
        self.push(QuadInstance::new(cx - r, cy - r, d, d, color, ShapeKind::Circle, glow), out);
    }

    /// Appends one instance, flushing the pending window first when it is full.
    pub fn push(&mut self, instance: QuadInstance, out: &mut Vec<Submission>) {
        if self.pending_len() >= MAX_INSTANCES {
            log::trace!("quad batch full ({MAX_INSTANCES}); implicit flush");
            self.flush(out);
        }
        self.instances.push(instance);
    }

    /// Records the pending window as one draw call.
    pub fn flush(&mut self, out: &mut Vec<Submission>) {
        if let Some(range) = take_window(&mut self.pending_from, self.instances.len()) {
            out.push(Submission::Quads(range));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    // ── instances ─────────────────────────────────────────────────────────

    #[test]
    fn instance_is_48_bytes() {
        assert_eq!(std::mem::size_of::<QuadInstance>(), 48);
    }

    #[test]
    fn circle_uses_bounding_quad() {
        let mut batch = QuadBatch::new();
        let mut out = Vec::new();
        batch.add_circle(10.0, 20.0, 5.0, red(), Glow::NONE, &mut out);

        let inst = batch.instances()[0];
        assert_eq!(inst.rect, [5.0, 15.0, 10.0, 10.0]);
        assert_eq!(inst.shape(), ShapeKind::Circle);
    }

    #[test]
    fn glow_is_stamped_at_call_time() {
        let mut batch = QuadBatch::new();
        let mut out = Vec::new();
        batch.add_rect(0.0, 0.0, 1.0, 1.0, red(), Glow::new(red(), 0.8), &mut out);
        batch.add_rect(0.0, 0.0, 1.0, 1.0, red(), Glow::NONE, &mut out);

        assert_eq!(batch.instances()[0].glow(), 0.8);
        assert_eq!(batch.instances()[1].glow(), 0.0);
    }

    #[test]
    fn every_instance_carries_the_glow_gain() {
        let lit = QuadInstance::new(0.0, 0.0, 1.0, 1.0, red(), ShapeKind::Rect, Glow::new(red(), 0.5));
        let unlit = QuadInstance::new(0.0, 0.0, 1.0, 1.0, red(), ShapeKind::Circle, Glow::NONE);
        assert_eq!(lit.params[2], GLOW_BOOST);
        assert_eq!(unlit.params[2], GLOW_BOOST);
    }

    #[test]
    fn negative_glow_is_clamped() {
        assert!(!Glow::new(red(), -1.0).is_active());
    }

    // ── flushing ──────────────────────────────────────────────────────────

    #[test]
    fn explicit_flush_keeps_call_order() {
        let mut batch = QuadBatch::new();
        let mut out = Vec::new();
        for i in 0..3 {
            batch.add_rect(i as f32, 0.0, 1.0, 1.0, red(), Glow::NONE, &mut out);
        }
        batch.flush(&mut out);

        assert_eq!(out, vec![Submission::Quads(0..3)]);
        let xs: Vec<f32> = batch.instances().iter().map(|i| i.rect[0]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn flush_with_nothing_pending_records_nothing() {
        let mut batch = QuadBatch::new();
        let mut out = Vec::new();
        batch.flush(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn overflow_flushes_implicitly_without_loss() {
        let mut batch = QuadBatch::new();
        let mut out = Vec::new();
        let total = MAX_INSTANCES * 2 + 10;
        for _ in 0..total {
            batch.add_rect(0.0, 0.0, 1.0, 1.0, red(), Glow::NONE, &mut out);
        }
        assert_eq!(out.len(), 2, "two implicit flushes before the final one");
        batch.flush(&mut out);

        let drawn: u32 = out.iter().map(Submission::len).sum();
        assert_eq!(drawn as usize, total);
        assert_eq!(out[0], Submission::Quads(0..MAX_INSTANCES as u32));
    }

    #[test]
    fn exactly_full_batch_does_not_flush_early() {
        let mut batch = QuadBatch::new();
        let mut out = Vec::new();
        for _ in 0..MAX_INSTANCES {
            batch.add_rect(0.0, 0.0, 1.0, 1.0, red(), Glow::NONE, &mut out);
        }
        assert!(out.is_empty());
        assert_eq!(batch.pending_len(), MAX_INSTANCES);
    }
}
