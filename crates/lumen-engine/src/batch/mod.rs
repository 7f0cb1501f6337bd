//! CPU-side primitive accumulators.
//!
//! Each batcher owns the frame-wide backing array for its primitive type and a
//! "pending" window (the geometry added since its last flush). A flush closes
//! the window and records a [`Submission`]: one draw call over a contiguous
//! range of that array. Implicit flushes (capacity overflow) are recorded the
//! same way, at the moment they happen, so submission order is draw order.
//!
//! Capacity policy differs per path:
//! - quads and triangles flush implicitly when full (nothing is lost)
//! - dashed lines and text drop whatever does not fit

use std::ops::Range;

pub mod dashed;
pub mod quad;
pub mod tri;

pub use dashed::{DashStyle, DashedBatch, DashedVertex, MAX_DASHED_VERTS};
pub use quad::{Glow, QuadBatch, QuadInstance, ShapeKind, MAX_INSTANCES};
pub use tri::{TriVertex, TriangleBatch, MAX_TRI_VERTS};

/// One recorded draw call: a range into the matching frame-wide array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Instanced rect/circle quads; range over `FramePlan::quads`.
    Quads(Range<u32>),
    /// Dashed line vertices; range over `FramePlan::dashed`.
    Dashed(Range<u32>),
    /// Vertex-colored triangles; range over `FramePlan::triangles`.
    Triangles(Range<u32>),
    /// Textured glyph quads; range over `FramePlan::text`.
    Text(Range<u32>),
}

impl Submission {
    /// Number of instances (quads) or vertices (everything else) drawn.
    pub fn len(&self) -> u32 {
        let r = match self {
            Submission::Quads(r)
            | Submission::Dashed(r)
            | Submission::Triangles(r)
            | Submission::Text(r) => r,
        };
        r.end - r.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Closes the pending window `[*pending_from, len)` and returns it as a range.
///
/// Returns `None` when nothing is pending.
pub(crate) fn take_window(pending_from: &mut usize, len: usize) -> Option<Range<u32>> {
    if *pending_from >= len {
        return None;
    }
    let range = *pending_from as u32..len as u32;
    *pending_from = len;
    Some(range)
}
