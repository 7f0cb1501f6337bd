//! Coordinate types shared by the batchers and renderers.
//!
//! Canonical CPU space:
//! - pixels of the output surface
//! - origin top-left
//! - +X right, +Y down
//!
//! Shaders convert to NDC with a viewport uniform, so geometry never needs to
//! be rebuilt when the output is resized.

mod vec2;
mod viewport;

pub use vec2::Vec2;
pub use viewport::Viewport;
