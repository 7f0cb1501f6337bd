//! Per-frame recording.
//!
//! [`FrameSession`] is the game-facing draw API. It records one frame into the
//! batchers and hands the result to the GPU side as a borrowed [`FramePlan`].

mod plan;
mod session;

pub use plan::{FramePlan, FrameStats};
pub use session::FrameSession;
