//! Lumen: a small 2D GPU renderer for browser-style arcade games.
//!
//! A frame is recorded on the CPU by [`FrameSession`] (pixel-space rects,
//! circles, lines, polygons, dashed lines and text), turned into an immutable
//! [`FramePlan`], and encoded by [`Renderer`] with an optional bloom pass.
//!
//! ```no_run
//! # fn frame(session: &mut lumen_engine::FrameSession) {
//! use lumen_engine::text::Align;
//!
//! session.begin_frame("#0a0a1a");
//! session.set_glow(Some("#0ff".into()), 0.8);
//! session.fill_circle(320.0, 240.0, 12.0, "#0ff");
//! session.flush_all();
//! session.begin_text_frame();
//! session.draw_text("SCORE 100", 320.0, 16.0, 24.0, "white", Align::Center);
//! session.flush_text(640.0, 480.0);
//! let _plan = session.end_frame();
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod coords;
pub mod device;
pub mod frame;
pub mod logging;
pub mod paint;
pub mod render;
pub mod text;

pub use config::{BloomConfig, RendererConfig};
pub use frame::{FramePlan, FrameSession, FrameStats};
pub use paint::Color;
pub use render::Renderer;
