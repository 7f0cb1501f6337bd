//! Paint model shared by the batchers and the text layout.
//!
//! Colors are straight (non-premultiplied) alpha; pipelines blend with
//! `SrcAlpha, OneMinusSrcAlpha`.

pub mod color;

pub use color::Color;
