//! Text: glyph rasterization seam, one-time atlas bake, and per-frame layout.

pub mod atlas;
pub mod layout;
pub mod rasterizer;

pub use atlas::{AtlasConfig, GlyphAtlas, GlyphEntry, CHARSET, FONT_SIZES, MIN_ATLAS_SIZE};
pub use layout::{Align, TextBatch, TextVertex, FALLBACK_ADVANCE, MAX_TEXT_VERTS};
pub use rasterizer::{FontLoadError, FontdueRasterizer, GlyphRasterizer, RasterizedGlyph};
