use std::fmt;

/// Error returned by [`FontdueRasterizer::from_bytes`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// One rasterized glyph as handed to the atlas bake.
///
/// `coverage` is `width * height` bytes, row-major, 0 = empty, 255 = solid.
/// `left`/`top` place the bitmap's top-left corner relative to the pen
/// position at the top of the em box (+Y down).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterizedGlyph {
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
    pub left: i32,
    pub top: i32,
    pub advance: f32,
}

/// Host glyph rasterization service.
///
/// Called once per (size, character) pair while the atlas is baked, never
/// during a frame.
pub trait GlyphRasterizer {
    fn rasterize(&self, ch: char, px: f32) -> RasterizedGlyph;
}

/// [`GlyphRasterizer`] backed by a single `fontdue` font.
///
/// A monospace face gives the most predictable layout, since text width is
/// computed from per-glyph advances only (no kerning).
pub struct FontdueRasterizer {
    font: fontdue::Font,
}

impl FontdueRasterizer {
    /// Parses a TrueType or OpenType font from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn font(&self) -> &fontdue::Font {
        &self.font
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn rasterize(&self, ch: char, px: f32) -> RasterizedGlyph {
        let (metrics, coverage) = self.font.rasterize(ch, px);

        // fontdue measures ymin upward from the baseline; the atlas wants the
        // bitmap top measured downward from the top of the em box.
        let ascent = self
            .font
            .horizontal_line_metrics(px)
            .map_or(px * 0.8, |lm| lm.ascent);
        let top = (ascent - (metrics.ymin as f32 + metrics.height as f32)).round() as i32;

        RasterizedGlyph {
            width: metrics.width,
            height: metrics.height,
            coverage,
            left: metrics.xmin,
            top,
            advance: metrics.advance_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_load() {
        let err = FontdueRasterizer::from_bytes(b"definitely not a font").err();
        let msg = err.map(|e| e.to_string()).unwrap_or_default();
        assert!(msg.starts_with("font load error"));
    }
}
