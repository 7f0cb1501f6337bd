use std::collections::HashMap;
use std::ops::RangeInclusive;

use super::rasterizer::GlyphRasterizer;

/// Pixel sizes baked into the atlas, ascending.
pub const FONT_SIZES: [u32; 14] = [12, 14, 16, 20, 24, 26, 28, 32, 36, 40, 48, 56, 64, 80];

/// Printable ASCII.
pub const CHARSET: RangeInclusive<char> = ' '..='~';

/// Smaller requested sizes are raised to this at bake.
pub const MIN_ATLAS_SIZE: u32 = 16;
const CELL_PAD_X: u32 = 2;
const CELL_PAD_Y: u32 = 4;
/// Glyph bitmaps sit this far below the top of their cell.
const CELL_TOP_INSET: i32 = 2;

/// Atlas bake parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Width and height of the square atlas bitmap, in pixels.
    pub size: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self { size: 2048 }
    }
}

/// Location and metrics of one baked glyph.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphEntry {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    /// Horizontal advance at the preset size, whole pixels.
    pub advance: f32,
}

/// Immutable glyph atlas: one R8 coverage bitmap plus a `(size, char)` table.
///
/// Built once by [`GlyphAtlas::bake`]; nothing mutates it afterwards, so it is
/// shared between the text layout and the GPU upload behind an `Arc`.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    size: u32,
    bitmap: Vec<u8>,
    glyphs: HashMap<(u32, char), GlyphEntry>,
}

impl GlyphAtlas {
    /// Rasterizes every character of [`CHARSET`] at every [`FONT_SIZES`] entry
    /// and shelf-packs the cells row by row.
    ///
    /// Packing stops at the first cell that would cross the bottom edge; the
    /// glyphs after it are simply absent from the table. A glyph whose cell is
    /// wider than an empty row is skipped; a non-finite advance counts as zero.
    pub fn bake(rasterizer: &dyn GlyphRasterizer, config: AtlasConfig) -> Self {
        let size = config.size.max(MIN_ATLAS_SIZE);
        let mut atlas = Self {
            size,
            bitmap: vec![0; size as usize * size as usize],
            glyphs: HashMap::new(),
        };

        let mut cursor_x = 1u32;
        let mut cursor_y = 1u32;
        let mut row_height = 0u32;

        'sizes: for &px in &FONT_SIZES {
            for ch in CHARSET {
                let glyph = rasterizer.rasterize(ch, px as f32);
                let advance = if glyph.advance.is_finite() { glyph.advance.max(0.0).ceil() } else { 0.0 };
                let w = (advance.min(size as f32) as u32).saturating_add(CELL_PAD_X);
                let h = px + CELL_PAD_Y;

                if 1 + w >= size {
                    log::warn!("glyph {px}px '{ch}' is wider than the atlas ({size}px); skipped");
                    continue;
                }

                if cursor_x + w >= size {
                    cursor_x = 1;
                    cursor_y += row_height + 1;
                    row_height = 0;
                }
                if cursor_y + h >= size {
                    log::warn!(
                        "glyph atlas is full ({size}x{size}) at {px}px '{ch}'; \
                         remaining glyphs fall back to blank advances"
                    );
                    break 'sizes;
                }

                let entry = GlyphEntry { x: cursor_x, y: cursor_y, w, h, advance };
                atlas.blit(&entry, &glyph.coverage, glyph.width, glyph.height, glyph.left, glyph.top);
                atlas.glyphs.insert((px, ch), entry);

                cursor_x += w + 1;
                row_height = row_height.max(h);
            }
        }

        log::debug!("glyph atlas baked: {} glyphs in {size}x{size}", atlas.glyphs.len());
        atlas
    }

    /// Copies a coverage bitmap into `cell`, clipped to the cell bounds.
    fn blit(&mut self, cell: &GlyphEntry, coverage: &[u8], w: usize, h: usize, left: i32, top: i32) {
        let origin_x = cell.x as i32 + left;
        let origin_y = cell.y as i32 + CELL_TOP_INSET + top;
        let (x0, x1) = (cell.x as i32, (cell.x + cell.w) as i32);
        let (y0, y1) = (cell.y as i32, (cell.y + cell.h) as i32);

        for row in 0..h {
            let ty = origin_y + row as i32;
            if ty < y0 || ty >= y1 {
                continue;
            }
            for col in 0..w {
                let tx = origin_x + col as i32;
                if tx < x0 || tx >= x1 {
                    continue;
                }
                let Some(&value) = coverage.get(row * w + col) else { continue };
                self.bitmap[ty as usize * self.size as usize + tx as usize] = value;
            }
        }
    }

    /// Snaps a requested pixel size to the nearest preset (ties go to the
    /// smaller preset).
    pub fn closest_size(px: f32) -> u32 {
        let mut best = FONT_SIZES[0];
        for &s in &FONT_SIZES {
            if (s as f32 - px).abs() < (best as f32 - px).abs() {
                best = s;
            }
        }
        best
    }

    #[inline]
    pub fn get(&self, size: u32, ch: char) -> Option<&GlyphEntry> {
        self.glyphs.get(&(size, ch))
    }

    /// Width and height of the square bitmap.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row-major single-channel coverage, `size * size` bytes.
    #[inline]
    pub fn bitmap(&self) -> &[u8] {
        &self.bitmap
    }

    /// Number of baked glyphs.
    #[inline]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Normalized texture coordinates of a glyph cell: `(min, max)`.
    pub fn uv(&self, g: &GlyphEntry) -> ([f32; 2], [f32; 2]) {
        let s = self.size as f32;
        (
            [g.x as f32 / s, g.y as f32 / s],
            [(g.x + g.w) as f32 / s, (g.y + g.h) as f32 / s],
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::text::RasterizedGlyph;

    /// Solid block glyphs: half an em wide (three quarters for 'B' and 'W'),
    /// as tall as the em.
    pub(crate) struct BlockRasterizer;

    impl GlyphRasterizer for BlockRasterizer {
        fn rasterize(&self, ch: char, px: f32) -> RasterizedGlyph {
            let advance = match ch {
                'B' | 'W' => px * 0.75,
                _ => px * 0.5,
            };
            let (width, height) = if ch == ' ' { (0, 0) } else { (advance as usize, px as usize) };
            RasterizedGlyph {
                width,
                height,
                coverage: vec![255; width * height],
                left: 0,
                top: 0,
                advance,
            }
        }
    }

    pub(crate) fn block_atlas() -> GlyphAtlas {
        GlyphAtlas::bake(&BlockRasterizer, AtlasConfig::default())
    }

    /// Block glyphs, except 'A' reports an infinite advance and 'B' one far
    /// wider than any atlas.
    struct RunawayRasterizer;

    impl GlyphRasterizer for RunawayRasterizer {
        fn rasterize(&self, ch: char, px: f32) -> RasterizedGlyph {
            let mut glyph = BlockRasterizer.rasterize(ch, px);
            match ch {
                'A' => glyph.advance = f32::INFINITY,
                'B' => glyph.advance = 1e9,
                _ => {}
            }
            glyph
        }
    }

    // ── presets ───────────────────────────────────────────────────────────

    #[test]
    fn closest_size_snaps_to_presets() {
        assert_eq!(GlyphAtlas::closest_size(1.0), 12);
        assert_eq!(GlyphAtlas::closest_size(15.0), 14);
        assert_eq!(GlyphAtlas::closest_size(22.0), 20);
        assert_eq!(GlyphAtlas::closest_size(500.0), 80);
    }

    #[test]
    fn closest_size_ties_go_down() {
        assert_eq!(GlyphAtlas::closest_size(18.0), 16);
        assert_eq!(GlyphAtlas::closest_size(72.0), 64);
    }

    // ── packing ───────────────────────────────────────────────────────────

    #[test]
    fn default_atlas_holds_every_preset() {
        let atlas = block_atlas();
        assert_eq!(atlas.len(), FONT_SIZES.len() * CHARSET.count());
    }

    #[test]
    fn cells_follow_the_shelf_rules() {
        let atlas = block_atlas();
        let a = atlas.get(12, ' ').copied().unwrap();
        assert_eq!((a.x, a.y), (1, 1));
        assert_eq!((a.w, a.h), (6 + 2, 12 + 4));
        assert_eq!(a.advance, 6.0);

        let next = atlas.get(12, '!').copied().unwrap();
        assert_eq!(next.x, a.x + a.w + 1);
        assert_eq!(next.y, a.y);
    }

    #[test]
    fn cells_never_overlap_or_cross_the_edge() {
        let atlas = block_atlas();
        let mut cells: Vec<GlyphEntry> = atlas.glyphs.values().copied().collect();
        cells.sort_by_key(|c| (c.y, c.x));
        for c in &cells {
            assert!(c.x + c.w < atlas.size() && c.y + c.h < atlas.size());
        }
        for pair in cells.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.y == b.y {
                assert!(a.x + a.w < b.x);
            }
        }
    }

    #[test]
    fn small_atlas_stops_packing_when_full() {
        let atlas = GlyphAtlas::bake(&BlockRasterizer, AtlasConfig { size: 256 });
        assert!(!atlas.is_empty());
        assert!(atlas.len() < FONT_SIZES.len() * CHARSET.count());
        assert!(atlas.get(80, 'A').is_none());
        assert!(atlas.get(12, 'A').is_some());
    }

    #[test]
    fn tiny_sizes_are_raised_to_the_minimum() {
        let atlas = GlyphAtlas::bake(&BlockRasterizer, AtlasConfig { size: 4 });
        assert_eq!(atlas.size(), MIN_ATLAS_SIZE);
        assert_eq!(atlas.bitmap().len(), (MIN_ATLAS_SIZE * MIN_ATLAS_SIZE) as usize);
    }

    #[test]
    fn runaway_advances_do_not_break_packing() {
        let atlas = GlyphAtlas::bake(&RunawayRasterizer, AtlasConfig::default());

        let a = atlas.get(12, 'A').copied().unwrap();
        assert_eq!(a.advance, 0.0);
        assert_eq!(a.w, CELL_PAD_X);
        assert!(atlas.get(12, 'B').is_none());
        assert!(atlas.get(12, 'C').is_some());

        for c in atlas.glyphs.values() {
            assert!(c.x + c.w < atlas.size() && c.y + c.h < atlas.size());
        }
    }

    #[test]
    fn glyph_coverage_is_blitted_below_cell_top() {
        let atlas = block_atlas();
        let g = atlas.get(12, 'A').copied().unwrap();
        let at = |x: u32, y: u32| atlas.bitmap()[(y * atlas.size() + x) as usize];
        assert_eq!(at(g.x, g.y), 0);
        assert_eq!(at(g.x, g.y + 2), 255);
        assert_eq!(at(g.x + g.w - 1, g.y + 2), 0);
    }

    #[test]
    fn uv_spans_the_cell() {
        let atlas = block_atlas();
        let g = atlas.get(12, ' ').copied().unwrap();
        let (min, max) = atlas.uv(&g);
        let s = atlas.size() as f32;
        assert_eq!(min, [1.0 / s, 1.0 / s]);
        assert_eq!(max, [9.0 / s, 17.0 / s]);
    }
}
