//! Renderer configuration.

use crate::text::AtlasConfig;

/// Top-level renderer settings.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RendererConfig {
    pub bloom: BloomConfig,
    pub atlas: AtlasConfig,
}

/// Bloom post-process tunables.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BloomConfig {
    pub enabled: bool,
    /// Luminance above which a pixel contributes to bloom, `[0, 1]`.
    pub threshold: f32,
    /// Multiplier for the blurred bright pass when composited.
    pub intensity: f32,
    /// Gaussian sigma in texels of the half-resolution buffers.
    pub radius: f32,
}

const MIN_RADIUS: f32 = 0.01;

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.45,
            intensity: 0.6,
            radius: 3.0,
        }
    }
}

impl BloomConfig {
    /// Returns a copy with every value in its valid range.
    ///
    /// Non-finite values fall back to the defaults.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let finite_or = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };

        Self {
            enabled: self.enabled,
            threshold: finite_or(self.threshold, d.threshold).clamp(0.0, 1.0),
            intensity: finite_or(self.intensity, d.intensity).max(0.0),
            radius: finite_or(self.radius, d.radius).max(MIN_RADIUS),
        }
    }
}
