use anyhow::Result;

use crate::batch::Submission;
use crate::config::{BloomConfig, RendererConfig};
use crate::frame::FramePlan;
use crate::render::{RenderCtx, RenderTarget};
use crate::text::GlyphAtlas;

use super::bloom::BloomPostProcessor;
use super::common::to_wgpu_color;
use super::dashed::DashedRenderer;
use super::quad::QuadRenderer;
use super::text::TextRenderer;
use super::tri::TriangleRenderer;

/// Encodes a [`FramePlan`] into GPU work.
///
/// Per frame: one capture pass that clears and replays every submission in
/// order, then (with bloom enabled) the bloom stages onto the display target.
pub struct Renderer {
    quads: QuadRenderer,
    triangles: TriangleRenderer,
    dashed: DashedRenderer,
    text: TextRenderer,
    bloom: BloomPostProcessor,
}

impl Renderer {
    /// Builds every pipeline and uploads `atlas`.
    ///
    /// Buffers are sized from `ctx.viewport`.
    pub fn new(ctx: &RenderCtx<'_>, atlas: &GlyphAtlas, config: RendererConfig) -> Result<Self> {
        let text = TextRenderer::new(ctx, atlas)?;
        let (width, height) = ctx.target_size();

        let renderer = Self {
            quads: QuadRenderer::new(ctx),
            triangles: TriangleRenderer::new(ctx),
            dashed: DashedRenderer::new(ctx),
            text,
            bloom: BloomPostProcessor::new(ctx, config.bloom, width, height),
        };

        log::debug!(
            "renderer ready: {:?}, {}x{}, bloom {}",
            ctx.surface_format,
            width,
            height,
            if renderer.bloom.enabled() { "on" } else { "off" }
        );
        Ok(renderer)
    }

    /// Recreates the scene buffer and both bloom buffers.
    pub fn resize(&mut self, ctx: &RenderCtx<'_>, width: u32, height: u32) {
        self.bloom.resize(ctx, width, height);
    }

    #[inline]
    pub fn bloom(&self) -> BloomConfig {
        self.bloom.config()
    }

    pub fn set_bloom(&mut self, ctx: &RenderCtx<'_>, config: BloomConfig) {
        self.bloom.set_config(ctx.queue, config);
    }

    /// Uploads the plan's geometry and records the frame into `target`.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, plan: &FramePlan<'_>) {
        let (width, height) = ctx.target_size();
        if self.bloom.size() != (width, height) {
            self.bloom.resize(ctx, width, height);
        }

        let viewport = ctx.viewport;
        self.quads.prepare(ctx, plan.quads, viewport);
        self.triangles.prepare(ctx, plan.triangles, viewport);
        self.dashed.prepare(ctx, plan.dashed, viewport);
        self.text.prepare(ctx, plan.text, plan.text_viewport.unwrap_or(viewport));

        let bloom = self.bloom.enabled();
        let capture = if bloom { self.bloom.scene_view() } else { target.color_view };

        {
            let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lumen capture pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: capture,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(plan.clear)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for submission in plan.submissions {
                match submission {
                    Submission::Quads(r) => self.quads.draw(&mut pass, r.clone()),
                    Submission::Dashed(r) => self.dashed.draw(&mut pass, r.clone()),
                    Submission::Triangles(r) => self.triangles.draw(&mut pass, r.clone()),
                    Submission::Text(r) => self.text.draw(&mut pass, r.clone()),
                }
            }
        }

        if bloom {
            self.bloom.apply(target.encoder, target.color_view);
        }

        log::trace!("frame: {:?}", plan.stats());
    }
}
