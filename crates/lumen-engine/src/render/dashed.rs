use std::ops::Range;

use crate::batch::DashedVertex;
use crate::coords::Viewport;
use crate::render::RenderCtx;

use super::common::{
    blended_pipeline, create_viewport_ubo, viewport_bind_group_layout, VertexStream,
    ViewportUniform,
};

const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x2, // pos
    1 => Float32x4, // pattern: distance, dash, gap, unused
    2 => Float32x4  // color
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<DashedVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

/// Draws dashed line quads; the fragment stage cuts the gaps.
pub struct DashedRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    viewport_ubo: wgpu::Buffer,
    vertices: VertexStream,
}

impl DashedRenderer {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen dashed shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/dashed.wgsl").into()),
        });

        let bind_group_layout = viewport_bind_group_layout(ctx.device, "lumen dashed bgl");
        let pipeline = blended_pipeline(
            ctx.device,
            "lumen dashed pipeline",
            &shader,
            &[&bind_group_layout],
            &[vertex_layout()],
            ctx.surface_format,
        );

        let viewport_ubo = create_viewport_ubo(ctx.device, "lumen dashed viewport ubo");
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen dashed bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            bind_group,
            viewport_ubo,
            vertices: VertexStream::new("lumen dashed vbo"),
        }
    }

    pub fn prepare(&mut self, ctx: &RenderCtx<'_>, vertices: &[DashedVertex], viewport: Viewport) {
        if vertices.is_empty() {
            return;
        }
        ctx.queue
            .write_buffer(&self.viewport_ubo, 0, bytemuck::bytes_of(&ViewportUniform::new(viewport)));
        self.vertices.upload(ctx.device, ctx.queue, vertices);
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, range: Range<u32>) {
        let Some(vbo) = self.vertices.buffer() else { return };
        if range.is_empty() {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, vbo.slice(..));
        pass.draw(range, 0..1);
    }
}
