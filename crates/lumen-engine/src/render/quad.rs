use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::batch::QuadInstance;
use crate::coords::Viewport;
use crate::render::RenderCtx;

use super::common::{
    blended_pipeline, create_viewport_ubo, viewport_bind_group_layout, QuadVertex,
    VertexStream, ViewportUniform, QUAD_INDICES, QUAD_VERTICES,
};

const INSTANCE_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    1 => Float32x4, // rect
    2 => Float32x4, // color
    3 => Float32x4  // params
];

fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &INSTANCE_ATTRS,
    }
}

/// Draws [`QuadInstance`]s (rects and SDF circles) with one instanced call per
/// submission.
pub struct QuadRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    viewport_ubo: wgpu::Buffer,

    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,

    instances: VertexStream,
}

impl QuadRenderer {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen quad shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/quad.wgsl").into()),
        });

        let bind_group_layout = viewport_bind_group_layout(ctx.device, "lumen quad bgl");
        let pipeline = blended_pipeline(
            ctx.device,
            "lumen quad pipeline",
            &shader,
            &[&bind_group_layout],
            &[QuadVertex::layout(), instance_layout()],
            ctx.surface_format,
        );

        let viewport_ubo = create_viewport_ubo(ctx.device, "lumen quad viewport ubo");
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen quad bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let quad_vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            pipeline,
            bind_group,
            viewport_ubo,
            quad_vbo,
            quad_ibo,
            instances: VertexStream::new("lumen quad instance vbo"),
        }
    }

    /// Uploads the frame's instances and viewport.
    pub fn prepare(&mut self, ctx: &RenderCtx<'_>, instances: &[QuadInstance], viewport: Viewport) {
        if instances.is_empty() {
            return;
        }
        ctx.queue
            .write_buffer(&self.viewport_ubo, 0, bytemuck::bytes_of(&ViewportUniform::new(viewport)));
        self.instances.upload(ctx.device, ctx.queue, instances);
    }

    /// Draws the instances in `range` (indices into the prepared array).
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, range: Range<u32>) {
        let Some(instance_vbo) = self.instances.buffer() else { return };
        if range.is_empty() {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad_vbo.slice(..));
        pass.set_vertex_buffer(1, instance_vbo.slice(..));
        pass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_layout_matches_struct() {
        let layout = instance_layout();
        assert_eq!(layout.array_stride, 48);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 16, 32]);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
    }
}
