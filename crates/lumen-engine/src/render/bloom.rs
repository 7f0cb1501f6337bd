//! Bloom post-process.
//!
//! Stages, each a fullscreen triangle:
//! 1. extract: scene → half-res A, keeping pixels whose luminance exceeds the
//!    threshold (others become black)
//! 2. blur: A → B horizontally, then B → A vertically (13-tap gaussian)
//! 3. composite: `scene + A * intensity` onto the display target, alpha 1
//!
//! The scene buffer is what the frame is captured into while bloom is on.

use bytemuck::{Pod, Zeroable};

use crate::config::BloomConfig;
use crate::render::RenderCtx;

use super::common::min_binding_size;

/// Taps on each side of the center sample.
pub const BLUR_HALF_TAPS: usize = 6;

/// Normalized gaussian weights for taps `0..=6`; tap `-i` reuses weight `i`.
///
/// `w(i) = exp(-0.5 * i² / radius²)`, divided by the sum over all 13 taps.
pub fn gaussian_weights(radius: f32) -> [f32; BLUR_HALF_TAPS + 1] {
    let sigma = radius.max(0.01);
    let mut weights = [0.0f32; BLUR_HALF_TAPS + 1];
    for (i, w) in weights.iter_mut().enumerate() {
        let x = i as f32;
        *w = (-0.5 * x * x / (sigma * sigma)).exp();
    }
    let sum = weights[0] + 2.0 * weights[1..].iter().sum::<f32>();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Size of the half-resolution bloom buffers for a `width` x `height` scene.
#[inline]
pub fn half_extent(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Uniform block shared by every bloom stage (96 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct BloomUniforms {
    texel: [f32; 2],
    direction: [f32; 2],
    threshold: f32,
    intensity: f32,
    _pad: [f32; 2],
    weights: [[f32; 4]; 4],
}

impl BloomUniforms {
    fn new(config: &BloomConfig, source_size: (u32, u32), direction: [f32; 2]) -> Self {
        let mut weights = [[0.0f32; 4]; 4];
        for (i, w) in gaussian_weights(config.radius).into_iter().enumerate() {
            weights[i / 4][i % 4] = w;
        }
        Self {
            texel: [1.0 / source_size.0.max(1) as f32, 1.0 / source_size.1.max(1) as f32],
            direction,
            threshold: config.threshold,
            intensity: config.intensity,
            _pad: [0.0; 2],
            weights,
        }
    }
}

struct RenderTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTexture {
    fn new(device: &wgpu::Device, label: &str, (width, height): (u32, u32), format: wgpu::TextureFormat) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { _texture: texture, view }
    }
}

/// Size-dependent resources, rebuilt on resize.
struct BloomTargets {
    size: (u32, u32),
    scene: RenderTexture,
    bloom_a: RenderTexture,
    bloom_b: RenderTexture,

    extract_bg: wgpu::BindGroup,
    blur_h_bg: wgpu::BindGroup,
    blur_v_bg: wgpu::BindGroup,
    composite_bg: wgpu::BindGroup,
}

/// Uniform buffers, one per stage.
struct StageUniforms {
    extract: wgpu::Buffer,
    blur_h: wgpu::Buffer,
    blur_v: wgpu::Buffer,
    composite: wgpu::Buffer,
}

pub struct BloomPostProcessor {
    config: BloomConfig,
    format: wgpu::TextureFormat,

    extract_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,

    source_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniforms: StageUniforms,

    targets: BloomTargets,
}

impl BloomPostProcessor {
    /// Creates the pipelines and the scene/bloom buffers for a
    /// `width` x `height` display target.
    pub fn new(ctx: &RenderCtx<'_>, config: BloomConfig, width: u32, height: u32) -> Self {
        let device = ctx.device;
        let format = ctx.surface_format;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen bloom shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/bloom.wgsl").into()),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen bloom sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let source_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen bloom source bgl"),
            entries: &[uniform_entry(), texture_entry(1), sampler_entry()],
        });
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen bloom composite bgl"),
            entries: &[uniform_entry(), texture_entry(1), sampler_entry(), texture_entry(3)],
        });

        let extract_pipeline =
            fullscreen_pipeline(device, "lumen bloom extract", &shader, &source_layout, "fs_extract", format);
        let blur_pipeline =
            fullscreen_pipeline(device, "lumen bloom blur", &shader, &source_layout, "fs_blur", format);
        let composite_pipeline = fullscreen_pipeline(
            device,
            "lumen bloom composite",
            &shader,
            &composite_layout,
            "fs_composite",
            format,
        );

        let uniforms = StageUniforms {
            extract: create_uniform_buffer(device, "lumen bloom extract ubo"),
            blur_h: create_uniform_buffer(device, "lumen bloom blur h ubo"),
            blur_v: create_uniform_buffer(device, "lumen bloom blur v ubo"),
            composite: create_uniform_buffer(device, "lumen bloom composite ubo"),
        };

        let targets = create_targets(
            device,
            format,
            &source_layout,
            &composite_layout,
            &sampler,
            &uniforms,
            (width.max(1), height.max(1)),
        );

        let bloom = Self {
            config: config.sanitized(),
            format,
            extract_pipeline,
            blur_pipeline,
            composite_pipeline,
            source_layout,
            composite_layout,
            sampler,
            uniforms,
            targets,
        };
        bloom.write_uniforms(ctx.queue);
        bloom
    }

    #[inline]
    pub fn config(&self) -> BloomConfig {
        self.config
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Replaces the tunables; takes effect from the next frame.
    pub fn set_config(&mut self, queue: &wgpu::Queue, config: BloomConfig) {
        self.config = config.sanitized();
        self.write_uniforms(queue);
    }

    /// Full-resolution size of the scene buffer.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.targets.size
    }

    /// View the frame is captured into while bloom is enabled.
    #[inline]
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene.view
    }

    /// Recreates the scene buffer and both half-resolution buffers.
    pub fn resize(&mut self, ctx: &RenderCtx<'_>, width: u32, height: u32) {
        let size = (width.max(1), height.max(1));
        if size == self.targets.size {
            return;
        }
        self.targets = create_targets(
            ctx.device,
            self.format,
            &self.source_layout,
            &self.composite_layout,
            &self.sampler,
            &self.uniforms,
            size,
        );
        self.write_uniforms(ctx.queue);

        let half = half_extent(size.0, size.1);
        log::debug!("bloom buffers resized: scene {}x{}, bloom {}x{}", size.0, size.1, half.0, half.1);
    }

    /// Runs extract, both blur passes and the composite onto `output`.
    pub fn apply(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let t = &self.targets;
        run_pass(encoder, "lumen bloom extract pass", &t.bloom_a.view, &self.extract_pipeline, &t.extract_bg);
        run_pass(encoder, "lumen bloom blur h pass", &t.bloom_b.view, &self.blur_pipeline, &t.blur_h_bg);
        run_pass(encoder, "lumen bloom blur v pass", &t.bloom_a.view, &self.blur_pipeline, &t.blur_v_bg);
        run_pass(encoder, "lumen bloom composite pass", output, &self.composite_pipeline, &t.composite_bg);
    }

    fn write_uniforms(&self, queue: &wgpu::Queue) {
        let scene = self.targets.size;
        let half = half_extent(scene.0, scene.1);
        let write = |buffer: &wgpu::Buffer, u: BloomUniforms| {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&u));
        };

        write(&self.uniforms.extract, BloomUniforms::new(&self.config, scene, [0.0, 0.0]));
        write(&self.uniforms.blur_h, BloomUniforms::new(&self.config, half, [1.0, 0.0]));
        write(&self.uniforms.blur_v, BloomUniforms::new(&self.config, half, [0.0, 1.0]));
        write(&self.uniforms.composite, BloomUniforms::new(&self.config, scene, [0.0, 0.0]));
    }
}

// ── resource helpers ──────────────────────────────────────────────────────

fn create_targets(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    source_layout: &wgpu::BindGroupLayout,
    composite_layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    uniforms: &StageUniforms,
    size: (u32, u32),
) -> BloomTargets {
    let half = half_extent(size.0, size.1);
    let scene = RenderTexture::new(device, "lumen scene buffer", size, format);
    let bloom_a = RenderTexture::new(device, "lumen bloom buffer a", half, format);
    let bloom_b = RenderTexture::new(device, "lumen bloom buffer b", half, format);

    let source_bg = |label: &str, ubo: &wgpu::Buffer, source: &wgpu::TextureView| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: source_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(source) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
            ],
        })
    };

    let extract_bg = source_bg("lumen bloom extract bg", &uniforms.extract, &scene.view);
    let blur_h_bg = source_bg("lumen bloom blur h bg", &uniforms.blur_h, &bloom_a.view);
    let blur_v_bg = source_bg("lumen bloom blur v bg", &uniforms.blur_v, &bloom_b.view);
    let composite_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("lumen bloom composite bg"),
        layout: composite_layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: uniforms.composite.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&scene.view) },
            wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
            wgpu::BindGroupEntry { binding: 3, resource: wgpu::BindingResource::TextureView(&bloom_a.view) },
        ],
    });

    BloomTargets {
        size,
        scene,
        bloom_a,
        bloom_b,
        extract_bg,
        blur_h_bg,
        blur_v_bg,
        composite_bg,
    }
}

fn create_uniform_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<BloomUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: min_binding_size::<BloomUniforms>(),
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 2,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn run_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
