//! Bloom: bright-pass extraction and a progressive blur mip chain.
//!
//! The scene renders into an HDR target owned here. `execute` extracts
//! pixels above the luminance threshold into the first mip, blurs by walking
//! the chain down and back up, and leaves the finished glow in mip 0. The
//! grade pass composites it; this module never touches the surface.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::postfx::BloomSettings;

/// Mip chain depth. Five halvings is enough spread for a fullscreen glow.
const MIP_LEVELS: u32 = 5;

/// Soft knee below the threshold so the bright cut has no hard edge.
const SOFT_KNEE: f32 = 0.5;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BloomParams {
    threshold: f32,
    knee: f32,
    radius: f32,
    _pad: f32,
}

const BLOOM_SHADER_SOURCE: &str = r#"
struct BloomParams {
    threshold: f32,
    knee: f32,
    radius: f32,
    _pad: f32,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0) var<uniform> params: BloomParams;
@group(1) @binding(0) var input_tex: texture_2d<f32>;
@group(1) @binding(1) var input_sampler: sampler;

@vertex
fn vs_fullscreen(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

fn soft_threshold(color: vec3<f32>, threshold: f32, knee: f32) -> vec3<f32> {
    let luminance = dot(color, vec3<f32>(0.2126, 0.7152, 0.0722));
    let soft = clamp(luminance - threshold + knee, 0.0, 2.0 * knee);
    let contribution = soft * soft / (4.0 * knee + 0.0001);
    let factor = max(luminance - threshold, contribution) / max(luminance, 0.0001);
    return color * max(factor, 0.0);
}

@fragment
fn fs_extract(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(input_tex, input_sampler, in.uv).rgb;
    return vec4<f32>(soft_threshold(color, params.threshold, params.knee), 1.0);
}

@fragment
fn fs_downsample(in: VertexOutput) -> @location(0) vec4<f32> {
    let dims = vec2<f32>(textureDimensions(input_tex));
    let texel = params.radius / dims;
    let a = textureSample(input_tex, input_sampler, in.uv + vec2(-texel.x, -texel.y)).rgb;
    let b = textureSample(input_tex, input_sampler, in.uv + vec2( texel.x, -texel.y)).rgb;
    let c = textureSample(input_tex, input_sampler, in.uv + vec2(-texel.x,  texel.y)).rgb;
    let d = textureSample(input_tex, input_sampler, in.uv + vec2( texel.x,  texel.y)).rgb;
    return vec4<f32>((a + b + c + d) * 0.25, 1.0);
}

@fragment
fn fs_upsample(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(input_tex, input_sampler, in.uv).rgb;
    return vec4<f32>(color, 1.0);
}
"#;

/// Bright-pass and blur pipelines over a fixed-depth mip chain.
pub struct BloomPipeline {
    texture_bgl: wgpu::BindGroupLayout,
    extract_pipeline: wgpu::RenderPipeline,
    downsample_pipeline: wgpu::RenderPipeline,
    upsample_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
    hdr_texture: wgpu::Texture,
    hdr_view: wgpu::TextureView,
    hdr_bind_group: wgpu::BindGroup,
    hdr_format: wgpu::TextureFormat,
    mip_textures: Vec<wgpu::Texture>,
    mip_views: Vec<wgpu::TextureView>,
    mip_bind_groups: Vec<wgpu::BindGroup>,
}

impl BloomPipeline {
    pub fn new(
        device: &wgpu::Device,
        hdr_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bloom-shader"),
            source: wgpu::ShaderSource::Wgsl(BLOOM_SHADER_SOURCE.into()),
        });

        let params_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom-params-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(16),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom-texture-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("bloom-layout"),
            bind_group_layouts: &[&params_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let extract_pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &layout,
            "fs_extract",
            hdr_format,
            None,
            "bloom-extract",
        );
        let downsample_pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &layout,
            "fs_downsample",
            hdr_format,
            None,
            "bloom-downsample",
        );
        let upsample_pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &layout,
            "fs_upsample",
            hdr_format,
            Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            }),
            "bloom-upsample",
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("bloom-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let settings = BloomSettings::default();
        let params = BloomParams {
            threshold: settings.threshold,
            knee: SOFT_KNEE,
            radius: settings.radius,
            _pad: 0.0,
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom-params"),
            contents: bytemuck::cast_slice(&[params]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bloom-params-bg"),
            layout: &params_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        let (hdr_texture, hdr_view, hdr_bind_group) =
            create_hdr_texture(device, &texture_bgl, &sampler, hdr_format, width, height);
        let (mip_textures, mip_views, mip_bind_groups) =
            create_mip_chain(device, &texture_bgl, &sampler, hdr_format, width, height);

        Self {
            texture_bgl,
            extract_pipeline,
            downsample_pipeline,
            upsample_pipeline,
            sampler,
            params_buffer,
            params_bind_group,
            hdr_texture,
            hdr_view,
            hdr_bind_group,
            hdr_format,
            mip_textures,
            mip_views,
            mip_bind_groups,
        }
    }

    /// The HDR view scenes render into.
    pub fn hdr_view(&self) -> &wgpu::TextureView {
        &self.hdr_view
    }

    pub fn hdr_format(&self) -> wgpu::TextureFormat {
        self.hdr_format
    }

    /// The finished glow, ready for compositing.
    pub fn bloom_view(&self) -> &wgpu::TextureView {
        &self.mip_views[0]
    }

    /// Recreate textures and bind groups after a window resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (hdr_texture, hdr_view, hdr_bind_group) = create_hdr_texture(
            device,
            &self.texture_bgl,
            &self.sampler,
            self.hdr_format,
            width,
            height,
        );
        self.hdr_texture = hdr_texture;
        self.hdr_view = hdr_view;
        self.hdr_bind_group = hdr_bind_group;

        let (mip_textures, mip_views, mip_bind_groups) = create_mip_chain(
            device,
            &self.texture_bgl,
            &self.sampler,
            self.hdr_format,
            width,
            height,
        );
        self.mip_textures = mip_textures;
        self.mip_views = mip_views;
        self.mip_bind_groups = mip_bind_groups;
    }

    /// Push damped bloom parameters to the GPU.
    pub fn update_settings(&self, queue: &wgpu::Queue, settings: &BloomSettings) {
        let params = BloomParams {
            threshold: settings.threshold,
            knee: SOFT_KNEE,
            radius: settings.radius,
            _pad: 0.0,
        };
        queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));
    }

    /// Extract, downsample, and upsample. Leaves the glow in mip 0.
    pub fn execute(&self, encoder: &mut wgpu::CommandEncoder) {
        self.run_pass(
            encoder,
            &self.extract_pipeline,
            &self.hdr_bind_group,
            &self.mip_views[0],
            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            "bloom-extract",
        );

        for i in 1..self.mip_textures.len() {
            self.run_pass(
                encoder,
                &self.downsample_pipeline,
                &self.mip_bind_groups[i - 1],
                &self.mip_views[i],
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                "bloom-downsample",
            );
        }

        for i in (0..self.mip_textures.len() - 1).rev() {
            self.run_pass(
                encoder,
                &self.upsample_pipeline,
                &self.mip_bind_groups[i + 1],
                &self.mip_views[i],
                wgpu::LoadOp::Load,
                "bloom-upsample",
            );
        }
    }

    fn run_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipeline: &wgpu::RenderPipeline,
        texture_bind_group: &wgpu::BindGroup,
        target_view: &wgpu::TextureView,
        load_op: wgpu::LoadOp<wgpu::Color>,
        label: &str,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: load_op,
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
        pass.set_bind_group(0, &self.params_bind_group, &[]);
        pass.set_bind_group(1, texture_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    fragment_entry: &str,
    target_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_fullscreen"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

fn create_hdr_texture(
    device: &wgpu::Device,
    texture_bgl: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView, wgpu::BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("postfx-hdr"),
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
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("postfx-hdr-bg"),
        layout: texture_bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    (texture, view, bind_group)
}

fn create_mip_chain(
    device: &wgpu::Device,
    texture_bgl: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> (
    Vec<wgpu::Texture>,
    Vec<wgpu::TextureView>,
    Vec<wgpu::BindGroup>,
) {
    let mut textures = Vec::new();
    let mut views = Vec::new();
    let mut bind_groups = Vec::new();
    let mut w = width / 2;
    let mut h = height / 2;

    for i in 0..MIP_LEVELS {
        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("bloom-mip"),
            size: wgpu::Extent3d {
                width: w.max(1),
                height: h.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bloom-mip-bg"),
            layout: texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        textures.push(tex);
        views.push(view);
        bind_groups.push(bg);

        log::trace!("Bloom mip {i}: {w}x{h}");
        w = (w / 2).max(1);
        h = (h / 2).max(1);
    }

    (textures, views, bind_groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bloom_params_uniform_size() {
        assert_eq!(std::mem::size_of::<BloomParams>(), 16);
    }

    #[test]
    fn test_bright_pixels_pass_the_threshold() {
        let bright = [5.0_f32, 5.0, 5.0];
        let threshold = 1.0;
        let luminance = bright[0] * 0.2126 + bright[1] * 0.7152 + bright[2] * 0.0722;
        let factor = (luminance - threshold) / luminance;
        assert!(factor > 0.0);
    }

    #[test]
    fn test_dim_pixels_contribute_almost_nothing() {
        let dim = [0.3_f32, 0.3, 0.3];
        let threshold = 1.0;
        let luminance = dim[0] * 0.2126 + dim[1] * 0.7152 + dim[2] * 0.0722;
        let factor = (luminance - threshold).max(0.0) / luminance.max(0.0001);
        let extracted: Vec<f32> = dim.iter().map(|c| c * factor).collect();
        assert!(extracted.iter().all(|&v| v < 0.01));
    }

    #[test]
    fn test_mip_chain_dimensions_halve_each_level() {
        let mut w = 1920u32 / 2;
        let mut h = 1080u32 / 2;
        let expected = [(960, 540), (480, 270), (240, 135), (120, 67), (60, 33)];
        for (i, &(ew, eh)) in expected.iter().enumerate() {
            assert_eq!((w, h), (ew, eh), "mip level {i}");
            w = (w / 2).max(1);
            h = (h / 2).max(1);
        }
    }

    #[test]
    fn test_tiny_surfaces_clamp_to_one_pixel_mips() {
        let mut w = 4u32 / 2;
        let mut h = 4u32 / 2;
        for _ in 0..MIP_LEVELS {
            assert!(w.max(1) >= 1 && h.max(1) >= 1);
            w = (w / 2).max(1);
            h = (h / 2).max(1);
        }
        assert_eq!((w, h), (1, 1));
    }
}
