//! The final grade pass: tonemap plus stylized distortion.
//!
//! Reads the HDR scene and the finished bloom, composites them, tonemaps,
//! and applies chromatic aberration, vignette, animated grain, scanline
//! weave, and frame jitter. All amounts come from the damped preset, so a
//! zeroed preset is a clean tonemapped image.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::postfx::PostFxPreset;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct GradeParams {
    resolution: [f32; 2],
    time: f32,
    aberration: f32,
    vignette: f32,
    grain: f32,
    weave: f32,
    jitter: f32,
    bloom_strength: f32,
    /// Whole-scene opacity composited over the gradient beneath.
    fade: f32,
    _pad: [f32; 2],
}

const GRADE_SHADER_SOURCE: &str = r#"
struct GradeParams {
    resolution: vec2<f32>,
    time: f32,
    aberration: f32,
    vignette: f32,
    grain: f32,
    weave: f32,
    jitter: f32,
    bloom_strength: f32,
    fade: f32,
    _pad: vec2<f32>,
};

@group(0) @binding(0) var<uniform> params: GradeParams;
@group(1) @binding(0) var hdr_tex: texture_2d<f32>;
@group(1) @binding(1) var bloom_tex: texture_2d<f32>;
@group(1) @binding(2) var tex_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

fn hash21(p: vec2<f32>) -> f32 {
    var q = fract(p * vec2<f32>(123.34, 456.21));
    q = q + dot(q, q + 45.32);
    return fract(q.x * q.y);
}

fn aces(x: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp((x * (a * x + b)) / (x * (c * x + d) + e), vec3<f32>(0.0), vec3<f32>(1.0));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Frame jitter: small displacement that changes a few times a second.
    let step_time = floor(params.time * 8.0);
    let jitter_offset = (vec2<f32>(
        hash21(vec2<f32>(step_time, 3.7)),
        hash21(vec2<f32>(step_time, 9.1)),
    ) - 0.5) * params.jitter;
    let uv = in.uv + jitter_offset;

    // Chromatic aberration: split channels radially from center.
    let from_center = uv - vec2<f32>(0.5, 0.5);
    let shift = from_center * params.aberration;
    let r = textureSample(hdr_tex, tex_sampler, uv + shift).r;
    let g = textureSample(hdr_tex, tex_sampler, uv).g;
    let b = textureSample(hdr_tex, tex_sampler, uv - shift).b;
    var color = vec3<f32>(r, g, b);

    let bloom = textureSample(bloom_tex, tex_sampler, uv).rgb;
    color = color + bloom * params.bloom_strength;

    color = aces(color);

    // Scanline weave.
    let weave_wave = sin(uv.y * params.resolution.y * 1.5 + params.time * 3.0);
    color = color * (1.0 - params.weave * 0.5 * (0.5 + 0.5 * weave_wave));

    // Animated grain.
    let noise = hash21(uv * params.resolution + vec2<f32>(params.time * 61.7, 0.0));
    color = color + (noise - 0.5) * params.grain;

    // Vignette.
    let dist = length(from_center) * 1.4142;
    let vig = 1.0 - params.vignette * smoothstep(0.4, 1.1, dist);
    color = color * vig;

    return vec4<f32>(color, params.fade);
}
"#;

/// One fullscreen pass from HDR + bloom to the surface.
pub struct GradePass {
    params: GradeParams,
    params_buffer: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
    texture_bgl: wgpu::BindGroupLayout,
    texture_bind_group: Option<wgpu::BindGroup>,
    sampler: wgpu::Sampler,
    pipeline: wgpu::RenderPipeline,
}

impl GradePass {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("grade-shader"),
            source: wgpu::ShaderSource::Wgsl(GRADE_SHADER_SOURCE.into()),
        });

        let params = GradeParams {
            resolution: [width.max(1) as f32, height.max(1) as f32],
            time: 0.0,
            aberration: 0.0,
            vignette: 0.0,
            grain: 0.0,
            weave: 0.0,
            jitter: 0.0,
            bloom_strength: 0.0,
            fade: 1.0,
            _pad: [0.0; 2],
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grade-params"),
            contents: bytemuck::cast_slice(&[params]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let params_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grade-params-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<GradeParams>() as u64,
                    ),
                },
                count: None,
            }],
        });
        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grade-params-bg"),
            layout: &params_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grade-texture-bgl"),
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
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("grade-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grade-layout"),
            bind_group_layouts: &[&params_bgl, &texture_bgl],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("grade-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
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
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    // Composites over the gradient already on the surface.
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            params,
            params_buffer,
            params_bind_group,
            texture_bgl,
            texture_bind_group: None,
            sampler,
            pipeline,
        }
    }

    /// Bind the input textures. Must be called after construction and after
    /// every resize, once the upstream views exist.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        hdr_view: &wgpu::TextureView,
        bloom_view: &wgpu::TextureView,
    ) {
        self.texture_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grade-texture-bg"),
            layout: &self.texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(hdr_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(bloom_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }));
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.params.resolution = [width.max(1) as f32, height.max(1) as f32];
    }

    /// Upload the damped preset and draw to the surface.
    pub fn execute(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
        preset: &PostFxPreset,
        time: f32,
        fade: f32,
    ) {
        let Some(texture_bind_group) = self.texture_bind_group.as_ref() else {
            log::warn!("Grade pass executed before rebind, skipping");
            return;
        };

        self.params.time = time;
        self.params.fade = fade.clamp(0.0, 1.0);
        self.params.aberration = preset.grade.aberration;
        self.params.vignette = preset.grade.vignette;
        self.params.grain = preset.grade.grain;
        self.params.weave = preset.grade.weave;
        self.params.jitter = preset.grade.jitter;
        self.params.bloom_strength = preset.bloom.strength;
        queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[self.params]));

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("grade-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.params_bind_group, &[]);
        pass.set_bind_group(1, texture_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_params_uniform_size() {
        assert_eq!(std::mem::size_of::<GradeParams>(), 48);
        assert_eq!(std::mem::size_of::<GradeParams>() % 16, 0);
    }

    #[test]
    fn test_shader_defines_both_entry_points() {
        assert!(GRADE_SHADER_SOURCE.contains("fn vs_fullscreen"));
        assert!(GRADE_SHADER_SOURCE.contains("fn fs_main"));
    }
}
