//! Instanced sprite rendering for scene props.
//!
//! Props (birds, drifting cars, bokeh motes) are soft-edged quads drawn in
//! one instanced call. Owners animate instance data on the CPU each frame
//! and re-upload; counts are tiny so this is cheaper than per-prop
//! pipelines.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// One sprite. Position and size are in UV space, origin top-left.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SpriteInstance {
    pub pos: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
    pub rotation: f32,
    pub _pad: [f32; 3],
}

impl SpriteInstance {
    pub fn new(pos: [f32; 2], size: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            pos,
            size,
            color,
            rotation: 0.0,
            _pad: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct SpriteGlobals {
    resolution: [f32; 2],
    fade: f32,
    _pad: f32,
}

const SPRITE_SHADER_SOURCE: &str = r#"
struct SpriteGlobals {
    resolution: vec2<f32>,
    fade: f32,
    _pad: f32,
};

@group(0) @binding(0) var<uniform> globals: SpriteGlobals;

struct InstanceInput {
    @location(0) pos: vec2<f32>,
    @location(1) size: vec2<f32>,
    @location(2) color: vec4<f32>,
    @location(3) rotation: f32,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) local: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_sprite(
    @builtin(vertex_index) vertex_index: u32,
    instance: InstanceInput,
) -> VertexOutput {
    // Two triangles in local space [-0.5, 0.5].
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>( 0.5, -0.5),
        vec2<f32>(-0.5,  0.5),
        vec2<f32>(-0.5,  0.5),
        vec2<f32>( 0.5, -0.5),
        vec2<f32>( 0.5,  0.5),
    );
    let corner = corners[vertex_index];
    let cos_r = cos(instance.rotation);
    let sin_r = sin(instance.rotation);
    let rotated = vec2<f32>(
        corner.x * cos_r - corner.y * sin_r,
        corner.x * sin_r + corner.y * cos_r,
    );
    // Keep sprites round regardless of surface aspect ratio.
    let aspect = globals.resolution.x / max(globals.resolution.y, 1.0);
    var scaled = rotated * instance.size;
    scaled.x = scaled.x / aspect;
    let uv = instance.pos + scaled;

    var out: VertexOutput;
    out.position = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0);
    out.local = corner * 2.0;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_sprite(in: VertexOutput) -> @location(0) vec4<f32> {
    // Soft-edged disc; alpha fades toward the quad edge.
    let dist = length(in.local);
    let alpha = in.color.a * (1.0 - smoothstep(0.6, 1.0, dist)) * globals.fade;
    return vec4<f32>(in.color.rgb * alpha, alpha);
}
"#;

/// A single instanced draw of soft-edged sprites.
pub struct SpriteBatch {
    globals: SpriteGlobals,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    capacity: u32,
    count: u32,
    pipeline: wgpu::RenderPipeline,
}

impl SpriteBatch {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        capacity: u32,
        width: u32,
        height: u32,
        label: &'static str,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(SPRITE_SHADER_SOURCE.into()),
        });

        let globals = SpriteGlobals {
            resolution: [width.max(1) as f32, height.max(1) as f32],
            fade: 0.0,
            _pad: 0.0,
        };
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[globals]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(16),
                },
                count: None,
            }],
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: u64::from(capacity) * std::mem::size_of::<SpriteInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 8,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 16,
                    shader_location: 2,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 32,
                    shader_location: 3,
                },
            ],
        };

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_sprite"),
                buffers: &[instance_layout],
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
                entry_point: Some("fs_sprite"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    // Premultiplied alpha, matching the fragment output.
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            globals,
            globals_buffer,
            globals_bind_group,
            instance_buffer,
            capacity,
            count: 0,
            pipeline,
        }
    }

    pub fn set_fade(&mut self, fade: f32) {
        self.globals.fade = fade.clamp(0.0, 1.0);
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.globals.resolution = [width.max(1) as f32, height.max(1) as f32];
    }

    /// Upload instances and globals for this frame. Instances beyond the
    /// batch capacity are dropped with a warning.
    pub fn upload(&mut self, queue: &wgpu::Queue, instances: &[SpriteInstance]) {
        let count = instances.len().min(self.capacity as usize);
        if count < instances.len() {
            log::warn!(
                "Sprite batch over capacity: {} of {} uploaded",
                count,
                instances.len()
            );
        }
        self.count = count as u32;
        if count > 0 {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances[..count]),
            );
        }
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::cast_slice(&[self.globals]));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout_size() {
        // Must match the vertex attribute offsets in the pipeline.
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 48);
    }

    #[test]
    fn test_globals_uniform_size() {
        assert_eq!(std::mem::size_of::<SpriteGlobals>(), 16);
    }

    #[test]
    fn test_shader_defines_entry_points() {
        assert!(SPRITE_SHADER_SOURCE.contains("fn vs_sprite"));
        assert!(SPRITE_SHADER_SOURCE.contains("fn fs_sprite"));
    }
}
