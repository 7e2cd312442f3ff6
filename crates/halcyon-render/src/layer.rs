//! The layer abstraction scenes are built from.
//!
//! A scene is a small stack of [`Layer`]s composited back-to-front with alpha
//! blending. Most layers are a [`ShaderPlane`]: one fullscreen triangle whose
//! fragment shader paints the whole band (sky, fog, ocean, skyline). Each
//! layer advances its own clock so per-layer time scales stay independent.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Per-layer GPU uniform block. Shared by every fullscreen layer shader;
/// `params0..2` carry layer-specific knobs.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LayerUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub fade: f32,
    /// Parallax offset in UV units, already scaled by the layer's depth.
    pub offset: [f32; 2],
    pub _pad: [f32; 2],
    pub params0: [f32; 4],
    pub params1: [f32; 4],
    pub params2: [f32; 4],
}

/// WGSL shared by every fullscreen layer: the uniform block, the vertex
/// output, and the fullscreen-triangle vertex stage. Fragment sources are
/// appended to this and must define `fs_main`.
pub const LAYER_SHADER_PRELUDE: &str = r#"
struct LayerUniforms {
    resolution: vec2<f32>,
    time: f32,
    fade: f32,
    offset: vec2<f32>,
    _pad: vec2<f32>,
    params0: vec4<f32>,
    params1: vec4<f32>,
    params2: vec4<f32>,
};

@group(0) @binding(0) var<uniform> u: LayerUniforms;

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
"#;

/// One compositing layer of a scene.
pub trait Layer {
    fn label(&self) -> &str;

    /// Draw order. Lower values draw first (further back).
    fn z_order(&self) -> i32;

    /// Advance animation time and upload uniforms.
    fn update(&mut self, queue: &wgpu::Queue, dt: f32);

    /// Set the crossfade opacity, 0.0 (invisible) to 1.0 (fully shown).
    fn set_fade(&mut self, fade: f32);

    /// Feed the pointer-driven parallax offset. Layers apply their own depth
    /// scale; most ignore it.
    fn set_offset(&mut self, offset: [f32; 2]) {
        let _ = offset;
    }

    fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32);

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>);
}

/// Construction parameters for a [`ShaderPlane`].
pub struct ShaderPlaneDesc {
    pub label: &'static str,
    /// Fragment WGSL appended to [`LAYER_SHADER_PRELUDE`]; must define `fs_main`.
    pub fragment_source: &'static str,
    pub z_order: i32,
    /// Multiplier on wall-clock dt for this layer's animation time.
    pub time_scale: f32,
    /// Depth factor applied to the parallax offset.
    pub parallax: f32,
    pub params0: [f32; 4],
    pub params1: [f32; 4],
    pub params2: [f32; 4],
    pub blend: wgpu::BlendState,
}

impl ShaderPlaneDesc {
    pub fn new(label: &'static str, fragment_source: &'static str) -> Self {
        Self {
            label,
            fragment_source,
            z_order: 0,
            time_scale: 1.0,
            parallax: 0.0,
            params0: [0.0; 4],
            params1: [0.0; 4],
            params2: [0.0; 4],
            blend: wgpu::BlendState::ALPHA_BLENDING,
        }
    }

    pub fn z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    pub fn time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn parallax(mut self, parallax: f32) -> Self {
        self.parallax = parallax;
        self
    }

    pub fn params0(mut self, params: [f32; 4]) -> Self {
        self.params0 = params;
        self
    }

    pub fn params1(mut self, params: [f32; 4]) -> Self {
        self.params1 = params;
        self
    }

    pub fn params2(mut self, params: [f32; 4]) -> Self {
        self.params2 = params;
        self
    }

    pub fn blend(mut self, blend: wgpu::BlendState) -> Self {
        self.blend = blend;
        self
    }
}

/// A fullscreen fragment-shader layer: one pipeline, one uniform buffer,
/// drawn as a single fullscreen triangle.
pub struct ShaderPlane {
    label: &'static str,
    z_order: i32,
    time_scale: f32,
    parallax: f32,
    uniforms: LayerUniforms,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl ShaderPlane {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        desc: ShaderPlaneDesc,
    ) -> Self {
        let source = format!("{LAYER_SHADER_PRELUDE}{}", desc.fragment_source);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let uniforms = LayerUniforms {
            resolution: [width.max(1) as f32, height.max(1) as f32],
            time: 0.0,
            fade: 0.0,
            offset: [0.0, 0.0],
            _pad: [0.0, 0.0],
            params0: desc.params0,
            params1: desc.params1,
            params2: desc.params2,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(desc.label),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(desc.label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<LayerUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(desc.label),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(desc.label),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
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
                    format: target_format,
                    blend: Some(desc.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            label: desc.label,
            z_order: desc.z_order,
            time_scale: desc.time_scale,
            parallax: desc.parallax,
            uniforms,
            uniform_buffer,
            bind_group,
            pipeline,
        }
    }

    /// Overwrite one of the layer-specific parameter blocks.
    pub fn set_params0(&mut self, params: [f32; 4]) {
        self.uniforms.params0 = params;
    }

    pub fn set_params1(&mut self, params: [f32; 4]) {
        self.uniforms.params1 = params;
    }

    fn upload(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[self.uniforms]));
    }
}

impl Layer for ShaderPlane {
    fn label(&self) -> &str {
        self.label
    }

    fn z_order(&self) -> i32 {
        self.z_order
    }

    fn update(&mut self, queue: &wgpu::Queue, dt: f32) {
        self.uniforms.time += dt * self.time_scale;
        self.upload(queue);
    }

    fn set_fade(&mut self, fade: f32) {
        self.uniforms.fade = fade.clamp(0.0, 1.0);
    }

    fn set_offset(&mut self, offset: [f32; 2]) {
        self.uniforms.offset = [offset[0] * self.parallax, offset[1] * self.parallax];
    }

    fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.uniforms.resolution = [width.max(1) as f32, height.max(1) as f32];
        self.upload(queue);
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

/// An ordered collection of layers, kept sorted by z-order.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn Layer>>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Insert a layer, maintaining back-to-front order. Insertion order
    /// breaks ties.
    pub fn push(&mut self, layer: Box<dyn Layer>) {
        self.layers.push(layer);
        self.layers.sort_by_key(|l| l.z_order());
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn update(&mut self, queue: &wgpu::Queue, dt: f32) {
        for layer in &mut self.layers {
            layer.update(queue, dt);
        }
    }

    pub fn set_fade(&mut self, fade: f32) {
        for layer in &mut self.layers {
            layer.set_fade(fade);
        }
    }

    pub fn set_offset(&mut self, offset: [f32; 2]) {
        for layer in &mut self.layers {
            layer.set_offset(offset);
        }
    }

    pub fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        for layer in &mut self.layers {
            layer.resize(queue, width, height);
        }
    }

    /// Draw every layer back-to-front into an already-begun pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        for layer in &self.layers {
            layer.draw(pass);
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.label()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_uniforms_size_and_alignment() {
        // vec4-aligned uniform block: 2+1+1+2+2 f32 header plus three vec4s.
        assert_eq!(std::mem::size_of::<LayerUniforms>(), 80);
        assert_eq!(std::mem::size_of::<LayerUniforms>() % 16, 0);
    }

    #[test]
    fn test_prelude_defines_vertex_entry() {
        assert!(LAYER_SHADER_PRELUDE.contains("fn vs_fullscreen"));
        assert!(LAYER_SHADER_PRELUDE.contains("struct LayerUniforms"));
    }

    #[test]
    fn test_desc_defaults() {
        let desc = ShaderPlaneDesc::new("test", "");
        assert_eq!(desc.z_order, 0);
        assert_eq!(desc.time_scale, 1.0);
        assert_eq!(desc.parallax, 0.0);
    }

    struct FakeLayer {
        label: &'static str,
        z_order: i32,
    }

    impl Layer for FakeLayer {
        fn label(&self) -> &str {
            self.label
        }
        fn z_order(&self) -> i32 {
            self.z_order
        }
        fn update(&mut self, _queue: &wgpu::Queue, _dt: f32) {}
        fn set_fade(&mut self, _fade: f32) {}
        fn resize(&mut self, _queue: &wgpu::Queue, _width: u32, _height: u32) {}
        fn draw(&self, _pass: &mut wgpu::RenderPass<'_>) {}
    }

    #[test]
    fn test_stack_orders_by_z() {
        let mut stack = LayerStack::new();
        stack.push(Box::new(FakeLayer {
            label: "front",
            z_order: 10,
        }));
        stack.push(Box::new(FakeLayer {
            label: "back",
            z_order: -10,
        }));
        stack.push(Box::new(FakeLayer {
            label: "middle",
            z_order: 0,
        }));
        assert_eq!(stack.labels(), vec!["back", "middle", "front"]);
    }

    #[test]
    fn test_stack_ties_keep_insertion_order() {
        let mut stack = LayerStack::new();
        stack.push(Box::new(FakeLayer {
            label: "first",
            z_order: 0,
        }));
        stack.push(Box::new(FakeLayer {
            label: "second",
            z_order: 0,
        }));
        assert_eq!(stack.labels(), vec!["first", "second"]);
    }
}
