//! The always-available gradient backdrop.
//!
//! Every frame starts by painting a vertical two-stop gradient keyed to the
//! active theme. Scenes composite on top of it; when there is no GPU budget
//! for scenes, the gradient alone is the whole backdrop. The worst visual
//! outcome anywhere in the engine is this gradient, never a blank window.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use halcyon_theme::ThemeId;

/// Two-stop vertical gradient, top to bottom, linear sRGB.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientPalette {
    pub top: [f32; 4],
    pub bottom: [f32; 4],
}

/// The gradient for a theme. Total function: every theme has one.
pub fn palette_for(theme: ThemeId) -> GradientPalette {
    match theme {
        ThemeId::Light => GradientPalette {
            top: [0.93, 0.95, 0.98, 1.0],
            bottom: [0.82, 0.87, 0.94, 1.0],
        },
        ThemeId::Dark => GradientPalette {
            top: [0.05, 0.06, 0.10, 1.0],
            bottom: [0.10, 0.11, 0.18, 1.0],
        },
        ThemeId::Cyberpunk => GradientPalette {
            top: [0.08, 0.02, 0.14, 1.0],
            bottom: [0.20, 0.03, 0.22, 1.0],
        },
        ThemeId::Ethereal => GradientPalette {
            top: [0.13, 0.10, 0.25, 1.0],
            bottom: [0.30, 0.18, 0.38, 1.0],
        },
        ThemeId::Horizon => GradientPalette {
            top: [0.10, 0.14, 0.28, 1.0],
            bottom: [0.75, 0.42, 0.30, 1.0],
        },
        ThemeId::Mirage => GradientPalette {
            top: [0.85, 0.72, 0.48, 1.0],
            bottom: [0.62, 0.44, 0.28, 1.0],
        },
        ThemeId::Simple => GradientPalette {
            top: [0.16, 0.16, 0.18, 1.0],
            bottom: [0.12, 0.12, 0.14, 1.0],
        },
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct GradientUniforms {
    top: [f32; 4],
    bottom: [f32; 4],
}

const GRADIENT_SHADER_SOURCE: &str = r#"
struct GradientUniforms {
    top: vec4<f32>,
    bottom: vec4<f32>,
};

@group(0) @binding(0) var<uniform> u: GradientUniforms;

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

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return mix(u.top, u.bottom, in.uv.y);
}
"#;

/// Fullscreen gradient pipeline. Drawn first every frame, opaque.
pub struct GradientBackdrop {
    palette: GradientPalette,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl GradientBackdrop {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        theme: ThemeId,
    ) -> Self {
        let palette = palette_for(theme);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gradient-shader"),
            source: wgpu::ShaderSource::Wgsl(GRADIENT_SHADER_SOURCE.into()),
        });

        let uniforms = GradientUniforms {
            top: palette.top,
            bottom: palette.bottom,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gradient-uniforms"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gradient-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(32),
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gradient-bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gradient-layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gradient-pipeline"),
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
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            palette,
            uniform_buffer,
            bind_group,
            pipeline,
        }
    }

    pub fn palette(&self) -> GradientPalette {
        self.palette
    }

    /// Switch the gradient to another theme's palette.
    pub fn set_theme(&mut self, queue: &wgpu::Queue, theme: ThemeId) {
        self.palette = palette_for(theme);
        let uniforms = GradientUniforms {
            top: self.palette.top,
            bottom: self.palette.bottom,
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halcyon_theme::THEMES;

    #[test]
    fn test_every_theme_has_a_palette() {
        for theme in THEMES {
            let palette = palette_for(theme.id);
            for channel in palette.top.iter().chain(palette.bottom.iter()) {
                assert!(
                    (0.0..=1.0).contains(channel),
                    "{} palette channel out of range: {channel}",
                    theme.id
                );
            }
        }
    }

    #[test]
    fn test_palettes_are_opaque() {
        for theme in THEMES {
            let palette = palette_for(theme.id);
            assert_eq!(palette.top[3], 1.0, "{} top alpha", theme.id);
            assert_eq!(palette.bottom[3], 1.0, "{} bottom alpha", theme.id);
        }
    }

    #[test]
    fn test_light_is_lighter_than_dark() {
        let light = palette_for(ThemeId::Light);
        let dark = palette_for(ThemeId::Dark);
        let light_lum = light.top[0] + light.top[1] + light.top[2];
        let dark_lum = dark.top[0] + dark.top[1] + dark.top[2];
        assert!(light_lum > dark_lum);
    }
}
