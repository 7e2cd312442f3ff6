//! Render pass abstraction for reducing wgpu boilerplate.
//!
//! Provides [`RenderPassBuilder`] for declarative render pass configuration
//! and [`FrameEncoder`] for managing per-frame command encoding lifecycle.
//! Backdrop passes never use depth or MSAA; layers composite back-to-front
//! with alpha blending.

use std::sync::Arc;

/// Builder for configuring color-only render passes.
#[derive(Debug)]
pub struct RenderPassBuilder {
    load: wgpu::LoadOp<wgpu::Color>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    /// A pass that clears to opaque black before drawing.
    pub fn new() -> Self {
        Self {
            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            label: None,
        }
    }

    /// Set the clear color for the color attachment.
    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.load = wgpu::LoadOp::Clear(color);
        self
    }

    /// Keep the existing attachment contents instead of clearing.
    pub fn load_existing(mut self) -> Self {
        self.load = wgpu::LoadOp::Load;
        self
    }

    /// Set debug label for the render pass.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Begin the pass against an arbitrary color target.
    pub fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        color_view: &'encoder wgpu::TextureView,
    ) -> wgpu::RenderPass<'encoder> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: self.load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Manages per-frame command encoding lifecycle with automatic submission.
pub struct FrameEncoder {
    encoder: Option<wgpu::CommandEncoder>,
    queue: Arc<wgpu::Queue>,
    surface_texture: Option<wgpu::SurfaceTexture>,
    surface_view: Option<wgpu::TextureView>,
    submitted: bool,
}

impl FrameEncoder {
    /// Create a new frame encoder for the given device, queue, and surface texture.
    pub fn new(
        device: &wgpu::Device,
        queue: Arc<wgpu::Queue>,
        surface_texture: wgpu::SurfaceTexture,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            encoder: Some(encoder),
            queue,
            surface_texture: Some(surface_texture),
            surface_view: Some(surface_view),
            submitted: false,
        }
    }

    /// Begin a render pass against the surface using the builder configuration.
    pub fn begin_surface_pass<'a>(
        &'a mut self,
        builder: &RenderPassBuilder,
    ) -> wgpu::RenderPass<'a> {
        let view = self
            .surface_view
            .as_ref()
            .expect("FrameEncoder already submitted");

        builder.begin(
            self.encoder
                .as_mut()
                .expect("FrameEncoder already submitted"),
            view,
        )
    }

    /// The surface view, for passes composited after offscreen rendering.
    pub fn surface_view(&self) -> &wgpu::TextureView {
        self.surface_view
            .as_ref()
            .expect("FrameEncoder already submitted")
    }

    /// The raw command encoder, for multi-target work like the post-FX chain.
    pub fn encoder(&mut self) -> &mut wgpu::CommandEncoder {
        self.encoder
            .as_mut()
            .expect("FrameEncoder already submitted")
    }

    /// Returns a reference to the queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Submit the command buffer to the queue and present the surface texture.
    /// Consumes self to prevent double-submission.
    pub fn submit(mut self) {
        if self.submitted {
            return;
        }

        if let (Some(encoder), Some(surface_texture)) =
            (self.encoder.take(), self.surface_texture.take())
        {
            let command_buffer = encoder.finish();
            self.queue.submit([command_buffer]);
            surface_texture.present();
            self.submitted = true;
        }
    }
}

impl Drop for FrameEncoder {
    fn drop(&mut self) {
        if !self.submitted
            && let (Some(encoder), Some(surface_texture)) =
                (self.encoder.take(), self.surface_texture.take())
        {
            log::warn!("FrameEncoder dropped without explicit submit() - auto-submitting");
            let command_buffer = encoder.finish();
            self.queue.submit([command_buffer]);
            surface_texture.present();
            self.submitted = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_clear_color() {
        let builder = RenderPassBuilder::new().clear_color(wgpu::Color::RED);
        match builder.load {
            wgpu::LoadOp::Clear(color) => {
                assert_eq!(color.r, 1.0);
                assert_eq!(color.g, 0.0);
            }
            _ => panic!("expected clear"),
        }
    }

    #[test]
    fn test_default_clears_to_black() {
        let builder = RenderPassBuilder::new();
        match builder.load {
            wgpu::LoadOp::Clear(color) => {
                assert_eq!(color.r, 0.0);
                assert_eq!(color.g, 0.0);
                assert_eq!(color.b, 0.0);
                assert_eq!(color.a, 1.0);
            }
            _ => panic!("expected clear"),
        }
    }

    #[test]
    fn test_load_existing_keeps_contents() {
        let builder = RenderPassBuilder::new().load_existing();
        assert!(matches!(builder.load, wgpu::LoadOp::Load));
    }

    #[test]
    fn test_label_is_stored() {
        let builder = RenderPassBuilder::new().label("backdrop-pass");
        assert_eq!(builder.label, Some("backdrop-pass"));
    }
}
