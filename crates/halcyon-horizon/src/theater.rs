//! The theater scene itself.

use halcyon_clock::HorizonVariant;
use halcyon_render::{LayerStack, PostFxChain, PresetDamper, RenderPassBuilder};
use halcyon_scenes::{Scene, SceneContext, SceneError};
use halcyon_theme::SceneKey;

use crate::layers::build_stack;
use crate::presets::preset_for;

/// The layered time-of-day backdrop.
///
/// Renders its layer stack into an HDR target and finishes through the
/// bloom + grade chain. If the chain cannot be built the theater renders
/// straight to the surface without post-FX; it never refuses to exist over
/// a missing effect.
pub struct HorizonTheater {
    device: wgpu::Device,
    surface_format: wgpu::TextureFormat,
    variant: HorizonVariant,
    stack: LayerStack,
    postfx: Option<PostFxChain>,
    damper: PresetDamper,
    fade: f32,
    time: f32,
    width: u32,
    height: u32,
}

impl HorizonTheater {
    pub fn new(ctx: &SceneContext<'_>) -> Result<Self, SceneError> {
        let variant = HorizonVariant::Day;
        let postfx = if ctx.postfx {
            match PostFxChain::new(ctx.device, ctx.surface_format, ctx.width, ctx.height) {
                Ok(chain) => Some(chain),
                Err(err) => {
                    log::warn!("Post-FX unavailable, theater runs without it: {err}");
                    None
                }
            }
        } else {
            None
        };

        let target_format = match &postfx {
            Some(chain) => chain.scene_format(),
            None => ctx.surface_format,
        };
        let stack = build_stack(ctx.device, target_format, ctx.width, ctx.height, variant);

        Ok(Self {
            device: ctx.device.clone(),
            surface_format: ctx.surface_format,
            variant,
            stack,
            postfx,
            damper: PresetDamper::new(preset_for(variant)),
            fade: 0.0,
            time: 0.0,
            width: ctx.width,
            height: ctx.height,
        })
    }

    fn target_format(&self) -> wgpu::TextureFormat {
        match &self.postfx {
            Some(chain) => chain.scene_format(),
            None => self.surface_format,
        }
    }

    fn rebuild_stack(&mut self) {
        self.stack = build_stack(
            &self.device,
            self.target_format(),
            self.width,
            self.height,
            self.variant,
        );
    }

    pub fn variant(&self) -> HorizonVariant {
        self.variant
    }
}

impl Scene for HorizonTheater {
    fn key(&self) -> SceneKey {
        SceneKey::Theater
    }

    fn update(&mut self, queue: &wgpu::Queue, dt: f32) {
        self.time += dt;
        self.damper.advance(dt);
        // With post-FX the crossfade is applied at the grade composite;
        // layers stay fully opaque inside the HDR frame.
        let layer_fade = if self.postfx.is_some() { 1.0 } else { self.fade };
        self.stack.set_fade(layer_fade);
        self.stack.update(queue, dt);
    }

    fn set_fade(&mut self, fade: f32) {
        self.fade = fade.clamp(0.0, 1.0);
    }

    fn set_variant(&mut self, variant: HorizonVariant) {
        if variant == self.variant {
            return;
        }
        log::info!("Theater variant: {:?} -> {:?}", self.variant, variant);
        self.variant = variant;
        self.damper.set_target(preset_for(variant));
        self.rebuild_stack();
    }

    fn set_offset(&mut self, offset: [f32; 2]) {
        self.stack.set_offset(offset);
    }

    fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.stack.resize(queue, self.width, self.height);
        let resize_failed = match self.postfx.as_mut() {
            Some(chain) => chain.resize(device, self.width, self.height).is_err(),
            None => false,
        };
        if resize_failed {
            log::warn!("Post-FX targets could not be resized, dropping the chain");
            self.postfx = None;
            self.rebuild_stack();
        }
    }

    fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
    ) {
        match self.postfx.as_mut() {
            Some(chain) => {
                {
                    let builder = RenderPassBuilder::new().label("theater-hdr");
                    let mut pass = builder.begin(encoder, chain.scene_view());
                    self.stack.draw(&mut pass);
                }
                let preset = *self.damper.current();
                chain.execute(encoder, queue, surface_view, &preset, self.time, self.fade);
            }
            None => {
                let builder = RenderPassBuilder::new()
                    .load_existing()
                    .label("theater-direct");
                let mut pass = builder.begin(encoder, surface_view);
                self.stack.draw(&mut pass);
            }
        }
    }
}
