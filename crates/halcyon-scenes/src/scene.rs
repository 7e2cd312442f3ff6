//! The scene abstraction.

use halcyon_clock::HorizonVariant;
use halcyon_theme::SceneKey;

/// GPU handles and surface state passed to scene constructors and updates.
pub struct SceneContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    /// Whether scenes may build post-processing chains.
    pub postfx: bool,
}

/// Scene construction failures. Construction is the only fallible scene
/// operation; per-frame work is infallible by design.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The post-processing chain could not be built.
    #[error("post-processing unavailable: {0}")]
    PostFx(#[from] halcyon_render::PostFxError),

    /// No constructor registered for the requested scene.
    #[error("no constructor registered for scene {0:?}")]
    Unregistered(SceneKey),
}

/// One animated backdrop. Scenes own their GPU resources and release them
/// on drop; the orchestrator never reuses a torn-down scene.
pub trait Scene {
    fn key(&self) -> SceneKey;

    /// Advance animation time by `dt` seconds.
    fn update(&mut self, queue: &wgpu::Queue, dt: f32);

    /// Crossfade opacity over the gradient, 0.0 to 1.0.
    fn set_fade(&mut self, fade: f32);

    /// Time-of-day variant. Only the Horizon theater reacts; other scenes
    /// ignore it.
    fn set_variant(&mut self, variant: HorizonVariant) {
        let _ = variant;
    }

    /// Pointer-driven parallax offset. Optional.
    fn set_offset(&mut self, offset: [f32; 2]) {
        let _ = offset;
    }

    fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32);

    /// Draw the scene over the already-painted gradient.
    fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
    );
}
