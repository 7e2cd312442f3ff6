//! The scene orchestrator.
//!
//! Owns the gradient backdrop and at most one live scene, and reconciles
//! them against the desired state (theme, time-of-day variant, preferences,
//! GPU availability). All transitions are crossfades; all failures land on
//! the gradient.

use halcyon_clock::HorizonVariant;
use halcyon_render::{GradientBackdrop, RenderPassBuilder, RenderPath, select_render_path};
use halcyon_signals::PreferenceSnapshot;
use halcyon_theme::{SceneKey, ThemeId};

use crate::crossfade::{Crossfade, FadeEvent};
use crate::registry::SceneRegistry;
use crate::scene::{Scene, SceneContext};

/// Everything the orchestrator needs to decide what should be on screen.
#[derive(Clone, Copy, Debug)]
pub struct SceneActivation {
    pub theme: ThemeId,
    pub variant: HorizonVariant,
    pub prefs: PreferenceSnapshot,
    /// `None` means the capability probe has not run yet (calm session).
    pub gpu_available: Option<bool>,
    pub force_scenes: bool,
}

/// The scene that should be live for this activation, or `None` for the
/// gradient-only backdrop. Unknown GPU availability counts as unavailable;
/// the probe result arriving later re-resolves.
pub fn resolve_scene(activation: &SceneActivation) -> Option<SceneKey> {
    let gpu = activation.gpu_available.unwrap_or(false);
    match select_render_path(&activation.prefs, gpu, activation.force_scenes) {
        RenderPath::Static => None,
        RenderPath::Animated => match activation.theme.scene_key() {
            SceneKey::None => None,
            key => Some(key),
        },
    }
}

/// Drives scene lifecycle: create, crossfade, swap, tear down.
pub struct Orchestrator {
    registry: SceneRegistry,
    gradient: GradientBackdrop,
    crossfade: Crossfade,
    current: Option<Box<dyn Scene>>,
    desired: Option<SceneKey>,
    theme: ThemeId,
    variant: HorizonVariant,
}

impl Orchestrator {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        theme: ThemeId,
        variant: HorizonVariant,
        registry: SceneRegistry,
        fade_out_secs: f32,
        fade_in_secs: f32,
    ) -> Self {
        Self {
            registry,
            gradient: GradientBackdrop::new(device, surface_format, theme),
            crossfade: Crossfade::new(fade_out_secs, fade_in_secs),
            current: None,
            desired: None,
            theme,
            variant,
        }
    }

    /// The key of the scene currently alive, faded in or not.
    pub fn active_key(&self) -> Option<SceneKey> {
        self.current.as_ref().map(|scene| scene.key())
    }

    /// Reconcile against a new desired state. Cheap; call on every change
    /// of theme, preferences, variant, or probe result.
    pub fn apply(&mut self, queue: &wgpu::Queue, activation: &SceneActivation) {
        if activation.theme != self.theme {
            self.theme = activation.theme;
            self.gradient.set_theme(queue, activation.theme);
        }
        if activation.variant != self.variant {
            self.variant = activation.variant;
            if let Some(scene) = self.current.as_mut() {
                scene.set_variant(activation.variant);
            }
        }

        let desired = resolve_scene(activation);
        if desired == self.active_key() {
            // Same scene wanted; cancel any in-flight fade-out.
            self.desired = desired;
            if self.current.is_some() {
                self.crossfade.show();
            }
            return;
        }

        log::info!(
            "Scene target changed: {:?} -> {:?}",
            self.active_key(),
            desired
        );
        self.desired = desired;
        if self.current.is_some() {
            self.crossfade.hide();
        }
    }

    /// Advance fades and animation; swap scenes at the fade-out boundary.
    pub fn update(&mut self, ctx: &SceneContext<'_>, dt: f32) {
        if self.crossfade.advance(dt) == FadeEvent::FadedOut {
            // Dropping the scene releases its GPU resources.
            self.current = None;
        }

        if self.current.is_none()
            && let Some(key) = self.desired
        {
            match self.registry.create(key, ctx) {
                Ok(Some(mut scene)) => {
                    scene.set_variant(self.variant);
                    self.current = Some(scene);
                    self.crossfade.show();
                }
                Ok(None) => {
                    self.desired = None;
                }
                Err(err) => {
                    // Scene failures must never take the backdrop down.
                    log::error!("Failed to create scene {key:?}: {err}");
                    self.desired = None;
                }
            }
        }

        if let Some(scene) = self.current.as_mut() {
            scene.set_fade(self.crossfade.fade());
            scene.update(ctx.queue, dt);
        }
    }

    /// Forward the parallax offset to the live scene.
    pub fn set_offset(&mut self, offset: [f32; 2]) {
        if let Some(scene) = self.current.as_mut() {
            scene.set_offset(offset);
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        if let Some(scene) = self.current.as_mut() {
            scene.resize(device, queue, width, height);
        }
    }

    /// Draw the frame: gradient first, always, then the scene over it.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
    ) {
        {
            let builder = RenderPassBuilder::new().label("gradient-pass");
            let mut pass = builder.begin(encoder, surface_view);
            self.gradient.draw(&mut pass);
        }

        if self.crossfade.fade() > 0.0
            && let Some(scene) = self.current.as_mut()
        {
            scene.render(encoder, queue, surface_view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activation(
        theme: ThemeId,
        reduce_motion: bool,
        low_data: bool,
        gpu: Option<bool>,
        force: bool,
    ) -> SceneActivation {
        SceneActivation {
            theme,
            variant: HorizonVariant::Day,
            prefs: PreferenceSnapshot {
                reduce_motion,
                low_data,
            },
            gpu_available: gpu,
            force_scenes: force,
        }
    }

    #[test]
    fn test_resolve_maps_theme_to_its_scene() {
        let a = activation(ThemeId::Dark, false, false, Some(true), false);
        assert_eq!(resolve_scene(&a), Some(SceneKey::Starfield));
    }

    #[test]
    fn test_resolve_simple_theme_has_no_scene() {
        let a = activation(ThemeId::Simple, false, false, Some(true), false);
        assert_eq!(resolve_scene(&a), None);
    }

    #[test]
    fn test_resolve_calm_suppresses_scenes() {
        let a = activation(ThemeId::Horizon, true, true, Some(true), false);
        assert_eq!(resolve_scene(&a), None);
    }

    #[test]
    fn test_resolve_one_signal_alone_is_not_calm() {
        let a = activation(ThemeId::Horizon, true, false, Some(true), false);
        assert_eq!(resolve_scene(&a), Some(SceneKey::Theater));
        let b = activation(ThemeId::Horizon, false, true, Some(true), false);
        assert_eq!(resolve_scene(&b), Some(SceneKey::Theater));
    }

    #[test]
    fn test_resolve_force_overrides_calm_but_not_missing_gpu() {
        let forced = activation(ThemeId::Horizon, true, true, Some(true), true);
        assert_eq!(resolve_scene(&forced), Some(SceneKey::Theater));

        let no_gpu = activation(ThemeId::Horizon, true, true, Some(false), true);
        assert_eq!(resolve_scene(&no_gpu), None);
    }

    #[test]
    fn test_resolve_unknown_gpu_stays_on_gradient() {
        let a = activation(ThemeId::Dark, false, false, None, false);
        assert_eq!(resolve_scene(&a), None);
    }
}
