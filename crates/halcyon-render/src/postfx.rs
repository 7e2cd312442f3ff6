//! Post-processing presets and the bloom + grade chain.
//!
//! Scenes render into an HDR target; [`PostFxChain`] then runs bloom
//! extraction over a mip chain and a final grade pass (tonemap, chromatic
//! aberration, vignette, grain, weave, jitter) onto the surface. Preset
//! changes are smoothed by [`PresetDamper`] so a variant switch glides
//! instead of snapping.

use crate::bloom::BloomPipeline;
use crate::grade::GradePass;

/// Bloom shaping parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomSettings {
    /// Multiplier on the bloom contribution in the final composite.
    pub strength: f32,
    /// Blur tap offset scale; wider radius means softer glow.
    pub radius: f32,
    /// Luminance above which pixels contribute to bloom.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 0.3,
            radius: 1.0,
            threshold: 1.0,
        }
    }
}

/// Final-grade distortion and texture parameters. All default to zero,
/// meaning a clean tonemapped image.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GradeSettings {
    /// Chromatic aberration: RGB sample separation in UV units.
    pub aberration: f32,
    /// Corner darkening amount.
    pub vignette: f32,
    /// Animated film-grain amount.
    pub grain: f32,
    /// Scanline-weave interference amount.
    pub weave: f32,
    /// Time-quantized frame displacement amount.
    pub jitter: f32,
}

/// A complete post-processing look.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PostFxPreset {
    pub bloom: BloomSettings,
    pub grade: GradeSettings,
}

impl PostFxPreset {
    fn lerp(a: &Self, b: &Self, k: f32) -> Self {
        let l = |x: f32, y: f32| x + (y - x) * k;
        Self {
            bloom: BloomSettings {
                strength: l(a.bloom.strength, b.bloom.strength),
                radius: l(a.bloom.radius, b.bloom.radius),
                threshold: l(a.bloom.threshold, b.bloom.threshold),
            },
            grade: GradeSettings {
                aberration: l(a.grade.aberration, b.grade.aberration),
                vignette: l(a.grade.vignette, b.grade.vignette),
                grain: l(a.grade.grain, b.grade.grain),
                weave: l(a.grade.weave, b.grade.weave),
                jitter: l(a.grade.jitter, b.grade.jitter),
            },
        }
    }

    /// Largest relative distance between any field of the two presets.
    fn distance(a: &Self, b: &Self) -> f32 {
        let fields = [
            (a.bloom.strength, b.bloom.strength),
            (a.bloom.radius, b.bloom.radius),
            (a.bloom.threshold, b.bloom.threshold),
            (a.grade.aberration, b.grade.aberration),
            (a.grade.vignette, b.grade.vignette),
            (a.grade.grain, b.grade.grain),
            (a.grade.weave, b.grade.weave),
            (a.grade.jitter, b.grade.jitter),
        ];
        fields
            .iter()
            .map(|(x, y)| (x - y).abs())
            .fold(0.0_f32, f32::max)
    }
}

/// Frame-rate-independent exponential smoothing toward a target preset.
///
/// Each `advance(dt)` moves the current preset by a factor of
/// `1 - exp(-rate * dt)`, so the approach speed does not depend on how the
/// elapsed time is sliced into frames.
pub struct PresetDamper {
    current: PostFxPreset,
    target: PostFxPreset,
    rate: f32,
}

/// Convergence rate chosen so a preset switch settles visually within two
/// seconds.
pub const DEFAULT_DAMPING_RATE: f32 = 3.0;

impl PresetDamper {
    pub fn new(initial: PostFxPreset) -> Self {
        Self {
            current: initial,
            target: initial,
            rate: DEFAULT_DAMPING_RATE,
        }
    }

    pub fn set_target(&mut self, target: PostFxPreset) {
        self.target = target;
    }

    pub fn target(&self) -> &PostFxPreset {
        &self.target
    }

    pub fn current(&self) -> &PostFxPreset {
        &self.current
    }

    /// Advance toward the target and return the smoothed preset.
    pub fn advance(&mut self, dt: f32) -> &PostFxPreset {
        let k = 1.0 - (-self.rate * dt.max(0.0)).exp();
        self.current = PostFxPreset::lerp(&self.current, &self.target, k);
        &self.current
    }

    /// Jump straight to the target without smoothing.
    pub fn snap(&mut self) {
        self.current = self.target;
    }
}

/// Post-FX chain construction failures. These are downgraded to a warning by
/// callers; a scene without post-FX is still a scene.
#[derive(Debug, thiserror::Error)]
pub enum PostFxError {
    /// The device cannot allocate render targets at the requested size.
    #[error("surface {width}x{height} exceeds device texture limit {limit}")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },
}

/// The full chain: HDR scene target, bloom mip chain, and the final grade
/// pass onto the surface.
pub struct PostFxChain {
    bloom: BloomPipeline,
    grade: GradePass,
}

impl PostFxChain {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, PostFxError> {
        let limit = device.limits().max_texture_dimension_2d;
        if width > limit || height > limit {
            return Err(PostFxError::TextureTooLarge {
                width,
                height,
                limit,
            });
        }

        let bloom = BloomPipeline::new(device, wgpu::TextureFormat::Rgba16Float, width, height);
        let mut grade = GradePass::new(device, surface_format, width, height);
        grade.rebind(device, bloom.hdr_view(), bloom.bloom_view());
        Ok(Self { bloom, grade })
    }

    /// The HDR view scenes should render into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        self.bloom.hdr_view()
    }

    pub fn scene_format(&self) -> wgpu::TextureFormat {
        self.bloom.hdr_format()
    }

    /// Recreate render targets after a window resize.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<(), PostFxError> {
        let limit = device.limits().max_texture_dimension_2d;
        if width > limit || height > limit {
            return Err(PostFxError::TextureTooLarge {
                width,
                height,
                limit,
            });
        }
        self.bloom.resize(device, width, height);
        self.grade.set_resolution(width, height);
        self.grade
            .rebind(device, self.bloom.hdr_view(), self.bloom.bloom_view());
        Ok(())
    }

    /// Run bloom and grade, leaving the finished frame in `surface_view`.
    pub fn execute(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
        preset: &PostFxPreset,
        time: f32,
        fade: f32,
    ) {
        self.bloom.update_settings(queue, &preset.bloom);
        self.bloom.execute(encoder);
        self.grade
            .execute(encoder, queue, surface_view, preset, time, fade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizon_like_preset() -> PostFxPreset {
        PostFxPreset {
            bloom: BloomSettings {
                strength: 0.8,
                radius: 1.4,
                threshold: 0.7,
            },
            grade: GradeSettings {
                aberration: 0.004,
                vignette: 0.35,
                grain: 0.08,
                weave: 0.1,
                jitter: 0.02,
            },
        }
    }

    #[test]
    fn test_damper_converges_within_two_seconds() {
        let mut damper = PresetDamper::new(PostFxPreset::default());
        let target = horizon_like_preset();
        damper.set_target(target);

        let dt = 1.0 / 60.0;
        for _ in 0..120 {
            damper.advance(dt);
        }
        let remaining = PostFxPreset::distance(damper.current(), &target);
        let span = PostFxPreset::distance(&PostFxPreset::default(), &target);
        assert!(
            remaining < span * 0.01,
            "after 2s the preset should be within 1% of target, remaining {remaining}"
        );
    }

    #[test]
    fn test_damper_approach_is_monotone() {
        let mut damper = PresetDamper::new(PostFxPreset::default());
        let target = horizon_like_preset();
        damper.set_target(target);

        let mut last = PostFxPreset::distance(damper.current(), &target);
        for _ in 0..60 {
            damper.advance(1.0 / 60.0);
            let dist = PostFxPreset::distance(damper.current(), &target);
            assert!(dist <= last, "distance must never increase");
            last = dist;
        }
    }

    #[test]
    fn test_damper_is_frame_rate_independent() {
        let target = horizon_like_preset();

        let mut fine = PresetDamper::new(PostFxPreset::default());
        fine.set_target(target);
        for _ in 0..120 {
            fine.advance(1.0 / 120.0);
        }

        let mut coarse = PresetDamper::new(PostFxPreset::default());
        coarse.set_target(target);
        for _ in 0..30 {
            coarse.advance(1.0 / 30.0);
        }

        // One simulated second either way; results should nearly agree.
        let diff = PostFxPreset::distance(fine.current(), coarse.current());
        assert!(diff < 0.02, "step size changed the outcome by {diff}");
    }

    #[test]
    fn test_damper_snap_reaches_target_exactly() {
        let mut damper = PresetDamper::new(PostFxPreset::default());
        let target = horizon_like_preset();
        damper.set_target(target);
        damper.snap();
        assert_eq!(*damper.current(), target);
    }

    #[test]
    fn test_negative_dt_does_not_overshoot() {
        let mut damper = PresetDamper::new(PostFxPreset::default());
        damper.set_target(horizon_like_preset());
        let before = *damper.current();
        damper.advance(-1.0);
        assert_eq!(*damper.current(), before);
    }

    #[test]
    fn test_default_preset_is_clean() {
        let preset = PostFxPreset::default();
        assert_eq!(preset.grade.aberration, 0.0);
        assert_eq!(preset.grade.vignette, 0.0);
        assert_eq!(preset.grade.grain, 0.0);
    }
}
