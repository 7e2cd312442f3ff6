//! The lightweight single-plane scenes.
//!
//! Everything except the Horizon theater is one or two [`ShaderPlane`]s:
//! all the motion lives in the fragment shader, driven by the shared layer
//! uniforms. Each constructor matches the [`SceneCtor`](crate::SceneCtor)
//! signature so it can go straight into the registry.

use halcyon_render::{LayerStack, RenderPassBuilder, ShaderPlane, ShaderPlaneDesc};
use halcyon_theme::SceneKey;

use crate::scene::{Scene, SceneContext, SceneError};

/// A scene made entirely of fullscreen shader planes.
struct PlaneScene {
    key: SceneKey,
    stack: LayerStack,
}

impl PlaneScene {
    fn new(ctx: &SceneContext<'_>, key: SceneKey, descs: Vec<ShaderPlaneDesc>) -> Self {
        let mut stack = LayerStack::new();
        for desc in descs {
            stack.push(Box::new(ShaderPlane::new(
                ctx.device,
                ctx.surface_format,
                ctx.width,
                ctx.height,
                desc,
            )));
        }
        Self { key, stack }
    }
}

impl Scene for PlaneScene {
    fn key(&self) -> SceneKey {
        self.key
    }

    fn update(&mut self, queue: &wgpu::Queue, dt: f32) {
        self.stack.update(queue, dt);
    }

    fn set_fade(&mut self, fade: f32) {
        self.stack.set_fade(fade);
    }

    fn set_offset(&mut self, offset: [f32; 2]) {
        self.stack.set_offset(offset);
    }

    fn resize(&mut self, _device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        self.stack.resize(queue, width, height);
    }

    fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        _queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
    ) {
        let builder = RenderPassBuilder::new()
            .load_existing()
            .label("plane-scene");
        let mut pass = builder.begin(encoder, surface_view);
        self.stack.draw(&mut pass);
    }
}

const SOFT_BLOBS_FS: &str = r#"
fn blob(uv: vec2<f32>, center: vec2<f32>, radius: f32) -> f32 {
    return 1.0 - smoothstep(radius * 0.3, radius, distance(uv, center));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let t = u.time * 0.15;
    let uv = in.uv + u.offset;
    var color = vec3<f32>(0.0);
    var coverage = 0.0;

    let a = blob(uv, vec2<f32>(0.3 + 0.15 * sin(t), 0.4 + 0.1 * cos(t * 1.3)), 0.45);
    color += a * vec3<f32>(0.98, 0.80, 0.85);
    coverage = max(coverage, a);

    let b = blob(uv, vec2<f32>(0.7 + 0.12 * cos(t * 0.8), 0.35 + 0.14 * sin(t * 1.1)), 0.5);
    color += b * vec3<f32>(0.78, 0.88, 0.99);
    coverage = max(coverage, b);

    let c = blob(uv, vec2<f32>(0.5 + 0.18 * sin(t * 0.6), 0.72 + 0.08 * cos(t)), 0.4);
    color += c * vec3<f32>(0.86, 0.95, 0.82);
    coverage = max(coverage, c);

    let alpha = coverage * 0.6 * u.fade;
    return vec4<f32>(color * 0.5, alpha);
}
"#;

const STARFIELD_FS: &str = r#"
fn hash21(p: vec2<f32>) -> f32 {
    var q = fract(p * vec2<f32>(123.34, 456.21));
    q = q + dot(q, q + 45.32);
    return fract(q.x * q.y);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    let aspect = u.resolution.x / max(u.resolution.y, 1.0);
    let cells = (uv * vec2<f32>(aspect, 1.0)) * 48.0;
    let cell = floor(cells);
    let seed = hash21(cell);

    var star = 0.0;
    if (seed > 0.92) {
        let local = fract(cells) - 0.5;
        let size = 0.04 + 0.08 * hash21(cell + 7.0);
        let core = 1.0 - smoothstep(0.0, size, length(local));
        let twinkle = 0.6 + 0.4 * sin(u.time * (1.0 + 3.0 * hash21(cell + 13.0)) + seed * 40.0);
        star = core * twinkle;
    }

    let tint = mix(vec3<f32>(0.85, 0.9, 1.0), vec3<f32>(1.0, 0.95, 0.85), hash21(cell + 3.0));
    return vec4<f32>(tint * star, star * u.fade);
}
"#;

const NEON_GRID_FS: &str = r#"
fn hash11(x: f32) -> f32 {
    return fract(sin(x * 12.9898) * 43758.5453);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    // Horizon sits at 55% height; the grid fills the floor below it.
    let horizon = 0.55;
    var color = vec3<f32>(0.0);
    var alpha = 0.0;

    if (uv.y > horizon) {
        let depth = (uv.y - horizon) / (1.0 - horizon);
        let persp = 1.0 / max(depth, 0.02);
        let gx = abs(fract((uv.x - 0.5) * persp * 2.0) - 0.5);
        let gz = abs(fract(depth * 12.0 - u.time * 1.5) - 0.5);
        let line = max(
            1.0 - smoothstep(0.0, 0.06, gx),
            1.0 - smoothstep(0.0, 0.06, gz),
        );
        color = vec3<f32>(1.0, 0.15, 0.8) * line * depth;
        alpha = line * depth;
    } else {
        let glow = 1.0 - smoothstep(0.0, 0.25, horizon - uv.y);
        color = vec3<f32>(0.1, 0.9, 1.0) * glow * glow * 0.8;
        alpha = glow * 0.5;

        // Glyph rain: sparse columns of falling dashes above the horizon.
        let column = floor(uv.x * 40.0);
        let seed = hash11(column);
        if (seed > 0.6) {
            let speed = 0.15 + 0.25 * seed;
            let y = fract(uv.y * 1.8 + u.time * speed + seed * 9.0);
            let cell = floor(y * 14.0);
            let on = step(0.55, hash11(column * 31.0 + cell + floor(u.time * 2.0) * seed));
            let dash = (1.0 - smoothstep(0.3, 0.5, abs(fract(uv.x * 40.0) - 0.5)))
                * (1.0 - smoothstep(0.2, 0.45, abs(fract(y * 14.0) - 0.5)));
            let fall = dash * on * (1.0 - uv.y / horizon) * 0.5;
            color += vec3<f32>(0.2, 1.0, 0.6) * fall;
            alpha = max(alpha, fall);
        }
    }

    return vec4<f32>(color, alpha * u.fade);
}
"#;

const AURORA_FS: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    var color = vec3<f32>(0.0);
    var total = 0.0;

    for (var i = 0; i < 3; i++) {
        let fi = f32(i);
        let speed = 0.2 + fi * 0.07;
        let center = 0.35 + fi * 0.12
            + 0.08 * sin(uv.x * 4.0 + u.time * speed + fi * 2.1)
            + 0.04 * sin(uv.x * 9.0 - u.time * speed * 1.7);
        let band = exp(-pow((uv.y - center) * 9.0, 2.0));
        let hue = mix(
            vec3<f32>(0.2, 0.9, 0.5),
            vec3<f32>(0.6, 0.3, 0.9),
            fi * 0.5,
        );
        color += hue * band;
        total += band;
    }

    let alpha = clamp(total * 0.5, 0.0, 0.8);
    return vec4<f32>(color * 0.6, alpha * u.fade);
}
"#;

const DUNE_FAR_FS: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    let crest = 0.55
        + 0.08 * sin(uv.x * 3.0 + 1.7)
        + 0.03 * sin(uv.x * 7.0);
    let body = smoothstep(crest, crest + 0.01, uv.y);
    let shade = mix(vec3<f32>(0.72, 0.52, 0.34), vec3<f32>(0.55, 0.38, 0.25), uv.y);
    return vec4<f32>(shade, body * u.fade);
}
"#;

const DUNE_NEAR_FS: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var uv = in.uv + u.offset;
    // Heat shimmer: tiny horizontal wobble that grows toward the ground.
    let heat = pow(max(uv.y - 0.4, 0.0), 2.0);
    uv.x += 0.006 * heat * sin(uv.y * 60.0 + u.time * 5.0);

    let crest = 0.72
        + 0.06 * sin(uv.x * 4.0)
        + 0.02 * sin(uv.x * 11.0 + 3.0);
    let body = smoothstep(crest, crest + 0.008, uv.y);
    let shade = mix(vec3<f32>(0.60, 0.40, 0.24), vec3<f32>(0.42, 0.27, 0.16), uv.y);

    // Faint mirage band hovering over the far crest line.
    let mirage = exp(-pow((uv.y - 0.52) * 40.0, 2.0))
        * (0.5 + 0.5 * sin(uv.x * 30.0 + u.time * 2.0));
    let color = shade + vec3<f32>(0.9, 0.85, 0.7) * mirage * 0.15;

    let alpha = max(body, mirage * 0.3);
    return vec4<f32>(color, alpha * u.fade);
}
"#;

/// Drifting pastel blobs for the light theme.
pub fn soft_blobs(ctx: &SceneContext<'_>) -> Result<Box<dyn Scene>, SceneError> {
    Ok(Box::new(PlaneScene::new(
        ctx,
        SceneKey::SoftBlobs,
        vec![
            ShaderPlaneDesc::new("soft-blobs", SOFT_BLOBS_FS)
                .time_scale(1.0)
                .parallax(0.1),
        ],
    )))
}

/// Twinkling stars for the dark theme.
pub fn starfield(ctx: &SceneContext<'_>) -> Result<Box<dyn Scene>, SceneError> {
    Ok(Box::new(PlaneScene::new(
        ctx,
        SceneKey::Starfield,
        vec![
            ShaderPlaneDesc::new("starfield", STARFIELD_FS)
                .time_scale(1.0)
                .parallax(0.05),
        ],
    )))
}

/// Scrolling perspective grid for the cyberpunk theme.
pub fn neon_grid(ctx: &SceneContext<'_>) -> Result<Box<dyn Scene>, SceneError> {
    Ok(Box::new(PlaneScene::new(
        ctx,
        SceneKey::NeonGrid,
        vec![
            ShaderPlaneDesc::new("neon-grid", NEON_GRID_FS)
                .time_scale(1.0)
                .parallax(0.1),
        ],
    )))
}

/// Flowing aurora bands for the ethereal theme.
pub fn aurora(ctx: &SceneContext<'_>) -> Result<Box<dyn Scene>, SceneError> {
    Ok(Box::new(PlaneScene::new(
        ctx,
        SceneKey::Aurora,
        vec![
            ShaderPlaneDesc::new("aurora", AURORA_FS)
                .time_scale(1.0)
                .parallax(0.08),
        ],
    )))
}

/// Layered dunes with heat shimmer for the mirage theme.
pub fn dune_shimmer(ctx: &SceneContext<'_>) -> Result<Box<dyn Scene>, SceneError> {
    Ok(Box::new(PlaneScene::new(
        ctx,
        SceneKey::DuneShimmer,
        vec![
            ShaderPlaneDesc::new("dune-far", DUNE_FAR_FS)
                .z_order(0)
                .time_scale(0.5)
                .parallax(0.05),
            ShaderPlaneDesc::new("dune-near", DUNE_NEAR_FS)
                .z_order(10)
                .time_scale(1.0)
                .parallax(0.12),
        ],
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_fragment_defines_fs_main() {
        for (name, src) in [
            ("soft-blobs", SOFT_BLOBS_FS),
            ("starfield", STARFIELD_FS),
            ("neon-grid", NEON_GRID_FS),
            ("aurora", AURORA_FS),
            ("dune-far", DUNE_FAR_FS),
            ("dune-near", DUNE_NEAR_FS),
        ] {
            assert!(src.contains("fn fs_main"), "{name} is missing fs_main");
        }
    }

    #[test]
    fn test_every_fragment_honors_fade() {
        // Crossfading depends on every scene shader respecting the fade
        // uniform in its output alpha.
        for (name, src) in [
            ("soft-blobs", SOFT_BLOBS_FS),
            ("starfield", STARFIELD_FS),
            ("neon-grid", NEON_GRID_FS),
            ("aurora", AURORA_FS),
            ("dune-far", DUNE_FAR_FS),
            ("dune-near", DUNE_NEAR_FS),
        ] {
            assert!(src.contains("u.fade"), "{name} ignores the fade uniform");
        }
    }
}
