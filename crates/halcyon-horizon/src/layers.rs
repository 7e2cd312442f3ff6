//! Layer stacks for each Horizon variant.
//!
//! Every band of the picture is a fullscreen fragment shader; variants are
//! just different stacks with different parameters. The sun and moon share
//! one shader, as do the sunrise mountains and the sunset ocean across
//! variants that reuse them.

use halcyon_clock::HorizonVariant;
use halcyon_render::{LayerStack, ShaderPlane, ShaderPlaneDesc};

use crate::props::{PropKind, PropLayer};

const SKY_FS: &str = r#"
fn hash21(p: vec2<f32>) -> f32 {
    var q = fract(p * vec2<f32>(123.34, 456.21));
    q = q + dot(q, q + 45.32);
    return fract(q.x * q.y);
}

// params0: top color, params1: bottom color, params2.x: star density.
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    var color = mix(u.params0.rgb, u.params1.rgb, uv.y);

    if (u.params2.x > 0.0) {
        let cells = uv * 64.0;
        let cell = floor(cells);
        let seed = hash21(cell);
        if (seed > 1.0 - u.params2.x) {
            let local = fract(cells) - 0.5;
            let star = 1.0 - smoothstep(0.0, 0.08, length(local));
            let twinkle = 0.5 + 0.5 * sin(u.time * (1.0 + 2.0 * seed) + seed * 50.0);
            color += vec3<f32>(star * twinkle);
        }
    }

    return vec4<f32>(color, u.fade);
}
"#;

const ORB_FS: &str = r#"
// params0: [x, y, radius, halo scale], params1: rgb * intensity.
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    let aspect = u.resolution.x / max(u.resolution.y, 1.0);
    let delta = (uv - u.params0.xy) * vec2<f32>(aspect, 1.0);
    let dist = length(delta);

    let core = 1.0 - smoothstep(u.params0.z * 0.8, u.params0.z, dist);
    let halo = exp(-dist * dist / (u.params0.w * u.params0.w + 0.0001)) * 0.6;
    let glow = core + halo;
    return vec4<f32>(u.params1.rgb * glow, min(glow, 1.0) * u.fade);
}
"#;

const FOG_FS: &str = r#"
// params0: rgb + overall density.
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    var band = 0.0;
    band += exp(-pow((uv.y - 0.55 - 0.03 * sin(uv.x * 3.0 + u.time * 0.2)) * 10.0, 2.0));
    band += exp(-pow((uv.y - 0.68 - 0.02 * sin(uv.x * 5.0 - u.time * 0.15)) * 14.0, 2.0)) * 0.7;
    let alpha = band * u.params0.w;
    return vec4<f32>(u.params0.rgb, alpha * u.fade);
}
"#;

const MOUNTAINS_FS: &str = r#"
// params0: [ridge height, amplitude, jaggedness, 0], params1: rgb.
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    let ridge = u.params0.x
        + u.params0.y * sin(uv.x * 4.0 + 1.3)
        + u.params0.y * u.params0.z * sin(uv.x * 13.0 + 4.1);
    let body = smoothstep(ridge, ridge + 0.006, uv.y);
    let shade = u.params1.rgb * mix(1.15, 0.8, uv.y);
    return vec4<f32>(shade, body * u.fade);
}
"#;

const OCEAN_FS: &str = r#"
// params0: [horizon y, wave amp, 0, 0], params1: water rgb,
// params2: [beam x, beam strength, beam rgb packed via params1 tint, 0].
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    if (uv.y < u.params0.x) {
        return vec4<f32>(0.0);
    }
    let depth = (uv.y - u.params0.x) / max(1.0 - u.params0.x, 0.001);
    let wave = sin(uv.x * 40.0 / (depth + 0.1) + u.time * 1.2)
        * sin(uv.y * 80.0 - u.time * 0.8);
    var color = u.params1.rgb * (0.7 + 0.3 * depth) + vec3<f32>(wave * u.params0.y);

    // Light path on the water under the orb.
    let beam = exp(-pow((uv.x - u.params2.x) * 9.0 / (depth + 0.15), 2.0))
        * u.params2.y * (0.6 + 0.4 * sin(uv.y * 60.0 + u.time * 2.0));
    color += vec3<f32>(1.0, 0.95, 0.8) * beam;

    return vec4<f32>(color, u.fade);
}
"#;

const CITY_FS: &str = r#"
fn hash11(x: f32) -> f32 {
    return fract(sin(x * 12.9898) * 43758.5453);
}

// params0: [skyline base y, height scale, window glow, 0], params1: rgb.
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    let column = floor(uv.x * 28.0);
    let height = u.params0.x - u.params0.y * hash11(column);
    if (uv.y < height) {
        return vec4<f32>(0.0);
    }
    if (uv.y > u.params0.x + 0.08) {
        return vec4<f32>(0.0);
    }

    var color = u.params1.rgb;
    // Lit windows on a coarse grid; a few flicker slowly.
    let cell = vec2<f32>(floor(uv.x * 120.0), floor(uv.y * 70.0));
    let lit = hash11(cell.x * 57.0 + cell.y);
    if (lit > 0.82) {
        let flicker = 0.7 + 0.3 * sin(u.time * (0.5 + lit) + lit * 20.0);
        color += vec3<f32>(1.0, 0.85, 0.5) * u.params0.z * flicker;
    }
    return vec4<f32>(color, u.fade);
}
"#;

const CLIFF_FS: &str = r#"
// params0: [edge height at left, falloff, 0, 0], params1: rgb.
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    let edge = u.params0.x + u.params0.y * uv.x * uv.x;
    let body = smoothstep(edge, edge + 0.01, uv.y) * step(uv.x, 0.45);
    let grass = exp(-pow((uv.y - edge) * 60.0, 2.0)) * step(uv.x, 0.45) * 0.5;
    let color = u.params1.rgb + vec3<f32>(0.1, 0.2, 0.08) * grass;
    return vec4<f32>(color, max(body, grass) * u.fade);
}
"#;

const HEAT_FS: &str = r#"
// params0: [band y, strength, 0, 0].
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    let band = exp(-pow((uv.y - u.params0.x) * 18.0, 2.0));
    let ripple = sin(uv.x * 80.0 + u.time * 6.0) * sin(uv.y * 120.0 - u.time * 4.0);
    let alpha = band * u.params0.y * (0.5 + 0.5 * ripple);
    return vec4<f32>(vec3<f32>(1.0, 0.9, 0.7), alpha * u.fade);
}
"#;

const GUARDRAIL_FS: &str = r#"
// params0: [rail y, 0, 0, 0], params1: rgb.
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv + u.offset;
    let rail = smoothstep(u.params0.x, u.params0.x + 0.008, uv.y)
        * (1.0 - smoothstep(u.params0.x + 0.02, u.params0.x + 0.028, uv.y));
    let post_x = abs(fract(uv.x * 14.0) - 0.5);
    let post = (1.0 - smoothstep(0.02, 0.05, post_x))
        * step(u.params0.x, uv.y)
        * (1.0 - smoothstep(u.params0.x + 0.1, u.params0.x + 0.12, uv.y));
    let alpha = max(rail, post);
    return vec4<f32>(u.params1.rgb, alpha * u.fade);
}
"#;

/// One planned entry of a variant's stack, before any GPU resources exist.
enum StackEntry {
    Plane(ShaderPlaneDesc),
    Props(PropKind, i32),
}

impl StackEntry {
    fn label(&self) -> &'static str {
        match self {
            StackEntry::Plane(desc) => desc.label,
            StackEntry::Props(kind, _) => kind.label(),
        }
    }

    fn z_order(&self) -> i32 {
        match self {
            StackEntry::Plane(desc) => desc.z_order,
            StackEntry::Props(_, z_order) => *z_order,
        }
    }
}

/// The composition of a variant's stack, back to front. Pure data so the
/// per-variant layer sets can be asserted without a device.
fn stack_plan(variant: HorizonVariant) -> Vec<StackEntry> {
    match variant {
        HorizonVariant::Sunrise => vec![
            StackEntry::Plane(
                ShaderPlaneDesc::new("sunrise-sky", SKY_FS)
                    .z_order(0)
                    .parallax(0.02)
                    .params0([0.45, 0.55, 0.75, 0.0])
                    .params1([0.98, 0.72, 0.45, 0.0]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("sunrise-sun", ORB_FS)
                    .z_order(10)
                    .parallax(0.03)
                    .params0([0.62, 0.62, 0.05, 0.25])
                    .params1([1.6, 1.1, 0.6, 0.0]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("sunrise-fog", FOG_FS)
                    .z_order(20)
                    .time_scale(0.8)
                    .parallax(0.05)
                    .params0([0.95, 0.85, 0.8, 0.5]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("sunrise-mountains", MOUNTAINS_FS)
                    .z_order(30)
                    .parallax(0.08)
                    .params0([0.62, 0.05, 0.4, 0.0])
                    .params1([0.25, 0.2, 0.3, 0.0]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("sunrise-cliff", CLIFF_FS)
                    .z_order(40)
                    .parallax(0.15)
                    .params0([0.75, 0.3, 0.0, 0.0])
                    .params1([0.1, 0.09, 0.1, 0.0]),
            ),
            StackEntry::Props(PropKind::Birds, 50),
        ],
        HorizonVariant::Day => vec![
            StackEntry::Plane(
                ShaderPlaneDesc::new("day-sky", SKY_FS)
                    .z_order(0)
                    .parallax(0.02)
                    .params0([0.45, 0.68, 0.92, 0.0])
                    .params1([0.78, 0.88, 0.96, 0.0]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("day-sun", ORB_FS)
                    .z_order(10)
                    .parallax(0.03)
                    .params0([0.75, 0.2, 0.03, 0.15])
                    .params1([1.8, 1.7, 1.4, 0.0]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("day-haze", FOG_FS)
                    .z_order(20)
                    .time_scale(0.5)
                    .parallax(0.05)
                    .params0([1.0, 1.0, 1.0, 0.2]),
            ),
            StackEntry::Props(PropKind::Motes, 30),
            StackEntry::Props(PropKind::Cafe, 40),
        ],
        HorizonVariant::Sunset => vec![
            StackEntry::Plane(
                ShaderPlaneDesc::new("sunset-sky", SKY_FS)
                    .z_order(0)
                    .parallax(0.02)
                    .params0([0.25, 0.15, 0.4, 0.0])
                    .params1([0.98, 0.45, 0.25, 0.0]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("sunset-sun", ORB_FS)
                    .z_order(10)
                    .parallax(0.03)
                    .params0([0.5, 0.55, 0.07, 0.3])
                    .params1([1.8, 0.8, 0.35, 0.0]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("sunset-ocean", OCEAN_FS)
                    .z_order(20)
                    .parallax(0.06)
                    .params0([0.58, 0.03, 0.0, 0.0])
                    .params1([0.2, 0.12, 0.25, 0.0])
                    .params2([0.5, 0.35, 0.0, 0.0]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("sunset-heat", HEAT_FS)
                    .z_order(30)
                    .parallax(0.06)
                    .params0([0.58, 0.25, 0.0, 0.0]),
            ),
            StackEntry::Props(PropKind::Beach, 35),
            StackEntry::Props(PropKind::Birds, 40),
        ],
        HorizonVariant::NightCity => vec![
            StackEntry::Plane(
                ShaderPlaneDesc::new("night-sky", SKY_FS)
                    .z_order(0)
                    .parallax(0.02)
                    .params0([0.02, 0.03, 0.08, 0.0])
                    .params1([0.08, 0.08, 0.16, 0.0])
                    .params2([0.06, 0.0, 0.0, 0.0]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("night-moon", ORB_FS)
                    .z_order(10)
                    .parallax(0.03)
                    .params0([0.7, 0.22, 0.035, 0.12])
                    .params1([1.2, 1.25, 1.35, 0.0]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("night-ocean", OCEAN_FS)
                    .z_order(20)
                    .parallax(0.06)
                    .params0([0.6, 0.015, 0.0, 0.0])
                    .params1([0.04, 0.05, 0.1, 0.0])
                    .params2([0.7, 0.5, 0.0, 0.0]),
            ),
            StackEntry::Plane(
                ShaderPlaneDesc::new("night-city", CITY_FS)
                    .z_order(30)
                    .parallax(0.08)
                    .params0([0.6, 0.18, 0.6, 0.0])
                    .params1([0.03, 0.03, 0.06, 0.0]),
            ),
            StackEntry::Props(PropKind::Car, 40),
            StackEntry::Plane(
                ShaderPlaneDesc::new("night-guardrail", GUARDRAIL_FS)
                    .z_order(50)
                    .parallax(0.15)
                    .params0([0.82, 0.0, 0.0, 0.0])
                    .params1([0.05, 0.05, 0.07, 0.0]),
            ),
        ],
    }
}

/// Build the full layer stack (planes and props) for a variant.
pub fn build_stack(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    variant: HorizonVariant,
) -> LayerStack {
    let mut stack = LayerStack::new();
    for entry in stack_plan(variant) {
        match entry {
            StackEntry::Plane(desc) => {
                stack.push(Box::new(ShaderPlane::new(device, format, width, height, desc)));
            }
            StackEntry::Props(kind, z_order) => {
                stack.push(Box::new(PropLayer::new(
                    device, format, width, height, kind, z_order,
                )));
            }
        }
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_labels(variant: HorizonVariant) -> Vec<&'static str> {
        stack_plan(variant).iter().map(StackEntry::label).collect()
    }

    #[test]
    fn test_layer_shaders_define_fs_main() {
        for (name, src) in [
            ("sky", SKY_FS),
            ("orb", ORB_FS),
            ("fog", FOG_FS),
            ("mountains", MOUNTAINS_FS),
            ("ocean", OCEAN_FS),
            ("city", CITY_FS),
            ("cliff", CLIFF_FS),
            ("heat", HEAT_FS),
            ("guardrail", GUARDRAIL_FS),
        ] {
            assert!(src.contains("fn fs_main"), "{name} is missing fs_main");
            assert!(src.contains("u.fade"), "{name} ignores the fade uniform");
        }
    }

    #[test]
    fn test_sunrise_stack_composition() {
        assert_eq!(
            plan_labels(HorizonVariant::Sunrise),
            vec![
                "sunrise-sky",
                "sunrise-sun",
                "sunrise-fog",
                "sunrise-mountains",
                "sunrise-cliff",
                "prop-birds",
            ],
        );
    }

    #[test]
    fn test_day_stack_composition() {
        assert_eq!(
            plan_labels(HorizonVariant::Day),
            vec!["day-sky", "day-sun", "day-haze", "prop-motes", "prop-cafe"],
        );
    }

    #[test]
    fn test_sunset_stack_composition() {
        assert_eq!(
            plan_labels(HorizonVariant::Sunset),
            vec![
                "sunset-sky",
                "sunset-sun",
                "sunset-ocean",
                "sunset-heat",
                "prop-beach",
                "prop-birds",
            ],
        );
    }

    #[test]
    fn test_night_city_stack_composition() {
        assert_eq!(
            plan_labels(HorizonVariant::NightCity),
            vec![
                "night-sky",
                "night-moon",
                "night-ocean",
                "night-city",
                "prop-car",
                "night-guardrail",
            ],
        );
    }

    #[test]
    fn test_plans_are_ordered_back_to_front() {
        for variant in [
            HorizonVariant::Sunrise,
            HorizonVariant::Day,
            HorizonVariant::Sunset,
            HorizonVariant::NightCity,
        ] {
            let plan = stack_plan(variant);
            assert!(!plan.is_empty(), "{variant:?} has an empty plan");
            for pair in plan.windows(2) {
                assert!(
                    pair[0].z_order() < pair[1].z_order(),
                    "{variant:?}: {} (z {}) is not behind {} (z {})",
                    pair[0].label(),
                    pair[0].z_order(),
                    pair[1].label(),
                    pair[1].z_order(),
                );
            }
        }
    }

    #[test]
    fn test_every_variant_starts_with_a_sky() {
        for variant in [
            HorizonVariant::Sunrise,
            HorizonVariant::Day,
            HorizonVariant::Sunset,
            HorizonVariant::NightCity,
        ] {
            let labels = plan_labels(variant);
            assert!(labels[0].ends_with("-sky"), "{variant:?}: {labels:?}");
        }
    }
}
