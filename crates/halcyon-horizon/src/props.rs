//! Sprite props: the small moving things that make a variant feel alive.
//!
//! Each prop group is one [`SpriteBatch`] animated on the CPU. Motion is
//! deterministic from elapsed time and the prop index, so two theaters at
//! the same time look the same.

use glam::Vec2;
use halcyon_render::{Layer, SpriteBatch, SpriteInstance};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropKind {
    /// Distant birds crossing the sky.
    Birds,
    /// Slow bokeh motes drifting upward.
    Motes,
    /// A lone car tracing the coast road.
    Car,
    /// Cafe string lights sagging across the bottom edge, flickering warm.
    Cafe,
    /// Beach parasols at the waterline, swaying slowly.
    Beach,
}

impl PropKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            PropKind::Birds => "prop-birds",
            PropKind::Motes => "prop-motes",
            PropKind::Car => "prop-car",
            PropKind::Cafe => "prop-cafe",
            PropKind::Beach => "prop-beach",
        }
    }
}

struct PropState {
    origin: Vec2,
    speed: f32,
    phase: f32,
    scale: f32,
}

fn hash(i: u32, salt: f32) -> f32 {
    let x = (i as f32 * 12.9898 + salt * 78.233).sin() * 43758.5453;
    x.fract().abs()
}

/// A batch of animated sprites living inside a layer stack.
pub struct PropLayer {
    kind: PropKind,
    z_order: i32,
    batch: SpriteBatch,
    states: Vec<PropState>,
    instances: Vec<SpriteInstance>,
    parallax: f32,
    offset: [f32; 2],
    time: f32,
}

impl PropLayer {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        kind: PropKind,
        z_order: i32,
    ) -> Self {
        let count = match kind {
            PropKind::Birds => 6,
            PropKind::Motes => 16,
            PropKind::Car => 2, // two headlights
            PropKind::Cafe => 9,
            PropKind::Beach => 5,
        };
        let states = (0..count)
            .map(|i| PropState {
                origin: Vec2::new(hash(i, 1.0), hash(i, 2.0)),
                speed: 0.5 + hash(i, 3.0),
                phase: hash(i, 4.0) * std::f32::consts::TAU,
                scale: 0.5 + hash(i, 5.0),
            })
            .collect();

        Self {
            kind,
            z_order,
            batch: SpriteBatch::new(device, target_format, 32, width, height, "prop-batch"),
            states,
            instances: Vec::with_capacity(count as usize),
            parallax: match kind {
                PropKind::Birds => 0.06,
                PropKind::Motes => 0.12,
                PropKind::Car => 0.1,
                PropKind::Cafe => 0.16,
                PropKind::Beach => 0.1,
            },
            offset: [0.0, 0.0],
            time: 0.0,
        }
    }

    fn animate(&mut self) {
        self.instances.clear();
        let t = self.time;
        let shift = [
            self.offset[0] * self.parallax,
            self.offset[1] * self.parallax,
        ];
        match self.kind {
            PropKind::Birds => {
                for s in &self.states {
                    // Right to left, wrapping; slow wing-bob.
                    let x = (s.origin.x + 1.2 - t * 0.03 * s.speed).rem_euclid(1.4) - 0.2;
                    let y = 0.15 + s.origin.y * 0.25 + 0.01 * (t * 2.0 * s.speed + s.phase).sin();
                    self.instances.push(SpriteInstance::new(
                        [x + shift[0], y + shift[1]],
                        [0.012 * s.scale, 0.006 * s.scale],
                        [0.08, 0.08, 0.1, 0.8],
                    ));
                }
            }
            PropKind::Motes => {
                for s in &self.states {
                    let x = s.origin.x + 0.02 * (t * 0.3 * s.speed + s.phase).sin();
                    let y = (s.origin.y + 1.0 - t * 0.01 * s.speed).rem_euclid(1.0);
                    let pulse = 0.5 + 0.3 * (t * 0.5 + s.phase).sin();
                    self.instances.push(SpriteInstance::new(
                        [x + shift[0], y + shift[1]],
                        [0.05 * s.scale, 0.05 * s.scale],
                        [1.0, 0.98, 0.9, 0.12 * pulse],
                    ));
                }
            }
            PropKind::Car => {
                // One vehicle, both lights locked together on the road line.
                let x = (t * 0.06).rem_euclid(1.4) - 0.2;
                for (i, _) in self.states.iter().enumerate() {
                    let dx = i as f32 * 0.018;
                    self.instances.push(SpriteInstance::new(
                        [x + dx + shift[0], 0.79 + shift[1]],
                        [0.01, 0.008],
                        [1.4, 1.3, 0.9, 0.9],
                    ));
                }
            }
            PropKind::Cafe => {
                // Evenly spaced bulbs on a sagging wire; each flickers on its
                // own phase.
                let n = self.states.len().max(1) as f32;
                for (i, s) in self.states.iter().enumerate() {
                    let x = 0.15 + 0.7 * (i as f32 / (n - 1.0).max(1.0));
                    let sag = 0.04 * (1.0 - (2.0 * (x - 0.5)).powi(2));
                    let flicker = 0.75 + 0.25 * (t * (1.5 + s.speed) + s.phase).sin();
                    self.instances.push(SpriteInstance::new(
                        [x + shift[0], 0.86 + sag + shift[1]],
                        [0.012, 0.012],
                        [1.3, 1.0, 0.5, 0.7 * flicker],
                    ));
                }
            }
            PropKind::Beach => {
                for s in &self.states {
                    let x = 0.1 + s.origin.x * 0.8 + 0.005 * (t * 0.4 * s.speed + s.phase).sin();
                    self.instances.push(SpriteInstance::new(
                        [x + shift[0], 0.64 + s.origin.y * 0.03 + shift[1]],
                        [0.035 * s.scale, 0.014 * s.scale],
                        [0.9, 0.45, 0.4, 0.85],
                    ));
                }
            }
        }
    }
}

impl Layer for PropLayer {
    fn label(&self) -> &str {
        self.kind.label()
    }

    fn z_order(&self) -> i32 {
        self.z_order
    }

    fn update(&mut self, queue: &wgpu::Queue, dt: f32) {
        self.time += dt;
        self.animate();
        let instances = std::mem::take(&mut self.instances);
        self.batch.upload(queue, &instances);
        self.instances = instances;
    }

    fn set_fade(&mut self, fade: f32) {
        self.batch.set_fade(fade);
    }

    fn set_offset(&mut self, offset: [f32; 2]) {
        self.offset = offset;
    }

    fn resize(&mut self, _queue: &wgpu::Queue, width: u32, height: u32) {
        self.batch.set_resolution(width, height);
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.batch.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_and_in_range() {
        for i in 0..64 {
            for salt in [1.0, 2.0, 3.0] {
                let a = hash(i, salt);
                let b = hash(i, salt);
                assert_eq!(a, b);
                assert!((0.0..1.0).contains(&a), "hash({i}, {salt}) = {a}");
            }
        }
    }

    #[test]
    fn test_prop_counts_fit_batch_capacity() {
        for kind in [
            PropKind::Birds,
            PropKind::Motes,
            PropKind::Car,
            PropKind::Cafe,
            PropKind::Beach,
        ] {
            let count = match kind {
                PropKind::Birds => 6,
                PropKind::Motes => 16,
                PropKind::Car => 2,
                PropKind::Cafe => 9,
                PropKind::Beach => 5,
            };
            assert!(count <= 32, "{kind:?}");
        }
    }
}
