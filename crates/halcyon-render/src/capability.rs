//! GPU capability probing and the animated-vs-static path decision.
//!
//! The probe asks wgpu for a headless adapter and device once per session and
//! caches the answer. While the viewer prefers calm output the probe is not
//! worth running at all, so the gate reports "unknown" instead of touching
//! the GPU.

use halcyon_signals::PreferenceSnapshot;

/// How the backdrop should be drawn right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPath {
    /// Full animated scene with layers and post-processing.
    Animated,
    /// Static gradient only.
    Static,
}

/// Decide the render path from the preference snapshot and GPU availability.
///
/// The animated path requires a working GPU, full stop. On top of that the
/// calm preference downgrades to the static gradient unless `force_scenes`
/// overrides it.
pub fn select_render_path(
    prefs: &PreferenceSnapshot,
    gpu_available: bool,
    force_scenes: bool,
) -> RenderPath {
    if gpu_available && (force_scenes || !prefs.calm()) {
        RenderPath::Animated
    } else {
        RenderPath::Static
    }
}

/// Session-scoped cache around the headless GPU probe.
///
/// The first non-calm call runs the probe; every later call returns the
/// cached verdict, including calls made while calm. A probe failure is an
/// expected environment condition, not an error.
pub struct CapabilityGate {
    cached: Option<bool>,
    probe: fn() -> bool,
}

impl Default for CapabilityGate {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityGate {
    pub fn new() -> Self {
        Self {
            cached: None,
            probe: probe_gpu,
        }
    }

    /// Gate with a custom probe function, for tests.
    #[cfg(test)]
    fn with_probe(probe: fn() -> bool) -> Self {
        Self {
            cached: None,
            probe,
        }
    }

    /// GPU availability, probing on first use. Returns `None` when the
    /// viewer is calm and no probe has run yet: calm sessions render the
    /// gradient anyway, so there is nothing to learn.
    pub fn availability(&mut self, calm: bool) -> Option<bool> {
        if let Some(verdict) = self.cached {
            return Some(verdict);
        }
        if calm {
            return None;
        }
        let verdict = (self.probe)();
        if verdict {
            log::info!("GPU probe succeeded, animated scenes available");
        } else {
            log::debug!("GPU probe failed, staying on the gradient path");
        }
        self.cached = Some(verdict);
        Some(verdict)
    }

    /// The cached verdict, if a probe has run this session.
    pub fn cached(&self) -> Option<bool> {
        self.cached
    }
}

/// Ask wgpu for a headless adapter and device. Any failure means "no GPU".
fn probe_gpu() -> bool {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = match pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: false,
    })) {
        Ok(adapter) => adapter,
        Err(err) => {
            log::debug!("GPU probe: no adapter ({err})");
            return false;
        }
    };
    let device = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("halcyon-probe"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        memory_hints: wgpu::MemoryHints::default(),
        experimental_features: wgpu::ExperimentalFeatures::default(),
        trace: wgpu::Trace::Off,
    }));
    match device {
        Ok(_) => true,
        Err(err) => {
            log::debug!("GPU probe: adapter found but no device ({err})");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn snapshot(reduce_motion: bool, low_data: bool) -> PreferenceSnapshot {
        PreferenceSnapshot {
            reduce_motion,
            low_data,
        }
    }

    #[test]
    fn test_render_path_table() {
        // (reduce_motion, low_data, gpu, force) -> expected
        let cases = [
            (false, false, true, false, RenderPath::Animated),
            (true, false, true, false, RenderPath::Animated),
            (false, true, true, false, RenderPath::Animated),
            (true, true, true, false, RenderPath::Static),
            (true, true, true, true, RenderPath::Animated),
            (false, false, false, false, RenderPath::Static),
            (true, true, false, false, RenderPath::Static),
            // Forcing scenes never conjures a GPU out of thin air.
            (false, false, false, true, RenderPath::Static),
            (true, true, false, true, RenderPath::Static),
        ];
        for (rm, ld, gpu, force, expected) in cases {
            let got = select_render_path(&snapshot(rm, ld), gpu, force);
            assert_eq!(
                got, expected,
                "reduce_motion={rm} low_data={ld} gpu={gpu} force={force}"
            );
        }
    }

    static PROBE_CALLS: AtomicU32 = AtomicU32::new(0);

    fn counting_probe() -> bool {
        PROBE_CALLS.fetch_add(1, Ordering::SeqCst);
        true
    }

    #[test]
    fn test_probe_runs_once_per_session() {
        PROBE_CALLS.store(0, Ordering::SeqCst);
        let mut gate = CapabilityGate::with_probe(counting_probe);
        assert_eq!(gate.availability(false), Some(true));
        assert_eq!(gate.availability(false), Some(true));
        assert_eq!(gate.availability(true), Some(true));
        assert_eq!(PROBE_CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_probe_skipped_while_calm() {
        let mut gate = CapabilityGate::with_probe(|| {
            panic!("probe must not run while calm");
        });
        assert_eq!(gate.availability(true), None);
        assert_eq!(gate.availability(true), None);
        assert_eq!(gate.cached(), None);
    }

    #[test]
    fn test_failed_probe_is_cached() {
        let mut gate = CapabilityGate::with_probe(|| false);
        assert_eq!(gate.availability(false), Some(false));
        assert_eq!(gate.cached(), Some(false));
    }
}
