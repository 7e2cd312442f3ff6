//! The backdrop shell.
//!
//! Implements winit's [`ApplicationHandler`]: owns the window, the GPU
//! context, and every store the orchestrator reconciles against. The frame
//! loop re-samples the wall clock once a minute, reacts to preference
//! changes, and pauses entirely while the window is occluded.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::Key;
use winit::window::{Fullscreen, Window, WindowId};

use halcyon_clock::{DayPhaseClock, HorizonVariant, POLL_INTERVAL, local_hour};
use halcyon_config::Config;
use halcyon_render::{
    CapabilityGate, FrameEncoder, PhysicalSize, RenderContext, SurfaceError, Viewport,
    init_render_context_blocking,
};
use halcyon_scenes::{Orchestrator, SceneActivation, SceneContext, SceneRegistry};
use halcyon_signals::{EnvSignalSource, PreferenceStore, Subscription};
use halcyon_theme::{SceneKey, ThemeId, ThemeStore};

/// A frame longer than this is a stall (debugger, suspend), not animation
/// time; fades and shader clocks should not leap across it.
const MAX_FRAME_DT: f32 = 0.25;

/// Normalized pointer offset from the window center, in `[-0.5, 0.5]` per
/// axis. This is what layers parallax against.
fn pointer_offset(x: f64, y: f64, size: PhysicalSize) -> [f32; 2] {
    let w = size.width.max(1) as f64;
    let h = size.height.max(1) as f64;
    [
        ((x / w) - 0.5).clamp(-0.5, 0.5) as f32,
        ((y / h) - 0.5).clamp(-0.5, 0.5) as f32,
    ]
}

/// The GPU probe is skipped while calm, unless scenes are forced on; a
/// forced session that never probes could never show a scene.
fn probe_suppressed(calm: bool, force_scenes: bool) -> bool {
    calm && !force_scenes
}

/// Everything the event loop drives.
pub struct BackdropShell {
    config: Config,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    viewport: Viewport,
    orchestrator: Option<Orchestrator>,
    themes: ThemeStore,
    theme: ThemeId,
    prefs: PreferenceStore,
    prefs_dirty: Rc<Cell<bool>>,
    _prefs_sub: Subscription,
    clock: DayPhaseClock,
    variant: HorizonVariant,
    poll_elapsed: f32,
    gate: CapabilityGate,
    last_frame: Option<Instant>,
    occluded: bool,
    frame_count: u64,
    frame_time_accum: f32,
}

impl BackdropShell {
    pub fn new(config: Config, config_dir: PathBuf) -> Self {
        let themes = ThemeStore::load(&config_dir);
        let theme = config
            .overrides
            .theme
            .as_deref()
            .and_then(|name| match name.parse::<ThemeId>() {
                Ok(id) => Some(id),
                Err(()) => {
                    warn!("Unknown theme override {name:?}, using persisted choice");
                    None
                }
            })
            .unwrap_or_else(|| themes.current());

        let prefs = PreferenceStore::from_source(&EnvSignalSource);
        if config.overrides.reduce_motion {
            prefs.set_reduce_motion(true);
        }
        if config.overrides.low_data {
            prefs.set_low_data(true);
        }
        let prefs_dirty = Rc::new(Cell::new(false));
        let dirty = prefs_dirty.clone();
        let prefs_sub = prefs.subscribe(move |_| dirty.set(true));

        let clock = match config.overrides.hour {
            Some(hour) => DayPhaseClock::with_override(hour),
            None => DayPhaseClock::new(),
        };

        let viewport = Viewport::new(config.window.width, config.window.height, 1.0);

        Self {
            config,
            window: None,
            gpu: None,
            viewport,
            orchestrator: None,
            themes,
            theme,
            prefs,
            prefs_dirty,
            _prefs_sub: prefs_sub,
            clock,
            variant: HorizonVariant::Day,
            poll_elapsed: 0.0,
            gate: CapabilityGate::new(),
            last_frame: None,
            occluded: false,
            frame_count: 0,
            frame_time_accum: 0.0,
        }
    }

    /// Reconcile the orchestrator against the current stores. Cheap; called
    /// on every theme, preference, variant, or probe change.
    fn apply_activation(&mut self) {
        let (Some(gpu), Some(orchestrator)) = (self.gpu.as_ref(), self.orchestrator.as_mut())
        else {
            return;
        };
        let prefs = self.prefs.snapshot();
        let force_scenes = self.config.overrides.force_scenes;
        let gpu_available = self
            .gate
            .availability(probe_suppressed(prefs.calm(), force_scenes));
        let activation = SceneActivation {
            theme: self.theme,
            variant: self.variant,
            prefs,
            gpu_available,
            force_scenes,
        };
        orchestrator.apply(&gpu.queue, &activation);
    }

    fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        if let Err(err) = self.themes.set(self.theme) {
            // The in-memory switch still happened; only persistence failed.
            warn!("Could not persist theme choice: {err}");
        }
        info!("Theme cycled to {}", self.theme);
        self.apply_activation();
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        let Some(size) = self.viewport.handle_resize(width, height) else {
            return;
        };
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(size.width, size.height);
        }
        if let (Some(gpu), Some(orchestrator)) = (self.gpu.as_ref(), self.orchestrator.as_mut()) {
            orchestrator.resize(&gpu.device, &gpu.queue, size.width, size.height);
        }
        info!("Window resized to {}x{}", size.width, size.height);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.occluded {
            // No redraw request: the loop sleeps until the window is
            // uncovered again.
            return;
        }

        let now = Instant::now();
        let dt = match self.last_frame.replace(now) {
            Some(previous) => (now - previous).as_secs_f32().min(MAX_FRAME_DT),
            None => 0.0,
        };

        self.poll_elapsed += dt;
        if self.poll_elapsed >= POLL_INTERVAL.as_secs_f32() {
            self.poll_elapsed = 0.0;
            if let Some(sample) = self.clock.sample(local_hour()) {
                self.variant = sample.variant;
                self.apply_activation();
            }
        }
        if self.prefs_dirty.replace(false) {
            self.apply_activation();
        }

        let (Some(gpu), Some(orchestrator)) = (self.gpu.as_mut(), self.orchestrator.as_mut())
        else {
            return;
        };
        let size = self.viewport.size();
        let ctx = SceneContext {
            device: &gpu.device,
            queue: &gpu.queue,
            surface_format: gpu.surface_format,
            width: size.width,
            height: size.height,
            postfx: self.config.render.postfx,
        };
        orchestrator.update(&ctx, dt);

        match gpu.get_current_texture() {
            Ok(surface_texture) => {
                let mut frame =
                    FrameEncoder::new(&gpu.device, Arc::new(gpu.queue.clone()), surface_texture);
                let surface_view = frame.surface_view().clone();
                orchestrator.render(frame.encoder(), &gpu.queue, &surface_view);
                frame.submit();
            }
            Err(SurfaceError::Lost) => {
                gpu.resize(size.width, size.height);
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
            }
        }

        self.frame_count += 1;
        self.frame_time_accum += dt;
        let interval = self.config.debug.frame_log_interval;
        if interval > 0 && self.frame_count % interval == 0 {
            let avg_ms = self.frame_time_accum / interval as f32 * 1000.0;
            debug!(
                "Frame {}: {:.2} ms avg, scene {:?}",
                self.frame_count,
                avg_ms,
                orchestrator.active_key()
            );
            self.frame_time_accum = 0.0;
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for BackdropShell {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        if self.config.window.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("Window creation failed: {err}");
                event_loop.exit();
                return;
            }
        };

        let inner = window.inner_size();
        self.viewport = Viewport::new(inner.width, inner.height, window.scale_factor());

        match init_render_context_blocking(window.clone()) {
            Ok(gpu) => {
                let mut registry = SceneRegistry::with_builtin_scenes();
                registry.register(SceneKey::Theater, halcyon_horizon::theater_ctor);

                if let Some(sample) = self.clock.sample(local_hour()) {
                    self.variant = sample.variant;
                }

                self.orchestrator = Some(Orchestrator::new(
                    &gpu.device,
                    gpu.surface_format,
                    self.theme,
                    self.variant,
                    registry,
                    self.config.render.fade_out_secs,
                    self.config.render.fade_in_secs,
                ));
                self.gpu = Some(gpu);
            }
            Err(err) => {
                error!("GPU initialization failed: {err}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
        self.apply_activation();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size.width, new_size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if self.viewport.handle_scale_factor(scale_factor)
                    && let Some(window) = &self.window
                {
                    let inner = window.inner_size();
                    self.handle_resize(inner.width, inner.height);
                }
            }
            WindowEvent::Occluded(occluded) => {
                self.occluded = occluded;
                if occluded {
                    debug!("Window occluded, pausing");
                    self.last_frame = None;
                } else {
                    debug!("Window visible, resuming");
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let offset = pointer_offset(position.x, position.y, self.viewport.size());
                if let Some(orchestrator) = self.orchestrator.as_mut() {
                    orchestrator.set_offset(offset);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed()
                    && !event.repeat
                    && let Key::Character(ref c) = event.logical_key
                    && c.as_str().eq_ignore_ascii_case("t")
                {
                    self.cycle_theme();
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

/// Create an event loop and run the backdrop until the window closes.
pub fn run(config: Config, config_dir: PathBuf) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut shell = BackdropShell::new(config, config_dir);
    event_loop.run_app(&mut shell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_offset_is_centered_and_bounded() {
        let size = PhysicalSize::new(1000, 500);
        assert_eq!(pointer_offset(500.0, 250.0, size), [0.0, 0.0]);
        assert_eq!(pointer_offset(0.0, 0.0, size), [-0.5, -0.5]);
        assert_eq!(pointer_offset(1000.0, 500.0, size), [0.5, 0.5]);
        // Positions outside the window (drag capture) stay bounded.
        let out = pointer_offset(2000.0, -300.0, size);
        assert_eq!(out, [0.5, -0.5]);
    }

    #[test]
    fn test_pointer_offset_survives_degenerate_size() {
        let offset = pointer_offset(10.0, 10.0, PhysicalSize::new(0, 0));
        assert!(offset[0].is_finite());
        assert!(offset[1].is_finite());
    }

    #[test]
    fn test_probe_suppressed_only_when_calm_and_not_forced() {
        assert!(probe_suppressed(true, false));
        assert!(!probe_suppressed(true, true));
        assert!(!probe_suppressed(false, false));
        assert!(!probe_suppressed(false, true));
    }
}
