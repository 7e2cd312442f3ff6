//! Halcyon application shell.
//!
//! Window creation, the winit event loop, and the wiring between config,
//! preference signals, the day-phase clock, the theme store, and the scene
//! orchestrator.

pub mod shell;

pub use shell::{BackdropShell, run};
