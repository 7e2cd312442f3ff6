//! Environment preference signals for the Halcyon backdrop engine.
//!
//! A single [`PreferenceStore`] owns the reduced-motion and low-data flags.
//! Components subscribe for change notifications; non-reactive consumers read
//! a mirrored pair of process-wide flags written exclusively by the store.
//! Detection sources that are unavailable silently default to "not reduced".

mod detect;
mod mirror;
mod store;

pub use detect::{EnvSignalSource, SignalSource};
pub use mirror::mirror_snapshot;
pub use store::{PreferenceSnapshot, PreferenceStore, Subscription};
