//! Theme identity and selection for the Halcyon backdrop engine.
//!
//! The ordered [`THEMES`] array is the single source of truth for which
//! themes exist and which scene each maps to. [`ThemeStore`] persists the
//! user's choice; unrecognized persisted values fall back to the default
//! theme rather than failing.

mod registry;
mod store;

pub use registry::{DEFAULT_THEME, SceneKey, Theme, THEMES, ThemeId};
pub use store::{ThemeStore, ThemeStoreError};
