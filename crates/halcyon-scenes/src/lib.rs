//! Scene implementations and the orchestrator that swaps between them.
//!
//! A scene is a self-contained animated backdrop behind the gradient-first
//! frame. The [`Orchestrator`] owns at most one live scene at a time and
//! moves between them with an opacity crossfade; any scene failure drops
//! back to the gradient instead of propagating.

pub mod crossfade;
pub mod orchestrator;
pub mod registry;
pub mod scene;
pub mod simple;

pub use crossfade::{Crossfade, FadeEvent, FadePhase};
pub use orchestrator::{Orchestrator, SceneActivation, resolve_scene};
pub use registry::{SceneCtor, SceneRegistry};
pub use scene::{Scene, SceneContext, SceneError};
