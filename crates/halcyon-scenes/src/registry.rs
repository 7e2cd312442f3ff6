//! Scene constructor registry.
//!
//! Which scene implementation backs a [`SceneKey`] is data, not a match
//! statement buried in the render loop. The built-in scenes register
//! themselves here; heavier scenes living in other crates (the Horizon
//! theater) are registered by the application at startup.

use std::collections::HashMap;

use halcyon_theme::SceneKey;

use crate::scene::{Scene, SceneContext, SceneError};
use crate::simple;

/// A scene constructor. Runs against live GPU state and may fail; failure
/// means the caller stays on the gradient.
pub type SceneCtor = fn(&SceneContext<'_>) -> Result<Box<dyn Scene>, SceneError>;

/// Maps scene keys to constructors.
pub struct SceneRegistry {
    ctors: HashMap<SceneKey, SceneCtor>,
}

impl SceneRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            ctors: HashMap::new(),
        }
    }

    /// A registry with every scene this crate implements.
    pub fn with_builtin_scenes() -> Self {
        let mut registry = Self::new();
        registry.register(SceneKey::SoftBlobs, simple::soft_blobs);
        registry.register(SceneKey::Starfield, simple::starfield);
        registry.register(SceneKey::NeonGrid, simple::neon_grid);
        registry.register(SceneKey::Aurora, simple::aurora);
        registry.register(SceneKey::DuneShimmer, simple::dune_shimmer);
        registry
    }

    /// Register or replace the constructor for a key.
    pub fn register(&mut self, key: SceneKey, ctor: SceneCtor) {
        self.ctors.insert(key, ctor);
    }

    pub fn is_registered(&self, key: SceneKey) -> bool {
        self.ctors.contains_key(&key)
    }

    /// Build the scene for `key`. `SceneKey::None` is the deliberate
    /// no-scene answer and yields `Ok(None)`.
    pub fn create(
        &self,
        key: SceneKey,
        ctx: &SceneContext<'_>,
    ) -> Result<Option<Box<dyn Scene>>, SceneError> {
        if key == SceneKey::None {
            return Ok(None);
        }
        let ctor = self.ctors.get(&key).ok_or(SceneError::Unregistered(key))?;
        ctor(ctx).map(Some)
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::with_builtin_scenes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halcyon_theme::THEMES;

    #[test]
    fn test_builtins_cover_every_theme_except_theater() {
        let registry = SceneRegistry::with_builtin_scenes();
        for theme in THEMES {
            match theme.scene_key {
                // The theater is registered by the application; None never is.
                SceneKey::Theater | SceneKey::None => {
                    assert!(!registry.is_registered(theme.scene_key))
                }
                key => assert!(
                    registry.is_registered(key),
                    "{} has no registered scene",
                    theme.display_name
                ),
            }
        }
    }

    #[test]
    fn test_register_is_idempotent_per_key() {
        let mut registry = SceneRegistry::new();
        registry.register(SceneKey::Starfield, simple::starfield);
        registry.register(SceneKey::Starfield, simple::starfield);
        assert!(registry.is_registered(SceneKey::Starfield));
    }
}
