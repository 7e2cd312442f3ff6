//! The Horizon theater: the layered time-of-day scene.
//!
//! Four variants (sunrise, day, sunset, night city) share one scene
//! instance. A variant change swaps the layer stack and re-targets the
//! post-processing preset damper; it never tears the scene down. The
//! theater is registered with the scene registry by the application:
//!
//! ```ignore
//! registry.register(SceneKey::Theater, halcyon_horizon::theater_ctor);
//! ```

mod layers;
mod presets;
mod props;
mod theater;

pub use presets::preset_for;
pub use theater::HorizonTheater;

use halcyon_scenes::{Scene, SceneContext, SceneError};

/// Constructor with the registry's expected signature.
pub fn theater_ctor(ctx: &SceneContext<'_>) -> Result<Box<dyn Scene>, SceneError> {
    Ok(Box::new(HorizonTheater::new(ctx)?))
}
