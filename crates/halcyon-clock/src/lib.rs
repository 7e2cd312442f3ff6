//! Time-of-day phases for the Halcyon backdrop engine.
//!
//! Derives a discrete [`DayPhase`] from the local wall-clock hour and maps it
//! to the Horizon scene's [`HorizonVariant`]. Both mappings are pure functions
//! and live only here; scenes import them instead of re-deriving the logic.

mod clock;
mod phase;

pub use clock::{DayPhaseClock, DayPhaseSample, POLL_INTERVAL};
pub use phase::{DayPhase, HorizonVariant, derive_day_phase, variant_for_phase};

/// Current local hour in `[0, 24)`.
pub fn local_hour() -> u32 {
    use chrono::Timelike;
    chrono::Local::now().hour()
}
