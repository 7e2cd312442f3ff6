//! Hour-change-suppressed day-phase clock.
//!
//! The clock takes explicit hours so it is testable without wall-clock time;
//! the app shell feeds it [`local_hour`](crate::local_hour) on a fixed
//! interval. Re-sampling within the same hour emits nothing, so downstream
//! consumers never see redundant state transitions.

use std::time::Duration;

use crate::phase::{DayPhase, HorizonVariant, derive_day_phase, variant_for_phase};

/// How often the app shell re-samples the wall clock.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// A day-phase observation emitted when the hour changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayPhaseSample {
    /// The local hour that produced this sample.
    pub hour: u32,
    /// The phase bucket for that hour.
    pub phase: DayPhase,
    /// The Horizon variant that phase selects.
    pub variant: HorizonVariant,
}

/// Tracks the last observed hour and emits a sample only when it changes.
pub struct DayPhaseClock {
    last_hour: Option<u32>,
    /// Pinned hour from the override surface; when set, sampling ignores
    /// the supplied hour.
    override_hour: Option<u32>,
}

impl DayPhaseClock {
    /// Create a clock with no observations yet.
    pub fn new() -> Self {
        Self {
            last_hour: None,
            override_hour: None,
        }
    }

    /// Create a clock pinned to a fixed hour (visual-testing override).
    pub fn with_override(hour: u32) -> Self {
        Self {
            last_hour: None,
            override_hour: Some(hour % 24),
        }
    }

    /// Observe the given local hour. Returns a sample on the first call and
    /// whenever the effective hour differs from the previous observation;
    /// returns `None` otherwise.
    pub fn sample(&mut self, hour: u32) -> Option<DayPhaseSample> {
        let effective = self.override_hour.unwrap_or(hour % 24);
        if self.last_hour == Some(effective) {
            return None;
        }
        self.last_hour = Some(effective);
        let phase = derive_day_phase(effective);
        let sample = DayPhaseSample {
            hour: effective,
            phase,
            variant: variant_for_phase(phase),
        };
        log::debug!(
            "Day phase: hour {} -> {:?} ({:?})",
            effective,
            sample.phase,
            sample.variant
        );
        Some(sample)
    }

    /// The most recent observation, if any.
    pub fn current(&self) -> Option<DayPhaseSample> {
        self.last_hour.map(|hour| {
            let phase = derive_day_phase(hour);
            DayPhaseSample {
                hour,
                phase,
                variant: variant_for_phase(phase),
            }
        })
    }
}

impl Default for DayPhaseClock {
    fn default() -> Self {
        Self::new()
    }
}
