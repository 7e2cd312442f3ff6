//! Pure hour → phase → variant derivations.

use serde::{Deserialize, Serialize};

/// Discrete time-of-day bucket derived from the local hour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayPhase {
    /// Hours [0, 6).
    LateNight,
    /// Hours [6, 12).
    Morning,
    /// Hours [12, 18).
    Afternoon,
    /// Hours [18, 24).
    Evening,
}

/// Horizon sub-scene selection tied to time of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HorizonVariant {
    Sunrise,
    Sunset,
    NightCity,
    Day,
}

/// Derive the day phase from a local hour.
///
/// Total over all inputs; hours >= 24 wrap modulo 24.
pub fn derive_day_phase(hour: u32) -> DayPhase {
    match hour % 24 {
        0..=5 => DayPhase::LateNight,
        6..=11 => DayPhase::Morning,
        12..=17 => DayPhase::Afternoon,
        _ => DayPhase::Evening,
    }
}

/// Map a day phase to the Horizon variant it selects.
///
/// This is the only place the phase → variant mapping is defined.
pub fn variant_for_phase(phase: DayPhase) -> HorizonVariant {
    match phase {
        DayPhase::Morning => HorizonVariant::Sunrise,
        DayPhase::Evening => HorizonVariant::Sunset,
        DayPhase::LateNight => HorizonVariant::NightCity,
        DayPhase::Afternoon => HorizonVariant::Day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_totality() {
        for hour in 0..24 {
            // Must not panic and must land in exactly one bucket.
            let _ = derive_day_phase(hour);
        }
    }

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(derive_day_phase(0), DayPhase::LateNight);
        assert_eq!(derive_day_phase(5), DayPhase::LateNight);
        assert_eq!(derive_day_phase(6), DayPhase::Morning);
        assert_eq!(derive_day_phase(11), DayPhase::Morning);
        assert_eq!(derive_day_phase(12), DayPhase::Afternoon);
        assert_eq!(derive_day_phase(17), DayPhase::Afternoon);
        assert_eq!(derive_day_phase(18), DayPhase::Evening);
        assert_eq!(derive_day_phase(23), DayPhase::Evening);
    }

    #[test]
    fn test_hours_wrap_modulo_24() {
        assert_eq!(derive_day_phase(24), derive_day_phase(0));
        assert_eq!(derive_day_phase(31), derive_day_phase(7));
    }

    #[test]
    fn test_variant_mapping_is_fixed() {
        assert_eq!(variant_for_phase(DayPhase::Morning), HorizonVariant::Sunrise);
        assert_eq!(variant_for_phase(DayPhase::Evening), HorizonVariant::Sunset);
        assert_eq!(
            variant_for_phase(DayPhase::LateNight),
            HorizonVariant::NightCity
        );
        assert_eq!(variant_for_phase(DayPhase::Afternoon), HorizonVariant::Day);
    }

    #[test]
    fn test_variant_mapping_is_deterministic() {
        // No hidden state or randomness: repeated calls agree.
        for _ in 0..100 {
            assert_eq!(
                variant_for_phase(DayPhase::Morning),
                HorizonVariant::Sunrise
            );
        }
    }
}
