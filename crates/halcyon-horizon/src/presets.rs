//! Per-variant post-processing looks.

use halcyon_clock::HorizonVariant;
use halcyon_render::{BloomSettings, GradeSettings, PostFxPreset};

/// The post-FX look for a variant. Night leans hardest on bloom and
/// distortion; day is nearly clean.
pub fn preset_for(variant: HorizonVariant) -> PostFxPreset {
    match variant {
        HorizonVariant::Sunrise => PostFxPreset {
            bloom: BloomSettings {
                strength: 0.5,
                radius: 1.2,
                threshold: 0.8,
            },
            grade: GradeSettings {
                aberration: 0.002,
                vignette: 0.25,
                grain: 0.05,
                weave: 0.0,
                jitter: 0.0,
            },
        },
        HorizonVariant::Day => PostFxPreset {
            bloom: BloomSettings {
                strength: 0.3,
                radius: 1.0,
                threshold: 1.0,
            },
            grade: GradeSettings {
                aberration: 0.001,
                vignette: 0.15,
                grain: 0.03,
                weave: 0.0,
                jitter: 0.0,
            },
        },
        HorizonVariant::Sunset => PostFxPreset {
            bloom: BloomSettings {
                strength: 0.7,
                radius: 1.4,
                threshold: 0.7,
            },
            grade: GradeSettings {
                aberration: 0.003,
                vignette: 0.3,
                grain: 0.06,
                weave: 0.05,
                jitter: 0.01,
            },
        },
        HorizonVariant::NightCity => PostFxPreset {
            bloom: BloomSettings {
                strength: 0.9,
                radius: 1.6,
                threshold: 0.6,
            },
            grade: GradeSettings {
                aberration: 0.005,
                vignette: 0.45,
                grain: 0.1,
                weave: 0.15,
                jitter: 0.02,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [HorizonVariant; 4] = [
        HorizonVariant::Sunrise,
        HorizonVariant::Day,
        HorizonVariant::Sunset,
        HorizonVariant::NightCity,
    ];

    #[test]
    fn test_each_variant_has_a_distinct_preset() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert_ne!(preset_for(*a), preset_for(*b), "{a:?} and {b:?}");
            }
        }
    }

    #[test]
    fn test_night_blooms_hardest_day_is_cleanest() {
        let day = preset_for(HorizonVariant::Day);
        let night = preset_for(HorizonVariant::NightCity);
        assert!(night.bloom.strength > day.bloom.strength);
        assert!(night.grade.vignette > day.grade.vignette);
        assert!(night.grade.grain > day.grade.grain);
    }

    #[test]
    fn test_amounts_are_sane() {
        for variant in ALL {
            let preset = preset_for(variant);
            assert!(preset.bloom.strength > 0.0 && preset.bloom.strength <= 1.5);
            assert!(preset.bloom.threshold > 0.0);
            assert!(preset.grade.vignette >= 0.0 && preset.grade.vignette < 1.0);
            assert!(preset.grade.aberration < 0.02, "{variant:?} aberration too strong");
        }
    }
}
