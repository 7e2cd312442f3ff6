//! The static theme registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named visual identity for the whole backdrop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    Light,
    Dark,
    Cyberpunk,
    Ethereal,
    Horizon,
    Mirage,
    Simple,
}

/// Scene implementation selector. Every theme maps to exactly one key;
/// `None` is the no-op scene for the simple theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneKey {
    SoftBlobs,
    Starfield,
    NeonGrid,
    Aurora,
    Theater,
    DuneShimmer,
    None,
}

/// One entry of the theme registry.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub id: ThemeId,
    /// Human-readable label for pickers.
    pub display_name: &'static str,
    pub scene_key: SceneKey,
}

/// Theme used when nothing is persisted or the persisted value is invalid.
pub const DEFAULT_THEME: ThemeId = ThemeId::Light;

/// The ordered, immutable theme list. Cycling wraps around this order.
pub const THEMES: [Theme; 7] = [
    Theme {
        id: ThemeId::Light,
        display_name: "Light",
        scene_key: SceneKey::SoftBlobs,
    },
    Theme {
        id: ThemeId::Dark,
        display_name: "Dark",
        scene_key: SceneKey::Starfield,
    },
    Theme {
        id: ThemeId::Cyberpunk,
        display_name: "Cyberpunk",
        scene_key: SceneKey::NeonGrid,
    },
    Theme {
        id: ThemeId::Ethereal,
        display_name: "Ethereal",
        scene_key: SceneKey::Aurora,
    },
    Theme {
        id: ThemeId::Horizon,
        display_name: "Horizon",
        scene_key: SceneKey::Theater,
    },
    Theme {
        id: ThemeId::Mirage,
        display_name: "Mirage",
        scene_key: SceneKey::DuneShimmer,
    },
    Theme {
        id: ThemeId::Simple,
        display_name: "Simple",
        scene_key: SceneKey::None,
    },
];

impl ThemeId {
    /// Look up this theme's registry entry.
    pub fn entry(&self) -> &'static Theme {
        THEMES
            .iter()
            .find(|t| t.id == *self)
            .unwrap_or(&THEMES[0]) // unreachable: every variant is registered
    }

    /// The scene this theme maps to.
    pub fn scene_key(&self) -> SceneKey {
        self.entry().scene_key
    }

    /// The next theme in registry order, wrapping at the end.
    pub fn next(&self) -> ThemeId {
        let idx = THEMES
            .iter()
            .position(|t| t.id == *self)
            .unwrap_or(0);
        THEMES[(idx + 1) % THEMES.len()].id
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ThemeId::Light => "light",
            ThemeId::Dark => "dark",
            ThemeId::Cyberpunk => "cyberpunk",
            ThemeId::Ethereal => "ethereal",
            ThemeId::Horizon => "horizon",
            ThemeId::Mirage => "mirage",
            ThemeId::Simple => "simple",
        };
        f.write_str(name)
    }
}

impl FromStr for ThemeId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeId::Light),
            "dark" => Ok(ThemeId::Dark),
            "cyberpunk" => Ok(ThemeId::Cyberpunk),
            "ethereal" => Ok(ThemeId::Ethereal),
            "horizon" => Ok(ThemeId::Horizon),
            "mirage" => Ok(ThemeId::Mirage),
            "simple" => Ok(ThemeId::Simple),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_theme_registered_once() {
        for theme in [
            ThemeId::Light,
            ThemeId::Dark,
            ThemeId::Cyberpunk,
            ThemeId::Ethereal,
            ThemeId::Horizon,
            ThemeId::Mirage,
            ThemeId::Simple,
        ] {
            let count = THEMES.iter().filter(|t| t.id == theme).count();
            assert_eq!(count, 1, "{theme} must appear exactly once");
        }
    }

    #[test]
    fn test_scene_keys_are_unique() {
        for (i, a) in THEMES.iter().enumerate() {
            for b in &THEMES[i + 1..] {
                assert_ne!(
                    a.scene_key, b.scene_key,
                    "{} and {} share a scene key",
                    a.display_name, b.display_name
                );
            }
        }
    }

    #[test]
    fn test_cycle_wraps_around() {
        let mut theme = THEMES[0].id;
        for expected in THEMES.iter().skip(1) {
            theme = theme.next();
            assert_eq!(theme, expected.id);
        }
        // Past the last entry, cycling returns to the first.
        assert_eq!(theme.next(), THEMES[0].id);
    }

    #[test]
    fn test_from_str_round_trip() {
        for theme in THEMES {
            let name = theme.id.to_string();
            assert_eq!(name.parse::<ThemeId>(), Ok(theme.id));
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("midnight".parse::<ThemeId>().is_err());
        assert!("".parse::<ThemeId>().is_err());
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("Horizon".parse::<ThemeId>(), Ok(ThemeId::Horizon));
        assert_eq!(" DARK ".parse::<ThemeId>(), Ok(ThemeId::Dark));
    }

    #[test]
    fn test_simple_maps_to_none_scene() {
        assert_eq!(ThemeId::Simple.scene_key(), SceneKey::None);
    }
}
