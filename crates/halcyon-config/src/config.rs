//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level backdrop engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// The backdrop window.
    pub window: WindowConfig,
    /// Scene rendering and crossfade timing.
    pub render: RenderConfig,
    /// Testing/tooling overrides.
    pub overrides: OverrideConfig,
    /// Development knobs.
    pub debug: DebugConfig,
}

/// How the backdrop window is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Logical width when windowed.
    pub width: u32,
    /// Logical height when windowed.
    pub height: u32,
    /// Cover the monitor with a borderless fullscreen window instead.
    pub fullscreen: bool,
    /// Present with vsync; a backdrop has no reason to outrun the display.
    pub vsync: bool,
    /// Title shown to window managers and task switchers.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Enable the bloom + grade post-processing chain for the Horizon theater.
    pub postfx: bool,
    /// Crossfade-out duration for the outgoing scene, in seconds.
    pub fade_out_secs: f32,
    /// Crossfade-in duration for the incoming scene, in seconds.
    pub fade_in_secs: f32,
}

/// Overrides used by visual-regression tooling and manual testing.
///
/// These feed the same preference store and clock the production paths
/// consume, so the test surface and the production surface stay unified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverrideConfig {
    /// Force heavy scenes on regardless of the calm state.
    pub force_scenes: bool,
    /// Simulate the OS reduced-motion preference.
    pub reduce_motion: bool,
    /// Simulate the low-data preference.
    pub low_data: bool,
    /// Pin the day-phase clock to this local hour (0-23).
    pub hour: Option<u32>,
    /// Start with this theme instead of the persisted choice.
    pub theme: Option<String>,
}

/// Development knobs, all off in a default install.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Emit a frame-timing summary every N frames; 0 disables it.
    pub frame_log_interval: u64,
    /// Log filter applied at startup ("debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Halcyon".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            postfx: true,
            fade_out_secs: 0.4,
            fade_in_secs: 0.5,
        }
    }
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            force_scenes: false,
            reduce_motion: false,
            low_data: false,
            hour: None,
            theme: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            frame_log_interval: 0,
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Default per-user config directory (`~/.config/halcyon` on Linux).
    pub fn default_config_dir() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|d| d.join("halcyon"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("postfx: true"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        // Config missing the `overrides` section entirely
        let ron_str = "(window: (), render: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.overrides, OverrideConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_fade_durations() {
        let config = RenderConfig::default();
        assert!((config.fade_out_secs - 0.4).abs() < 1e-6);
        assert!((config.fade_in_secs - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_overrides_default_off() {
        let o = OverrideConfig::default();
        assert!(!o.force_scenes);
        assert!(!o.reduce_motion);
        assert!(!o.low_data);
        assert!(o.hour.is_none());
        assert!(o.theme.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.window.height = 1080;
        config.overrides.force_scenes = true;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.overrides.hour = Some(9);
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().overrides.hour, Some(9));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
