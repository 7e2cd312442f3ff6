//! Command-line argument parsing for the Halcyon backdrop engine.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Halcyon command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "halcyon", about = "Halcyon animated backdrop engine")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start with this theme (light, dark, cyberpunk, ethereal, horizon, mirage, simple).
    #[arg(long)]
    pub theme: Option<String>,

    /// Pin the day-phase clock to this local hour (0-23).
    #[arg(long)]
    pub hour: Option<u32>,

    /// Force heavy scenes on regardless of the calm state.
    #[arg(long)]
    pub force_scenes: bool,

    /// Simulate the reduced-motion preference.
    #[arg(long)]
    pub reduce_motion: bool,

    /// Simulate the low-data preference.
    #[arg(long)]
    pub low_data: bool,

    /// Disable the post-processing chain.
    #[arg(long)]
    pub no_postfx: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref theme) = args.theme {
            self.overrides.theme = Some(theme.clone());
        }
        if let Some(hour) = args.hour {
            self.overrides.hour = Some(hour);
        }
        if args.force_scenes {
            self.overrides.force_scenes = true;
        }
        if args.reduce_motion {
            self.overrides.reduce_motion = true;
        }
        if args.low_data {
            self.overrides.low_data = true;
        }
        if args.no_postfx {
            self.render.postfx = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs {
            width: None,
            height: None,
            theme: None,
            hour: None,
            force_scenes: false,
            reduce_motion: false,
            low_data: false,
            no_postfx: false,
            log_level: None,
            config: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            theme: Some("horizon".to_string()),
            hour: Some(23),
            force_scenes: true,
            ..empty_args()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.overrides.theme.as_deref(), Some("horizon"));
        assert_eq!(config.overrides.hour, Some(23));
        assert!(config.overrides.force_scenes);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert!(config.render.postfx);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&empty_args());
        assert_eq!(config, original);
    }

    #[test]
    fn test_no_postfx_flag() {
        let mut config = Config::default();
        let args = CliArgs {
            no_postfx: true,
            ..empty_args()
        };
        config.apply_cli_overrides(&args);
        assert!(!config.render.postfx);
    }
}
