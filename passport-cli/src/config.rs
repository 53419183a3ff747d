//! Settings resolution for the CLI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{LevelFilter, info};
use passport_utils::{
    config::{AppSettings, default_settings_path},
    configure_telemetry, normalize_path,
};

use crate::args::GlobalArgs;

/// Load application settings from a file or use defaults.
pub fn load_settings(config_path: Option<&PathBuf>) -> Result<AppSettings> {
    if let Some(path) = config_path {
        let resolved = normalize_path(path)?;
        let settings = AppSettings::load_from_path(&resolved)?;
        info!("Loaded settings from {}", resolved.display());
        Ok(settings)
    } else {
        let default_path = default_settings_path();
        if default_path.exists() {
            let settings = AppSettings::load_from_path(&default_path).with_context(|| {
                format!(
                    "failed to load default settings from {}",
                    default_path.display()
                )
            })?;
            info!("Loaded settings from {}", default_path.display());
            Ok(settings)
        } else {
            Ok(AppSettings::default())
        }
    }
}

/// Apply command-line overrides on top of the loaded settings.
pub fn apply_cli_overrides(settings: &mut AppSettings, args: &GlobalArgs) -> Result<()> {
    if let Some(ppm) = args.pixels_per_mm {
        settings.calibration.pixels_per_mm = ppm;
    }
    if let Some(policy) = args.bounds {
        settings.crop.policy = policy;
    }
    if let Some(threads) = args.threads {
        settings.batch.threads = Some(threads);
    }
    if args.telemetry {
        settings.telemetry.enabled = true;
    }
    if let Some(level) = args.telemetry_level.as_ref() {
        settings.telemetry.level = level.clone();
    }
    settings.validate().context("invalid command-line overrides")
}

/// Switch telemetry on according to the resolved settings.
pub fn configure_telemetry_from(settings: &AppSettings) {
    let level = settings.telemetry.level_filter();
    configure_telemetry(settings.telemetry.enabled, level);
    if settings.telemetry.enabled && level != LevelFilter::Off {
        info!("Telemetry timing enabled at {level} level");
    }
}
