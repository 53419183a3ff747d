//! Common helpers shared across the passport verifier crates.

/// Persisted settings for calibration, thresholds, crop bounds and telemetry.
pub mod config;
/// Test fixture loading and path resolution.
pub mod fixtures;
/// Instrumentation helpers for optional stage timing.
pub mod telemetry;

use std::path::Path;

use anyhow::Result;
use log::LevelFilter;

pub use config::{
    AppSettings, BatchSettings, BoundsPolicySetting, CalibrationSettings, CropBoundsSettings,
    TelemetrySettings, ThresholdSettings,
};
pub use fixtures::{fixture_path, fixtures_dir, load_fixture_json};
pub use telemetry::{
    TimingGuard, configure as configure_telemetry, telemetry_enabled, timing_guard,
};

/// Initialize logging once for CLI environments and tests.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies. Repeated calls are no-ops.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.filter_module(telemetry::TARGET, LevelFilter::Trace);

    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
    Ok(())
}

/// Validate that a path exists and resolve it to an absolute path.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<std::path::PathBuf> {
    let path = path.as_ref();
    anyhow::ensure!(path.exists(), "path does not exist: {}", path.display());
    Ok(path.canonicalize()?)
}
