//! Shared configuration types consumed across the passport verifier workspace.
//!
//! These structures are the on-disk (JSON) form of the calibration constants,
//! verifier thresholds and runtime preferences. The core crate converts them into
//! its own immutable types once at start-up; nothing here is consulted mid-run.

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Physical layout of the canonical passport frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Output pixel density; every mm threshold is multiplied by this.
    pub pixels_per_mm: u32,
    /// Canonical frame width in millimetres.
    pub img_width_mm: u32,
    /// Canonical frame height in millimetres.
    pub img_height_mm: u32,
    /// Fraction of the canonical height occupied by the head.
    pub head_ratio: f64,
    /// Multiplier applied to the half non-head height above the face box.
    pub top_margin_weight: f64,
    /// Multiplier applied to the half non-head height below the face box.
    pub bottom_margin_weight: f64,
    /// Largest accepted upscale factor.
    pub max_upscale: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            pixels_per_mm: 15,
            img_width_mm: 35,
            img_height_mm: 45,
            head_ratio: 0.44,
            top_margin_weight: 1.2,
            bottom_margin_weight: 0.8,
            max_upscale: 2.0,
        }
    }
}

/// Verifier limits, in millimetres of the canonical frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThresholdSettings {
    /// Largest horizontal drift between the top and bottom nose bridge points.
    pub nose_bridge_mm: f64,
    /// Largest amount the left eyebrow span may exceed the right one.
    pub eyebrow_span_mm: f64,
    /// Largest mouth opening area (multiplied by `pixels_per_mm` once, not squared).
    pub lip_area_mm: f64,
    /// Largest vertical offset between the two chin endpoints.
    pub chin_level_mm: f64,
    /// Largest vertical offset between the eye-corner and chin-endpoint midpoints.
    pub eye_chin_vertical_mm: f64,
    /// Largest horizontal offset between the eye-corner and chin-endpoint midpoints.
    pub eye_chin_horizontal_mm: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            nose_bridge_mm: 0.8,
            eyebrow_span_mm: 2.5,
            lip_area_mm: 20.0,
            chin_level_mm: 3.0,
            eye_chin_vertical_mm: 1.5,
            eye_chin_horizontal_mm: 1.0,
        }
    }
}

impl ThresholdSettings {
    fn values(&self) -> [(&'static str, f64); 6] {
        [
            ("nose_bridge_mm", self.nose_bridge_mm),
            ("eyebrow_span_mm", self.eyebrow_span_mm),
            ("lip_area_mm", self.lip_area_mm),
            ("chin_level_mm", self.chin_level_mm),
            ("eye_chin_vertical_mm", self.eye_chin_vertical_mm),
            ("eye_chin_horizontal_mm", self.eye_chin_horizontal_mm),
        ]
    }
}

/// What to do when the canonical crop reaches past the scaled image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicySetting {
    /// Reject the photo.
    #[default]
    Reject,
    /// Fill the missing area with `fill_color`.
    Pad,
}

impl fmt::Display for BoundsPolicySetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoundsPolicySetting::Reject => "reject",
            BoundsPolicySetting::Pad => "pad",
        })
    }
}

impl FromStr for BoundsPolicySetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(BoundsPolicySetting::Reject),
            "pad" => Ok(BoundsPolicySetting::Pad),
            other => Err(format!(
                "invalid bounds policy '{other}'; expected 'reject' or 'pad'"
            )),
        }
    }
}

/// Crop boundary handling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CropBoundsSettings {
    pub policy: BoundsPolicySetting,
    /// RGB fill used by the `pad` policy.
    pub fill_color: [u8; 3],
}

/// Settings controlling optional runtime telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Whether stage timing logs are enabled.
    pub enabled: bool,
    /// Logging level for telemetry output (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
        }
    }
}

impl TelemetrySettings {
    /// Resolve the configured level string into a `LevelFilter`.
    pub fn level_filter(&self) -> LevelFilter {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Debug,
        }
    }
}

/// Parallelism for batch verification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct BatchSettings {
    /// Worker thread count; `None` uses one thread per core.
    pub threads: Option<usize>,
}

/// Persistent settings consumed by the CLI and by embedding applications.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub calibration: CalibrationSettings,
    pub thresholds: ThresholdSettings,
    pub crop: CropBoundsSettings,
    pub telemetry: TelemetrySettings,
    pub batch: BatchSettings,
}

impl AppSettings {
    /// Load settings from a JSON file. Missing fields fall back to defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))?;
        settings
            .validate()
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        Ok(settings)
    }

    /// Serialize settings to disk in pretty-printed JSON, overwriting any existing file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }

    /// Check that the calibration and thresholds describe a usable frame.
    pub fn validate(&self) -> Result<()> {
        let cal = &self.calibration;
        anyhow::ensure!(cal.pixels_per_mm > 0, "pixels_per_mm must be > 0");
        anyhow::ensure!(
            cal.img_width_mm > 0 && cal.img_height_mm > 0,
            "canonical frame must be at least 1mm in each direction"
        );
        anyhow::ensure!(
            cal.img_width_mm.checked_mul(cal.pixels_per_mm).is_some()
                && cal.img_height_mm.checked_mul(cal.pixels_per_mm).is_some(),
            "canonical frame of {}x{}mm at {} px/mm exceeds the pixel range",
            cal.img_width_mm,
            cal.img_height_mm,
            cal.pixels_per_mm
        );
        anyhow::ensure!(
            cal.head_ratio > 0.0 && cal.head_ratio < 1.0,
            "head_ratio must be in (0, 1), got {}",
            cal.head_ratio
        );
        anyhow::ensure!(
            cal.max_upscale.is_finite() && cal.max_upscale > 0.0,
            "max_upscale must be a positive number, got {}",
            cal.max_upscale
        );
        anyhow::ensure!(
            cal.top_margin_weight >= 0.0 && cal.bottom_margin_weight >= 0.0,
            "margin weights must not be negative"
        );
        for (name, value) in self.thresholds.values() {
            anyhow::ensure!(
                value.is_finite() && value >= 0.0,
                "threshold {name} must be a non-negative number, got {value}"
            );
        }
        if let Some(threads) = self.batch.threads {
            anyhow::ensure!(threads > 0, "batch.threads must be > 0 when set");
        }
        Ok(())
    }
}

/// Returns the default path for persisted settings (`config/passport_settings.json`).
pub fn default_settings_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("config/passport_settings.json"))
        .unwrap_or_else(|_| PathBuf::from("config/passport_settings.json"))
}
