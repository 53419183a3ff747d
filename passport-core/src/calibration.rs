//! Immutable calibration of the canonical passport frame and the verifier limits.
//!
//! Both types are built once from [`passport_utils::config`] settings and then passed by
//! reference to every stage. There is no global state: two verifiers with different
//! calibrations can run side by side.

use passport_utils::config::{CalibrationSettings, ThresholdSettings};

/// Canonical frame geometry and the spatial scale of the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pixels_per_mm: u32,
    img_width_mm: u32,
    img_height_mm: u32,
    head_ratio: f64,
    top_margin_weight: f64,
    bottom_margin_weight: f64,
    max_upscale: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::from(&CalibrationSettings::default())
    }
}

impl From<&CalibrationSettings> for Calibration {
    fn from(s: &CalibrationSettings) -> Self {
        Self {
            pixels_per_mm: s.pixels_per_mm,
            img_width_mm: s.img_width_mm,
            img_height_mm: s.img_height_mm,
            head_ratio: s.head_ratio,
            top_margin_weight: s.top_margin_weight,
            bottom_margin_weight: s.bottom_margin_weight,
            max_upscale: s.max_upscale,
        }
    }
}

impl Calibration {
    /// Default 35x45mm frame at `pixels_per_mm`.
    pub fn with_pixels_per_mm(pixels_per_mm: u32) -> Self {
        Self::from(&CalibrationSettings {
            pixels_per_mm,
            ..CalibrationSettings::default()
        })
    }

    pub fn pixels_per_mm(&self) -> u32 {
        self.pixels_per_mm
    }

    pub fn head_ratio(&self) -> f64 {
        self.head_ratio
    }

    pub fn max_upscale(&self) -> f64 {
        self.max_upscale
    }

    /// Saturates at `u32::MAX`; validated settings never reach it.
    pub fn canonical_width_px(&self) -> u32 {
        self.img_width_mm.saturating_mul(self.pixels_per_mm)
    }

    pub fn canonical_height_px(&self) -> u32 {
        self.img_height_mm.saturating_mul(self.pixels_per_mm)
    }

    /// Pixel height the detected face box should have in the canonical frame.
    pub fn target_head_height_px(&self) -> f64 {
        self.canonical_height_px() as f64 * self.head_ratio
    }

    /// Share of the canonical height kept above the face box.
    pub fn top_ratio(&self) -> f64 {
        (1.0 - self.head_ratio) / 2.0 * self.top_margin_weight
    }

    /// Share of the canonical height kept below the face box.
    pub fn bottom_ratio(&self) -> f64 {
        (1.0 - self.head_ratio) / 2.0 * self.bottom_margin_weight
    }

    /// Convert a length in millimetres to canonical pixels.
    pub fn mm(&self, value: f64) -> f64 {
        value * self.pixels_per_mm as f64
    }
}

/// Verifier limits in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub nose_bridge_mm: f64,
    pub eyebrow_span_mm: f64,
    pub lip_area_mm: f64,
    pub chin_level_mm: f64,
    pub eye_chin_vertical_mm: f64,
    pub eye_chin_horizontal_mm: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&ThresholdSettings::default())
    }
}

impl From<&ThresholdSettings> for Thresholds {
    fn from(s: &ThresholdSettings) -> Self {
        Self {
            nose_bridge_mm: s.nose_bridge_mm,
            eyebrow_span_mm: s.eyebrow_span_mm,
            lip_area_mm: s.lip_area_mm,
            chin_level_mm: s.chin_level_mm,
            eye_chin_vertical_mm: s.eye_chin_vertical_mm,
            eye_chin_horizontal_mm: s.eye_chin_horizontal_mm,
        }
    }
}
