//! Geometric checks on one face's landmarks.
//!
//! Four cheap proxies for "frontal pose, neutral expression, level head". Every limit is
//! a length in millimetres of the canonical frame, converted to pixels through the
//! calibration, so the checks only make sense on landmarks extracted from the canonical
//! crop.

use std::fmt;

use serde::Serialize;

use crate::calibration::{Calibration, Thresholds};
use crate::geometry::{midpoint, polygon_area};
use crate::landmarks::{LandmarkGroup, LandmarkSet, SchemaError};

/// One of the four geometric checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Nose bridge close to vertical.
    NoseBridge,
    /// Left eyebrow not much wider than the right one.
    EyebrowSymmetry,
    /// Mouth closed.
    LipClosure,
    /// Chin level and centred under the eyes.
    ChinAlignment,
}

impl Check {
    /// Evaluation order of the bank.
    pub const ALL: [Check; 4] = [
        Check::NoseBridge,
        Check::EyebrowSymmetry,
        Check::LipClosure,
        Check::ChinAlignment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Check::NoseBridge => "nose_bridge",
            Check::EyebrowSymmetry => "eyebrow_symmetry",
            Check::LipClosure => "lip_closure",
            Check::ChinAlignment => "chin_alignment",
        }
    }

    /// Landmark groups the check reads.
    pub fn groups(self) -> &'static [LandmarkGroup] {
        match self {
            Check::NoseBridge => &[LandmarkGroup::NoseBridge],
            Check::EyebrowSymmetry => &[LandmarkGroup::LeftEyebrow, LandmarkGroup::RightEyebrow],
            Check::LipClosure => &[LandmarkGroup::TopLip, LandmarkGroup::BottomLip],
            Check::ChinAlignment => &[
                LandmarkGroup::Chin,
                LandmarkGroup::LeftEye,
                LandmarkGroup::RightEye,
            ],
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single measured quantity and the limit it was compared with (`value <= limit`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub name: &'static str,
    pub value: f64,
    pub limit: f64,
    pub passed: bool,
}

impl Measurement {
    fn at_most(name: &'static str, value: f64, limit: f64) -> Self {
        Self {
            name,
            value,
            limit,
            passed: value <= limit,
        }
    }
}

/// Outcome of one check with the numbers behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub check: Check,
    pub passed: bool,
    pub measurements: Vec<Measurement>,
}

/// The four checks bound to one calibration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VerifierBank {
    calibration: Calibration,
    thresholds: Thresholds,
}

impl VerifierBank {
    pub fn new(calibration: Calibration, thresholds: Thresholds) -> Self {
        Self {
            calibration,
            thresholds,
        }
    }

    /// First failing check in [`Check::ALL`] order, or `None` when all pass.
    ///
    /// Every group the bank reads is validated up front, so a malformed group is reported
    /// even when an earlier check would already have failed.
    pub fn first_failure(&self, landmarks: &LandmarkSet) -> Result<Option<Check>, SchemaError> {
        self.validate(landmarks)?;
        for check in Check::ALL {
            if !self.run(check, landmarks)?.passed {
                return Ok(Some(check));
            }
        }
        Ok(None)
    }

    /// Returns true when every check passes.
    pub fn passes(&self, landmarks: &LandmarkSet) -> Result<bool, SchemaError> {
        Ok(self.first_failure(landmarks)?.is_none())
    }

    /// Run every check without short-circuiting.
    pub fn inspect(&self, landmarks: &LandmarkSet) -> Result<Vec<CheckReport>, SchemaError> {
        self.validate(landmarks)?;
        Check::ALL
            .iter()
            .map(|&check| self.run(check, landmarks))
            .collect()
    }

    /// Run a single check.
    pub fn run(&self, check: Check, landmarks: &LandmarkSet) -> Result<CheckReport, SchemaError> {
        let measurements = match check {
            Check::NoseBridge => self.nose_bridge(landmarks)?,
            Check::EyebrowSymmetry => self.eyebrows(landmarks)?,
            Check::LipClosure => self.lips(landmarks)?,
            Check::ChinAlignment => self.chin(landmarks)?,
        };
        Ok(CheckReport {
            check,
            passed: measurements.iter().all(|m| m.passed),
            measurements,
        })
    }

    fn validate(&self, landmarks: &LandmarkSet) -> Result<(), SchemaError> {
        Check::ALL
            .iter()
            .try_for_each(|check| landmarks.validate_groups(check.groups()))
    }

    fn nose_bridge(&self, landmarks: &LandmarkSet) -> Result<Vec<Measurement>, SchemaError> {
        let bridge = landmarks.group(LandmarkGroup::NoseBridge)?;
        let drift = (bridge[3].x as i64 - bridge[0].x as i64).abs() as f64;
        Ok(vec![Measurement::at_most(
            "horizontal_drift_px",
            drift,
            self.calibration.mm(self.thresholds.nose_bridge_mm),
        )])
    }

    // One-sided: a right eyebrow wider than the left never fails.
    fn eyebrows(&self, landmarks: &LandmarkSet) -> Result<Vec<Measurement>, SchemaError> {
        let left = landmarks.group(LandmarkGroup::LeftEyebrow)?;
        let right = landmarks.group(LandmarkGroup::RightEyebrow)?;
        let left_span = left[4].x as i64 - left[0].x as i64;
        let right_span = right[4].x as i64 - right[0].x as i64;
        Ok(vec![Measurement::at_most(
            "span_excess_px",
            (left_span - right_span) as f64,
            self.calibration.mm(self.thresholds.eyebrow_span_mm),
        )])
    }

    fn lips(&self, landmarks: &LandmarkSet) -> Result<Vec<Measurement>, SchemaError> {
        let top = landmarks.group(LandmarkGroup::TopLip)?;
        let bottom = landmarks.group(LandmarkGroup::BottomLip)?;
        // Inner contour: top lip right-to-left, then bottom lip left-to-right.
        let opening: Vec<_> = top[7..].iter().chain(&bottom[7..]).copied().collect();
        Ok(vec![Measurement::at_most(
            "opening_area_px",
            polygon_area(&opening),
            self.calibration.mm(self.thresholds.lip_area_mm),
        )])
    }

    fn chin(&self, landmarks: &LandmarkSet) -> Result<Vec<Measurement>, SchemaError> {
        let chin = landmarks.group(LandmarkGroup::Chin)?;
        let left_eye = landmarks.group(LandmarkGroup::LeftEye)?;
        let right_eye = landmarks.group(LandmarkGroup::RightEye)?;

        let (jaw_left, jaw_right) = (chin[0], chin[16]);
        let (eye_left, eye_right) = (left_eye[0], right_eye[3]);

        let eyes_h = midpoint(eye_left.y, eye_right.y);
        let eyes_w = midpoint(eye_left.x, eye_right.x);
        let chin_h = midpoint(jaw_left.y, jaw_right.y);
        let chin_w = midpoint(jaw_left.x, jaw_right.x);

        let cal = &self.calibration;
        let t = &self.thresholds;
        Ok(vec![
            Measurement::at_most(
                "jaw_level_px",
                (jaw_left.y as i64 - jaw_right.y as i64).abs() as f64,
                cal.mm(t.chin_level_mm),
            ),
            Measurement::at_most(
                "eye_chin_vertical_px",
                (eyes_h - chin_h).abs(),
                cal.mm(t.eye_chin_vertical_mm),
            ),
            Measurement::at_most(
                "eye_chin_horizontal_px",
                (eyes_w - chin_w).abs(),
                cal.mm(t.eye_chin_horizontal_mm),
            ),
        ])
    }
}
