//! Serializable CLI reports.

use std::path::Path;

use log::{debug, warn};
use passport_core::{
    BoundsPolicy, Calibration, CheckReport, CropPlan, Rejection, VerifierBank, admit_plan,
    single_landmark_set,
};
use serde::Serialize;

use crate::input::load_landmark_file;

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    Accepted,
    Rejected { rejection: Rejection },
    Error { message: String },
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(flatten)]
    pub status: Status,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<CheckReport>,
}

impl FileReport {
    fn error(file: String, message: String) -> Self {
        warn!("Failed to check {file}: {message}");
        Self {
            file,
            status: Status::Error { message },
            checks: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, Status::Error { .. })
    }
}

/// Gate and check the landmarks stored in one file.
pub fn check_file(path: &Path, bank: &VerifierBank) -> FileReport {
    let file = path.display().to_string();

    let sets = match load_landmark_file(path) {
        Ok(sets) => sets,
        Err(err) => return FileReport::error(file, format!("{err:#}")),
    };
    let landmarks = match single_landmark_set(sets) {
        Ok(landmarks) => landmarks,
        Err(rejection) => {
            debug!("{file}: {rejection}");
            return FileReport {
                file,
                status: Status::Rejected { rejection },
                checks: Vec::new(),
            };
        }
    };

    let checks = match bank.inspect(&landmarks) {
        Ok(checks) => checks,
        Err(err) => return FileReport::error(file, err.to_string()),
    };
    // Reports come back in evaluation order, so the first failure is the verdict.
    let status = match checks.iter().find(|report| !report.passed) {
        Some(report) => Status::Rejected {
            rejection: report.check.into(),
        },
        None => Status::Accepted,
    };
    debug!("{file}: {status:?}");
    FileReport {
        file,
        status,
        checks,
    }
}

#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub plan: CropPlan,
    pub requires_padding: bool,
    #[serde(flatten)]
    pub status: Status,
}

impl PlanReport {
    pub fn new(plan: CropPlan, calibration: &Calibration, bounds: BoundsPolicy) -> Self {
        let status = match admit_plan(&plan, calibration, bounds) {
            Ok(_) => Status::Accepted,
            Err(rejection) => Status::Rejected { rejection },
        };
        Self {
            plan,
            requires_padding: plan.requires_padding(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passport_core::{BoundingBox, Check, Thresholds, plan_crop};
    use passport_utils::{BoundsPolicySetting, CropBoundsSettings, fixture_path};

    fn bank() -> VerifierBank {
        VerifierBank::new(Calibration::default(), Thresholds::default())
    }

    #[test]
    fn frontal_fixture_is_accepted_with_all_checks() {
        let path = fixture_path("landmarks/frontal_neutral.json").expect("fixture");
        let report = check_file(&path, &bank());
        assert_eq!(report.status, Status::Accepted);
        assert_eq!(report.checks.len(), 4);
    }

    #[test]
    fn open_mouth_reports_lip_failure() {
        let path = fixture_path("landmarks/open_mouth.json").expect("fixture");
        let report = check_file(&path, &bank());
        assert_eq!(
            report.status,
            Status::Rejected {
                rejection: Rejection::FailedCheck {
                    check: Check::LipClosure
                }
            }
        );
        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["rejection"]["reason"], "failed_check");
        assert_eq!(json["checks"][2]["check"], "lip_closure");
    }

    #[test]
    fn two_faces_are_rejected_without_checks() {
        let path = fixture_path("landmarks/two_faces.json").expect("fixture");
        let report = check_file(&path, &bank());
        assert_eq!(
            report.status,
            Status::Rejected {
                rejection: Rejection::PostCropMultipleFaces { count: 2 }
            }
        );
        assert!(report.checks.is_empty());
    }

    #[test]
    fn malformed_landmarks_are_errors() {
        let path = fixture_path("landmarks/malformed_nose_bridge.json").expect("fixture");
        let report = check_file(&path, &bank());
        assert!(report.is_error());
        let Status::Error { message } = &report.status else {
            panic!("expected error status");
        };
        assert!(message.contains("nose_bridge"));
    }

    #[test]
    fn plan_report_flags_padding() {
        let cal = Calibration::default();
        let plan = plan_crop(600, 800, BoundingBox::new(100, 300, 400, 100), &cal).expect("plan");
        let strict = PlanReport::new(plan, &cal, BoundsPolicy::Reject);
        assert!(strict.requires_padding);
        assert!(matches!(
            strict.status,
            Status::Rejected {
                rejection: Rejection::CropOutOfBounds { .. }
            }
        ));

        let pad = BoundsPolicy::from(&CropBoundsSettings {
            policy: BoundsPolicySetting::Pad,
            fill_color: [255, 255, 255],
        });
        let padded = PlanReport::new(plan, &cal, pad);
        assert_eq!(padded.status, Status::Accepted);
    }
}
