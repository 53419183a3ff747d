//! Passport photo verification.
//!
//! Given a photo and a face detection backend, the pipeline keeps only photos with a
//! single face, rescales and crops them to the canonical passport frame, re-detects the
//! face on the crop and runs a bank of geometric checks on its landmarks.

/// Face detection capability injected into the pipeline.
pub mod analyzer;
/// Canonical frame calibration and verifier limits.
pub mod calibration;
/// Scale and crop planning and rendering.
pub mod cropper;
/// Pipeline faults.
pub mod error;
/// Points, face boxes and polygon helpers.
pub mod geometry;
/// Landmark groups and schema validation.
pub mod landmarks;
/// The verification pipeline.
pub mod pipeline;
/// Verdict types.
pub mod verdict;
/// Geometric checks on landmarks.
pub mod verifier;

pub use analyzer::{FaceAnalyzer, FaceAnalyzerMut, ReplayAnalyzer, Serialized};
pub use calibration::{Calibration, Thresholds};
pub use cropper::{BoundsPolicy, CropPlan, CropRegion, plan_crop, render_canonical};
pub use error::PipelineError;
pub use geometry::{BoundingBox, Point, polygon_area};
pub use landmarks::{LandmarkGroup, LandmarkSet, SchemaError};
pub use pipeline::{PassportVerifier, admit_plan, single_face, single_landmark_set};
pub use verdict::{Rejection, Verification};
pub use verifier::{Check, CheckReport, Measurement, VerifierBank};

/// Returns the crate version for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
