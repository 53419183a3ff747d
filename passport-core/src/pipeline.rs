//! End-to-end verification of one photo.
//!
//! Stages run in a fixed order and stop at the first rejection:
//! locate faces, plan the canonical crop, check the upscale bound and the crop bounds,
//! render the crop, re-extract landmarks on it, then run the verifier bank.

use image::{DynamicImage, GenericImageView, Rgba};
use log::debug;
use passport_utils::{AppSettings, timing_guard};
use rayon::prelude::*;

use crate::analyzer::FaceAnalyzer;
use crate::calibration::{Calibration, Thresholds};
use crate::cropper::{BoundsPolicy, CropPlan, plan_crop, render_canonical};
use crate::error::PipelineError;
use crate::geometry::BoundingBox;
use crate::landmarks::LandmarkSet;
use crate::verdict::{Rejection, Verification};
use crate::verifier::VerifierBank;

/// Accept `faces` only when it holds exactly one box.
pub fn single_face(mut faces: Vec<BoundingBox>) -> Result<BoundingBox, Rejection> {
    match faces.len() {
        0 => Err(Rejection::NoFace),
        1 => Ok(faces.remove(0)),
        count => Err(Rejection::MultipleFaces { count }),
    }
}

/// Accept `sets` only when the crop yielded exactly one landmark set.
pub fn single_landmark_set(mut sets: Vec<LandmarkSet>) -> Result<LandmarkSet, Rejection> {
    match sets.len() {
        0 => Err(Rejection::PostCropNoFace),
        1 => Ok(sets.remove(0)),
        count => Err(Rejection::PostCropMultipleFaces { count }),
    }
}

/// Upscale and bounds gates applied to a crop plan before any pixels are resampled.
///
/// Yields the fill colour for [`render_canonical`].
pub fn admit_plan(
    plan: &CropPlan,
    calibration: &Calibration,
    bounds: BoundsPolicy,
) -> Result<Rgba<u8>, Rejection> {
    if plan.scale > calibration.max_upscale() {
        return Err(Rejection::ExcessiveUpscale { scale: plan.scale });
    }
    match bounds {
        BoundsPolicy::Reject if plan.requires_padding() => Err(Rejection::CropOutOfBounds {
            region: plan.region,
        }),
        BoundsPolicy::Reject => Ok(Rgba([0, 0, 0, 255])),
        BoundsPolicy::Pad { fill } => Ok(fill),
    }
}

/// Passport photo verifier bound to a detection backend and a calibration.
pub struct PassportVerifier<A> {
    analyzer: A,
    calibration: Calibration,
    bank: VerifierBank,
    bounds: BoundsPolicy,
}

impl<A: FaceAnalyzer> PassportVerifier<A> {
    /// Verifier that rejects crops reaching past the photo.
    pub fn new(analyzer: A, calibration: Calibration, thresholds: Thresholds) -> Self {
        Self {
            analyzer,
            calibration,
            bank: VerifierBank::new(calibration, thresholds),
            bounds: BoundsPolicy::default(),
        }
    }

    /// Build a verifier from persisted settings.
    pub fn from_settings(analyzer: A, settings: &AppSettings) -> Self {
        Self::new(
            analyzer,
            Calibration::from(&settings.calibration),
            Thresholds::from(&settings.thresholds),
        )
        .with_bounds_policy(BoundsPolicy::from(&settings.crop))
    }

    pub fn with_bounds_policy(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn bank(&self) -> &VerifierBank {
        &self.bank
    }

    pub fn bounds_policy(&self) -> BoundsPolicy {
        self.bounds
    }

    /// Verify one photo.
    ///
    /// Returns `Ok(Verification::Rejected(_))` for photos that fail a requirement and
    /// `Err(_)` only when the analyzer failed or produced unusable output.
    pub fn verify(&self, image: &DynamicImage) -> Result<Verification, PipelineError> {
        let _guard = timing_guard("passport_core::verify", log::Level::Debug);

        let faces = {
            let _guard = timing_guard("passport_core::locate_faces", log::Level::Debug);
            self.analyzer
                .locate_faces(image)
                .map_err(PipelineError::Analyzer)?
        };
        let face = match single_face(faces) {
            Ok(face) => face,
            Err(reason) => return Ok(rejected(reason)),
        };

        let (width, height) = image.dimensions();
        let plan = plan_crop(width, height, face, &self.calibration)?;
        let fill = match admit_plan(&plan, &self.calibration, self.bounds) {
            Ok(fill) => fill,
            Err(reason) => return Ok(rejected(reason)),
        };

        let canonical = {
            let _guard = timing_guard("passport_core::render_canonical", log::Level::Debug);
            render_canonical(image, &plan, fill)
        };

        let sets = {
            let _guard = timing_guard("passport_core::extract_landmarks", log::Level::Debug);
            self.analyzer
                .extract_landmarks(&canonical)
                .map_err(PipelineError::Analyzer)?
        };
        let landmarks = match single_landmark_set(sets) {
            Ok(landmarks) => landmarks,
            Err(reason) => return Ok(rejected(reason)),
        };

        let failure = {
            let _guard = timing_guard("passport_core::verifier_bank", log::Level::Trace);
            self.bank.first_failure(&landmarks)?
        };
        Ok(match failure {
            Some(check) => rejected(check.into()),
            None => Verification::Accepted(canonical),
        })
    }

    /// [`verify`](Self::verify) collapsed to the canonical image or nothing.
    pub fn verify_optional(
        &self,
        image: &DynamicImage,
    ) -> Result<Option<DynamicImage>, PipelineError> {
        Ok(self.verify(image)?.into_image())
    }

    /// Verify independent photos in parallel. Results keep the input order.
    pub fn verify_batch(
        &self,
        images: &[DynamicImage],
    ) -> Vec<Result<Verification, PipelineError>> {
        let _guard = timing_guard(
            format!("passport_core::verify_batch[{}]", images.len()),
            log::Level::Info,
        );
        images.par_iter().map(|image| self.verify(image)).collect()
    }
}

fn rejected(reason: Rejection) -> Verification {
    debug!("photo rejected: {reason}");
    Verification::Rejected(reason)
}
