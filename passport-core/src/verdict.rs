//! Outcome of verifying one photo.

use std::fmt;

use image::DynamicImage;
use serde::Serialize;

use crate::cropper::CropRegion;
use crate::verifier::Check;

/// Why a photo was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// No face on the source photo.
    NoFace,
    /// More than one face on the source photo.
    MultipleFaces { count: usize },
    /// Reaching the canonical head size would need more than the allowed upscale.
    ExcessiveUpscale { scale: f64 },
    /// The canonical crop reaches past the scaled photo and padding is disabled.
    CropOutOfBounds { region: CropRegion },
    /// No face found again on the canonical crop.
    PostCropNoFace,
    /// More than one face found on the canonical crop.
    PostCropMultipleFaces { count: usize },
    /// A geometric check failed.
    FailedCheck { check: Check },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoFace => write!(f, "no face detected"),
            Rejection::MultipleFaces { count } => write!(f, "{count} faces detected"),
            Rejection::ExcessiveUpscale { scale } => {
                write!(f, "face too small: would need a {scale:.2}x upscale")
            }
            Rejection::CropOutOfBounds { region } => write!(
                f,
                "canonical crop {}x{} at ({}, {}) extends past the photo",
                region.width, region.height, region.x, region.y
            ),
            Rejection::PostCropNoFace => write!(f, "no face detected after cropping"),
            Rejection::PostCropMultipleFaces { count } => {
                write!(f, "{count} faces detected after cropping")
            }
            Rejection::FailedCheck { check } => write!(f, "failed {check} check"),
        }
    }
}

impl From<Check> for Rejection {
    fn from(check: Check) -> Self {
        Rejection::FailedCheck { check }
    }
}

/// Verdict for one photo: the canonical crop, or the reason it was rejected.
#[derive(Debug, Clone)]
pub enum Verification {
    Accepted(DynamicImage),
    Rejected(Rejection),
}

impl Verification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verification::Accepted(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Verification::Accepted(_) => None,
            Verification::Rejected(reason) => Some(*reason),
        }
    }

    /// The canonical image, if accepted.
    pub fn into_image(self) -> Option<DynamicImage> {
        match self {
            Verification::Accepted(image) => Some(image),
            Verification::Rejected(_) => None,
        }
    }
}

impl From<Rejection> for Verification {
    fn from(reason: Rejection) -> Self {
        Verification::Rejected(reason)
    }
}
