use thiserror::Error;

use crate::geometry::BoundingBox;
use crate::landmarks::SchemaError;

/// Faults that abort verification of an image.
///
/// These are distinct from [`Rejection`](crate::Rejection): a rejection is a normal
/// outcome for a photo that does not meet the requirements, while a fault means the
/// pipeline could not reach a verdict at all.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("face detector returned a degenerate box {0:?}")]
    DegenerateFaceBox(BoundingBox),

    #[error("face analyzer failed: {0:#}")]
    Analyzer(anyhow::Error),
}

impl PipelineError {
    /// Returns true when the landmark output did not match the fixed group schema.
    pub fn is_schema(&self) -> bool {
        matches!(self, PipelineError::Schema(_))
    }
}
