use thiserror::Error;

/// Errors raised while turning image pairs into a session speed estimate.
#[derive(Debug, Error)]
pub enum VelocityError {
    /// One of the two frames produced no usable feature points.
    #[error("no features detected in frame {0}")]
    NoFeatures(usize),
    /// The matcher found no mutual nearest neighbours for the pair.
    #[error("no correspondences between the two frames")]
    NoCorrespondences,
    /// A correspondence references a feature that does not exist.
    #[error("correspondence index {index} out of range for {len} features")]
    IndexOutOfRange { index: usize, len: usize },
    /// Capture timestamps imply a zero, negative or non-finite duration.
    #[error("invalid elapsed time between captures: {0} s")]
    InvalidElapsedTime(f64),
    /// Pixel displacement was negative or not a number.
    #[error("invalid pixel displacement: {0}")]
    InvalidDisplacement(f64),
    /// `finalize` was reached without a single speed sample.
    #[error("session finished without any speed sample")]
    EmptySession,
    /// The capture source has no more frames to deliver.
    #[error("capture source exhausted after {0} frames")]
    CaptureExhausted(usize),
    #[error("metadata error for {path}: {reason}")]
    Metadata { path: String, reason: String },
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Glob(#[from] glob::PatternError),
}

impl VelocityError {
    /// Per-pair failures that skip one sample without ending the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VelocityError::NoFeatures(_)
                | VelocityError::NoCorrespondences
                | VelocityError::InvalidElapsedTime(_)
                | VelocityError::InvalidDisplacement(_)
                | VelocityError::Metadata { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, VelocityError>;
