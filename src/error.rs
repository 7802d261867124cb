//! Failure taxonomy shared by every stage of the scale pipeline.
//!
//! All failures are local and synchronous. Nothing in the crate retries: the
//! computations are deterministic, so repeating a call with identical inputs
//! cannot change the outcome.

/// Reasons why peak detection or scale calibration may fail.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleError {
    /// Shape or radius configuration that cannot be processed
    /// (non-square spectrum, `inner >= outer`, mismatched fields, ...).
    InvalidGeometry { reason: String },
    /// Crystal-system or symmetry selector that is not supported.
    UnsupportedSymmetry { selector: String },
    /// No finite candidate survived suppression or matching.
    NoPeakFound { stage: &'static str },
    /// The real-space sweep found no sampling with an acceptable polygon.
    CalibrationNotFound { min_sampling: f32, max_sampling: f32 },
}

impl ScaleError {
    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        ScaleError::InvalidGeometry {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::InvalidGeometry { reason } => write!(f, "invalid geometry: {reason}"),
            ScaleError::UnsupportedSymmetry { selector } => {
                write!(f, "structure {selector:?} not recognized for scale recognition")
            }
            ScaleError::NoPeakFound { stage } => write!(f, "no peak found ({stage})"),
            ScaleError::CalibrationNotFound {
                min_sampling,
                max_sampling,
            } => write!(
                f,
                "no sampling in [{min_sampling}, {max_sampling}] matched the reference polygon"
            ),
        }
    }
}

impl std::error::Error for ScaleError {}
