#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod scale;

// Engines – public, but their signatures may still move.
pub mod angle;
pub mod nms;
pub mod polar;
pub mod spectrum;
pub mod symmetry;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector + results.
pub use crate::detector::{ScaleDetector, ScaleParams};
pub use crate::diagnostics::ScaleReport;
pub use crate::error::ScaleError;

// Engine entry points that are useful on their own.
pub use crate::nms::{suppress, suppress_density, Peak, SuppressionParams};
pub use crate::polar::{build_bin_map, unroll, BinMap, BinMapCache, PolarGeometry};
pub use crate::scale::{scale_from_power_spectrum, CrystalSystem, RingRegime, ScaleMethod};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use lattice_scale::prelude::*;
///
/// # fn main() -> Result<(), ScaleError> {
/// let image = ImageF32::new(256, 256);
/// let mut detector = ScaleDetector::new(ScaleParams::default())?;
/// let report = detector.detect_scale(&image)?;
/// println!("scale={:.5} nm/px", report.scale);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ClassField, ImageF32};
    pub use crate::{ScaleDetector, ScaleError, ScaleParams, ScaleReport};
}
