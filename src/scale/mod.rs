//! Conversion of detected lattice periodicity into a physical pixel size.
//!
//! - [`fourier`]: spot radius → length per pixel.
//! - [`realspace`]: sampling sweep over a point-detection model.
//! - [`strategy`]: the three calibration methods behind [`ScaleStrategy`].

pub mod crystal;
pub mod fourier;
pub mod realspace;
pub mod strategy;

pub use crystal::{CrystalSystem, GRAPHENE_LATTICE_CONSTANT_NM};
pub use fourier::{scale_from_power_spectrum, RingRegime};
pub use realspace::{PointDetector, RealSpaceCalibrator, RealSpaceParams, SweepOutcome};
pub use strategy::{
    RealSpaceStrategy, ScaleEstimate, ScaleMethod, ScaleStrategy, SpotPeakStrategy,
    TemplateStrategy,
};
