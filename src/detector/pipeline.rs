//! Detector pipeline driving scale detection end-to-end.
//!
//! The [`ScaleDetector`] exposes a simple API: feed a grayscale image and get
//! its physical pixel size together with the evidence it was derived from.
//!
//! Typical usage:
//! ```no_run
//! use lattice_scale::{ScaleDetector, ScaleParams};
//! use lattice_scale::image::ImageF32;
//!
//! # fn example(image: ImageF32) -> Result<(), lattice_scale::ScaleError> {
//! let mut detector = ScaleDetector::new(ScaleParams::default())?;
//! let report = detector.detect_scale(&image)?;
//! println!("{:.4} nm/px", report.scale);
//! # Ok(())
//! # }
//! ```
use super::params::ScaleParams;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{InputDescriptor, ScaleReport, TimingBreakdown};
use crate::error::ScaleError;
use crate::image::ImageF32;
use crate::polar::BinMapCache;
use crate::scale::{
    CrystalSystem, PointDetector, RealSpaceStrategy, ScaleMethod, ScaleStrategy, SpotPeakStrategy,
    TemplateStrategy,
};
use crate::symmetry::SymmetryMatcher;
use log::debug;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug)]
pub struct ScaleDetector {
    params: ScaleParams,
    crystal: CrystalSystem,
    cache: Arc<BinMapCache>,
}

impl ScaleDetector {
    /// Fails with `UnsupportedSymmetry` for an unknown crystal system and with
    /// `InvalidGeometry` for a non-positive lattice constant.
    pub fn new(params: ScaleParams) -> Result<Self, ScaleError> {
        let crystal: CrystalSystem = params.crystal_system.parse()?;
        if !(params.lattice_constant.is_finite() && params.lattice_constant > 0.0) {
            return Err(ScaleError::geometry(format!(
                "lattice constant must be positive, got {}",
                params.lattice_constant
            )));
        }
        Ok(Self {
            params,
            crystal,
            // Spot map and template map of the current image size.
            cache: Arc::new(BinMapCache::new(2)),
        })
    }

    pub fn params(&self) -> &ScaleParams {
        &self.params
    }

    pub fn crystal_system(&self) -> CrystalSystem {
        self.crystal
    }

    /// Symmetry matcher configured for the crystal system, sharing the
    /// detector's bin-map cache across calls.
    pub fn matcher(&self) -> SymmetryMatcher {
        let symmetry = self
            .params
            .symmetry
            .clone()
            .with_symmetry_order(self.crystal.symmetry_order());
        SymmetryMatcher::new(symmetry, self.params.backend.build()).with_cache(self.cache.clone())
    }

    /// Fourier strategy selected by `params.method`.
    pub fn fourier_strategy(&self) -> Result<Box<dyn ScaleStrategy>, ScaleError> {
        let lattice_constant = self.params.lattice_constant;
        let regime = self.params.regime;
        match self.params.method {
            ScaleMethod::SpotPeaks => Ok(Box::new(SpotPeakStrategy {
                matcher: self.matcher(),
                lattice_constant,
                regime,
            })),
            ScaleMethod::Template => Ok(Box::new(TemplateStrategy {
                matcher: self.matcher(),
                lattice_constant,
                regime,
            })),
            ScaleMethod::RealSpace => Err(ScaleError::geometry(
                "the real-space method needs a point detector (detect_scale_real_space)",
            )),
        }
    }

    /// Run the configured Fourier method on `image`.
    pub fn detect_scale(&mut self, image: &ImageF32) -> Result<ScaleReport, ScaleError> {
        let mut strategy = self.fourier_strategy()?;
        self.detect_with(strategy.as_mut(), image)
    }

    /// Run the real-space sweep with a caller-supplied point detector.
    pub fn detect_scale_real_space<D: PointDetector>(
        &mut self,
        image: &ImageF32,
        detector: D,
    ) -> Result<ScaleReport, ScaleError> {
        let mut strategy = RealSpaceStrategy::new(
            self.crystal,
            self.params.lattice_constant,
            &self.params.real_space,
            detector,
        )?;
        self.detect_with(&mut strategy, image)
    }

    /// Run any strategy and wrap its estimate into a report.
    pub fn detect_with(
        &self,
        strategy: &mut dyn ScaleStrategy,
        image: &ImageF32,
    ) -> Result<ScaleReport, ScaleError> {
        let start = Instant::now();
        let mut timings = TimingBreakdown::default();
        let label = format!("{:?}", strategy.method());
        let estimate = timings.measure(&label, || strategy.estimate(image))?;
        timings.total_ms = elapsed_ms(start);
        debug!(
            "detect_scale: {:?} on {}x{} -> {:.5} ({:.2} ms)",
            estimate.method, image.w, image.h, estimate.scale, timings.total_ms
        );
        Ok(ScaleReport::new(
            estimate,
            self.crystal,
            self.params.lattice_constant,
            InputDescriptor {
                width: image.w,
                height: image.h,
            },
            timings,
        ))
    }
}
