//! Interchangeable calibration strategies sharing one output contract.
use super::crystal::CrystalSystem;
use super::fourier::{scale_from_power_spectrum, RingRegime};
use super::realspace::{PointDetector, PolygonTemplate, RealSpaceCalibrator, RealSpaceParams};
use crate::error::ScaleError;
use crate::image::ImageF32;
use crate::symmetry::{SpotCandidate, SymmetryMatcher};
use log::debug;
use serde::{Deserialize, Serialize};

/// Calibration method, also the `method` selector of [`crate::ScaleParams`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMethod {
    /// Folded spectrum + suppression + ring consistency check.
    #[default]
    SpotPeaks,
    /// Angular template cross-correlation.
    Template,
    /// Sampling sweep with neighbour-polygon matching.
    RealSpace,
}

/// Physical length per pixel with the evidence it was derived from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleEstimate {
    /// Length per pixel, in the unit of the lattice constant.
    pub scale: f32,
    pub method: ScaleMethod,
    /// Spot used by the Fourier methods.
    pub spot: Option<SpotCandidate>,
    pub regime: Option<RingRegime>,
    /// Whether a consistent first/second ring pair was found.
    pub consistent: bool,
    /// Area fraction covered by accepted polygons (real-space method).
    pub coverage: Option<f32>,
}

pub trait ScaleStrategy {
    fn method(&self) -> ScaleMethod;
    fn estimate(&mut self, image: &ImageF32) -> Result<ScaleEstimate, ScaleError>;
}

/// Fourier path through the folded-spectrum spot search.
#[derive(Debug)]
pub struct SpotPeakStrategy {
    pub matcher: SymmetryMatcher,
    pub lattice_constant: f32,
    pub regime: RingRegime,
}

impl ScaleStrategy for SpotPeakStrategy {
    fn method(&self) -> ScaleMethod {
        ScaleMethod::SpotPeaks
    }

    fn estimate(&mut self, image: &ImageF32) -> Result<ScaleEstimate, ScaleError> {
        let spectrum = self.matcher.power_spectrum(image)?;
        let spots = self.matcher.find_spots(&spectrum)?;
        let chosen = self.matcher.resolve_hexagonal(&spots, self.regime)?;
        let scale = scale_from_power_spectrum(
            chosen.spot.radius,
            self.lattice_constant,
            image.min_dim(),
            chosen.regime,
        )?;
        debug!(
            "spot peaks: r={:.2} regime={:?} consistent={} -> {scale:.5}",
            chosen.spot.radius, chosen.regime, chosen.consistent
        );
        Ok(ScaleEstimate {
            scale,
            method: ScaleMethod::SpotPeaks,
            spot: Some(chosen.spot),
            regime: Some(chosen.regime),
            consistent: chosen.consistent,
            coverage: None,
        })
    }
}

/// Fourier path through the angular template match.
#[derive(Debug)]
pub struct TemplateStrategy {
    pub matcher: SymmetryMatcher,
    pub lattice_constant: f32,
    pub regime: RingRegime,
}

impl ScaleStrategy for TemplateStrategy {
    fn method(&self) -> ScaleMethod {
        ScaleMethod::Template
    }

    fn estimate(&mut self, image: &ImageF32) -> Result<ScaleEstimate, ScaleError> {
        let spectrum = self.matcher.power_spectrum(image)?;
        let spot = self.matcher.match_template(&spectrum)?;
        let scale = scale_from_power_spectrum(
            spot.radius,
            self.lattice_constant,
            image.min_dim(),
            self.regime,
        )?;
        debug!("template: r={:.2} -> {scale:.5}", spot.radius);
        Ok(ScaleEstimate {
            scale,
            method: ScaleMethod::Template,
            spot: Some(spot),
            regime: Some(self.regime),
            consistent: false,
            coverage: None,
        })
    }
}

/// Real-space path around a caller-supplied point detector.
pub struct RealSpaceStrategy<D> {
    pub calibrator: RealSpaceCalibrator,
    pub detector: D,
}

impl<D: PointDetector> RealSpaceStrategy<D> {
    pub fn new(
        crystal: CrystalSystem,
        lattice_constant: f32,
        params: &RealSpaceParams,
        detector: D,
    ) -> Result<Self, ScaleError> {
        let template = PolygonTemplate::new(crystal.reference_polygon(lattice_constant))?;
        Ok(Self {
            calibrator: RealSpaceCalibrator::new(template, params),
            detector,
        })
    }
}

impl<D: PointDetector> ScaleStrategy for RealSpaceStrategy<D> {
    fn method(&self) -> ScaleMethod {
        ScaleMethod::RealSpace
    }

    fn estimate(&mut self, image: &ImageF32) -> Result<ScaleEstimate, ScaleError> {
        let outcome = self.calibrator.calibrate(image, &mut self.detector)?;
        Ok(ScaleEstimate {
            scale: outcome.sampling,
            method: ScaleMethod::RealSpace,
            spot: None,
            regime: None,
            consistent: false,
            coverage: Some(outcome.best.score),
        })
    }
}
