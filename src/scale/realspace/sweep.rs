//! Sampling sweep of the real-space calibrator.
//!
//! For every candidate sampling the point detector runs on the image, the
//! detected points are decomposed into stable polygons and each polygon is
//! compared with the reference template scaled to that sampling. The sampling
//! whose accepted polygons cover the largest fraction of the image wins; its
//! value is then refined from the ratio of template and detected areas.
use super::delaunay::{signed_area, triangulate};
use super::polygons::stable_polygons;
use super::rmsd::{polygon_rmsd, PolygonTemplate};
use super::PointDetector;
use crate::error::ScaleError;
use crate::image::ImageF32;
use log::debug;
use serde::{Deserialize, Serialize};

/// Serializable knobs of the real-space sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealSpaceParams {
    /// Stability threshold (radians) below which Delaunay edges are merged.
    pub alpha: f32,
    /// Maximum polygon RMSD in pixels.
    pub rmsd_max: f32,
    /// Sweep range and step, in physical units per pixel.
    pub min_sampling: f32,
    pub max_sampling: f32,
    pub step: f32,
}

impl Default for RealSpaceParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            rmsd_max: 1.0,
            min_sampling: 0.005,
            max_sampling: 0.05,
            step: 0.001,
        }
    }
}

/// Evaluation of a single candidate sampling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSample {
    pub sampling: f32,
    pub points: usize,
    pub polygons: usize,
    pub accepted: usize,
    /// Accepted polygon area divided by image area.
    pub score: f32,
    /// Mean accepted polygon area in square pixels (0 without acceptance).
    pub mean_area: f32,
}

/// Best sampling of a sweep.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepOutcome {
    /// Refined sampling, `best.sampling × sqrt(template_area / mean_area)`.
    pub sampling: f32,
    pub best: SweepSample,
    pub samples: Vec<SweepSample>,
}

#[derive(Clone, Debug)]
pub struct RealSpaceCalibrator {
    pub template: PolygonTemplate,
    pub alpha: f32,
    pub rmsd_max: f32,
    pub min_sampling: f32,
    pub max_sampling: f32,
    pub step: f32,
}

impl RealSpaceCalibrator {
    pub fn new(template: PolygonTemplate, params: &RealSpaceParams) -> Self {
        Self {
            template,
            alpha: params.alpha,
            rmsd_max: params.rmsd_max,
            min_sampling: params.min_sampling,
            max_sampling: params.max_sampling,
            step: params.step,
        }
    }

    /// Candidate samplings, `floor((max - min) / step) + 1` values from `min`.
    pub fn samplings(&self) -> Result<Vec<f32>, ScaleError> {
        let valid = self.step.is_finite()
            && self.step > 0.0
            && self.min_sampling.is_finite()
            && self.min_sampling > 0.0
            && self.max_sampling.is_finite()
            && self.max_sampling >= self.min_sampling;
        if !valid {
            return Err(ScaleError::geometry(format!(
                "invalid sampling sweep [{}, {}] step {}",
                self.min_sampling, self.max_sampling, self.step
            )));
        }
        // Slack so that e.g. 0.004 / 0.0005 counts 8 steps.
        let steps = ((self.max_sampling - self.min_sampling) / self.step + 1e-4).floor() as usize;
        Ok((0..=steps)
            .map(|i| self.min_sampling + i as f32 * self.step)
            .collect())
    }

    /// Run the sweep; `None` when no sampling accepted any polygon.
    pub fn sweep<D: PointDetector + ?Sized>(
        &self,
        image: &ImageF32,
        detector: &mut D,
    ) -> Result<Option<SweepOutcome>, ScaleError> {
        let samplings = self.samplings()?;
        let image_area = (image.w * image.h) as f32;
        if image_area <= 0.0 {
            return Err(ScaleError::geometry("empty image"));
        }

        let mut samples = Vec::with_capacity(samplings.len());
        let mut best: Option<SweepSample> = None;
        for sampling in samplings {
            let sample = self.evaluate(image, detector, sampling, image_area);
            debug!(
                "sweep s={sampling:.5}: {} points, {}/{} polygons accepted, score={:.4}",
                sample.points, sample.accepted, sample.polygons, sample.score
            );
            if sample.accepted > 0 && best.map_or(true, |b| sample.score > b.score) {
                best = Some(sample);
            }
            samples.push(sample);
        }

        Ok(best.map(|best| {
            let template_area = self.template.area() / (best.sampling * best.sampling);
            let sampling = best.sampling * (template_area / best.mean_area).sqrt();
            debug!(
                "sweep best s={:.5} refined to {sampling:.5} (score {:.4})",
                best.sampling, best.score
            );
            SweepOutcome {
                sampling,
                best,
                samples,
            }
        }))
    }

    /// Like [`sweep`](Self::sweep) but failing with `CalibrationNotFound`.
    pub fn calibrate<D: PointDetector + ?Sized>(
        &self,
        image: &ImageF32,
        detector: &mut D,
    ) -> Result<SweepOutcome, ScaleError> {
        self.sweep(image, detector)?
            .ok_or(ScaleError::CalibrationNotFound {
                min_sampling: self.min_sampling,
                max_sampling: self.max_sampling,
            })
    }

    fn evaluate<D: PointDetector + ?Sized>(
        &self,
        image: &ImageF32,
        detector: &mut D,
        sampling: f32,
        image_area: f32,
    ) -> SweepSample {
        let points = detector.detect(image, sampling);
        let mut sample = SweepSample {
            sampling,
            points: points.len(),
            polygons: 0,
            accepted: 0,
            score: 0.0,
            mean_area: 0.0,
        };
        if points.len() < 3 {
            return sample;
        }
        let template = self.template.scaled(sampling);
        let triangles = triangulate(&points);
        let polygons = stable_polygons(&points, &triangles, self.alpha);
        sample.polygons = polygons.len();

        let mut area = 0.0f32;
        for polygon in &polygons {
            let vertices: Vec<[f32; 2]> = polygon.iter().map(|&i| points[i]).collect();
            match polygon_rmsd(&vertices, &template) {
                Some(d) if d < self.rmsd_max => {
                    area += signed_area(&vertices).abs();
                    sample.accepted += 1;
                }
                _ => {}
            }
        }
        if sample.accepted > 0 {
            sample.score = area / image_area;
            sample.mean_area = area / sample.accepted as f32;
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrator(min: f32, max: f32, step: f32) -> RealSpaceCalibrator {
        let template = PolygonTemplate::new(
            crate::scale::CrystalSystem::Hexagonal
                .reference_polygon(crate::scale::GRAPHENE_LATTICE_CONSTANT_NM),
        )
        .expect("hexagon");
        RealSpaceCalibrator::new(
            template,
            &RealSpaceParams {
                min_sampling: min,
                max_sampling: max,
                step,
                ..RealSpaceParams::default()
            },
        )
    }

    #[test]
    fn sampling_count_is_inclusive() {
        let c = calibrator(0.008, 0.012, 0.0005);
        let s = c.samplings().expect("valid range");
        assert_eq!(s.len(), 9);
        assert!((s[8] - 0.012).abs() < 1e-6);
        assert!(calibrator(0.01, 0.005, 0.001).samplings().is_err());
        assert!(calibrator(0.01, 0.02, 0.0).samplings().is_err());
    }

    #[test]
    fn no_points_means_not_found() {
        let c = calibrator(0.01, 0.02, 0.005);
        let image = ImageF32::new(32, 32);
        let mut detector = |_: &ImageF32, _: f32| -> Vec<[f32; 2]> { Vec::new() };
        assert_eq!(c.sweep(&image, &mut detector), Ok(None));
        assert!(matches!(
            c.calibrate(&image, &mut detector),
            Err(ScaleError::CalibrationNotFound { .. })
        ));
    }
}
