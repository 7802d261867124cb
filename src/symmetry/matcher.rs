//! Spot search in the polar-unrolled power spectrum.
//!
//! Pipeline (NMS path)
//! - Unroll the spectrum over `[inner_radius, size / 2)` with
//!   `symmetry_order × bins_per_spot` angular bins.
//! - Fold the symmetry repeats onto one sector and divide by a smoothed
//!   angular baseline to flatten the broadband radial decay.
//! - Run suppression with a rectangular margin, periodic in angle, and refine
//!   each accepted bin with three-point parabolas.
//!
//! The template path instead correlates the unrolled spectrum with Gaussian
//! bumps at the symmetry angles over a wrap-padded copy of the field.
use super::consistency::{resolve_hexagonal, LatticeSpot};
use super::fold::{fold_symmetry, normalize_by_baseline};
use super::params::SymmetryParams;
use super::subpixel::quad_peak_offset;
use super::template::{make_circular_template, match_template_ncc, wrap_pad_rows};
use crate::angle::{wrap_index, wrap_period};
use crate::error::ScaleError;
use crate::image::ImageF32;
use crate::nms::{suppress, Neighborhood, PeriodicAxes, SuppressionParams};
use crate::polar::{unroll, BinMap, BinMapCache, PolarGeometry};
use crate::scale::RingRegime;
use crate::spectrum::{power_spectrum, SpectrumBackend};
use log::debug;
use serde::Serialize;
use std::f32::consts::TAU;
use std::sync::Arc;

/// A candidate diffraction spot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotCandidate {
    /// Distance from the spectrum centre in pixels (sub-bin refined).
    pub radius: f32,
    /// Angle in radians within one symmetry sector `[0, 2π / order)`.
    pub angle: f32,
    /// Baseline-normalised score (NMS path) or correlation (template path).
    pub intensity: f32,
    pub angular_bin: usize,
    pub radial_bin: usize,
}

pub struct SymmetryMatcher {
    params: SymmetryParams,
    backend: Box<dyn SpectrumBackend>,
    cache: Arc<BinMapCache>,
}

impl std::fmt::Debug for SymmetryMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetryMatcher")
            .field("params", &self.params)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl SymmetryMatcher {
    /// Matcher with its own two-entry bin-map cache (spot map + template map).
    pub fn new(params: SymmetryParams, backend: Box<dyn SpectrumBackend>) -> Self {
        Self {
            params,
            backend,
            cache: Arc::new(BinMapCache::new(2)),
        }
    }

    /// Share a bin-map cache with other matchers.
    pub fn with_cache(mut self, cache: Arc<BinMapCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn params(&self) -> &SymmetryParams {
        &self.params
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Centred power spectrum of `image` through the injected backend.
    pub fn power_spectrum(&self, image: &ImageF32) -> Result<ImageF32, ScaleError> {
        power_spectrum(image, self.backend.as_ref())
    }

    /// Angular period of one symmetry sector.
    pub fn sector(&self) -> f32 {
        TAU / self.params.symmetry_order.max(1) as f32
    }

    /// Ranked spot candidates (highest intensity first), at most `max_spots`.
    pub fn find_spots(&self, spectrum: &ImageF32) -> Result<Vec<SpotCandidate>, ScaleError> {
        let p = &self.params;
        if p.symmetry_order == 0 || p.bins_per_spot == 0 {
            return Err(ScaleError::geometry(format!(
                "symmetry order {} and bins per spot {} must be positive",
                p.symmetry_order, p.bins_per_spot
            )));
        }
        let map = self.bin_map(spectrum, p.symmetry_order * p.bins_per_spot)?;
        let unrolled = unroll(spectrum, &map)?;
        let folded = fold_symmetry(&unrolled, p.symmetry_order)?;
        let normalized = normalize_by_baseline(&folded, p.search_window, p.baseline_floor)?;

        let nms = SuppressionParams::new(Neighborhood::square(p.margin_bins()))
            .with_max_peaks(p.max_spots.max(1))
            .with_threshold(f32::MIN_POSITIVE)
            .with_periodic(PeriodicAxes::ROWS);
        let peaks = suppress(&normalized, &nms, None)?;
        if peaks.is_empty() {
            return Err(ScaleError::NoPeakFound {
                stage: "folded spectrum suppression",
            });
        }

        let spots: Vec<SpotCandidate> = peaks
            .iter()
            .map(|peak| self.refine_spot(&folded, &map, peak.row, peak.col, peak.score))
            .collect();
        debug!(
            "find_spots: {} candidates, best r={:.2} θ={:.3} score={:.3}",
            spots.len(),
            spots[0].radius,
            spots[0].angle,
            spots[0].intensity
        );
        Ok(spots)
    }

    /// Highest-ranked spot of [`find_spots`](Self::find_spots).
    pub fn find_dominant_spot(&self, spectrum: &ImageF32) -> Result<SpotCandidate, ScaleError> {
        self.find_spots(spectrum)?
            .into_iter()
            .next()
            .ok_or(ScaleError::NoPeakFound {
                stage: "dominant spot",
            })
    }

    /// Template variant: correlate the unrolled spectrum with Gaussian bumps
    /// at the symmetry angles; the best row gives the rotation, the best
    /// column the radius.
    pub fn match_template(&self, spectrum: &ImageF32) -> Result<SpotCandidate, ScaleError> {
        let tp = &self.params.template;
        let order = self.params.symmetry_order.max(1);
        let angles: Vec<f32> = (0..order).map(|k| k as f32 * TAU / order as f32).collect();

        let map = self.bin_map(spectrum, tp.angular_bins)?;
        let mut unrolled = unroll(spectrum, &map)?;
        let max = unrolled
            .max_finite()
            .filter(|m| *m > 0.0)
            .ok_or(ScaleError::NoPeakFound {
                stage: "template unrolling",
            })?;
        unrolled.data.iter_mut().for_each(|v| *v /= max);

        let template = make_circular_template(&angles, tp.angular_bins, tp.gauss_width, tp.margin)?;
        let pad = tp.angular_bins / 2;
        let padded = wrap_pad_rows(&unrolled, pad);
        let response = match_template_ncc(&padded, &template)?;

        let (best, score) = response
            .data
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .fold(None, |acc: Option<(usize, f32)>, (i, v)| match acc {
                Some((_, bv)) if bv >= v => acc,
                _ => Some((i, v)),
            })
            .filter(|(_, v)| *v > 0.0)
            .ok_or(ScaleError::NoPeakFound {
                stage: "template correlation",
            })?;
        let (row, col) = (best / response.w, best % response.w);

        let dc = if col > 0 && col + 1 < response.w {
            quad_peak_offset(
                response.get(col - 1, row),
                score,
                response.get(col + 1, row),
            )
            .unwrap_or(0.0)
        } else {
            0.0
        };
        let offset = row as f32 - pad as f32;
        let angle = wrap_period(
            angles[0] + (offset + 0.5) * TAU / tp.angular_bins as f32,
            self.sector(),
        );
        let radial_bin = col + tp.margin;
        let radius = map.bin_radius(radial_bin as f32 + dc);
        debug!("match_template: r={radius:.2} θ={angle:.3} ncc={score:.3}");
        Ok(SpotCandidate {
            radius,
            angle,
            intensity: score,
            angular_bin: wrap_index(row as isize - pad as isize, tp.angular_bins),
            radial_bin,
        })
    }

    /// Consistency check over ranked spots (see [`resolve_hexagonal`]).
    pub fn resolve_hexagonal(
        &self,
        spots: &[SpotCandidate],
        regime: RingRegime,
    ) -> Result<LatticeSpot, ScaleError> {
        resolve_hexagonal(
            spots,
            regime,
            self.sector(),
            self.params.ratio_tolerance,
            self.params.angle_tolerance,
            self.params.min_partner_intensity,
        )
    }

    fn bin_map(&self, spectrum: &ImageF32, angular_bins: usize) -> Result<Arc<BinMap>, ScaleError> {
        if !spectrum.is_square() {
            return Err(ScaleError::geometry(format!(
                "power spectrum must be square, got {}x{}",
                spectrum.w, spectrum.h
            )));
        }
        let outer = spectrum.w / 2;
        if self.params.inner_radius >= outer {
            return Err(ScaleError::geometry(format!(
                "inner radius {} leaves no annulus below {outer}",
                self.params.inner_radius
            )));
        }
        let geometry = PolarGeometry::new(
            spectrum.w,
            spectrum.h,
            self.params.inner_radius,
            outer,
            angular_bins,
        );
        self.cache.get_or_build(geometry)
    }

    fn refine_spot(
        &self,
        folded: &ImageF32,
        map: &BinMap,
        row: usize,
        col: usize,
        score: f32,
    ) -> SpotCandidate {
        let nr = folded.w;
        let na = folded.h;
        // Re-centre on the raw maximum: the normalised and raw maxima may differ by a bin.
        let r0 = (col.saturating_sub(1)..=(col + 1).min(nr - 1))
            .filter(|&r| folded.get(r, row).is_finite())
            .max_by(|&a, &b| {
                folded
                    .get(a, row)
                    .total_cmp(&folded.get(b, row))
                    .then(b.cmp(&a))
            })
            .unwrap_or(col);
        let dr = if r0 > 0 && r0 + 1 < nr {
            quad_peak_offset(
                folded.get(r0 - 1, row),
                folded.get(r0, row),
                folded.get(r0 + 1, row),
            )
            .unwrap_or(0.0)
        } else {
            0.0
        };
        let da = if na >= 3 {
            quad_peak_offset(
                folded.get(r0, wrap_index(row as isize - 1, na)),
                folded.get(r0, row),
                folded.get(r0, wrap_index(row as isize + 1, na)),
            )
            .unwrap_or(0.0)
        } else {
            0.0
        };
        let sector = self.sector();
        SpotCandidate {
            radius: map.bin_radius(r0 as f32 + dr),
            angle: wrap_period((row as f32 + 0.5 + da) * sector / na as f32, sector),
            intensity: score,
            angular_bin: row,
            radial_bin: r0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::SerialBackend;

    fn spots_field(n: usize, radius: f32, order: usize, phase: f32, sigma: f32) -> ImageF32 {
        let c = (n / 2) as f32;
        ImageF32::from_fn(n, n, |x, y| {
            (0..order)
                .map(|k| {
                    let t = phase + k as f32 * TAU / order as f32;
                    let (sx, sy) = (c + radius * t.cos(), c + radius * t.sin());
                    let d2 = (x as f32 - sx).powi(2) + (y as f32 - sy).powi(2);
                    (-d2 / (2.0 * sigma * sigma)).exp()
                })
                .sum()
        })
    }

    fn matcher() -> SymmetryMatcher {
        SymmetryMatcher::new(SymmetryParams::default(), Box::new(SerialBackend))
    }

    #[test]
    fn dominant_spot_radius_and_angle() {
        let field = spots_field(128, 30.0, 6, 0.3, 1.5);
        let spot = matcher().find_dominant_spot(&field).expect("spot present");
        assert!((spot.radius - 30.0).abs() < 0.3, "radius={}", spot.radius);
        assert!((spot.angle - 0.3).abs() < 0.05, "angle={}", spot.angle);
    }

    #[test]
    fn template_variant_finds_ring_radius() {
        let field = spots_field(128, 30.0, 6, 0.3, 1.5);
        let spot = matcher().match_template(&field).expect("spot present");
        assert!((spot.radius - 30.0).abs() < 0.6, "radius={}", spot.radius);
        assert!(
            crate::angle::circular_distance(spot.angle, 0.3, TAU / 6.0) < 0.15,
            "angle={}",
            spot.angle
        );
    }

    #[test]
    fn non_square_spectrum_is_rejected() {
        let field = ImageF32::filled(64, 48, 1.0);
        assert!(matches!(
            matcher().find_spots(&field),
            Err(ScaleError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn inner_radius_beyond_nyquist_is_rejected() {
        let m = SymmetryMatcher::new(
            SymmetryParams::default().with_inner_radius(40),
            Box::new(SerialBackend),
        );
        assert!(matches!(
            m.find_spots(&ImageF32::filled(64, 64, 1.0)),
            Err(ScaleError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn empty_spectrum_has_no_peak() {
        let field = ImageF32::new(64, 64);
        assert!(matches!(
            matcher().find_spots(&field),
            Err(ScaleError::NoPeakFound { .. })
        ));
        assert!(matches!(
            matcher().match_template(&field),
            Err(ScaleError::NoPeakFound { .. })
        ));
    }
}
