//! Cartesian → polar bin maps.
//!
//! A [`BinMap`] assigns every pixel of a `w × h` field whose distance from the
//! centre lies strictly inside `(inner, outer)` to one (angular, radial) bin,
//! and stores for each bin the contributing pixel indices with mean weights.
//! Bins that receive no pixel are synthesised from their nearest populated
//! neighbours, so that every bin yields a sample even over sparse annuli.
//!
//! Contributions are kept in a compressed offset table (`offsets`,
//! `pixels`, `weights`) so that unrolling is a single linear pass.
use crate::angle::forward_steps;
use crate::error::ScaleError;
use log::debug;
use std::f32::consts::TAU;

/// Complete parameter tuple of a bin map; also the cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PolarGeometry {
    pub width: usize,
    pub height: usize,
    pub inner_radius: usize,
    pub outer_radius: usize,
    pub angular_bins: usize,
    pub radial_bins: usize,
}

impl PolarGeometry {
    /// Geometry with one radial bin per pixel of radius (`outer - inner`).
    pub fn new(
        width: usize,
        height: usize,
        inner_radius: usize,
        outer_radius: usize,
        angular_bins: usize,
    ) -> Self {
        Self {
            width,
            height,
            inner_radius,
            outer_radius,
            angular_bins,
            radial_bins: outer_radius.saturating_sub(inner_radius),
        }
    }

    pub fn with_radial_bins(mut self, radial_bins: usize) -> Self {
        self.radial_bins = radial_bins;
        self
    }

    pub fn bin_count(&self) -> usize {
        self.angular_bins * self.radial_bins
    }

    fn validate(&self) -> Result<(), ScaleError> {
        if self.width == 0 || self.height == 0 {
            return Err(ScaleError::geometry(format!(
                "empty field {}x{}",
                self.width, self.height
            )));
        }
        if self.inner_radius >= self.outer_radius {
            return Err(ScaleError::geometry(format!(
                "inner radius {} must be smaller than outer radius {}",
                self.inner_radius, self.outer_radius
            )));
        }
        if self.angular_bins == 0 || self.radial_bins == 0 {
            return Err(ScaleError::geometry(format!(
                "bin counts must be positive (angular={}, radial={})",
                self.angular_bins, self.radial_bins
            )));
        }
        Ok(())
    }
}

/// Immutable pixel → (angle, radius) bin mapping with per-bin contributions.
#[derive(Clone, Debug)]
pub struct BinMap {
    geometry: PolarGeometry,
    /// Bin id per pixel (`angular * radial_bins + radial`), `None` outside the annulus.
    labels: Vec<Option<u32>>,
    /// `offsets[b]..offsets[b + 1]` indexes the contributions of bin `b`.
    offsets: Vec<usize>,
    pixels: Vec<u32>,
    weights: Vec<f32>,
    interpolated_bins: usize,
}

impl BinMap {
    pub fn geometry(&self) -> &PolarGeometry {
        &self.geometry
    }

    pub fn angular_bins(&self) -> usize {
        self.geometry.angular_bins
    }

    pub fn radial_bins(&self) -> usize {
        self.geometry.radial_bins
    }

    /// Bin id of a pixel, `None` when the pixel lies outside the annulus.
    pub fn label(&self, pixel: usize) -> Option<usize> {
        self.labels.get(pixel).copied().flatten().map(|b| b as usize)
    }

    /// Ordered `(pixel_index, weight)` contributions of one bin.
    pub fn contributions(&self, bin: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let range = self.offsets[bin]..self.offsets[bin + 1];
        self.pixels[range.clone()]
            .iter()
            .zip(&self.weights[range])
            .map(|(&p, &w)| (p as usize, w))
    }

    /// Number of bins that had no pixel and were synthesised from neighbours.
    pub fn interpolated_bins(&self) -> usize {
        self.interpolated_bins
    }

    /// Radius at (possibly fractional) radial bin index `index`, measured at the bin centre.
    pub fn bin_radius(&self, index: f32) -> f32 {
        let g = &self.geometry;
        let step = (g.outer_radius - g.inner_radius) as f32 / g.radial_bins as f32;
        g.inner_radius as f32 + (index + 0.5) * step
    }

    /// Angle at (possibly fractional) angular bin index `index`, measured at the bin centre.
    pub fn bin_angle(&self, index: f32) -> f32 {
        (index + 0.5) * TAU / self.geometry.angular_bins as f32
    }
}

type Contributions = Vec<(u32, f32)>;

/// Build the bin map for `geometry`.
///
/// Fails with `InvalidGeometry` for `inner >= outer`, zero bin counts, an empty
/// field, or an annulus that contains no pixel at all.
pub fn build_bin_map(geometry: PolarGeometry) -> Result<BinMap, ScaleError> {
    geometry.validate()?;
    let PolarGeometry {
        width,
        height,
        inner_radius,
        outer_radius,
        angular_bins,
        radial_bins,
    } = geometry;

    let inner = inner_radius as f32;
    let outer = outer_radius as f32;
    let cy = (height / 2) as f32;
    let cx = (width / 2) as f32;

    let mut labels = vec![None; width * height];
    let mut direct: Vec<Vec<u32>> = vec![Vec::new(); geometry.bin_count()];
    for y in 0..height {
        let dy = y as f32 - cy;
        for x in 0..width {
            let dx = x as f32 - cx;
            let r = dy.hypot(dx);
            if !(r > inner && r < outer) {
                continue;
            }
            let radial = ((radial_bins as f32 * (r - inner) / (outer - inner)).floor() as usize)
                .min(radial_bins - 1);
            let theta = dy.atan2(dx).rem_euclid(TAU);
            let angular = ((angular_bins as f32 * theta / TAU).floor() as usize)
                .min(angular_bins - 1);
            let bin = angular * radial_bins + radial;
            let pixel = y * width + x;
            labels[pixel] = Some(bin as u32);
            direct[bin].push(pixel as u32);
        }
    }

    if direct.iter().all(|b| b.is_empty()) {
        return Err(ScaleError::geometry(format!(
            "annulus ({inner_radius}, {outer_radius}) contains no pixel of a {width}x{height} field"
        )));
    }

    let mut bins: Vec<Contributions> = direct
        .iter()
        .map(|pixels| {
            let w = 1.0 / pixels.len().max(1) as f32;
            pixels.iter().map(|&p| (p, w)).collect()
        })
        .collect();

    let populated: Vec<bool> = direct.iter().map(|b| !b.is_empty()).collect();
    let mut interpolated_bins = fill_angular_gaps(&mut bins, &populated, &geometry);
    interpolated_bins += fill_empty_rings(&mut bins, &populated, &geometry);

    let mut offsets = Vec::with_capacity(bins.len() + 1);
    let total: usize = bins.iter().map(|b| b.len()).sum();
    let mut pixels = Vec::with_capacity(total);
    let mut weights = Vec::with_capacity(total);
    offsets.push(0);
    for bin in &bins {
        for &(p, w) in bin {
            pixels.push(p);
            weights.push(w);
        }
        offsets.push(pixels.len());
    }

    debug!(
        "build_bin_map {}x{} r=({}, {}) bins={}x{} interpolated={}",
        width, height, inner_radius, outer_radius, angular_bins, radial_bins, interpolated_bins
    );

    Ok(BinMap {
        geometry,
        labels,
        offsets,
        pixels,
        weights,
        interpolated_bins,
    })
}

/// Fill empty bins from the nearest populated bins at the same radius, searching
/// both angular directions with wrap-around. Rings without any populated bin are
/// left for `fill_empty_rings`.
fn fill_angular_gaps(
    bins: &mut [Contributions],
    populated: &[bool],
    geometry: &PolarGeometry,
) -> usize {
    let na = geometry.angular_bins;
    let nr = geometry.radial_bins;
    let mut filled = 0;
    for r in 0..nr {
        let ring: Vec<usize> = (0..na).filter(|&a| populated[a * nr + r]).collect();
        if ring.is_empty() || ring.len() == na {
            continue;
        }
        for a in 0..na {
            if populated[a * nr + r] {
                continue;
            }
            let (fwd, d_fwd) = ring
                .iter()
                .map(|&n| (n, forward_steps(a, n, na)))
                .min_by_key(|&(_, d)| d)
                .unwrap_or((a, 0));
            let (bwd, d_bwd) = ring
                .iter()
                .map(|&n| (n, forward_steps(n, a, na)))
                .min_by_key(|&(_, d)| d)
                .unwrap_or((a, 0));
            let total = (d_fwd + d_bwd) as f32;
            let sources = [
                (fwd * nr + r, d_bwd as f32 / total),
                (bwd * nr + r, d_fwd as f32 / total),
            ];
            bins[a * nr + r] = blend(bins, &sources);
            filled += 1;
        }
    }
    filled
}

/// Fill rings that received no pixel at all from the nearest populated rings at
/// the same angular index (radius is not periodic).
fn fill_empty_rings(
    bins: &mut [Contributions],
    populated: &[bool],
    geometry: &PolarGeometry,
) -> usize {
    let na = geometry.angular_bins;
    let nr = geometry.radial_bins;
    let ring_has_pixels: Vec<bool> = (0..nr)
        .map(|r| (0..na).any(|a| populated[a * nr + r]))
        .collect();
    let mut filled = 0;
    for r in 0..nr {
        if ring_has_pixels[r] {
            continue;
        }
        let below = (0..r).rev().find(|&i| ring_has_pixels[i]);
        let above = (r + 1..nr).find(|&i| ring_has_pixels[i]);
        for a in 0..na {
            let sources: Vec<(usize, f32)> = match (below, above) {
                (Some(lo), Some(hi)) => {
                    let (d_lo, d_hi) = ((r - lo) as f32, (hi - r) as f32);
                    vec![
                        (a * nr + lo, d_hi / (d_lo + d_hi)),
                        (a * nr + hi, d_lo / (d_lo + d_hi)),
                    ]
                }
                (Some(n), None) | (None, Some(n)) => vec![(a * nr + n, 1.0)],
                (None, None) => continue,
            };
            bins[a * nr + r] = blend(bins, &sources);
            filled += 1;
        }
    }
    filled
}

/// Weighted union of the contributions of `sources`, merged by pixel index.
fn blend(bins: &[Contributions], sources: &[(usize, f32)]) -> Contributions {
    let mut merged: Contributions = sources
        .iter()
        .flat_map(|&(bin, w)| bins[bin].iter().map(move |&(p, pw)| (p, pw * w)))
        .collect();
    merged.sort_by_key(|&(p, _)| p);
    merged.dedup_by(|next, kept| {
        if next.0 == kept.0 {
            kept.1 += next.1;
            true
        } else {
            false
        }
    });
    merged
}
