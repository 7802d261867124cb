//! Greedy suppression driver and class-probability aggregation.
use super::mask::SuppressionMask;
use super::neighborhood::{Neighborhood, PeriodicAxes};
use crate::error::ScaleError;
use crate::image::{ClassField, ImageF32};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// An accepted peak. Sequences of peaks are ordered by descending score.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Peak {
    pub row: usize,
    pub col: usize,
    pub score: f32,
    /// Normalised class probabilities; `None` when no class field was given or
    /// the neighbourhood carried no class weight ("unknown class").
    pub probabilities: Option<Vec<f32>>,
}

/// Stopping rules and geometry of one suppression run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressionParams {
    pub neighborhood: Neighborhood,
    /// Stop after this many peaks; `None` visits every candidate.
    pub max_peaks: Option<usize>,
    /// Scores below this value are never selectable.
    pub threshold: Option<f32>,
    pub periodic: PeriodicAxes,
}

impl Default for SuppressionParams {
    fn default() -> Self {
        Self {
            neighborhood: Neighborhood::disc(3),
            max_peaks: None,
            threshold: None,
            periodic: PeriodicAxes::NONE,
        }
    }
}

impl SuppressionParams {
    pub fn new(neighborhood: Neighborhood) -> Self {
        Self {
            neighborhood,
            ..Default::default()
        }
    }

    pub fn with_max_peaks(mut self, count: usize) -> Self {
        self.max_peaks = Some(count);
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_periodic(mut self, periodic: PeriodicAxes) -> Self {
        self.periodic = periodic;
        self
    }
}

/// Greedy non-maximum suppression over `scores`.
///
/// Candidates are the finite scores not below the threshold, visited by
/// descending score with ties broken by ascending linear index. Each
/// unsuppressed candidate is accepted and its neighbourhood (wrapped on
/// periodic axes) is suppressed. The run ends after `max_peaks` acceptances,
/// at the first score below the threshold, or when candidates are exhausted.
pub fn suppress(
    scores: &ImageF32,
    params: &SuppressionParams,
    classes: Option<&ClassField>,
) -> Result<Vec<Peak>, ScaleError> {
    if let Some(classes) = classes {
        if !classes.matches(scores) {
            return Err(ScaleError::geometry(format!(
                "class field {}x{} does not match scores {}x{}",
                classes.w, classes.h, scores.w, scores.h
            )));
        }
    }

    let threshold = params.threshold.unwrap_or(f32::NEG_INFINITY);
    let mut order: Vec<usize> = (0..scores.data.len())
        .filter(|&i| {
            let s = scores.data[i];
            s.is_finite() && s >= threshold
        })
        .collect();
    // Stable sort keeps ascending index order among equal scores.
    order.sort_by(|&a, &b| scores.data[b].total_cmp(&scores.data[a]));

    let limit = params.max_peaks.unwrap_or(usize::MAX);
    let offsets = params.neighborhood.offsets();
    let aggregation = classes.map(|c| ClassAggregator::new(c, params.neighborhood));
    let mut mask = SuppressionMask::new(scores.w, scores.h, params.periodic);
    let mut peaks = Vec::new();

    for index in order {
        if peaks.len() >= limit {
            break;
        }
        if mask.is_suppressed(index) {
            continue;
        }
        let (row, col) = (index / scores.w, index % scores.w);
        mask.suppress_index(index);
        mask.suppress_around(row, col, &offsets);
        let probabilities = aggregation
            .as_ref()
            .and_then(|agg| agg.probabilities(&mask, row, col));
        peaks.push(Peak {
            row,
            col,
            score: scores.data[index],
            probabilities,
        });
    }

    debug!(
        "suppress {}x{}: {} peaks, {} pixels suppressed",
        scores.w,
        scores.h,
        peaks.len(),
        mask.suppressed_count()
    );
    Ok(peaks)
}

/// Detection-mode suppression of a density map: disc of `distance`, scores
/// below `threshold` ignored, no count limit, optional class aggregation.
pub fn suppress_density(
    density: &ImageF32,
    classes: Option<&ClassField>,
    distance: usize,
    threshold: f32,
) -> Result<Vec<Peak>, ScaleError> {
    let params = SuppressionParams::new(Neighborhood::disc(distance)).with_threshold(threshold);
    suppress(density, &params, classes)
}

/// Run [`suppress`] on every density map of a batch in parallel. `classes`,
/// when given, must hold one class field per density map.
pub fn suppress_batch(
    densities: &[ImageF32],
    classes: Option<&[ClassField]>,
    params: &SuppressionParams,
) -> Result<Vec<Vec<Peak>>, ScaleError> {
    if let Some(classes) = classes {
        if classes.len() != densities.len() {
            return Err(ScaleError::geometry(format!(
                "{} class fields for {} density maps",
                classes.len(),
                densities.len()
            )));
        }
    }
    densities
        .par_iter()
        .enumerate()
        .map(|(i, density)| suppress(density, params, classes.map(|c| &c[i])))
        .collect()
}

/// Gaussian-weighted class vote over a disc around each accepted peak.
struct ClassAggregator<'a> {
    classes: &'a ClassField,
    /// `(drow, dcol, weight)` with `σ = radius / 3`.
    kernel: Vec<(isize, isize, f32)>,
}

impl<'a> ClassAggregator<'a> {
    fn new(classes: &'a ClassField, neighborhood: Neighborhood) -> Self {
        let radius = neighborhood.aggregation_radius();
        let sigma = radius as f32 / 3.0;
        let kernel = Neighborhood::disc(radius)
            .offsets()
            .into_iter()
            .map(|(dr, dc)| {
                let d2 = (dr * dr + dc * dc) as f32;
                let w = if sigma > 0.0 {
                    (-d2 / (2.0 * sigma * sigma)).exp()
                } else {
                    1.0
                };
                (dr, dc, w)
            })
            .collect();
        Self { classes, kernel }
    }

    fn probabilities(&self, mask: &SuppressionMask, row: usize, col: usize) -> Option<Vec<f32>> {
        let mut sums = vec![0.0f32; self.classes.channels];
        let mut neighbours = self
            .kernel
            .iter()
            .filter_map(|&(dr, dc, w)| mask.resolve(row, col, dr, dc).map(|i| (i, w)))
            .peekable();
        if neighbours.peek().is_none() {
            // Zero-radius disc: fall back to the peak pixel itself.
            let pixel = row * self.classes.w + col;
            for (c, sum) in sums.iter_mut().enumerate() {
                *sum = class_weight(self.classes.get(c, pixel));
            }
        } else {
            for (pixel, w) in neighbours {
                for (c, sum) in sums.iter_mut().enumerate() {
                    *sum += w * class_weight(self.classes.get(c, pixel));
                }
            }
        }
        let total: f32 = sums.iter().sum();
        if !(total > 0.0 && total.is_finite()) {
            return None;
        }
        sums.iter_mut().for_each(|s| *s /= total);
        Some(sums)
    }
}

#[inline]
fn class_weight(v: f32) -> f32 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}
