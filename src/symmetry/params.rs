//! Parameter types configuring the symmetry matcher.
//!
//! Defaults target atomic-resolution images of a few hundred pixels with a
//! hexagonal lattice. For tuning, start with `inner_radius` (how much of the
//! low-frequency centre to ignore) and `bins_per_spot`.
use serde::{Deserialize, Serialize};

/// Knobs of the folded-spectrum spot search and of the template variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymmetryParams {
    /// Expected rotational symmetry of the diffraction pattern (6 = hexagonal).
    pub symmetry_order: usize,
    /// Angular bins per symmetry sector; the unrolled field has
    /// `symmetry_order × bins_per_spot` angular bins.
    pub bins_per_spot: usize,
    /// Radius (in spectrum pixels) below which the spectrum is ignored.
    pub inner_radius: usize,
    /// Half window (radial bins) of the moving-average baseline; the same
    /// number of bins at both radial ends is excluded from the search.
    pub search_window: usize,
    /// Baseline regulariser as a fraction of the largest baseline value.
    pub baseline_floor: f32,
    /// Suppression margin as a fraction of `bins_per_spot`.
    pub margin_fraction: f32,
    /// Number of ranked spots returned by the ensemble search.
    pub max_spots: usize,
    /// Allowed deviation of `r_inner / r_outer` from `1/√3`.
    pub ratio_tolerance: f32,
    /// Allowed deviation (radians) of the ring separation from `π/6`.
    pub angle_tolerance: f32,
    /// Minimum baseline-normalised intensity of the second spot of a ring
    /// pair; weaker spots are treated as background.
    pub min_partner_intensity: f32,
    pub template: TemplateParams,
}

impl Default for SymmetryParams {
    fn default() -> Self {
        Self {
            symmetry_order: 6,
            bins_per_spot: 16,
            inner_radius: 3,
            search_window: 2,
            baseline_floor: 1e-3,
            margin_fraction: 0.25,
            max_spots: 4,
            ratio_tolerance: 0.05,
            angle_tolerance: 0.1,
            min_partner_intensity: 2.0,
            template: TemplateParams::default(),
        }
    }
}

impl SymmetryParams {
    pub fn with_symmetry_order(mut self, order: usize) -> Self {
        self.symmetry_order = order;
        self
    }

    pub fn with_inner_radius(mut self, inner_radius: usize) -> Self {
        self.inner_radius = inner_radius;
        self
    }

    /// Suppression margin in bins, at least one.
    pub fn margin_bins(&self) -> usize {
        ((self.margin_fraction * self.bins_per_spot as f32).round() as usize).max(1)
    }
}

/// Synthetic angular template used by the cross-correlation variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateParams {
    /// Angular bins of the unrolled spectrum and of the template.
    pub angular_bins: usize,
    /// Standard deviation (bins) of each Gaussian bump.
    pub gauss_width: f32,
    /// Radial half width (bins) of the template; also the wrap margin.
    pub margin: usize,
}

impl Default for TemplateParams {
    fn default() -> Self {
        Self {
            angular_bins: 64,
            gauss_width: 1.0,
            margin: 1,
        }
    }
}
