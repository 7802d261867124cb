//! Fourier-path conversion from spot radius to physical pixel size.
use crate::error::ScaleError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which hexagonal ring a measured spot belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingRegime {
    /// Primary ring; the spot radius measures the lattice spacing directly.
    #[default]
    Low,
    /// Second-nearest-neighbour ring of a hexagonal lattice.
    High,
    /// Outer hexagonal ring at `√3×` the radius of the [`High`](Self::High)
    /// ring. Only chosen by the ring consistency check, which sees both.
    Outer,
}

impl RingRegime {
    pub fn geometry_factor(self) -> f32 {
        match self {
            RingRegime::Low => 1.0,
            RingRegime::High => 3.0f32.sqrt() / 2.0,
            RingRegime::Outer => 0.5,
        }
    }
}

impl FromStr for RingRegime {
    type Err = ScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RingRegime::Low),
            "high" => Ok(RingRegime::High),
            "outer" => Ok(RingRegime::Outer),
            _ => Err(ScaleError::geometry(format!("unknown ring regime {s:?}"))),
        }
    }
}

/// Physical length per pixel from a spot radius measured in spectrum bins.
///
/// `radius_bins × lattice_constant / image_min_dimension × geometry_factor`,
/// in the unit of `lattice_constant`.
pub fn scale_from_power_spectrum(
    radius_bins: f32,
    lattice_constant: f32,
    image_min_dimension: usize,
    regime: RingRegime,
) -> Result<f32, ScaleError> {
    if !radius_bins.is_finite() || radius_bins <= 0.0 {
        return Err(ScaleError::NoPeakFound {
            stage: "spot radius",
        });
    }
    if image_min_dimension == 0 {
        return Err(ScaleError::geometry("image has a zero dimension"));
    }
    if !(lattice_constant.is_finite() && lattice_constant > 0.0) {
        return Err(ScaleError::geometry(format!(
            "lattice constant must be positive, got {lattice_constant}"
        )));
    }
    Ok(radius_bins * lattice_constant / image_min_dimension as f32 * regime.geometry_factor())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphene_scale_matches_formula() {
        let s = scale_from_power_spectrum(40.0, 0.246, 512, RingRegime::High).expect("valid");
        let expected = 40.0 * 0.246 / 512.0 * 3.0f32.sqrt() / 2.0;
        assert!((s - expected).abs() < 1e-7, "{s} vs {expected}");
        let low = scale_from_power_spectrum(40.0, 0.246, 512, RingRegime::Low).expect("valid");
        assert!((low - 40.0 * 0.246 / 512.0).abs() < 1e-7);
    }

    #[test]
    fn outer_ring_agrees_with_first_ring() {
        let first = scale_from_power_spectrum(24.0, 0.246, 256, RingRegime::High).expect("valid");
        let r2 = 24.0 * 3.0f32.sqrt();
        let outer = scale_from_power_spectrum(r2, 0.246, 256, RingRegime::Outer).expect("valid");
        assert!((first - outer).abs() < 1e-6, "first={first} outer={outer}");
    }

    #[test]
    fn regime_parses_case_insensitively() {
        assert_eq!(" High".parse::<RingRegime>(), Ok(RingRegime::High));
        assert_eq!("low".parse::<RingRegime>(), Ok(RingRegime::Low));
        assert_eq!("OUTER".parse::<RingRegime>(), Ok(RingRegime::Outer));
        assert!("medium".parse::<RingRegime>().is_err());
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert!(matches!(
            scale_from_power_spectrum(f32::NAN, 0.246, 512, RingRegime::Low),
            Err(ScaleError::NoPeakFound { .. })
        ));
        assert!(matches!(
            scale_from_power_spectrum(10.0, 0.246, 0, RingRegime::Low),
            Err(ScaleError::InvalidGeometry { .. })
        ));
        assert!(scale_from_power_spectrum(10.0, -1.0, 64, RingRegime::Low).is_err());
    }
}
