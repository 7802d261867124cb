//! Crystal systems understood by the calibrator.
use crate::error::ScaleError;
use serde::Serialize;
use std::f32::consts::{FRAC_PI_3, TAU};
use std::fmt;
use std::str::FromStr;

/// Graphene lattice constant in nanometres.
pub const GRAPHENE_LATTICE_CONSTANT_NM: f32 = 0.246;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrystalSystem {
    Hexagonal,
}

impl CrystalSystem {
    /// Rotational symmetry of the diffraction pattern.
    pub fn symmetry_order(self) -> usize {
        match self {
            CrystalSystem::Hexagonal => 6,
        }
    }

    /// Expected spot angles of one ring, starting at zero.
    pub fn template_angles(self) -> Vec<f32> {
        let order = self.symmetry_order();
        (0..order).map(|k| k as f32 * TAU / order as f32).collect()
    }

    /// Neighbour polygon of the real-space lattice in physical units.
    ///
    /// For a hexagonal (honeycomb) lattice this is the regular hexagon of
    /// side `a/√3`, counter-clockwise and centred at the origin.
    pub fn reference_polygon(self, lattice_constant: f32) -> Vec<[f32; 2]> {
        match self {
            CrystalSystem::Hexagonal => {
                let side = lattice_constant / 3.0f32.sqrt();
                (0..6)
                    .map(|k| {
                        let t = k as f32 * FRAC_PI_3;
                        [side * t.cos(), side * t.sin()]
                    })
                    .collect()
            }
        }
    }
}

impl FromStr for CrystalSystem {
    type Err = ScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hexagonal" => Ok(CrystalSystem::Hexagonal),
            _ => Err(ScaleError::UnsupportedSymmetry {
                selector: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CrystalSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrystalSystem::Hexagonal => f.write_str("hexagonal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hexagonal_only() {
        assert_eq!(" Hexagonal ".parse(), Ok(CrystalSystem::Hexagonal));
        assert_eq!(
            "cubic".parse::<CrystalSystem>(),
            Err(ScaleError::UnsupportedSymmetry {
                selector: "cubic".to_string()
            })
        );
    }

    #[test]
    fn reference_hexagon_has_expected_side() {
        let poly = CrystalSystem::Hexagonal.reference_polygon(GRAPHENE_LATTICE_CONSTANT_NM);
        assert_eq!(poly.len(), 6);
        let side = GRAPHENE_LATTICE_CONSTANT_NM / 3.0f32.sqrt();
        for i in 0..6 {
            let (a, b) = (poly[i], poly[(i + 1) % 6]);
            let d = (a[0] - b[0]).hypot(a[1] - b[1]);
            assert!((d - side).abs() < 1e-6, "edge {i}: {d}");
        }
        let angles = CrystalSystem::Hexagonal.template_angles();
        assert_eq!(angles.len(), 6);
        assert!((angles[1] - FRAC_PI_3).abs() < 1e-6);
    }
}
