//! Parameter types configuring the scale detector.
//!
//! All fields are defaulted so that a JSON config only needs to name what it
//! changes. The defaults describe graphene: a hexagonal lattice with
//! `a = 0.246 nm`, measured on its first diffraction ring.

use crate::scale::{RealSpaceParams, RingRegime, ScaleMethod, GRAPHENE_LATTICE_CONSTANT_NM};
use crate::spectrum::BackendKind;
use crate::symmetry::SymmetryParams;
use serde::{Deserialize, Serialize};

/// Detector-wide parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleParams {
    /// Crystal-system selector, parsed case-insensitively (`"hexagonal"`).
    pub crystal_system: String,
    /// Lattice constant; the reported scale uses the same unit.
    pub lattice_constant: f32,
    /// Calibration method used by `detect_scale`.
    pub method: ScaleMethod,
    /// Ring regime applied when no consistent ring pair decides it.
    pub regime: RingRegime,
    /// FFT execution backend.
    pub backend: BackendKind,
    pub symmetry: SymmetryParams,
    pub real_space: RealSpaceParams,
}

impl Default for ScaleParams {
    fn default() -> Self {
        Self {
            crystal_system: "hexagonal".to_string(),
            lattice_constant: GRAPHENE_LATTICE_CONSTANT_NM,
            method: ScaleMethod::SpotPeaks,
            regime: RingRegime::High,
            backend: BackendKind::Serial,
            symmetry: SymmetryParams::default(),
            real_space: RealSpaceParams::default(),
        }
    }
}

impl ScaleParams {
    /// Preset by material name (`"graphene"`).
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "graphene" => Some(Self::default()),
            _ => None,
        }
    }

    pub fn with_method(mut self, method: ScaleMethod) -> Self {
        self.method = method;
        self
    }
}
