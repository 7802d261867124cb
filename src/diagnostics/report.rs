use super::timing::TimingBreakdown;
use crate::scale::{CrystalSystem, RingRegime, ScaleEstimate, ScaleMethod};
use serde::Serialize;

/// Shape of the analysed image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
}

/// Result produced by [`ScaleDetector`](crate::ScaleDetector).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleReport {
    /// Length per pixel, in the unit of `lattice_constant`.
    pub scale: f32,
    pub method: ScaleMethod,
    pub crystal_system: CrystalSystem,
    pub lattice_constant: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regime: Option<RingRegime>,
    pub consistent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f32>,
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
}

impl ScaleReport {
    pub fn new(
        estimate: ScaleEstimate,
        crystal_system: CrystalSystem,
        lattice_constant: f32,
        input: InputDescriptor,
        timings: TimingBreakdown,
    ) -> Self {
        Self {
            scale: estimate.scale,
            method: estimate.method,
            crystal_system,
            lattice_constant,
            radius: estimate.spot.map(|s| s.radius),
            angle: estimate.spot.map(|s| s.angle),
            regime: estimate.regime,
            consistent: estimate.consistent,
            coverage: estimate.coverage,
            input,
            timings,
        }
    }

    /// One-line human readable summary used by the demos.
    pub fn summary(&self) -> String {
        let radius = self
            .radius
            .map(|r| format!("{r:.2}"))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "scale={:.5}/px method={:?} radius={radius} consistent={} total={:.2}ms",
            self.scale, self.method, self.consistent, self.timings.total_ms
        )
    }
}
