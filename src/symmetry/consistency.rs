//! Hexagonal ring consistency check.
//!
//! A hexagonal lattice shows a first ring of spots at radius `r` and a second
//! ring at `√3·r`, rotated by π/6. When both rings are present among the ranked
//! candidates the outer one is preferred: its radius is measured with a
//! larger lever arm and maps onto the lattice constant with the
//! [`RingRegime::Outer`] factor, which yields the same scale as the first
//! ring under [`RingRegime::High`].
use super::matcher::SpotCandidate;
use crate::angle::circular_distance;
use crate::error::ScaleError;
use crate::scale::RingRegime;
use log::{debug, warn};
use serde::Serialize;
use std::f32::consts::FRAC_PI_6;

/// Spot selected for calibration together with its ring regime.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatticeSpot {
    pub spot: SpotCandidate,
    pub regime: RingRegime,
    /// `true` when a matching first/second ring pair was found.
    pub consistent: bool,
}

/// Pick the calibration spot from ranked candidates.
///
/// The best spot is paired with the next-ranked spot found in a different
/// angular bin, provided its intensity reaches `min_partner_intensity`. The
/// pair is consistent when `r_inner / r_outer` lies within `ratio_tolerance`
/// of `1/√3` and their separation inside one `sector` lies within
/// `angle_tolerance` of π/6; the outer spot is then returned with
/// [`RingRegime::Outer`]. Otherwise the best spot is returned with `fallback`.
pub fn resolve_hexagonal(
    spots: &[SpotCandidate],
    fallback: RingRegime,
    sector: f32,
    ratio_tolerance: f32,
    angle_tolerance: f32,
    min_partner_intensity: f32,
) -> Result<LatticeSpot, ScaleError> {
    let best = *spots.first().ok_or(ScaleError::NoPeakFound {
        stage: "ring consistency",
    })?;
    let partner = spots[1..]
        .iter()
        .find(|s| s.angular_bin != best.angular_bin)
        .filter(|s| s.intensity >= min_partner_intensity);

    if let Some(partner) = partner {
        let (inner, outer) = if best.radius <= partner.radius {
            (&best, partner)
        } else {
            (partner, &best)
        };
        if outer.radius > 0.0 {
            let ratio = inner.radius / outer.radius;
            let separation = circular_distance(inner.angle, outer.angle, sector);
            if (ratio - 1.0 / 3.0f32.sqrt()).abs() <= ratio_tolerance
                && (separation - FRAC_PI_6).abs() <= angle_tolerance
            {
                debug!(
                    "ring pair r={:.2}/{:.2} ratio={ratio:.3} Δθ={separation:.3}",
                    inner.radius, outer.radius
                );
                return Ok(LatticeSpot {
                    spot: *outer,
                    regime: RingRegime::Outer,
                    consistent: true,
                });
            }
        }
        warn!(
            "spots r={:.2} and r={:.2} do not form a hexagonal ring pair, using {:?}",
            best.radius, partner.radius, fallback
        );
    }
    Ok(LatticeSpot {
        spot: best,
        regime: fallback,
        consistent: false,
    })
}
