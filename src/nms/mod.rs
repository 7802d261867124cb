//! Greedy non-maximum suppression over scored 2-D fields.
//!
//! The same engine serves two callers:
//!
//! - density-map detection, where a disc neighbourhood suppresses nearby
//!   pixels and a companion class field is aggregated into per-peak class
//!   probabilities;
//! - spot selection inside an unrolled polar spectrum, where a rectangular
//!   margin is used and the angular (row) axis is periodic.
//!
//! Determinism: candidates are visited by descending score and ties are broken
//! by ascending linear index, so identical inputs give bit-identical output.
//! Suppression is monotone: once a pixel is suppressed it stays suppressed for
//! the rest of the run.

pub mod mask;
pub mod neighborhood;
pub mod suppress;

pub use mask::SuppressionMask;
pub use neighborhood::{Neighborhood, PeriodicAxes};
pub use suppress::{suppress, suppress_batch, suppress_density, Peak, SuppressionParams};
