//! Symmetry matching over the polar-unrolled power spectrum.
//!
//! [`SymmetryMatcher`] finds the diffraction spots of an `n`-fold symmetric
//! lattice either by folding the unrolled spectrum and running peak
//! suppression, or by correlating it with a synthetic angular template.
//! [`resolve_hexagonal`] then decides which ring the chosen spot belongs to.

pub mod consistency;
pub mod fold;
pub mod matcher;
pub mod params;
pub mod subpixel;
pub mod template;

pub use consistency::{resolve_hexagonal, LatticeSpot};
pub use fold::{fold_symmetry, normalize_by_baseline};
pub use matcher::{SpotCandidate, SymmetryMatcher};
pub use params::{SymmetryParams, TemplateParams};
pub use template::{make_circular_template, match_template_ncc};
