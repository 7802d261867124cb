//! Scale detector orchestrating the calibration strategies.
//!
//! Overview
//! - Parses the crystal-system selector once, at construction.
//! - Builds a [`SymmetryMatcher`](crate::symmetry::SymmetryMatcher) per call
//!   around the configured FFT backend and a bin-map cache owned by the
//!   detector, so repeated images of one size reuse their polar maps.
//! - Runs the Fourier method named by [`ScaleParams::method`], or the
//!   real-space sweep when a point detector is supplied.
//!
//! Modules
//! - [`params`] – configuration types used by the detector and the demos.
//! - `pipeline` – the [`ScaleDetector`] implementation.

pub mod params;
mod pipeline;

pub use params::ScaleParams;
pub use pipeline::ScaleDetector;
