//! Polar resampling of 2-D fields around their centre.
//!
//! - [`bins`]: static Cartesian → (angle, radius) bin maps with empty-bin
//!   filling over the circular angular axis.
//! - [`cache`]: LRU cache of bin maps keyed by their full geometry tuple.
//! - [`unroll`]: applies a bin map to a field, producing an array with one row
//!   per angular bin and one column per radial bin.
//!
//! The array centre is `(h / 2, w / 2)`, which is where the zero frequency of
//! an `fftshift`-ed spectrum lands.

pub mod bins;
pub mod cache;
pub mod unroll;

pub use bins::{build_bin_map, BinMap, PolarGeometry};
pub use cache::BinMapCache;
pub use unroll::{fill_circular_gaps, unroll};
