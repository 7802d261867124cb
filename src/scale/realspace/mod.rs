//! Real-space calibration by neighbour-polygon matching.
//!
//! The calibrator does not locate atoms itself: a [`PointDetector`] supplied
//! by the caller (typically a learned model) returns point positions for each
//! candidate sampling.

pub mod delaunay;
pub mod polygons;
pub mod rmsd;
pub mod sweep;

use crate::image::ImageF32;

pub use delaunay::{signed_area, triangulate, Triangle};
pub use polygons::{edge_stability, stable_polygons};
pub use rmsd::{polygon_rmsd, PolygonTemplate};
pub use sweep::{RealSpaceCalibrator, RealSpaceParams, SweepOutcome, SweepSample};

/// Point-detection model evaluated at a candidate sampling.
///
/// Returned points are `[x, y]` in pixel coordinates of `image`.
pub trait PointDetector {
    fn detect(&mut self, image: &ImageF32, sampling: f32) -> Vec<[f32; 2]>;
}

impl<F> PointDetector for F
where
    F: FnMut(&ImageF32, f32) -> Vec<[f32; 2]>,
{
    fn detect(&mut self, image: &ImageF32, sampling: f32) -> Vec<[f32; 2]> {
        self(image, sampling)
    }
}
