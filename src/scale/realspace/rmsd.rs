//! Shape distance between polygons after optimal rigid alignment.
use super::delaunay::signed_area;
use crate::error::ScaleError;
use nalgebra::{Matrix2, Rotation2, Vector2};
use serde::Serialize;

/// Reference polygon in physical units (counter-clockwise).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PolygonTemplate {
    vertices: Vec<[f32; 2]>,
}

impl PolygonTemplate {
    pub fn new(vertices: Vec<[f32; 2]>) -> Result<Self, ScaleError> {
        if vertices.len() < 3 {
            return Err(ScaleError::geometry(format!(
                "reference polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        let mut vertices = vertices;
        let area = signed_area(&vertices);
        if !(area.abs() > 0.0 && area.is_finite()) {
            return Err(ScaleError::geometry("reference polygon has no area"));
        }
        if area < 0.0 {
            vertices.reverse();
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[[f32; 2]] {
        &self.vertices
    }

    pub fn area(&self) -> f32 {
        signed_area(&self.vertices)
    }

    /// Template in pixel units at `sampling` (physical length per pixel).
    pub fn scaled(&self, sampling: f32) -> Vec<[f32; 2]> {
        self.vertices
            .iter()
            .map(|v| [v[0] / sampling, v[1] / sampling])
            .collect()
    }
}

fn centered(points: &[[f32; 2]]) -> Vec<Vector2<f32>> {
    let n = points.len() as f32;
    let c = points
        .iter()
        .fold(Vector2::zeros(), |acc: Vector2<f32>, p| acc + Vector2::new(p[0], p[1]))
        / n;
    points.iter().map(|p| Vector2::new(p[0], p[1]) - c).collect()
}

/// Root-mean-square vertex distance after removing centroids and applying the
/// best rotation, minimised over all cyclic vertex correspondences.
///
/// `None` when the vertex counts differ or are zero.
pub fn polygon_rmsd(polygon: &[[f32; 2]], template: &[[f32; 2]]) -> Option<f32> {
    let n = polygon.len();
    if n == 0 || n != template.len() {
        return None;
    }
    let p = centered(polygon);
    let q = centered(template);

    (0..n)
        .map(|shift| {
            let mut h = Matrix2::<f32>::zeros();
            for i in 0..n {
                h += p[i] * q[(i + shift) % n].transpose();
            }
            // Rotation maximising Σ qᵢ·R pᵢ.
            let angle = (h[(0, 1)] - h[(1, 0)]).atan2(h[(0, 0)] + h[(1, 1)]);
            let r = Rotation2::new(angle);
            let sq: f32 = (0..n)
                .map(|i| (r * p[i] - q[(i + shift) % n]).norm_squared())
                .sum();
            (sq / n as f32).sqrt()
        })
        .min_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_3;

    fn hexagon(side: f32, phase: f32, offset: [f32; 2]) -> Vec<[f32; 2]> {
        (0..6)
            .map(|k| {
                let t = phase + k as f32 * FRAC_PI_3;
                [offset[0] + side * t.cos(), offset[1] + side * t.sin()]
            })
            .collect()
    }

    #[test]
    fn rigid_motion_has_zero_rmsd() {
        let template = hexagon(10.0, 0.0, [0.0, 0.0]);
        let mut moved = hexagon(10.0, 0.4, [50.0, -7.0]);
        moved.rotate_left(2);
        let d = polygon_rmsd(&moved, &template).expect("same size");
        assert!(d < 1e-3, "rmsd={d}");
    }

    #[test]
    fn scale_mismatch_shows_in_rmsd() {
        let template = hexagon(10.0, 0.0, [0.0, 0.0]);
        let bigger = hexagon(11.0, 0.2, [3.0, 3.0]);
        let d = polygon_rmsd(&bigger, &template).expect("same size");
        assert!((d - 1.0).abs() < 1e-3, "rmsd={d}");
        assert!(polygon_rmsd(&template[..5], &template).is_none());
    }

    #[test]
    fn template_orientation_and_scaling() {
        let mut cw = hexagon(2.0, 0.0, [0.0, 0.0]);
        cw.reverse();
        let t = PolygonTemplate::new(cw).expect("valid");
        assert!(t.area() > 0.0);
        let px = t.scaled(0.5);
        assert!((px[0][0].hypot(px[0][1]) - 4.0).abs() < 1e-5);
        assert!(PolygonTemplate::new(vec![[0.0, 0.0], [1.0, 1.0]]).is_err());
    }
}
