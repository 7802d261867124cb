//! Neighbour polygons from a Delaunay triangulation.
//!
//! Two triangles sharing an edge are merged when the edge is unstable, i.e.
//! when the sum of the angles opposite to it is close to π and the four
//! vertices are nearly cocircular. On a lattice this recovers the unit
//! polygons (hexagons of a honeycomb, squares of a square lattice) that the
//! triangulation splits arbitrarily.
use super::delaunay::Triangle;
use log::debug;
use std::collections::HashMap;
use std::f32::consts::PI;

/// Stability `π − (α + β)` of an interior edge.
pub fn edge_stability(points: &[[f32; 2]], u: usize, v: usize, w1: usize, w2: usize) -> f32 {
    PI - (opposite_angle(points, u, v, w1) + opposite_angle(points, u, v, w2))
}

fn opposite_angle(points: &[[f32; 2]], u: usize, v: usize, w: usize) -> f32 {
    let (a, b, c) = (points[u], points[v], points[w]);
    let (ax, ay) = (a[0] - c[0], a[1] - c[1]);
    let (bx, by) = (b[0] - c[0], b[1] - c[1]);
    (ax * by - ay * bx).abs().atan2(ax * bx + ay * by)
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Merge unstable triangle pairs and return the resulting polygons as
/// counter-clockwise vertex index cycles.
///
/// Triangles must be counter-clockwise (as returned by `triangulate`). Groups
/// whose boundary is not a single simple cycle are dropped.
pub fn stable_polygons(points: &[[f32; 2]], triangles: &[Triangle], alpha: f32) -> Vec<Vec<usize>> {
    let mut edge_owner: HashMap<(usize, usize), usize> =
        HashMap::with_capacity(triangles.len() * 3);
    for (t, tri) in triangles.iter().enumerate() {
        for e in 0..3 {
            edge_owner.insert((tri[e], tri[(e + 1) % 3]), t);
        }
    }

    let mut parent: Vec<usize> = (0..triangles.len()).collect();
    let mut merged = 0usize;
    for (t, tri) in triangles.iter().enumerate() {
        for e in 0..3 {
            let (u, v) = (tri[e], tri[(e + 1) % 3]);
            let Some(&other) = edge_owner.get(&(v, u)) else {
                continue;
            };
            if other < t {
                continue;
            }
            let w1 = tri[(e + 2) % 3];
            let Some(&w2) = triangles[other].iter().find(|&&i| i != u && i != v) else {
                continue;
            };
            if edge_stability(points, u, v, w1, w2) < alpha {
                let (ra, rb) = (find(&mut parent, t), find(&mut parent, other));
                if ra != rb {
                    parent[ra] = rb;
                    merged += 1;
                }
            }
        }
    }

    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for t in 0..triangles.len() {
        let root = find(&mut parent, t);
        groups.entry(root).or_default().push(t);
    }
    let mut roots: Vec<usize> = groups.keys().copied().collect();
    roots.sort_unstable();

    let polygons: Vec<Vec<usize>> = roots
        .iter()
        .filter_map(|root| boundary_cycle(triangles, &groups[root]))
        .collect();
    debug!(
        "stable_polygons: {} triangles, {} merges -> {} polygons",
        triangles.len(),
        merged,
        polygons.len()
    );
    polygons
}

fn boundary_cycle(triangles: &[Triangle], members: &[usize]) -> Option<Vec<usize>> {
    let mut directed: Vec<(usize, usize)> = Vec::with_capacity(members.len() * 3);
    for &t in members {
        let tri = triangles[t];
        for e in 0..3 {
            directed.push((tri[e], tri[(e + 1) % 3]));
        }
    }
    let mut next: HashMap<usize, usize> = HashMap::new();
    for &(a, b) in &directed {
        if directed.contains(&(b, a)) {
            continue;
        }
        // A vertex leaving twice means the boundary touches itself.
        if next.insert(a, b).is_some() {
            return None;
        }
    }
    let &start = next.keys().min()?;
    let mut cycle = vec![start];
    let mut current = start;
    loop {
        current = *next.get(&current)?;
        if current == start {
            break;
        }
        if cycle.len() >= next.len() {
            return None;
        }
        cycle.push(current);
    }
    (cycle.len() == next.len()).then_some(cycle)
}

#[cfg(test)]
mod tests {
    use super::super::delaunay::{signed_area, triangulate};
    use super::*;

    #[test]
    fn perturbed_square_merges_into_quad() {
        let points = [[0.0, 0.0], [5.0, 0.02], [5.0, 5.0], [-0.01, 5.0]];
        let tris = triangulate(&points);
        assert_eq!(tris.len(), 2);
        let polys = stable_polygons(&points, &tris, 0.2);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 4);
        let poly: Vec<[f32; 2]> = polys[0].iter().map(|&i| points[i]).collect();
        assert!(signed_area(&poly) > 24.0);
    }

    #[test]
    fn sharp_rhombus_stays_split() {
        // Angles opposite the short diagonal sum to ~106°, far from π.
        let points = [[0.0, 0.0], [2.0, -1.0], [4.0, 0.0], [2.0, 1.0]];
        let tris = triangulate(&points);
        let polys = stable_polygons(&points, &tris, 0.3);
        assert_eq!(polys.len(), 2);
        assert!(polys.iter().all(|p| p.len() == 3));
    }

    #[test]
    fn regular_hexagon_stability() {
        let hex: Vec<[f32; 2]> = (0..6)
            .map(|k| {
                let t = k as f32 * PI / 3.0;
                [t.cos(), t.sin()]
            })
            .collect();
        // Diagonal 0-3 with opposite vertices 1 and 4: cocircular, stability 0.
        assert!(edge_stability(&hex, 0, 3, 1, 4).abs() < 1e-5);
    }
}
