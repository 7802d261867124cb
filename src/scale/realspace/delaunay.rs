//! Bowyer–Watson Delaunay triangulation of detected points.
//!
//! Computation runs in `f64`; triangles are returned as counter-clockwise
//! index triples into the input slice. Points closer than `1e-9` to an earlier
//! point are ignored.
use log::debug;

pub type Triangle = [usize; 3];

#[derive(Clone, Copy, Debug)]
struct Circle {
    cx: f64,
    cy: f64,
    r2: f64,
}

#[derive(Clone, Copy, Debug)]
struct Cell {
    v: Triangle,
    circle: Circle,
}

fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn circumcircle(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Option<Circle> {
    let d = 2.0 * orient(a, b, c);
    if d.abs() < 1e-12 {
        return None;
    }
    let (a2, b2, c2) = (
        a[0] * a[0] + a[1] * a[1],
        b[0] * b[0] + b[1] * b[1],
        c[0] * c[0] + c[1] * c[1],
    );
    let cx = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
    let cy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
    let r2 = (a[0] - cx).powi(2) + (a[1] - cy).powi(2);
    Some(Circle { cx, cy, r2 })
}

fn make_cell(pts: &[[f64; 2]], i: usize, j: usize, k: usize) -> Option<Cell> {
    let v = if orient(pts[i], pts[j], pts[k]) > 0.0 {
        [i, j, k]
    } else {
        [i, k, j]
    };
    circumcircle(pts[v[0]], pts[v[1]], pts[v[2]]).map(|circle| Cell { v, circle })
}

/// Delaunay triangulation of `points` (`[x, y]`).
///
/// Fewer than three distinct points, or all points collinear, yield an
/// empty triangulation.
pub fn triangulate(points: &[[f32; 2]]) -> Vec<Triangle> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    let mut pts: Vec<[f64; 2]> = points.iter().map(|p| [p[0] as f64, p[1] as f64]).collect();

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for p in &pts {
        min_x = min_x.min(p[0]);
        min_y = min_y.min(p[1]);
        max_x = max_x.max(p[0]);
        max_y = max_y.max(p[1]);
    }
    let span = (max_x - min_x).max(max_y - min_y).max(1.0);
    let (mx, my) = ((min_x + max_x) * 0.5, (min_y + max_y) * 0.5);
    // Super triangle, far outside the bounding box.
    pts.push([mx - 20.0 * span, my - 10.0 * span]);
    pts.push([mx + 20.0 * span, my - 10.0 * span]);
    pts.push([mx, my + 20.0 * span]);

    let mut cells: Vec<Cell> = make_cell(&pts, n, n + 1, n + 2).into_iter().collect();
    let mut inserted: Vec<usize> = Vec::with_capacity(n);
    let mut skipped = 0usize;

    for p in 0..n {
        let q = pts[p];
        if !(q[0].is_finite() && q[1].is_finite())
            || inserted.iter().any(|&o| {
                let r = pts[o];
                (r[0] - q[0]).abs() < 1e-9 && (r[1] - q[1]).abs() < 1e-9
            })
        {
            skipped += 1;
            continue;
        }

        let mut bad = Vec::new();
        cells.retain(|c| {
            let inside = (q[0] - c.circle.cx).powi(2) + (q[1] - c.circle.cy).powi(2) < c.circle.r2;
            if inside {
                bad.push(c.v);
            }
            !inside
        });

        // Cavity boundary: directed edges of bad triangles without their reverse.
        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for t in &bad {
            for e in 0..3 {
                let (a, b) = (t[e], t[(e + 1) % 3]);
                if let Some(pos) = boundary.iter().position(|&(x, y)| x == b && y == a) {
                    boundary.swap_remove(pos);
                } else {
                    boundary.push((a, b));
                }
            }
        }
        for (a, b) in boundary {
            if let Some(cell) = make_cell(&pts, a, b, p) {
                cells.push(cell);
            }
        }
        inserted.push(p);
    }

    let triangles: Vec<Triangle> = cells
        .into_iter()
        .map(|c| c.v)
        .filter(|v| v.iter().all(|&i| i < n))
        .collect();
    debug!(
        "triangulate: {} points ({} skipped) -> {} triangles",
        n,
        skipped,
        triangles.len()
    );
    triangles
}

/// Signed area (positive for counter-clockwise order).
pub fn signed_area(polygon: &[[f32; 2]]) -> f32 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| {
            let (a, b) = (polygon[i], polygon[(i + 1) % n]);
            a[0] * b[1] - b[0] * a[1]
        })
        .sum();
    0.5 * twice
}
