//! Polar unrolling of a 2-D field through a precomputed [`BinMap`].
use super::bins::BinMap;
use crate::error::ScaleError;
use crate::image::ImageF32;
use log::warn;

/// Resample `field` into an array with `angular_bins` rows and `radial_bins`
/// columns. Each cell is the weighted mean of its contributing pixels; cells
/// whose sum is not finite are filled by circular interpolation along the
/// angular axis of their column.
pub fn unroll(field: &ImageF32, map: &BinMap) -> Result<ImageF32, ScaleError> {
    let g = map.geometry();
    if field.w != g.width || field.h != g.height {
        return Err(ScaleError::geometry(format!(
            "field {}x{} does not match bin map {}x{}",
            field.w, field.h, g.width, g.height
        )));
    }
    let (na, nr) = (g.angular_bins, g.radial_bins);
    let mut out = ImageF32::new(nr, na);
    for (bin, cell) in out.data.iter_mut().enumerate() {
        let sum: f32 = map
            .contributions(bin)
            .map(|(pixel, w)| field.data[pixel] * w)
            .sum();
        *cell = if sum.is_finite() { sum } else { f32::NAN };
    }

    let mut column = vec![0.0f32; na];
    let mut unresolved = 0;
    for r in 0..nr {
        for (a, v) in column.iter_mut().enumerate() {
            *v = out.get(r, a);
        }
        if !fill_circular_gaps(&mut column) {
            unresolved += 1;
        }
        for (a, &v) in column.iter().enumerate() {
            out.set(r, a, v);
        }
    }
    if unresolved > 0 {
        warn!("unroll: {unresolved} radial columns have no finite sample");
    }
    Ok(out)
}

/// Replace NaN entries by linear interpolation between the nearest finite
/// neighbours, treating the slice as periodic. Returns `false` when the slice
/// holds no finite value (it is then left untouched).
pub fn fill_circular_gaps(values: &mut [f32]) -> bool {
    let n = values.len();
    let known: Vec<usize> = (0..n).filter(|&i| values[i].is_finite()).collect();
    if known.is_empty() {
        return n == 0;
    }
    if known.len() == n {
        return true;
    }
    for (k, &start) in known.iter().enumerate() {
        let end = known[(k + 1) % known.len()];
        // Steps from `start` to the next known sample, going forward around the ring.
        let span = if end > start { end - start } else { end + n - start };
        let (v0, v1) = (values[start], values[end]);
        for step in 1..span {
            let t = step as f32 / span as f32;
            values[(start + step) % n] = v0 + (v1 - v0) * t;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polar::bins::{build_bin_map, PolarGeometry};

    #[test]
    fn constant_field_unrolls_to_constant() {
        let field = ImageF32::filled(64, 64, 3.25);
        let map = build_bin_map(PolarGeometry::new(64, 64, 1, 32, 48)).expect("valid geometry");
        let unrolled = unroll(&field, &map).expect("matching shapes");
        assert_eq!((unrolled.w, unrolled.h), (31, 48));
        for &v in &unrolled.data {
            assert!((v - 3.25).abs() < 1e-4, "got {v}");
        }
    }

    #[test]
    fn radial_ramp_is_preserved() {
        let field = ImageF32::from_fn(64, 64, |x, y| {
            let (dx, dy) = (x as f32 - 32.0, y as f32 - 32.0);
            dx.hypot(dy)
        });
        let map = build_bin_map(PolarGeometry::new(64, 64, 8, 30, 32)).expect("valid geometry");
        let unrolled = unroll(&field, &map).expect("matching shapes");
        for a in 0..unrolled.h {
            for r in 0..unrolled.w {
                let v = unrolled.get(r, a);
                let centre = map.bin_radius(r as f32);
                assert!((v - centre).abs() <= 0.6, "bin ({a}, {r}) = {v}, centre {centre}");
            }
        }
    }

    #[test]
    fn circular_gaps_wrap_around() {
        let mut v = [f32::NAN, 2.0, f32::NAN, f32::NAN, 8.0, f32::NAN];
        assert!(fill_circular_gaps(&mut v));
        assert!((v[2] - 4.0).abs() < 1e-6);
        assert!((v[3] - 6.0).abs() < 1e-6);
        // Between index 4 (8.0) and index 1 (2.0) going forward through 5, 0.
        assert!((v[5] - 6.0).abs() < 1e-6);
        assert!((v[0] - 4.0).abs() < 1e-6);
    }

    #[test]
    fn all_missing_column_is_reported() {
        let mut v = [f32::NAN; 4];
        assert!(!fill_circular_gaps(&mut v));
        assert!(v.iter().all(|x| x.is_nan()));
    }

    #[test]
    fn nan_pixels_are_interpolated() {
        let mut field = ImageF32::filled(32, 32, 1.0);
        // Poison one angular sector near θ = 0.
        for x in 20..30 {
            field.set(x, 16, f32::NAN);
        }
        let map = build_bin_map(PolarGeometry::new(32, 32, 2, 14, 16)).expect("valid geometry");
        let unrolled = unroll(&field, &map).expect("matching shapes");
        assert!(unrolled.data.iter().all(|v| (v - 1.0).abs() < 1e-4));
    }

    #[test]
    fn rejects_mismatched_field() {
        let map = build_bin_map(PolarGeometry::new(32, 32, 2, 14, 16)).expect("valid geometry");
        assert!(unroll(&ImageF32::new(16, 32), &map).is_err());
    }
}
