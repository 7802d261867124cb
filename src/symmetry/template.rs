//! Synthetic angular templates and normalised cross-correlation.
use crate::error::ScaleError;
use crate::image::ImageF32;
use std::f32::consts::TAU;

/// Sum of Gaussian bumps at `angles` on an `angular_bins × (2·margin + 1)` grid
/// (rows = angle, cols = radius offset `-margin..=margin`).
///
/// The bumps are first laid out on a grid extended by `margin` rows at both
/// ends; the overhanging rows are then folded back onto the opposite end so
/// that bumps near 0 and 2π wrap correctly.
pub fn make_circular_template(
    angles: &[f32],
    angular_bins: usize,
    gauss_width: f32,
    margin: usize,
) -> Result<ImageF32, ScaleError> {
    if angular_bins <= 2 * margin {
        return Err(ScaleError::geometry(format!(
            "template margin {margin} too large for {angular_bins} angular bins"
        )));
    }
    if gauss_width <= 0.0 {
        return Err(ScaleError::geometry("template gaussian width must be positive"));
    }
    let cols = 2 * margin + 1;
    let full_rows = angular_bins + 2 * margin;
    let centres: Vec<f32> = angles
        .iter()
        .map(|a| a * angular_bins as f32 / TAU + margin as f32)
        .collect();
    let two_s2 = 2.0 * gauss_width * gauss_width;
    let mut full = ImageF32::from_fn(cols, full_rows, |c, x| {
        let y = c as f32 - margin as f32;
        centres
            .iter()
            .map(|p| (-((x as f32 - p).powi(2) + y * y) / two_s2).exp())
            .sum()
    });

    for i in 0..margin {
        for c in 0..cols {
            let tail = full.get(c, full_rows - margin + i);
            let head = full.get(c, i);
            let v = full.get(c, margin + i);
            full.set(c, margin + i, v + tail);
            let w = full.get(c, full_rows - 2 * margin + i);
            full.set(c, full_rows - 2 * margin + i, w + head);
        }
    }

    let mut template = ImageF32::new(cols, angular_bins);
    for a in 0..angular_bins {
        template.row_mut(a).copy_from_slice(full.row(a + margin));
    }
    Ok(template)
}

/// Extend `field` by `pad` rows at both ends, copying rows from the opposite
/// end (the row axis is periodic).
pub fn wrap_pad_rows(field: &ImageF32, pad: usize) -> ImageF32 {
    let h = field.h;
    let mut out = ImageF32::new(field.w, h + 2 * pad);
    for y in 0..h + 2 * pad {
        let src = crate::angle::wrap_index(y as isize - pad as isize, h);
        out.row_mut(y).copy_from_slice(field.row(src));
    }
    out
}

/// Normalised cross-correlation of `template` over every valid placement in
/// `field`. Non-finite field values count as zero; placements without energy
/// score zero. The response has `(field.h - t.h + 1)` rows and
/// `(field.w - t.w + 1)` columns.
pub fn match_template_ncc(field: &ImageF32, template: &ImageF32) -> Result<ImageF32, ScaleError> {
    if field.w < template.w || field.h < template.h {
        return Err(ScaleError::geometry(format!(
            "template {}x{} larger than field {}x{}",
            template.w, template.h, field.w, field.h
        )));
    }
    let t_energy: f32 = template.data.iter().map(|v| v * v).sum();
    let rows = field.h - template.h + 1;
    let cols = field.w - template.w + 1;
    let mut response = ImageF32::new(cols, rows);
    for oy in 0..rows {
        for ox in 0..cols {
            let mut num = 0.0f32;
            let mut energy = 0.0f32;
            for ty in 0..template.h {
                let frow = &field.row(oy + ty)[ox..ox + template.w];
                for (&f, &t) in frow.iter().zip(template.row(ty)) {
                    let f = if f.is_finite() { f } else { 0.0 };
                    num += f * t;
                    energy += f * f;
                }
            }
            let den = (energy * t_energy).sqrt();
            let score = if den > 0.0 { num / den } else { 0.0 };
            response.set(ox, oy, score);
        }
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_bumps_sit_on_expected_rows() {
        let angles: Vec<f32> = (0..6).map(|k| k as f32 * TAU / 6.0).collect();
        let t = make_circular_template(&angles, 60, 1.0, 1).expect("valid template");
        assert_eq!((t.w, t.h), (3, 60));
        for k in 0..6 {
            let row = k * 10;
            assert!(t.get(1, row) > 0.99, "bump {k} at row {row}: {}", t.get(1, row));
            assert!(t.get(1, row + 5) < 1e-3);
        }
        // Row 0 must have received the wrapped tail of the bump at 2π.
        assert!((t.get(1, 1) - t.get(1, 59)).abs() < 1e-5);
    }

    #[test]
    fn wrap_padding_copies_opposite_rows() {
        let field = ImageF32::from_fn(2, 4, |_, y| y as f32);
        let padded = wrap_pad_rows(&field, 2);
        let col: Vec<f32> = (0..8).map(|y| padded.get(0, y)).collect();
        assert_eq!(col, vec![2.0, 3.0, 0.0, 1.0, 2.0, 3.0, 0.0, 1.0]);
    }

    #[test]
    fn ncc_peaks_at_embedded_template() {
        let template = ImageF32::from_fn(3, 3, |x, y| if x == 1 || y == 1 { 1.0 } else { 0.2 });
        let mut field = ImageF32::from_fn(10, 8, |x, y| 0.05 * ((x * 3 + y * 5) % 7) as f32);
        for ty in 0..3 {
            for tx in 0..3 {
                field.set(6 + tx, 2 + ty, template.get(tx, ty));
            }
        }
        let response = match_template_ncc(&field, &template).expect("fits");
        assert_eq!((response.w, response.h), (8, 6));
        let best = response
            .data
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .expect("non-empty");
        assert_eq!((best % response.w, best / response.w), (6, 2));
        assert!((response.get(6, 2) - 1.0).abs() < 1e-5);
    }
}
