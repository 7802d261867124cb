//! Symmetry folding and baseline normalisation of unrolled spectra.
use crate::error::ScaleError;
use crate::image::ImageF32;

/// Sum the `order` rotational repeats of an unrolled field.
///
/// The input has `order × k` angular rows; the output has `k` rows, row `a`
/// holding `Σ_j unrolled[j·k + a]`. Under true rotational symmetry equivalent
/// spots superimpose.
pub fn fold_symmetry(unrolled: &ImageF32, order: usize) -> Result<ImageF32, ScaleError> {
    if order == 0 || unrolled.h % order != 0 {
        return Err(ScaleError::geometry(format!(
            "{} angular bins cannot be folded by symmetry order {order}",
            unrolled.h
        )));
    }
    let sector = unrolled.h / order;
    let mut folded = ImageF32::new(unrolled.w, sector);
    for repeat in 0..order {
        for a in 0..sector {
            let src = unrolled.row(repeat * sector + a);
            for (dst, &v) in folded.row_mut(a).iter_mut().zip(src) {
                *dst += v;
            }
        }
    }
    Ok(folded)
}

/// Divide each radial column by a smoothed angular baseline.
///
/// The baseline at radius `r` is the angular mean of the column, averaged over
/// `r ± half_window`. Cells are divided by `baseline + floor × max(baseline)`;
/// the first and last `half_window` columns are set to NaN so that window
/// artifacts are never selected.
pub fn normalize_by_baseline(
    folded: &ImageF32,
    half_window: usize,
    floor: f32,
) -> Result<ImageF32, ScaleError> {
    let (nr, na) = (folded.w, folded.h);
    if nr <= 2 * half_window {
        return Err(ScaleError::geometry(format!(
            "search window {half_window} leaves no radial bin out of {nr}"
        )));
    }

    let profile: Vec<f32> = (0..nr)
        .map(|r| finite_mean((0..na).map(|a| folded.get(r, a))))
        .collect();
    let baseline: Vec<f32> = (0..nr)
        .map(|r| {
            let lo = r.saturating_sub(half_window);
            let hi = (r + half_window).min(nr - 1);
            finite_mean(profile[lo..=hi].iter().copied())
        })
        .collect();
    let max_baseline = baseline
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f32, f32::max);
    if max_baseline <= 0.0 {
        return Err(ScaleError::NoPeakFound {
            stage: "baseline normalisation",
        });
    }
    let offset = floor.max(0.0) * max_baseline;

    let mut out = ImageF32::filled(nr, na, f32::NAN);
    for a in 0..na {
        for r in half_window..nr - half_window {
            out.set(r, a, folded.get(r, a) / (baseline[r] + offset));
        }
    }
    Ok(out)
}

fn finite_mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0f32, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        f32::NAN
    } else {
        sum / count as f32
    }
}
