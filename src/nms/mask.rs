use super::neighborhood::PeriodicAxes;

/// Monotone set of pixels that may no longer become peak centres.
#[derive(Clone, Debug)]
pub struct SuppressionMask {
    w: usize,
    h: usize,
    periodic: PeriodicAxes,
    bits: Vec<bool>,
}

impl SuppressionMask {
    pub fn new(w: usize, h: usize, periodic: PeriodicAxes) -> Self {
        Self {
            w,
            h,
            periodic,
            bits: vec![false; w * h],
        }
    }

    #[inline]
    pub fn is_suppressed(&self, index: usize) -> bool {
        self.bits[index]
    }

    #[inline]
    pub fn suppress_index(&mut self, index: usize) {
        self.bits[index] = true;
    }

    /// Linear index of `(row + drow, col + dcol)`, wrapping periodic axes and
    /// returning `None` when a non-periodic axis is left.
    #[inline]
    pub fn resolve(&self, row: usize, col: usize, drow: isize, dcol: isize) -> Option<usize> {
        let r = wrap_or_clip(row as isize + drow, self.h, self.periodic.rows)?;
        let c = wrap_or_clip(col as isize + dcol, self.w, self.periodic.cols)?;
        Some(r * self.w + c)
    }

    /// Mark every offset around `(row, col)` as suppressed.
    pub fn suppress_around(&mut self, row: usize, col: usize, offsets: &[(isize, isize)]) {
        for &(dr, dc) in offsets {
            if let Some(i) = self.resolve(row, col, dr, dc) {
                self.bits[i] = true;
            }
        }
    }

    pub fn suppressed_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

#[inline]
fn wrap_or_clip(v: isize, n: usize, periodic: bool) -> Option<usize> {
    if periodic {
        Some(crate::angle::wrap_index(v, n))
    } else if v >= 0 && (v as usize) < n {
        Some(v as usize)
    } else {
        None
    }
}
