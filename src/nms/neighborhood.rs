use serde::{Deserialize, Serialize};

/// Region marked as suppressed around an accepted peak.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Neighborhood {
    /// Offsets with `drow² + dcol² < radius²`; used for spatial detection.
    Disc { radius: usize },
    /// Centred rectangle `|drow| <= half_rows`, `|dcol| <= half_cols`; used in
    /// polar/bin space.
    Rect { half_rows: usize, half_cols: usize },
}

impl Neighborhood {
    pub fn disc(radius: usize) -> Self {
        Neighborhood::Disc { radius }
    }

    pub fn square(half: usize) -> Self {
        Neighborhood::Rect {
            half_rows: half,
            half_cols: half,
        }
    }

    #[inline]
    pub fn contains(&self, drow: isize, dcol: isize) -> bool {
        match *self {
            Neighborhood::Disc { radius } => {
                let r = radius as isize;
                drow * drow + dcol * dcol < r * r
            }
            Neighborhood::Rect {
                half_rows,
                half_cols,
            } => drow.unsigned_abs() <= half_rows && dcol.unsigned_abs() <= half_cols,
        }
    }

    /// All `(drow, dcol)` offsets inside the neighbourhood, row-major.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let (hr, hc) = self.half_extent();
        let mut out = Vec::with_capacity((2 * hr + 1) * (2 * hc + 1));
        for dr in -(hr as isize)..=(hr as isize) {
            for dc in -(hc as isize)..=(hc as isize) {
                if self.contains(dr, dc) {
                    out.push((dr, dc));
                }
            }
        }
        out
    }

    /// Radius of the disc used for class aggregation.
    pub fn aggregation_radius(&self) -> usize {
        match *self {
            Neighborhood::Disc { radius } => radius,
            Neighborhood::Rect {
                half_rows,
                half_cols,
            } => half_rows.max(half_cols),
        }
    }

    fn half_extent(&self) -> (usize, usize) {
        match *self {
            Neighborhood::Disc { radius } => (radius, radius),
            Neighborhood::Rect {
                half_rows,
                half_cols,
            } => (half_rows, half_cols),
        }
    }
}

/// Axes along which suppression wraps around instead of being clipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicAxes {
    pub rows: bool,
    pub cols: bool,
}

impl PeriodicAxes {
    pub const NONE: PeriodicAxes = PeriodicAxes {
        rows: false,
        cols: false,
    };
    /// Rows wrap: the angular axis of an unrolled polar field.
    pub const ROWS: PeriodicAxes = PeriodicAxes {
        rows: true,
        cols: false,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_is_strict() {
        let disc = Neighborhood::disc(2);
        let offsets = disc.offsets();
        assert!(offsets.contains(&(0, 0)));
        assert!(offsets.contains(&(1, 1)));
        assert!(!offsets.contains(&(0, 2)), "distance == radius is excluded");
        assert_eq!(offsets.len(), 9);
        assert!(Neighborhood::disc(0).offsets().is_empty());
    }

    #[test]
    fn rect_is_inclusive() {
        let rect = Neighborhood::Rect {
            half_rows: 1,
            half_cols: 2,
        };
        assert_eq!(rect.offsets().len(), 15);
        assert!(rect.contains(-1, 2));
        assert!(!rect.contains(2, 0));
        assert_eq!(rect.aggregation_radius(), 2);
    }
}
