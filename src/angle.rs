//! Circular-coordinate helpers used by the polar binning and suppression code.
//!
//! Angles live on `[0, 2π)` and angular bin indices live on `[0, n)`; both are
//! periodic, so neighbours and distances are computed modulo the period rather
//! than with ordinary bounds checks.

use std::f32::consts::TAU;

/// Wraps an angle into the range [0, 2π).
#[inline]
pub fn wrap_two_pi(angle: f32) -> f32 {
    wrap_period(angle, TAU)
}

/// Wraps `value` into `[0, period)`.
#[inline]
pub fn wrap_period(value: f32, period: f32) -> f32 {
    let wrapped = value.rem_euclid(period);
    if wrapped >= period {
        0.0
    } else {
        wrapped
    }
}

/// Smallest unsigned distance between `a` and `b` on a circle of length `period`.
#[inline]
pub fn circular_distance(a: f32, b: f32, period: f32) -> f32 {
    let diff = wrap_period(a - b, period);
    diff.min(period - diff)
}

/// Maps a possibly negative or overflowing index onto `[0, n)`.
#[inline]
pub fn wrap_index(index: isize, n: usize) -> usize {
    index.rem_euclid(n as isize) as usize
}

/// Number of forward steps needed to go from `from` to `to` on a ring of `n` bins.
#[inline]
pub fn forward_steps(from: usize, to: usize, n: usize) -> usize {
    (to + n - from % n) % n
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_3, PI};

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn wrap_two_pi_basic() {
        assert!(approx_eq(wrap_two_pi(0.5), 0.5));
        assert!(approx_eq(wrap_two_pi(-PI / 2.0), 1.5 * PI));
        assert!(approx_eq(wrap_two_pi(TAU), 0.0));
        assert!(approx_eq(wrap_two_pi(5.0 * PI), PI));
    }

    #[test]
    fn circular_distance_handles_wrap() {
        assert!(approx_eq(circular_distance(0.1, TAU - 0.1, TAU), 0.2));
        assert!(approx_eq(
            circular_distance(0.05, FRAC_PI_3 - 0.05, FRAC_PI_3),
            0.1
        ));
        assert!(approx_eq(
            circular_distance(1.0, 2.5, TAU),
            circular_distance(2.5, 1.0, TAU)
        ));
    }

    #[test]
    fn index_helpers_wrap() {
        assert_eq!(wrap_index(-1, 8), 7);
        assert_eq!(wrap_index(9, 8), 1);
        assert_eq!(forward_steps(6, 1, 8), 3);
        assert_eq!(forward_steps(1, 6, 8), 5);
        assert_eq!(forward_steps(3, 3, 8), 0);
    }
}
