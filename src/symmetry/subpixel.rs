/// Offset of the vertex of the parabola through `(-1, prev)`, `(0, curr)`,
/// `(1, next)`, clamped to ±0.5. `None` when the samples do not describe a
/// maximum or are not finite.
#[inline]
pub fn quad_peak_offset(prev: f32, curr: f32, next: f32) -> Option<f32> {
    if !(prev.is_finite() && curr.is_finite() && next.is_finite()) {
        return None;
    }
    let denom = prev - 2.0 * curr + next;
    if denom >= -1e-12 {
        return None;
    }
    Some((0.5 * (prev - next) / denom).clamp(-0.5, 0.5))
}

#[cfg(test)]
mod tests {
    use super::quad_peak_offset;

    #[test]
    fn recovers_vertex_of_parabola() {
        let f = |x: f32| 2.0 - (x - 0.3).powi(2);
        let off = quad_peak_offset(f(-1.0), f(0.0), f(1.0)).expect("maximum");
        assert!((off - 0.3).abs() < 1e-5, "off={off}");
    }

    #[test]
    fn rejects_flat_and_minimum() {
        assert!(quad_peak_offset(1.0, 1.0, 1.0).is_none());
        assert!(quad_peak_offset(2.0, 1.0, 2.0).is_none());
        assert!(quad_peak_offset(f32::NAN, 1.0, 0.0).is_none());
    }
}
