use super::backend::SpectrumBackend;
use crate::error::ScaleError;
use crate::image::ImageF32;
use rustfft::num_complex::Complex32;

/// Centred power spectrum `|fftshift(fft2(image))|²`.
///
/// The zero frequency lands at `(h / 2, w / 2)`, matching the centre used by
/// the polar bin maps.
pub fn power_spectrum(
    image: &ImageF32,
    backend: &dyn SpectrumBackend,
) -> Result<ImageF32, ScaleError> {
    if image.w == 0 || image.h == 0 {
        return Err(ScaleError::geometry(format!(
            "empty image {}x{}",
            image.w, image.h
        )));
    }
    let (w, h) = (image.w, image.h);
    let mut buffer: Vec<Complex32> = (0..h)
        .flat_map(|y| image.row(y).iter().map(|&v| Complex32::new(v, 0.0)))
        .collect();
    backend.fft2(&mut buffer, w, h);

    let mut power = ImageF32::new(w, h);
    for (i, v) in buffer.iter().enumerate() {
        power.data[i] = v.norm_sqr();
    }
    Ok(fftshift(&power))
}

/// Move the zero-frequency sample from `(0, 0)` to `(h / 2, w / 2)`.
pub fn fftshift(field: &ImageF32) -> ImageF32 {
    let (w, h) = (field.w, field.h);
    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        let ty = (y + h / 2) % h;
        for x in 0..w {
            let tx = (x + w / 2) % w;
            out.set(tx, ty, field.get(x, y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::backend::SerialBackend;
    use std::f32::consts::TAU;

    #[test]
    fn fftshift_moves_origin_to_centre() {
        let mut field = ImageF32::new(5, 4);
        field.set(0, 0, 1.0);
        let shifted = fftshift(&field);
        assert_eq!(shifted.get(2, 2), 1.0);
    }

    #[test]
    fn cosine_produces_symmetric_pair() {
        let (n, k) = (32usize, 5usize);
        let image = ImageF32::from_fn(n, n, |x, _| (TAU * k as f32 * x as f32 / n as f32).cos());
        let spec = power_spectrum(&image, &SerialBackend).expect("non-empty image");
        let c = n / 2;
        let peak = spec.get(c + k, c);
        assert!(peak > 1e4, "peak={peak}");
        assert!((spec.get(c - k, c) - peak).abs() / peak < 1e-3);
        let max = spec.max_finite().expect("finite spectrum");
        assert!((max - peak).abs() / peak < 1e-3);
        assert!(spec.get(c, c) < 1e-3 * peak, "zero-mean cosine has no DC");
    }
}
