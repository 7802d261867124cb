use lattice_scale::image::ImageF32;
use std::f32::consts::{FRAC_PI_3, FRAC_PI_6, TAU};

/// Gaussian spot of peak `amplitude` centred at `(sx, sy)`.
fn gaussian(x: usize, y: usize, sx: f32, sy: f32, sigma: f32, amplitude: f32) -> f32 {
    let d2 = (x as f32 - sx).powi(2) + (y as f32 - sy).powi(2);
    amplitude * (-d2 / (2.0 * sigma * sigma)).exp()
}

/// Centred power-spectrum-like field with `order` Gaussian spots on a ring of
/// `radius`, starting at angle `phase`, over a weak radially decaying background.
pub fn spot_spectrum(size: usize, radius: f32, order: usize, phase: f32, sigma: f32) -> ImageF32 {
    let c = (size / 2) as f32;
    ImageF32::from_fn(size, size, |x, y| {
        let r = (x as f32 - c).hypot(y as f32 - c);
        let background = 0.02 * (-r / 30.0).exp();
        background
            + (0..order)
                .map(|k| {
                    let t = phase + k as f32 * TAU / order as f32;
                    gaussian(x, y, c + radius * t.cos(), c + radius * t.sin(), sigma, 1.0)
                })
                .sum::<f32>()
    })
}

/// Hexagonal spectrum with a first ring at `r1` and a weaker second ring at
/// `√3·r1`, rotated by π/6 against the first.
pub fn two_ring_spectrum(size: usize, r1: f32, phase: f32) -> ImageF32 {
    let c = (size / 2) as f32;
    let r2 = r1 * 3.0f32.sqrt();
    ImageF32::from_fn(size, size, |x, y| {
        (0..6)
            .map(|k| {
                let t1 = phase + k as f32 * FRAC_PI_3;
                let t2 = t1 + FRAC_PI_6;
                gaussian(x, y, c + r1 * t1.cos(), c + r1 * t1.sin(), 1.5, 1.0)
                    + gaussian(x, y, c + r2 * t2.cos(), c + r2 * t2.sin(), 1.5, 0.6)
            })
            .sum()
    })
}

/// Three-cosine image of a triangular lattice with spacing `spacing_px`,
/// rotated by `rotation` and apodised with a periodic Hann window. Its power
/// spectrum holds a single ring of six spots at radius
/// `size / (spacing_px · √3/2)`.
pub fn hexagonal_pattern(size: usize, spacing_px: f32, rotation: f32) -> ImageF32 {
    two_order_hexagonal_pattern(size, spacing_px, rotation, 0.0)
}

/// [`hexagonal_pattern`] plus the second reflection order: three cosines of
/// `√3×` the frequency, rotated by π/6 and weighted by `second`.
pub fn two_order_hexagonal_pattern(
    size: usize,
    spacing_px: f32,
    rotation: f32,
    second: f32,
) -> ImageF32 {
    let k1 = TAU / (spacing_px * 3.0f32.sqrt() / 2.0);
    let k2 = k1 * 3.0f32.sqrt();
    let hann = |i: usize| 0.5 - 0.5 * (TAU * i as f32 / size as f32).cos();
    let wave = |k: f32, t: f32, x: usize, y: usize| {
        (k * (x as f32 * t.cos() + y as f32 * t.sin())).cos()
    };
    ImageF32::from_fn(size, size, |x, y| {
        let lattice = 3.0
            + (0..3)
                .map(|i| {
                    let t = rotation + i as f32 * FRAC_PI_3;
                    wave(k1, t, x, y) + second * wave(k2, t + FRAC_PI_6, x, y)
                })
                .sum::<f32>();
        lattice * hann(x) * hann(y)
    })
}

/// Honeycomb vertices (hexagon side `side_px`) inside a `width × height`
/// image, displaced by a deterministic jitter of at most `jitter` pixels.
pub fn honeycomb_points(width: usize, height: usize, side_px: f32, jitter: f32) -> Vec<[f32; 2]> {
    let a = side_px * 3.0f32.sqrt();
    let a1 = [a, 0.0];
    let a2 = [0.5 * a, 0.5 * a * 3.0f32.sqrt()];
    let basis = [[0.0, 0.0], [0.5 * a, 0.5 * side_px]];
    let (w, h) = (width as f32, height as f32);
    let n = (w.max(h) / a).ceil() as i32 * 2 + 2;

    let mut points = Vec::new();
    for j in -n..=n {
        for i in -n..=n {
            for (b, offset) in basis.iter().enumerate() {
                let x = 3.0 + i as f32 * a1[0] + j as f32 * a2[0] + offset[0];
                let y = 3.0 + i as f32 * a1[1] + j as f32 * a2[1] + offset[1];
                if x < 0.0 || y < 0.0 || x >= w || y >= h {
                    continue;
                }
                let seed = (i * 92821 + j * 68917 + b as i32 * 31) as f32;
                let jx = jitter * (seed * 12.9898).sin();
                let jy = jitter * (seed * 78.233).cos();
                points.push([x + jx, y + jy]);
            }
        }
    }
    points
}
