use lattice_scale::image::ImageF32;
use lattice_scale::scale::ScaleMethod;
use lattice_scale::{ScaleDetector, ScaleParams};
use std::f32::consts::{FRAC_PI_3, TAU};

/// Hann-windowed three-cosine pattern with lattice spacing `spacing_px`.
fn hexagonal_pattern(size: usize, spacing_px: f32, rotation: f32) -> ImageF32 {
    let k = TAU / (spacing_px * 3.0f32.sqrt() / 2.0);
    let hann = |i: usize| 0.5 - 0.5 * (TAU * i as f32 / size as f32).cos();
    ImageF32::from_fn(size, size, |x, y| {
        let lattice: f32 = (0..3)
            .map(|i| {
                let t = rotation + i as f32 * FRAC_PI_3;
                (k * (x as f32 * t.cos() + y as f32 * t.sin())).cos()
            })
            .sum();
        (lattice + 3.0) * hann(x) * hann(y)
    })
}

fn main() {
    // Demo: graphene-like lattice sampled at 0.02 nm/px.
    let sampling = 0.02f32;
    let params = ScaleParams::default();
    let image = hexagonal_pattern(256, params.lattice_constant / sampling, 0.2);

    for method in [ScaleMethod::SpotPeaks, ScaleMethod::Template] {
        let detector = ScaleDetector::new(params.clone().with_method(method));
        match detector.and_then(|mut d| d.detect_scale(&image)) {
            Ok(report) => println!("{} (true {sampling:.5})", report.summary()),
            Err(err) => println!("{method:?}: {err}"),
        }
    }
}
