//! Execution backends for the 2-D FFT.
//!
//! The backend is chosen by the caller and injected into the symmetry matcher
//! at construction; nothing probes for hardware at runtime. Tests pin the
//! serial backend to get a fixed evaluation order.
use rayon::prelude::*;
use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Computes in-place forward 2-D FFTs of row-major complex buffers.
pub trait SpectrumBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Forward FFT of a `width × height` buffer, rows first, then columns.
    fn fft2(&self, data: &mut [Complex32], width: usize, height: usize);
}

/// Serialisable backend selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Serial,
    Parallel,
}

impl BackendKind {
    pub fn build(self) -> Box<dyn SpectrumBackend> {
        match self {
            BackendKind::Serial => Box::new(SerialBackend),
            BackendKind::Parallel => Box::new(RayonBackend),
        }
    }
}

/// Single-threaded rustfft backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialBackend;

impl SpectrumBackend for SerialBackend {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn fft2(&self, data: &mut [Complex32], width: usize, height: usize) {
        if width == 0 || height == 0 {
            return;
        }
        let mut planner = FftPlanner::<f32>::new();
        planner.plan_fft_forward(width).process(data);
        let mut columns = transpose(data, width, height);
        planner.plan_fft_forward(height).process(&mut columns);
        transpose_into(&columns, height, width, data);
    }
}

/// rustfft backend that transforms rows (and then columns) in parallel with rayon.
#[derive(Clone, Copy, Debug, Default)]
pub struct RayonBackend;

impl SpectrumBackend for RayonBackend {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn fft2(&self, data: &mut [Complex32], width: usize, height: usize) {
        if width == 0 || height == 0 {
            return;
        }
        let mut planner = FftPlanner::<f32>::new();
        let row_fft = planner.plan_fft_forward(width);
        let col_fft = planner.plan_fft_forward(height);
        process_lines(&row_fft, data, width);
        let mut columns = transpose(data, width, height);
        process_lines(&col_fft, &mut columns, height);
        transpose_into(&columns, height, width, data);
    }
}

fn process_lines(fft: &Arc<dyn Fft<f32>>, data: &mut [Complex32], len: usize) {
    let scratch_len = fft.get_inplace_scratch_len();
    data.par_chunks_mut(len).for_each_init(
        || vec![Complex32::new(0.0, 0.0); scratch_len],
        |scratch, line| fft.process_with_scratch(line, scratch),
    );
}

/// Transpose a row-major `width × height` buffer into `height × width`.
fn transpose(data: &[Complex32], width: usize, height: usize) -> Vec<Complex32> {
    let mut out = vec![Complex32::new(0.0, 0.0); data.len()];
    transpose_into(data, width, height, &mut out);
    out
}

fn transpose_into(src: &[Complex32], width: usize, height: usize, dst: &mut [Complex32]) {
    for y in 0..height {
        for x in 0..width {
            dst[x * height + y] = src[y * width + x];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(width: usize, height: usize) -> Vec<Complex32> {
        let mut data = vec![Complex32::new(0.0, 0.0); width * height];
        data[0] = Complex32::new(1.0, 0.0);
        data
    }

    #[test]
    fn impulse_has_flat_spectrum() {
        let mut data = impulse(8, 4);
        SerialBackend.fft2(&mut data, 8, 4);
        for v in &data {
            assert!((v.re - 1.0).abs() < 1e-6 && v.im.abs() < 1e-6, "got {v}");
        }
    }

    #[test]
    fn backends_agree() {
        let (w, h) = (12, 10);
        let src: Vec<Complex32> = (0..w * h)
            .map(|i| Complex32::new(((i * 7) % 13) as f32 - 6.0, 0.0))
            .collect();
        let mut serial = src.clone();
        let mut parallel = src;
        SerialBackend.fft2(&mut serial, w, h);
        RayonBackend.fft2(&mut parallel, w, h);
        for (a, b) in serial.iter().zip(&parallel) {
            assert!((a - b).norm() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn kind_builds_named_backend() {
        assert_eq!(BackendKind::Serial.build().name(), "serial");
        assert_eq!(BackendKind::Parallel.build().name(), "rayon");
    }
}
