//! Power spectra through an injected FFT backend.

pub mod backend;
pub mod power;

pub use backend::{BackendKind, RayonBackend, SerialBackend, SpectrumBackend};
pub use power::{fftshift, power_spectrum};
