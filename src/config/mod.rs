//! JSON configuration of the demo binaries.

pub mod peaks;
pub mod scale;
