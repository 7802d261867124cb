//! Serializable reports returned by the scale detector and written by the demos.

pub mod report;
pub mod timing;

pub use report::{InputDescriptor, ScaleReport};
pub use timing::{StageTiming, TimingBreakdown};
