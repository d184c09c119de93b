//! One-shot closed-loop measurement of the camera gain.
mod calibrator;
mod compass;

pub use calibrator::*;
pub use compass::*;
