//! Discrete screen classification from fixed UI regions.
mod detector;
mod screen;
mod signature;

pub use detector::*;
pub use screen::*;
pub use signature::*;
