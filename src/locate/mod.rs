//! Which recorded map are we on, and where on it.
mod correlate;
mod matcher;
mod pose;
mod tracker;

pub use correlate::*;
pub use matcher::*;
pub use pose::*;
pub use tracker::*;
