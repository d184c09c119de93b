//! Signal extraction: minimap pixels to observations.
mod band;
mod extractor;
mod grid;
mod heading;
mod observation;
pub mod sketch;

pub use band::*;
pub use extractor::*;
pub use grid::*;
pub use heading::*;
pub use observation::*;
