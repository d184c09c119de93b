//! Choosing among on-screen options from recognized text.
mod fuzzy;
mod portal;
mod priority;
mod resolver;
mod rule;
mod text;

pub use fuzzy::*;
pub use portal::*;
pub use priority::*;
pub use resolver::*;
pub use rule::*;
pub use text::*;
