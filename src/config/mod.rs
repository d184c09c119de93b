//! The configuration document: read-only input to the engine.
mod keys;
mod lenient;
mod settings;
mod zone;

pub use keys::*;
pub use lenient::*;
pub use settings::*;
pub use zone::*;
