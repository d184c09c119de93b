//! Recorded maps: waypoint annotations, fingerprints and the on-disk store.
mod annotation;
mod fingerprint;
mod map;
mod store;
mod waypoint;

pub use annotation::*;
pub use fingerprint::*;
pub use map::*;
pub use store::*;
pub use waypoint::*;
