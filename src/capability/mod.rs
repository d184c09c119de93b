//! Interfaces to the outside world: frames in, commands out, text recognition
//! and out-of-band control signals. Implementations live outside this crate.
mod action;
mod frame;
mod ocr;
mod reel;
mod signal;

pub use action::*;
pub use frame::*;
pub use ocr::*;
pub use reel::*;
pub use signal::*;
