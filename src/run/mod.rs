mod checkpoint;
mod phase;
mod pilot;
mod reading;
mod tally;

pub use checkpoint::*;
pub use phase::*;
pub use pilot::*;
pub use reading::*;
pub use tally::*;
