//! Closed-loop waypoint following.
mod follower;
mod radii;
mod stall;
mod steering;

pub use follower::*;
pub use radii::*;
pub use stall::*;
pub use steering::*;
