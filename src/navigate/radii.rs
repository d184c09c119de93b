use crate::Pixels;
use crate::atlas::Kind;

/// Arrival radius per waypoint kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radii {
    pub path: Pixels,
    pub interaction: Pixels,
    pub danger: Pixels,
    pub destination: Pixels,
}

impl Default for Radii {
    fn default() -> Self {
        Self {
            path: crate::ARRIVE_PATH,
            interaction: crate::ARRIVE_INTERACTION,
            danger: crate::ARRIVE_DANGER,
            destination: crate::ARRIVE_DESTINATION,
        }
    }
}

impl Radii {
    pub const fn uniform(radius: Pixels) -> Self {
        Self {
            path: radius,
            interaction: radius,
            danger: radius,
            destination: radius,
        }
    }
    pub fn of(&self, kind: Kind) -> Pixels {
        match kind {
            Kind::Path => self.path,
            Kind::Interaction => self.interaction,
            Kind::Danger => self.danger,
            Kind::Destination => self.destination,
        }
    }
}
