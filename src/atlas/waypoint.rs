use crate::vision::Band;
use crate::vision::Point;
use image::Rgb;

/// What reaching a waypoint means for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// Intermediate point on the route.
    Path,
    /// End of the stage.
    Destination,
    /// Something to interact with; hands off to the screen detector.
    Interaction,
    /// An enemy; hands off to combat.
    Danger,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Path, Kind::Destination, Kind::Interaction, Kind::Danger];

    /// Annotation color of this kind's markers.
    pub const fn marker(&self) -> Band {
        match self {
            Self::Path => Band::new("path", [0, 0, 255], 1600),
            Self::Destination => Band::new("destination", [255, 0, 0], 1600),
            Self::Interaction => Band::new("interaction", [0, 255, 0], 1600),
            Self::Danger => Band::new("danger", [255, 0, 255], 1600),
        }
    }
    pub fn from_marker(pixel: &Rgb<u8>) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.marker().contains(pixel))
    }
    /// Interaction and danger waypoints suspend the follower.
    pub fn hands_off(&self) -> bool {
        matches!(self, Self::Interaction | Self::Danger)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Destination => write!(f, "destination"),
            Self::Interaction => write!(f, "interaction"),
            Self::Danger => write!(f, "danger"),
        }
    }
}

/// Typed point in map space. Immutable once a map is recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub kind: Kind,
    pub at: Point,
}

impl Waypoint {
    pub const fn new(kind: Kind, at: Point) -> Self {
        Self { kind, at }
    }
    pub fn path(x: f32, y: f32) -> Self {
        Self::new(Kind::Path, Point::new(x, y))
    }
    pub fn destination(x: f32, y: f32) -> Self {
        Self::new(Kind::Destination, Point::new(x, y))
    }
    pub fn interaction(x: f32, y: f32) -> Self {
        Self::new(Kind::Interaction, Point::new(x, y))
    }
    pub fn danger(x: f32, y: f32) -> Self {
        Self::new(Kind::Danger, Point::new(x, y))
    }
}

impl std::fmt::Display for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_distinct() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_marker(&kind.marker().pixel()), Some(kind));
        }
        assert_eq!(Kind::from_marker(&Rgb([55, 55, 55])), None);
        assert_eq!(Kind::from_marker(&Rgb([4, 191, 234])), None);
    }
}
