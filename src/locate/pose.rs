use crate::Confidence;
use crate::Degrees;
use crate::vision::Point;

/// Position and heading in the frame of the map that was matched.
/// Meaningless against any other map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point,
    pub heading: Degrees,
    pub confidence: Confidence,
}

impl Pose {
    pub const fn new(position: Point, heading: Degrees, confidence: Confidence) -> Self {
        Self {
            position,
            heading,
            confidence,
        }
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {:.0}° ({:.2})",
            self.position, self.heading, self.confidence
        )
    }
}
