use super::Grid;
use super::Point;
use crate::Degrees;
use std::time::Duration;

/// Structured view of one minimap frame. Ephemeral: produced per frame and
/// handed by reference to the localizer and the detector.
#[derive(Debug, Clone)]
pub struct Observation {
    timestamp: Duration,
    edges: Grid,
    markers: Grid,
    enemies: Grid,
    anchor: Point,
    heading: Option<Degrees>,
    stride: usize,
}

impl Observation {
    pub fn new(
        timestamp: Duration,
        edges: Grid,
        markers: Grid,
        enemies: Grid,
        anchor: Point,
        heading: Option<Degrees>,
        stride: usize,
    ) -> Self {
        Self {
            timestamp,
            edges,
            markers,
            enemies,
            anchor,
            heading,
            stride,
        }
    }
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }
    /// Wall pixels adjacent to walkable floor.
    pub fn edges(&self) -> &Grid {
        &self.edges
    }
    /// Interaction-point pixels.
    pub fn markers(&self) -> &Grid {
        &self.markers
    }
    pub fn enemies(&self) -> &Grid {
        &self.enemies
    }
    /// Player position on the minimap.
    pub fn anchor(&self) -> Point {
        self.anchor
    }
    pub fn heading(&self) -> Option<Degrees> {
        self.heading
    }
    /// Sampling stride the frame was extracted at.
    pub fn stride(&self) -> usize {
        self.stride
    }
    /// Edge pixels relative to the anchor.
    pub fn relative_edges(&self) -> Vec<(i32, i32)> {
        let (ax, ay) = self.anchor.rounded();
        self.edges
            .points()
            .into_iter()
            .map(|(x, y)| (x - ax, y - ay))
            .collect()
    }
    /// Nearest interaction marker, relative to the anchor.
    pub fn nearest_marker(&self) -> Option<Point> {
        let anchor = self.anchor;
        self.markers
            .points()
            .into_iter()
            .map(Point::from)
            .min_by(|a, b| anchor.distance(a).total_cmp(&anchor.distance(b)))
            .map(|p| Point::new(p.x - anchor.x, p.y - anchor.y))
    }
}
