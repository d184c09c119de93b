use super::*;
use crate::Confidence;
use crate::atlas::RecordedMap;
use crate::error::Fault;
use crate::vision::Observation;
use crate::vision::Point;

/// Incremental pose tracking on one matched map.
///
/// Each update searches a small window around the previous position, so the
/// estimate cannot jump across the map between ticks. Low-confidence ticks
/// keep the previous position; a long enough streak of them loses the pose.
#[derive(Debug, Clone)]
pub struct Tracker {
    pose: Pose,
    misses: usize,
    radius: i32,
    threshold: Confidence,
    streak: usize,
}

impl Tracker {
    pub fn new(start: Pose) -> Self {
        Self {
            pose: start,
            misses: 0,
            radius: crate::TRACK_RADIUS,
            threshold: crate::MIN_TRACK_CONFIDENCE,
            streak: crate::LOST_STREAK,
        }
    }
    pub fn with_streak(mut self, streak: usize) -> Self {
        self.streak = streak.max(1);
        self
    }
    pub fn with_threshold(mut self, threshold: Confidence) -> Self {
        self.threshold = threshold;
        self
    }
    pub fn pose(&self) -> Pose {
        self.pose
    }
    pub fn misses(&self) -> usize {
        self.misses
    }
    pub fn threshold(&self) -> Confidence {
        self.threshold
    }

    pub fn update(&mut self, observation: &Observation, map: &RecordedMap) -> Result<Pose, Fault> {
        let (position, confidence) = self.search(observation, map, self.radius, 1);
        let heading = observation.heading().unwrap_or(self.pose.heading);
        if confidence >= self.threshold {
            self.misses = 0;
            self.pose = Pose::new(position, heading, confidence);
            return Ok(self.pose);
        }
        self.misses += 1;
        log::debug!(
            "[tracker] miss {}/{} ({:.2} at {})",
            self.misses,
            self.streak,
            confidence,
            position
        );
        if self.misses >= self.streak {
            return Err(Fault::PoseLost {
                streak: self.misses,
            });
        }
        Ok(Pose::new(self.pose.position, heading, confidence))
    }

    /// Wider, coarser search around the last good position after the pose
    /// was lost. Success resets the miss streak.
    pub fn relocate(&mut self, observation: &Observation, map: &RecordedMap) -> Result<Pose, Fault> {
        let (position, confidence) = self.search(observation, map, self.radius * 4, 2);
        if confidence >= self.threshold {
            log::info!("[tracker] relocated at {} ({:.2})", position, confidence);
            self.misses = 0;
            self.pose = Pose::new(
                position,
                observation.heading().unwrap_or(self.pose.heading),
                confidence,
            );
            Ok(self.pose)
        } else {
            Err(Fault::PoseLost {
                streak: self.misses,
            })
        }
    }

    /// Best position and the share of observed edges that land on the map.
    fn search(&self, observation: &Observation, map: &RecordedMap, reach: i32, step: i32) -> (Point, Confidence) {
        let points = observation.relative_edges();
        if points.is_empty() {
            return (self.pose.position, 0.0);
        }
        let (x, y) = self.pose.position.rounded();
        let found = correlate(
            &points,
            map.neighbourhood(),
            map.layout().count(),
            observation.stride(),
            (x, y),
            (reach, step),
            (0.0, 1.0),
        );
        let position = Point::from((x + found.dx, y + found.dy));
        (position, found.hits as f32 / points.len() as f32)
    }
}
