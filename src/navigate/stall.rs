use crate::Pixels;
use crate::capability::Command;
use crate::capability::Key;
use crate::vision::Point;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::time::Duration;

/// Detects walking into a wall and produces the dodge out of it:
/// back off, strafe to a random side for a random time, walk on.
#[derive(Debug, Clone)]
pub struct Stall {
    ticks: usize,
    distance: Pixels,
    since: Option<(Point, usize)>,
    rng: SmallRng,
}

impl Stall {
    pub fn new(seed: u64) -> Self {
        Self {
            ticks: crate::STALL_TICKS,
            distance: crate::STALL_DISTANCE,
            since: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
    pub fn with_ticks(mut self, ticks: usize) -> Self {
        self.ticks = ticks.max(1);
        self
    }
    pub fn reset(&mut self) {
        self.since = None;
    }
    /// Feeds the position of one tick spent holding forward.
    pub fn observe(&mut self, position: Point) -> Option<Vec<Command>> {
        match self.since {
            None => {
                self.since = Some((position, 0));
                None
            }
            Some((start, _)) if start.distance(&position) >= self.distance => {
                self.since = Some((position, 0));
                None
            }
            Some((start, n)) if n + 1 < self.ticks => {
                self.since = Some((start, n + 1));
                None
            }
            Some(_) => {
                self.since = None;
                Some(self.dodge())
            }
        }
    }
    fn dodge(&mut self) -> Vec<Command> {
        let side = if self.rng.random_bool(0.5) { Key::Left } else { Key::Right };
        let strafe = Duration::from_millis(self.rng.random_range(200..=700));
        log::debug!("[follower] stalled, dodging {:?} for {}ms", side, strafe.as_millis());
        vec![
            Command::Release(Key::Forward),
            Command::Tap(Key::Back, Duration::from_millis(400)),
            Command::Tap(side, strafe),
            Command::Hold(Key::Forward),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_never_stalls() {
        let mut stall = Stall::new(0).with_ticks(3);
        for i in 0..20 {
            assert!(stall.observe(Point::new(0.0, i as f32 * 2.0)).is_none());
        }
    }

    #[test]
    fn standing_still_dodges_once_per_window() {
        let mut stall = Stall::new(0).with_ticks(3);
        let here = Point::new(5.0, 5.0);
        let dodges = (0..8).filter_map(|_| stall.observe(here)).collect::<Vec<_>>();
        assert_eq!(dodges.len(), 2);
        let dodge = &dodges[0];
        assert_eq!(dodge.first(), Some(&Command::Release(Key::Forward)));
        assert_eq!(dodge.last(), Some(&Command::Hold(Key::Forward)));
        assert!(matches!(dodge[2], Command::Tap(Key::Left | Key::Right, _)));
    }

    #[test]
    fn same_seed_same_dodge() {
        let here = Point::new(1.0, 1.0);
        let run = |seed| {
            let mut stall = Stall::new(seed).with_ticks(2);
            (0..3).filter_map(|_| stall.observe(here)).collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }
}
