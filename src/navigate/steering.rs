use crate::Degrees;
use crate::Gain;
use crate::capability::Command;
use crate::vision::wrap;

/// Heading error to mouse counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    gain: Gain,
    limit: Degrees,
}

impl Default for Steering {
    fn default() -> Self {
        Self::new(crate::MOUSE_SENSITIVITY)
    }
}

impl Steering {
    pub fn new(gain: Gain) -> Self {
        Self {
            gain,
            limit: crate::MAX_ROTATION_PER_TICK,
        }
    }
    pub fn gain(&self) -> Gain {
        self.gain
    }
    /// Signed correction from `heading` to `bearing`, clamped to the per-tick
    /// limit.
    pub fn correction(&self, heading: Degrees, bearing: Degrees) -> Degrees {
        wrap(bearing - heading).clamp(-self.limit, self.limit)
    }
    /// Mouse movement for a rotation, if it amounts to at least one count.
    pub fn rotate(&self, degrees: Degrees) -> Option<Command> {
        let dx = (degrees * self.gain).round() as i32;
        (dx != 0).then_some(Command::Turn { dx, dy: 0 })
    }
    pub fn turn(&self, heading: Degrees, bearing: Degrees) -> Option<Command> {
        self.rotate(self.correction(heading, bearing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_below_the_limit() {
        let steering = Steering::new(10.0);
        assert_eq!(steering.turn(0.0, 12.0), Some(Command::Turn { dx: 120, dy: 0 }));
        assert_eq!(steering.turn(12.0, 0.0), Some(Command::Turn { dx: -120, dy: 0 }));
    }

    #[test]
    fn clamped_and_wrapped() {
        let steering = Steering::new(10.0);
        assert_eq!(steering.turn(350.0, 170.0), Some(Command::Turn { dx: 300, dy: 0 }));
        assert_eq!(steering.turn(10.0, 300.0), Some(Command::Turn { dx: -300, dy: 0 }));
    }

    #[test]
    fn aligned_heading_needs_no_turn() {
        assert_eq!(Steering::default().turn(45.0, 45.01), None);
    }
}
