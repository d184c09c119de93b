use std::time::Duration;

/// Logical keys. The configured key mapping turns them into key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Interact,
    Map,
    Sprint,
    Auto,
    Technique,
    Forward,
    Left,
    Back,
    Right,
    /// Team slot 1..=4.
    Slot(u8),
}

impl Key {
    /// Position of the key in the thirteen-entry mapping list
    /// `f m shift v e w a s d 1 2 3 4`.
    pub fn index(&self) -> usize {
        match self {
            Self::Interact => 0,
            Self::Map => 1,
            Self::Sprint => 2,
            Self::Auto => 3,
            Self::Technique => 4,
            Self::Forward => 5,
            Self::Left => 6,
            Self::Back => 7,
            Self::Right => 8,
            Self::Slot(n) => 8 + (*n).clamp(1, 4) as usize,
        }
    }
}

/// Commands emitted by the engine in terms of logical keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Hold(Key),
    Release(Key),
    Tap(Key, Duration),
    /// Relative mouse movement in mouse counts.
    Turn { dx: i32, dy: i32 },
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hold(key) => write!(f, "hold {:?}", key),
            Self::Release(key) => write!(f, "release {:?}", key),
            Self::Tap(key, hold) => write!(f, "tap {:?} {}ms", key, hold.as_millis()),
            Self::Turn { dx, dy } => write!(f, "turn ({}, {})", dx, dy),
        }
    }
}

/// Commands as delivered to the input collaborator: named keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Hold(String),
    Release(String),
    Press(String, Duration),
    Mouse(i32, i32),
}

/// Input injection collaborator.
/// Each call must complete its keystroke before returning.
pub trait Actuator: Send {
    fn send(&mut self, input: Input) -> anyhow::Result<()>;
}

/// Actuator that keeps everything it was sent.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    inputs: Vec<Input>,
}

impl Recorder {
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }
    pub fn clear(&mut self) {
        self.inputs.clear();
    }
}

impl Actuator for Recorder {
    fn send(&mut self, input: Input) -> anyhow::Result<()> {
        self.inputs.push(input);
        Ok(())
    }
}

/// Actuator that only logs; used for dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Narrator;

impl Actuator for Narrator {
    fn send(&mut self, input: Input) -> anyhow::Result<()> {
        log::info!("[input] {:?}", input);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_movement_keys() {
        assert_eq!(Key::Right.index(), 8);
        assert_eq!(Key::Slot(1).index(), 9);
        assert_eq!(Key::Slot(4).index(), 12);
        assert_eq!(Key::Slot(9).index(), 12);
    }

    #[test]
    fn recorder_keeps_order() {
        let mut recorder = Recorder::default();
        recorder.send(Input::Hold("w".into())).unwrap();
        recorder.send(Input::Mouse(3, 0)).unwrap();
        assert_eq!(
            recorder.inputs(),
            &[Input::Hold("w".into()), Input::Mouse(3, 0)]
        );
    }
}
