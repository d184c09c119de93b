use crate::capability::Command;
use crate::capability::Input;
use crate::capability::Key;

/// Default key names, in `Key::index` order.
pub const DEFAULT_KEYS: [&str; 13] = ["f", "m", "shift", "v", "e", "w", "a", "s", "d", "1", "2", "3", "4"];

/// Logical key to configured key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap(Vec<String>);

impl Default for KeyMap {
    fn default() -> Self {
        Self(DEFAULT_KEYS.iter().map(|k| k.to_string()).collect())
    }
}

impl KeyMap {
    /// Empty means defaults; otherwise exactly thirteen names.
    pub fn from_names(names: &[String]) -> anyhow::Result<Self> {
        match names.len() {
            0 => Ok(Self::default()),
            13 => Ok(Self(names.to_vec())),
            n => anyhow::bail!("key_mapping needs 13 entries, got {}", n),
        }
    }
    pub fn name(&self, key: Key) -> &str {
        &self.0[key.index()]
    }
    pub fn render(&self, command: &Command) -> Input {
        match command {
            Command::Hold(key) => Input::Hold(self.name(*key).to_string()),
            Command::Release(key) => Input::Release(self.name(*key).to_string()),
            Command::Tap(key, hold) => Input::Press(self.name(*key).to_string(), *hold),
            Command::Turn { dx, dy } => Input::Mouse(*dx, *dy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn remaps_names() {
        let mut names = DEFAULT_KEYS.iter().map(|k| k.to_string()).collect::<Vec<_>>();
        names[5] = "up".into();
        let keys = KeyMap::from_names(&names).unwrap();
        assert_eq!(keys.render(&Command::Hold(Key::Forward)), Input::Hold("up".into()));
        assert_eq!(
            keys.render(&Command::Tap(Key::Slot(2), Duration::from_millis(50))),
            Input::Press("2".into(), Duration::from_millis(50))
        );
        assert_eq!(keys.render(&Command::Turn { dx: -7, dy: 0 }), Input::Mouse(-7, 0));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(KeyMap::from_names(&["f".to_string()]).is_err());
        assert_eq!(KeyMap::from_names(&[]).unwrap(), KeyMap::default());
    }
}
