use super::normalize;
use serde::Deserialize;
use serde::Serialize;

/// Keyword groups that score event options the priority list does not know.
/// An avoided keyword outweighs anything preferred in the same option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRules {
    pub prefer: Vec<String>,
    pub normal: Vec<String>,
    pub avoid: Vec<String>,
}

impl EventRules {
    pub const PREFER: i32 = 2;
    pub const NORMAL: i32 = 1;
    pub const AVOID: i32 = -10;

    pub fn score(&self, text: &str) -> i32 {
        let text = normalize(text);
        let hit = |group: &[String]| {
            group
                .iter()
                .map(|k| normalize(k))
                .any(|k| !k.is_empty() && text.contains(&k))
        };
        if hit(self.avoid.as_slice()) {
            Self::AVOID
        } else if hit(self.prefer.as_slice()) {
            Self::PREFER
        } else if hit(self.normal.as_slice()) {
            Self::NORMAL
        } else {
            0
        }
    }

    /// Highest scoring option, first on ties. `None` when no rule fires.
    pub fn pick<'a>(&self, options: impl IntoIterator<Item = &'a str>) -> Option<usize> {
        let scores = options
            .into_iter()
            .map(|text| self.score(text))
            .collect::<Vec<i32>>();
        if scores.iter().all(|s| *s == 0) {
            return None;
        }
        scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(i, _)| i)
    }
}
