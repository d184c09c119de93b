use super::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Which priority list a decision consults.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Fate,
    Blessing,
    Curio,
    Event,
    /// Boss-room prompts, per branch type.
    Boss(String),
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fate => write!(f, "fate"),
            Self::Blessing => write!(f, "blessing"),
            Self::Curio => write!(f, "curio"),
            Self::Event => write!(f, "event"),
            Self::Boss(branch) => write!(f, "boss/{}", branch),
        }
    }
}

/// How a label was found in recognized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Fit {
    /// Normalized text equals or plainly contains the label.
    Exact,
    /// Contains the label within its edit budget.
    Fuzzy,
}

/// Option labels, most wanted first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityList(Vec<String>);

impl From<Vec<String>> for PriorityList {
    fn from(labels: Vec<String>) -> Self {
        Self(labels)
    }
}

impl From<&[&str]> for PriorityList {
    fn from(labels: &[&str]) -> Self {
        Self(labels.iter().map(|s| s.to_string()).collect())
    }
}

impl PriorityList {
    pub fn labels(&self) -> &[String] {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Moves `label` to the front, adding it if missing.
    pub fn prefer(&mut self, label: String) {
        self.0.retain(|l| *l != label);
        self.0.insert(0, label);
    }
    /// Best rank of any label found in `text` with the given fit.
    pub fn rank(&self, text: &str, fit: Fit) -> Option<usize> {
        let text = normalize(text);
        if text.is_empty() {
            return None;
        }
        self.0.iter().position(|label| {
            let label = normalize(label);
            !label.is_empty()
                && match fit {
                    Fit::Exact => text.contains(&label),
                    Fit::Fuzzy => fuzzy_contains(&text, &label),
                }
        })
    }
}

/// Every configured priority list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Priorities {
    pub fate: PriorityList,
    pub blessing: PriorityList,
    pub curio: PriorityList,
    pub event: PriorityList,
    pub boss: BTreeMap<String, PriorityList>,
}

impl Priorities {
    /// Empty for unknown boss branches.
    pub fn list(&self, category: &Category) -> PriorityList {
        match category {
            Category::Fate => self.fate.clone(),
            Category::Blessing => self.blessing.clone(),
            Category::Curio => self.curio.clone(),
            Category::Event => self.event.clone(),
            Category::Boss(branch) => self.boss.get(branch).cloned().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_rank_is_first_label_found() {
        let list = PriorityList::from(&["A", "B", "C"][..]);
        assert_eq!(list.rank("C", Fit::Exact), Some(2));
        assert_eq!(list.rank("xBx", Fit::Exact), Some(1));
        assert_eq!(list.rank("", Fit::Exact), None);
        assert_eq!(list.rank("D", Fit::Exact), None);
    }

    #[test]
    fn fuzzy_rank_tolerates_noise() {
        let list = PriorityList::from(&["存护", "黄泉"][..]);
        assert_eq!(list.rank("黃泉", Fit::Exact), None);
        assert_eq!(list.rank("黃泉", Fit::Fuzzy), Some(1));
    }

    #[test]
    fn preferred_label_moves_to_the_front() {
        let mut list = PriorityList::from(&["A", "B", "C"][..]);
        list.prefer("C".to_string());
        list.prefer("D".to_string());
        assert_eq!(list.labels(), &["D", "C", "A", "B"].map(String::from));
    }

    #[test]
    fn unknown_boss_branch_is_empty() {
        let priorities = Priorities::default();
        assert!(priorities.list(&Category::Boss("首领".into())).is_empty());
    }
}
