use super::*;
use crate::capability::Recognition;
use crate::detect::Screen;

/// What a choice was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    Exact,
    Fuzzy,
    /// Event keyword rules.
    Rule,
    /// Portal weights.
    Weight,
    /// Nothing recognized; the configured default index.
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub index: usize,
    pub basis: Basis,
    pub label: Option<String>,
}

impl Decision {
    pub fn is_default(&self) -> bool {
        self.basis == Basis::Default
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.label {
            Some(ref label) => write!(f, "option {} ({:?} {})", self.index, self.basis, label),
            None => write!(f, "option {} ({:?})", self.index, self.basis),
        }
    }
}

/// Maps recognized option text to an option index.
///
/// Exact matches across all options are tried before any fuzzy match, and
/// within a pass the option holding the highest-priority label wins. Event
/// options fall back to keyword rules. Anything unresolved takes the default
/// index instead of failing.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    priorities: Priorities,
    rules: EventRules,
    portals: PortalPolicy,
    fallback: usize,
    branch: Option<String>,
}

impl Resolver {
    pub fn new(priorities: Priorities, rules: EventRules, fallback: usize) -> Self {
        Self {
            priorities,
            rules,
            portals: PortalPolicy::default(),
            fallback,
            branch: None,
        }
    }
    /// Replaces the portal policy; called on stage entry.
    pub fn set_portals(&mut self, portals: PortalPolicy) {
        self.portals = portals;
    }
    /// Branch type of the current boss room, selecting its prompt list.
    pub fn set_branch(&mut self, branch: Option<String>) {
        self.branch = branch;
    }
    pub fn portals(&self) -> &PortalPolicy {
        &self.portals
    }

    /// Priority lists a screen is ranked against, in order. Blessings are
    /// named first by the blessing list, then by the fate they belong to.
    pub fn categories(&self, screen: &Screen) -> Vec<Category> {
        match screen {
            Screen::BlessingScreen => vec![Category::Blessing, Category::Fate],
            Screen::CurioScreen => vec![Category::Curio],
            Screen::EventDialog => vec![Category::Event],
            Screen::BossSkillPrompt => vec![Category::Boss(
                self.branch.clone().unwrap_or_else(|| "首领".to_string()),
            )],
            _ => Vec::new(),
        }
    }

    pub fn choose(&self, screen: &Screen, options: &[Recognition]) -> Decision {
        if *screen == Screen::PortalChoice {
            return self.portal(options).unwrap_or_else(|| self.fallback(options));
        }
        let categories = self.categories(screen);
        categories
            .iter()
            .find_map(|category| self.rank(category, options))
            .or_else(|| self.by_rules(&categories, options))
            .unwrap_or_else(|| self.fallback(options))
    }

    pub fn choose_in(&self, category: &Category, options: &[Recognition]) -> Decision {
        let categories = std::slice::from_ref(category);
        self.rank(category, options)
            .or_else(|| self.by_rules(categories, options))
            .unwrap_or_else(|| self.fallback(options))
    }

    /// Exact matches across all options first, then fuzzy ones.
    fn rank(&self, category: &Category, options: &[Recognition]) -> Option<Decision> {
        let list = self.priorities.list(category);
        for (fit, basis) in [(Fit::Exact, Basis::Exact), (Fit::Fuzzy, Basis::Fuzzy)] {
            let best = options
                .iter()
                .enumerate()
                .filter_map(|(i, option)| list.rank(&option.text, fit).map(|rank| (rank, i)))
                .min();
            if let Some((rank, index)) = best {
                return Some(Decision {
                    index,
                    basis,
                    label: Some(list.labels()[rank].clone()),
                });
            }
        }
        None
    }

    /// Keyword rules, for event options only.
    fn by_rules(&self, categories: &[Category], options: &[Recognition]) -> Option<Decision> {
        if !categories.contains(&Category::Event) {
            return None;
        }
        self.rules
            .pick(options.iter().map(|o| o.text.as_str()))
            .map(|index| Decision {
                index,
                basis: Basis::Rule,
                label: None,
            })
    }

    pub fn portal(&self, portals: &[Recognition]) -> Option<Decision> {
        self.portals
            .rank(portals)
            .map(|(index, label, _)| Decision {
                index,
                basis: Basis::Weight,
                label: Some(label),
            })
    }

    fn fallback(&self, options: &[Recognition]) -> Decision {
        Decision {
            index: self.fallback.min(options.len().saturating_sub(1)),
            basis: Basis::Default,
            label: None,
        }
    }
}
