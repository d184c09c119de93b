use super::*;
use crate::Degrees;
use crate::capability::Recognition;
use std::collections::BTreeMap;

/// Branch types that are always taken when offered.
pub const FORCED_PORTALS: [&str; 2] = ["首领", "休整"];

/// Built-in portal weights.
pub const DEFAULT_PORTALS: [(&str, i32); 6] = [
    ("奖励", 3),
    ("事件", 3),
    ("战斗", 2),
    ("遭遇", 2),
    ("商店", 1),
    ("财富", 1),
];

/// Weights for ranking simultaneously visible portals.
///
/// Resolved once per stage entry from the configuration, so toggling the
/// manual override mid-stage cannot change the ranking halfway through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalPolicy {
    weights: BTreeMap<String, i32>,
    requested: Option<String>,
}

impl Default for PortalPolicy {
    fn default() -> Self {
        Self::resolve(false, &BTreeMap::new())
    }
}

impl PortalPolicy {
    /// Built-in weights, overlaid with `manual` when enabled. Forced types
    /// win regardless.
    pub fn resolve(enabled: bool, manual: &BTreeMap<String, i32>) -> Self {
        let mut weights = DEFAULT_PORTALS
            .iter()
            .map(|(label, weight)| (label.to_string(), *weight))
            .collect::<BTreeMap<String, i32>>();
        if enabled {
            for (label, weight) in manual {
                weights.insert(normalize(label), *weight);
            }
        }
        for label in FORCED_PORTALS {
            weights.insert(label.to_string(), crate::FORCED_PORTAL_WEIGHT);
        }
        Self {
            weights,
            requested: None,
        }
    }
    /// Favors one branch type above all weights, e.g. for a targeted run.
    pub fn with_request(mut self, label: impl Into<String>) -> Self {
        self.requested = Some(normalize(&label.into()));
        self
    }
    pub fn weights(&self) -> &BTreeMap<String, i32> {
        &self.weights
    }

    /// Heaviest known branch type found in the text. Exact matches are
    /// preferred over fuzzy ones; equal weights go to the smaller label.
    pub fn weigh(&self, text: &str) -> Option<(String, i32)> {
        let text = normalize(text);
        self.heaviest(|label| text.contains(label))
            .or_else(|| self.heaviest(|label| fuzzy_contains(&text, label)))
    }

    fn heaviest(&self, found: impl Fn(&str) -> bool) -> Option<(String, i32)> {
        self.weights
            .iter()
            .filter(|(label, _)| found(label.as_str()))
            .map(|(label, weight)| (label, weight + self.bonus(label)))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
            .map(|(label, weight)| (label.clone(), weight))
    }

    fn bonus(&self, label: &str) -> i32 {
        match self.requested {
            Some(ref requested) if requested == label => crate::REQUESTED_PORTAL_BONUS,
            _ => 0,
        }
    }

    /// Index of the heaviest recognizable portal. Ties go to the leftmost.
    pub fn rank(&self, portals: &[Recognition]) -> Option<(usize, String, i32)> {
        portals
            .iter()
            .enumerate()
            .filter_map(|(i, portal)| {
                self.weigh(&portal.text)
                    .map(|(label, weight)| (i, label, weight, portal.rect.centre_x()))
            })
            .min_by(|a, b| b.2.cmp(&a.2).then(a.3.cmp(&b.3)))
            .map(|(i, label, weight, _)| (i, label, weight))
    }
}

/// Camera rotation that brings a portal at screen column `x` to the centre.
/// `width` is the capture width; offsets are measured at 1920 pixels.
pub fn aim(x: i32, width: u32) -> Degrees {
    let scaled = x as f32 * 1920.0 / width.max(1) as f32;
    let bias = scaled - crate::SCREEN_CENTRE_X as f32;
    (bias * crate::PORTAL_AIM_GAIN).clamp(-crate::MAX_ROTATION_PER_TICK, crate::MAX_ROTATION_PER_TICK)
}
