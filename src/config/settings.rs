use super::*;
use crate::Confidence;
use crate::Gain;
use crate::decide::EventRules;
use crate::decide::PortalPolicy;
use crate::decide::Priorities;
use crate::decide::Resolver;
use anyhow::Context;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// The configuration document.
///
/// Every section and field has a default, so partial documents load. The
/// engine reads it and never writes it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "config")]
    pub settings: Settings,
    pub key_mapping: Vec<String>,
    pub priorities: Priorities,
    pub event_rules: EventRules,
    pub tuning: Tuning,
}

/// Run settings, the `config:` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Mouse gain multiplier, see [`Config::multiplier`].
    #[serde(deserialize_with = "number")]
    pub angle: f32,
    #[serde(deserialize_with = "whole")]
    pub difficulty: i64,
    /// Team members in slot order.
    pub team: Vec<String>,
    /// Path the run follows; its blessings and seal curio are preferred.
    pub fate: String,
    /// Technique casts on stage entry: team member names or slots "1"-"4".
    pub skill: Vec<String>,
    pub timezone: Zone,
    /// Recognition resolution; higher samples the minimap more densely.
    #[serde(deserialize_with = "whole")]
    pub accuracy: i64,
    pub enable_portal_prior: Flag,
    pub portal_prior: BTreeMap<String, i32>,
    #[serde(deserialize_with = "whole")]
    pub world: i64,
    /// Option index taken when nothing on screen can be matched.
    pub default_option: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            angle: 1.0,
            difficulty: 5,
            team: Vec::new(),
            fate: String::new(),
            skill: Vec::new(),
            timezone: Zone::default(),
            accuracy: crate::REFERENCE_ACCURACY as i64,
            enable_portal_prior: Flag::default(),
            portal_prior: crate::decide::DEFAULT_PORTALS
                .iter()
                .map(|(label, weight)| (label.to_string(), *weight))
                .collect(),
            world: 0,
            default_option: 0,
        }
    }
}

/// Loop timing and retry budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub tick_ms: u64,
    pub stuck_secs: u64,
    pub lost_streak: usize,
    pub map_retry_budget: usize,
    pub map_retry_backoff: usize,
    pub min_map_confidence: Confidence,
    pub stages_per_run: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_ms: crate::TICK_INTERVAL.as_millis() as u64,
            stuck_secs: crate::STUCK_TIMEOUT.as_secs(),
            lost_streak: crate::LOST_STREAK,
            map_retry_budget: crate::MAP_RETRY_BUDGET,
            map_retry_backoff: crate::MAP_RETRY_BACKOFF,
            min_map_confidence: crate::MIN_MAP_CONFIDENCE,
            stages_per_run: crate::STAGES_PER_RUN,
        }
    }
}

impl Tuning {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
    pub fn stuck(&self) -> Duration {
        Duration::from_secs(self.stuck_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            key_mapping: Vec::new(),
            priorities: Priorities::default(),
            event_rules: EventRules::default(),
            tuning: Tuning::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse {}", path.display()))
    }
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str::<Self>(text)?
        };
        config.validate()?;
        Ok(config)
    }
    pub fn validate(&self) -> anyhow::Result<()> {
        KeyMap::from_names(&self.key_mapping)?;
        for cast in self.settings.skill.iter() {
            anyhow::ensure!(
                self.slot(cast).is_some(),
                "skill entry {:?} is neither a slot nor a team member",
                cast
            );
        }
        anyhow::ensure!(self.tuning.map_retry_budget > 0, "map_retry_budget must be positive");
        anyhow::ensure!(self.tuning.stages_per_run > 0, "stages_per_run must be positive");
        Ok(())
    }

    /// Gain multiplier. Values above 5 are invalid and read as 1; values
    /// between 2 and 5 encode `x - 2`.
    pub fn multiplier(&self) -> f32 {
        let x = self.settings.angle;
        if x > 5.0 {
            1.0
        } else if x > 2.0 {
            x - 2.0
        } else {
            x
        }
    }
    /// Mouse counts per degree.
    pub fn gain(&self) -> Gain {
        crate::MOUSE_SENSITIVITY * self.multiplier()
    }
    /// Difficulty 1 to 5; anything else reads as 5.
    pub fn difficulty(&self) -> u8 {
        match self.settings.difficulty {
            d @ 1..=5 => d as u8,
            _ => 5,
        }
    }
    pub fn accuracy(&self) -> u32 {
        self.settings.accuracy.clamp(0, u32::MAX as i64) as u32
    }
    pub fn keys(&self) -> anyhow::Result<KeyMap> {
        KeyMap::from_names(&self.key_mapping)
    }
    /// Team slot of a technique entry.
    pub fn slot(&self, cast: &str) -> Option<u8> {
        match cast.trim().parse::<u8>() {
            Ok(n @ 1..=4) => Some(n),
            Ok(_) => None,
            Err(_) => self
                .settings
                .team
                .iter()
                .position(|member| member == cast)
                .filter(|i| *i < 4)
                .map(|i| i as u8 + 1),
        }
    }
    /// Slots to cast techniques from, in configured order.
    pub fn techniques(&self) -> Vec<u8> {
        self.settings
            .skill
            .iter()
            .filter_map(|cast| self.slot(cast))
            .collect()
    }
    /// Portal weights as they stand right now.
    pub fn portal_policy(&self) -> PortalPolicy {
        PortalPolicy::resolve(
            self.settings.enable_portal_prior.is_on(),
            &self.settings.portal_prior,
        )
    }
    /// Configured priority lists with the chosen fate put first: the fate
    /// itself heads the fate list and its seal heads the curio list.
    pub fn priorities(&self) -> Priorities {
        let mut priorities = self.priorities.clone();
        let fate = self.settings.fate.trim();
        if !fate.is_empty() {
            priorities.fate.prefer(fate.to_string());
            priorities.curio.prefer(format!("{}{}", fate, crate::FATE_SEAL_SUFFIX));
        }
        priorities
    }
    pub fn resolver(&self) -> Resolver {
        let mut resolver = Resolver::new(
            self.priorities(),
            self.event_rules.clone(),
            self.settings.default_option,
        );
        resolver.set_portals(self.portal_policy());
        resolver
    }

    /// SHA-256 of the canonical JSON form, hex encoded.
    /// Object keys are sorted, so equal documents hash equally.
    pub fn fingerprint(&self) -> anyhow::Result<String> {
        let canonical = serde_json::to_value(self).context("serialize configuration")?;
        let bytes = serde_json::to_vec(&canonical).context("encode configuration")?;
        Ok(Sha256::digest(&bytes)
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect())
    }
}
