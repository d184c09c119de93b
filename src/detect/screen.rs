use crate::capability::Region;

/// What the game is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Screen {
    Navigating,
    PortalChoice,
    BlessingScreen,
    CurioScreen,
    EventDialog,
    BossSkillPrompt,
    CombatActive,
    LoadingTransition,
}

impl Screen {
    pub const ALL: [Screen; 8] = [
        Screen::Navigating,
        Screen::PortalChoice,
        Screen::BlessingScreen,
        Screen::CurioScreen,
        Screen::EventDialog,
        Screen::BossSkillPrompt,
        Screen::CombatActive,
        Screen::LoadingTransition,
    ];

    /// Screens that wait for a choice.
    pub fn is_decision(&self) -> bool {
        matches!(
            self,
            Self::PortalChoice
                | Self::BlessingScreen
                | Self::CurioScreen
                | Self::EventDialog
                | Self::BossSkillPrompt
        )
    }

    /// Option text regions, in option order. Portal choices are read as one
    /// region because portals sit anywhere in the scene.
    pub fn options(&self) -> Vec<Region> {
        match self {
            Self::BlessingScreen | Self::CurioScreen => (0..3)
                .map(|i| Region::new(0.12 + 0.27 * i as f32, 0.45, 0.22, 0.08))
                .collect(),
            Self::EventDialog => (0..4)
                .map(|i| Region::new(0.64, 0.45 + 0.07 * i as f32, 0.30, 0.06))
                .collect(),
            Self::BossSkillPrompt => (0..3)
                .map(|i| Region::new(0.32, 0.42 + 0.07 * i as f32, 0.36, 0.06))
                .collect(),
            Self::PortalChoice => vec![Region::new(0.15, 0.10, 0.85, 0.70)],
            Self::Navigating | Self::CombatActive | Self::LoadingTransition => Vec::new(),
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Navigating => write!(f, "navigating"),
            Self::PortalChoice => write!(f, "portal choice"),
            Self::BlessingScreen => write!(f, "blessing screen"),
            Self::CurioScreen => write!(f, "curio screen"),
            Self::EventDialog => write!(f, "event dialog"),
            Self::BossSkillPrompt => write!(f, "boss skill prompt"),
            Self::CombatActive => write!(f, "combat"),
            Self::LoadingTransition => write!(f, "loading"),
        }
    }
}
