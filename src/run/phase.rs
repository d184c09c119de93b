use crate::detect::Screen;

/// Where a run stands.
///
/// Portals are only chosen after a stage is cleared, so a portal screen
/// leaves the in-stage phases alone. `Paused` wraps the phase it interrupted
/// and gives it back on resume. `Error` absorbs every trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Calibrating,
    Navigating,
    Deciding(Screen),
    Combat,
    StageComplete,
    NextStage,
    RunComplete,
    Paused(Box<Phase>),
    Error,
}

/// Inputs that move the run between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    /// A valid checkpoint was found on startup.
    Resumed,
    Calibrated,
    Screen(Screen),
    /// The follower reached the destination.
    StageCleared,
    Advance { last: bool },
    /// The loading screen after a portal ended.
    Entered,
    Finished,
    Pause,
    Resume,
    Fail,
}

impl Phase {
    pub fn next(self, trigger: Trigger) -> Phase {
        match (self, trigger) {
            (Phase::Error, _) => Phase::Error,
            (_, Trigger::Fail) => Phase::Error,
            (Phase::Paused(inner), Trigger::Resume) => *inner,
            (Phase::Paused(inner), _) => Phase::Paused(inner),
            (phase, Trigger::Pause) => Phase::Paused(Box::new(phase)),
            (Phase::Idle, Trigger::Start) => Phase::Calibrating,
            (Phase::Idle, Trigger::Resumed) => Phase::Navigating,
            (Phase::Calibrating, Trigger::Calibrated) => Phase::Navigating,
            (Phase::Navigating, Trigger::StageCleared) => Phase::StageComplete,
            (Phase::StageComplete, Trigger::Advance { last: false }) => Phase::NextStage,
            (Phase::StageComplete, Trigger::Advance { last: true }) => Phase::RunComplete,
            (Phase::NextStage, Trigger::Entered) => Phase::Navigating,
            (Phase::RunComplete, Trigger::Finished) => Phase::Idle,
            (phase @ (Phase::Navigating | Phase::Deciding(_) | Phase::Combat), Trigger::Screen(screen)) => {
                match screen {
                    Screen::Navigating => Phase::Navigating,
                    Screen::CombatActive => Phase::Combat,
                    Screen::LoadingTransition | Screen::PortalChoice => phase,
                    decision => Phase::Deciding(decision),
                }
            }
            (phase, _) => phase,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Phase::Paused(_))
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Calibrating => write!(f, "calibrating"),
            Phase::Navigating => write!(f, "navigating"),
            Phase::Deciding(screen) => write!(f, "deciding ({})", screen),
            Phase::Combat => write!(f, "combat"),
            Phase::StageComplete => write!(f, "stage complete"),
            Phase::NextStage => write!(f, "next stage"),
            Phase::RunComplete => write!(f, "run complete"),
            Phase::Paused(inner) => write!(f, "paused ({})", inner),
            Phase::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_full_stage() {
        let phase = Phase::Idle
            .next(Trigger::Start)
            .next(Trigger::Calibrated)
            .next(Trigger::Screen(Screen::CurioScreen));
        assert_eq!(phase, Phase::Deciding(Screen::CurioScreen));
        let phase = phase
            .next(Trigger::Screen(Screen::CombatActive))
            .next(Trigger::Screen(Screen::Navigating))
            .next(Trigger::StageCleared);
        assert_eq!(phase, Phase::StageComplete);
        assert_eq!(phase.clone().next(Trigger::Advance { last: false }), Phase::NextStage);
        let done = phase.next(Trigger::Advance { last: true });
        assert_eq!(done, Phase::RunComplete);
        assert_eq!(done.next(Trigger::Finished), Phase::Idle);
    }

    #[test]
    fn pause_wraps_and_unwraps() {
        let paused = Phase::Combat.next(Trigger::Pause);
        assert_eq!(paused, Phase::Paused(Box::new(Phase::Combat)));
        let still = paused.next(Trigger::Screen(Screen::Navigating));
        assert!(still.is_paused());
        assert_eq!(still.next(Trigger::Resume), Phase::Combat);
    }

    #[test]
    fn error_is_terminal() {
        let error = Phase::Paused(Box::new(Phase::Navigating)).next(Trigger::Fail);
        assert_eq!(error, Phase::Error);
        assert_eq!(error.clone().next(Trigger::Resume), Phase::Error);
        assert_eq!(error.next(Trigger::Start), Phase::Error);
    }

    #[test]
    fn loading_keeps_the_phase_and_stray_triggers_are_ignored() {
        assert_eq!(
            Phase::Combat.next(Trigger::Screen(Screen::LoadingTransition)),
            Phase::Combat
        );
        assert_eq!(
            Phase::Navigating.next(Trigger::Screen(Screen::PortalChoice)),
            Phase::Navigating
        );
        assert_eq!(Phase::Idle.next(Trigger::StageCleared), Phase::Idle);
        assert_eq!(
            Phase::NextStage.next(Trigger::Screen(Screen::PortalChoice)),
            Phase::NextStage
        );
        assert_eq!(Phase::Idle.next(Trigger::Resumed), Phase::Navigating);
    }
}
