use crate::detect::Screen;
use crate::run::RunCheckpoint;
use std::time::Duration;

/// Everything that can go wrong between a frame arriving and a command leaving.
///
/// The first three variants are handled inside the tick loop and never reach
/// the caller. The rest move the run into `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// Too few edge pixels to say anything about the frame.
    UnreadableFrame { edges: usize },
    /// No recorded map cleared the confidence threshold.
    NoMapMatch { attempts: usize, best: f32 },
    /// Option text could not be matched; the default index was used.
    DecisionAmbiguous { screen: Screen, fallback: usize },
    /// Local tracking missed too many ticks in a row.
    PoseLost { streak: usize },
    /// An expected screen transition never happened.
    ScreenStuck { screen: Option<Screen>, waited: Duration },
    /// Checkpoint was written under a different configuration.
    ConfigurationDrift { stored: String, current: String },
    /// The camera gain did not converge.
    CalibrationFailed { trials: usize, gain: f32 },
}

impl Fault {
    /// Recoverable faults are absorbed by the tick loop.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::UnreadableFrame { .. } => true,
            Self::NoMapMatch { .. } => true,
            Self::DecisionAmbiguous { .. } => true,
            Self::PoseLost { .. } => false,
            Self::ScreenStuck { .. } => false,
            Self::ConfigurationDrift { .. } => false,
            Self::CalibrationFailed { .. } => false,
        }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnreadableFrame { edges } => {
                write!(f, "unreadable frame: {} edge pixels", edges)
            }
            Self::NoMapMatch { attempts, best } => {
                write!(f, "no map match after {} attempts (best {:.3})", attempts, best)
            }
            Self::DecisionAmbiguous { screen, fallback } => {
                write!(f, "ambiguous decision on {}, fell back to option {}", screen, fallback)
            }
            Self::PoseLost { streak } => {
                write!(f, "pose lost after {} low-confidence ticks", streak)
            }
            Self::ScreenStuck { screen, waited } => match screen {
                Some(screen) => write!(f, "stuck on {} for {:.1}s", screen, waited.as_secs_f32()),
                None => write!(f, "stuck on unclassified screen for {:.1}s", waited.as_secs_f32()),
            },
            Self::ConfigurationDrift { stored, current } => write!(
                f,
                "configuration drift: checkpoint {} but current {}",
                short(stored),
                short(current)
            ),
            Self::CalibrationFailed { trials, gain } => {
                write!(f, "calibration failed after {} trials (last gain {:.2})", trials, gain)
            }
        }
    }
}

impl std::error::Error for Fault {}

/// At most the first twelve characters.
fn short(hash: &str) -> &str {
    hash.char_indices().nth(12).map_or(hash, |(i, _)| &hash[..i])
}

/// Structured reason reported when the run halts in `Error`.
/// The checkpoint is the last one persisted, left untouched for manual resume.
#[derive(Debug, Clone)]
pub struct Halt {
    pub reason: Fault,
    pub checkpoint: Option<RunCheckpoint>,
}

impl std::fmt::Display for Halt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.checkpoint {
            Some(ref checkpoint) => write!(f, "{} (resumable at {})", self.reason, checkpoint),
            None => write!(f, "{} (no checkpoint)", self.reason),
        }
    }
}

impl std::error::Error for Halt {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_split() {
        assert!(Fault::UnreadableFrame { edges: 3 }.is_recoverable());
        assert!(Fault::NoMapMatch { attempts: 1, best: 0.1 }.is_recoverable());
        assert!(!Fault::PoseLost { streak: 5 }.is_recoverable());
        assert!(
            !Fault::ConfigurationDrift {
                stored: "a".into(),
                current: "b".into()
            }
            .is_recoverable()
        );
    }

    #[test]
    fn drift_message_truncates_hashes() {
        let fault = Fault::ConfigurationDrift {
            stored: "0123456789abcdef0123".into(),
            current: "fedcba9876543210fedc".into(),
        };
        assert_eq!(
            fault.to_string(),
            "configuration drift: checkpoint 0123456789ab but current fedcba987654"
        );
    }

    #[test]
    fn drift_message_survives_non_ascii_fingerprints() {
        let fault = Fault::ConfigurationDrift {
            stored: "a配置配置配置配置配置配置".into(),
            current: "短".into(),
        };
        assert_eq!(
            fault.to_string(),
            "configuration drift: checkpoint a配置配置配置配置配置配 but current 短"
        );
    }
}
