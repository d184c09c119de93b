use super::*;
use crate::Degrees;
use crate::Gain;
use crate::capability::Actuator;
use crate::capability::Input;
use crate::error::Fault;
use crate::vision::wrap;
use std::time::Duration;

/// Measures mouse counts per degree by turning the camera and reading back
/// how far it went.
///
/// Each trial asks for a fixed sweep at the current estimate and rescales the
/// estimate by what the compass saw. Trials with an unreadable heading, or
/// one that barely moved, are skipped. Gives up after a fixed number of
/// trials.
#[derive(Debug, Clone)]
pub struct Calibrator {
    sweep: Degrees,
    tolerance: f32,
    trials: usize,
    settle: Duration,
}

impl Default for Calibrator {
    fn default() -> Self {
        Self {
            sweep: crate::CALIBRATION_SWEEP,
            tolerance: crate::CALIBRATION_TOLERANCE,
            trials: crate::CALIBRATION_TRIALS,
            settle: Duration::from_millis(300),
        }
    }
}

impl Calibrator {
    /// Time the camera gets to finish turning before the heading is read.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials.max(1);
        self
    }

    pub async fn run<C, A>(&self, compass: &mut C, actuator: &mut A, start: Gain) -> Result<Gain, Fault>
    where
        C: Compass,
        A: Actuator,
    {
        let mut gain = start;
        for trial in 1..=self.trials {
            let counts = (self.sweep * gain).round() as i32;
            let Some(turned) = self.trial(compass, actuator, counts).await else {
                log::debug!("[calibrate] trial {} unreadable", trial);
                continue;
            };
            if turned.abs() < 1.0 {
                log::debug!("[calibrate] trial {} did not turn", trial);
                continue;
            }
            let error = (turned.abs() - self.sweep).abs() / self.sweep;
            gain = counts as f32 / turned.abs();
            log::debug!(
                "[calibrate] trial {}: {} counts turned {:.1}°, gain {:.2}",
                trial,
                counts,
                turned,
                gain
            );
            if error < self.tolerance {
                log::info!("[calibrate] gain {:.2} counts/deg after {} trials", gain, trial);
                return Ok(gain);
            }
        }
        Err(Fault::CalibrationFailed {
            trials: self.trials,
            gain,
        })
    }

    /// Degrees turned by `counts`, if both readings worked.
    async fn trial<C, A>(&self, compass: &mut C, actuator: &mut A, counts: i32) -> Option<Degrees>
    where
        C: Compass,
        A: Actuator,
    {
        let before = Self::read(compass)?;
        if let Err(e) = actuator.send(Input::Mouse(counts, 0)) {
            log::warn!("[calibrate] mouse: {:#}", e);
            return None;
        }
        tokio::time::sleep(self.settle).await;
        let after = Self::read(compass)?;
        Some(wrap(after - before))
    }

    fn read<C: Compass>(compass: &mut C) -> Option<Degrees> {
        compass
            .heading()
            .inspect_err(|e| log::warn!("[calibrate] compass: {:#}", e))
            .ok()
            .flatten()
    }
}
