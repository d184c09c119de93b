use super::*;
use crate::capability::Frame;
use crate::error::Fault;
use crate::vision::Observation;
use std::time::Duration;

/// Result of one classification poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Screen(Screen),
    /// Ambiguous or unreadable; poll again next frame.
    Defer,
}

/// Screen classifier with a bounded wait.
///
/// Exactly one matching signature names the screen. With none, a readable
/// minimap means free navigation. Anything else defers. Deferring, and
/// loading, may last at most `timeout` of frame time before the detector
/// reports the screen stuck.
#[derive(Debug, Clone)]
pub struct Detector {
    signatures: Vec<Signature>,
    timeout: Duration,
    waiting: Option<Duration>,
    last: Option<Screen>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(crate::STUCK_TIMEOUT)
    }
}

impl Detector {
    pub fn new(timeout: Duration) -> Self {
        Self {
            signatures: Signature::table(),
            timeout,
            waiting: None,
            last: None,
        }
    }
    pub fn with_signatures(mut self, signatures: Vec<Signature>) -> Self {
        self.signatures = signatures;
        self
    }
    /// Last screen positively identified.
    pub fn last(&self) -> Option<Screen> {
        self.last
    }
    /// Forgets any wait in progress, e.g. after a pause.
    pub fn reset(&mut self) {
        self.waiting = None;
    }

    pub fn poll(&mut self, frame: &Frame, observation: Option<&Observation>) -> Result<Verdict, Fault> {
        let mut matched = self
            .signatures
            .iter()
            .filter(|s| s.matches(frame))
            .map(|s| s.screen)
            .collect::<Vec<Screen>>();
        matched.sort();
        matched.dedup();
        let verdict = match matched.as_slice() {
            [screen] => Verdict::Screen(*screen),
            [] if observation.is_some() => Verdict::Screen(Screen::Navigating),
            _ => Verdict::Defer,
        };
        if let Verdict::Screen(screen) = verdict {
            if self.last != Some(screen) {
                log::debug!("[detector] {}", screen);
            }
            self.last = Some(screen);
        }
        match verdict {
            Verdict::Defer | Verdict::Screen(Screen::LoadingTransition) => {
                let since = *self.waiting.get_or_insert(frame.timestamp());
                let waited = frame.timestamp().saturating_sub(since);
                if waited > self.timeout {
                    log::error!("[detector] no transition after {:.1}s", waited.as_secs_f32());
                    return Err(Fault::ScreenStuck {
                        screen: self.last,
                        waited,
                    });
                }
            }
            Verdict::Screen(_) => self.waiting = None,
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::Extractor;
    use crate::vision::sketch;
    use image::Rgb;
    use image::RgbImage;

    fn frame(at: u64, screen: Option<Screen>, minimap: RgbImage) -> Frame {
        let mut image = RgbImage::from_pixel(192, 108, Rgb([90, 110, 90]));
        if let Some(screen) = screen {
            paint(&mut image, screen);
        }
        Frame::new(Duration::from_secs(at), image, minimap)
    }

    fn readable() -> (RgbImage, Observation) {
        let (reference, _) = sketch::stage(1);
        let observation = Extractor::default().observe(&reference, Duration::ZERO).unwrap();
        (reference, observation)
    }

    #[test]
    fn readable_minimap_without_panels_is_navigation() {
        let (minimap, observation) = readable();
        let mut detector = Detector::default();
        let verdict = detector.poll(&frame(0, None, minimap), Some(&observation));
        assert_eq!(verdict, Ok(Verdict::Screen(Screen::Navigating)));
    }

    #[test]
    fn panels_win_over_the_minimap() {
        let (minimap, observation) = readable();
        let mut detector = Detector::default();
        let verdict = detector.poll(&frame(0, Some(Screen::CurioScreen), minimap), Some(&observation));
        assert_eq!(verdict, Ok(Verdict::Screen(Screen::CurioScreen)));
    }

    #[test]
    fn ambiguity_defers() {
        let mut image = RgbImage::from_pixel(192, 108, Rgb([90, 110, 90]));
        paint(&mut image, Screen::BossSkillPrompt);
        paint(&mut image, Screen::PortalChoice);
        let both = Frame::new(Duration::ZERO, image, RgbImage::new(1, 1));
        let mut detector = Detector::default();
        assert_eq!(detector.poll(&both, None), Ok(Verdict::Defer));
        let nothing = frame(1, None, RgbImage::new(1, 1));
        assert_eq!(detector.poll(&nothing, None), Ok(Verdict::Defer));
    }

    #[test]
    fn endless_loading_gets_stuck() {
        let mut detector = Detector::new(Duration::from_secs(5));
        for t in 0..=5 {
            let verdict = detector.poll(&frame(t, Some(Screen::LoadingTransition), RgbImage::new(1, 1)), None);
            assert_eq!(verdict, Ok(Verdict::Screen(Screen::LoadingTransition)));
        }
        let stuck = detector.poll(&frame(6, Some(Screen::LoadingTransition), RgbImage::new(1, 1)), None);
        assert_eq!(
            stuck,
            Err(Fault::ScreenStuck {
                screen: Some(Screen::LoadingTransition),
                waited: Duration::from_secs(6),
            })
        );
    }

    #[test]
    fn a_clear_screen_restarts_the_clock() {
        let (minimap, observation) = readable();
        let mut detector = Detector::new(Duration::from_secs(5));
        for t in 0..5 {
            detector.poll(&frame(t, None, RgbImage::new(1, 1)), None).unwrap();
        }
        detector.poll(&frame(5, None, minimap), Some(&observation)).unwrap();
        for t in 6..11 {
            assert_eq!(detector.poll(&frame(t, None, RgbImage::new(1, 1)), None), Ok(Verdict::Defer));
        }
    }
}
