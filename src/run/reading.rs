use crate::capability::Frame;
use crate::capability::Ocr;
use crate::capability::Recognition;
use crate::capability::Rect;
use crate::decide::tidy;
use crate::detect::Screen;
use image::RgbImage;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// An option read in flight.
///
/// OCR runs on its own task so capture keeps going. The reading remembers
/// which screen epoch it was started for; the pilot throws it away when the
/// screen changed before it finished. Dropping a reading aborts the task.
#[derive(Debug)]
pub struct Reading {
    epoch: u64,
    screen: Screen,
    handle: Option<JoinHandle<anyhow::Result<Vec<Recognition>>>>,
    outcome: Option<anyhow::Result<Vec<Recognition>>>,
}

impl Reading {
    pub fn spawn<O>(ocr: Arc<O>, frame: &Frame, screen: Screen, epoch: u64) -> Self
    where
        O: Ocr + 'static,
    {
        let (width, height) = frame.screen().dimensions();
        let crops = screen
            .options()
            .into_iter()
            .map(|region| {
                let (x, y, w, h) = region.pixels(width, height);
                let bounds = Rect::new(x as i32, (x + w) as i32, y as i32, (y + h) as i32);
                (frame.crop(region), bounds)
            })
            .collect::<Vec<_>>();
        log::debug!("[reading] {} regions of {} (epoch {})", crops.len(), screen, epoch);
        Self {
            epoch,
            screen,
            handle: Some(tokio::spawn(recognize(ocr, screen, crops))),
            outcome: None,
        }
    }
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
    pub fn screen(&self) -> Screen {
        self.screen
    }
    pub fn is_pending(&self) -> bool {
        self.outcome.is_none()
    }
    /// Waits at most `patience` for the task to finish.
    pub async fn settle(&mut self, patience: Duration) {
        if let Some(handle) = self.handle.as_mut() {
            if let Ok(joined) = tokio::time::timeout(patience, handle).await {
                self.handle = None;
                self.outcome = Some(joined.map_err(anyhow::Error::from).and_then(|read| read));
            }
        }
    }
    /// The options, once read. Taking them leaves the reading spent.
    pub fn take(&mut self) -> Option<anyhow::Result<Vec<Recognition>>> {
        self.outcome.take()
    }
}

impl Drop for Reading {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// One recognition per option region, or every span for portal choices.
/// Span boxes come back in screen coordinates.
async fn recognize<O>(ocr: Arc<O>, screen: Screen, crops: Vec<(RgbImage, Rect)>) -> anyhow::Result<Vec<Recognition>>
where
    O: Ocr + ?Sized,
{
    let mut options = Vec::with_capacity(crops.len());
    for (image, bounds) in crops {
        let spans = tidy(ocr.read(&image).await?)
            .into_iter()
            .map(|span| Recognition {
                rect: span.rect.shift(bounds.x0, bounds.y0),
                ..span
            })
            .collect::<Vec<_>>();
        match screen {
            Screen::PortalChoice => options.extend(spans),
            _ => options.push(Recognition::new(
                spans.iter().map(|s| s.text.as_str()).collect::<String>(),
                bounds,
                spans.iter().map(|s| s.confidence).reduce(f32::min).unwrap_or(0.0),
            )),
        }
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Hands out canned answers in call order.
    struct Script(Mutex<Vec<Vec<Recognition>>>);

    #[async_trait::async_trait]
    impl Ocr for Script {
        async fn read(&self, _: &RgbImage) -> anyhow::Result<Vec<Recognition>> {
            let mut answers = self.0.lock().unwrap();
            Ok(if answers.is_empty() { Vec::new() } else { answers.remove(0) })
        }
    }

    fn frame() -> Frame {
        Frame::new(Duration::ZERO, RgbImage::new(1000, 500), RgbImage::new(1, 1))
    }

    #[tokio::test]
    async fn options_are_joined_per_region() {
        let script = Script(Mutex::new(vec![
            vec![
                Recognition::new("天外", Rect::new(0, 40, 0, 20), 0.9),
                Recognition::new("大合唱", Rect::new(45, 100, 2, 20), 0.8),
            ],
            vec![],
            vec![Recognition::new("博士之袍", Rect::new(0, 80, 0, 20), 0.7)],
        ]));
        let mut reading = Reading::spawn(Arc::new(script), &frame(), Screen::CurioScreen, 3);
        reading.settle(Duration::from_secs(5)).await;
        let options = reading.take().unwrap().unwrap();
        assert_eq!(reading.epoch(), 3);
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].text, "天外大合唱");
        assert!((options[0].confidence - 0.8).abs() < 1e-6);
        assert_eq!(options[1].text, "");
        assert_eq!(options[2].text, "博士之袍");
        assert_eq!(options[2].rect.x0, 660);
        assert!(reading.take().is_none());
    }

    #[tokio::test]
    async fn portal_spans_move_to_screen_space() {
        let script = Script(Mutex::new(vec![vec![
            Recognition::new("战斗", Rect::new(10, 50, 10, 30), 0.9),
            Recognition::new("奖励", Rect::new(600, 640, 12, 30), 0.9),
        ]]));
        let mut reading = Reading::spawn(Arc::new(script), &frame(), Screen::PortalChoice, 0);
        reading.settle(Duration::from_secs(5)).await;
        let portals = reading.take().unwrap().unwrap();
        assert_eq!(portals.len(), 2);
        assert_eq!(portals[0].rect.x0, 160);
        assert_eq!(portals[1].rect.y0, 62);
    }
}
