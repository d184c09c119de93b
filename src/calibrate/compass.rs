use crate::Degrees;
use crate::capability::Frames;
use crate::vision::Extractor;

/// Reports which way the camera faces.
pub trait Compass {
    /// `None` when the heading cannot be read right now.
    fn heading(&mut self) -> anyhow::Result<Option<Degrees>>;
}

/// Reads the heading off the player arrow on the minimap.
pub struct MinimapCompass<F> {
    frames: F,
    extractor: Extractor,
}

impl<F: Frames> MinimapCompass<F> {
    pub fn new(frames: F, extractor: Extractor) -> Self {
        Self { frames, extractor }
    }
    pub fn into_inner(self) -> F {
        self.frames
    }
}

impl<F: Frames> Compass for MinimapCompass<F> {
    fn heading(&mut self) -> anyhow::Result<Option<Degrees>> {
        let frame = self.frames.capture()?;
        Ok(self
            .extractor
            .extract(&frame)
            .ok()
            .and_then(|observation| observation.heading()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Frame;
    use crate::capability::Reel;
    use crate::vision::sketch;
    use std::time::Duration;

    #[test]
    fn reads_the_arrow() {
        let mut plan = sketch::layout(5, 160);
        sketch::room(&mut plan, 70, 70, 90, 130);
        let frames = [90.0, 200.0]
            .into_iter()
            .map(|heading| sketch::minimap(&plan, (80, 80), 96, heading))
            .chain(std::iter::once(sketch::canvas(96)))
            .map(|minimap| Frame::new(Duration::ZERO, image::RgbImage::new(4, 4), minimap))
            .collect::<Reel>();
        let mut compass = MinimapCompass::new(frames, Extractor::default());
        let east = compass.heading().unwrap().unwrap();
        assert!(crate::vision::wrap(east - 90.0).abs() < 8.0);
        let south = compass.heading().unwrap().unwrap();
        assert!(crate::vision::wrap(south - 200.0).abs() < 8.0);
        assert_eq!(compass.heading().unwrap(), None);
        assert!(compass.heading().is_err());
    }
}
