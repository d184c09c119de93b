use super::*;
use anyhow::Context;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

/// Prerecorded frames played back in order. Capture fails once the reel
/// runs out, which ends a replay.
#[derive(Debug, Clone, Default)]
pub struct Reel {
    frames: VecDeque<Frame>,
}

impl Reel {
    /// Minimap crop of a 16:9 capture.
    pub const MINIMAP: Region = Region::new(0.0245, 0.0537, 0.0974, 0.1731);

    /// Every PNG in `dir`, in file name order, stamped `interval` apart.
    /// The minimap is cropped from each screen with `minimap`.
    pub fn open(dir: &Path, minimap: Region, interval: Duration) -> anyhow::Result<Self> {
        let mut paths = std::fs::read_dir(dir)
            .with_context(|| format!("list {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")))
            .collect::<Vec<_>>();
        paths.sort();
        let mut frames = VecDeque::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            let screen = image::open(path)
                .with_context(|| format!("open {}", path.display()))?
                .to_rgb8();
            let (x, y, w, h) = minimap.pixels(screen.width(), screen.height());
            let crop = image::imageops::crop_imm(&screen, x, y, w, h).to_image();
            frames.push_back(Frame::new(interval * i as u32, screen, crop));
        }
        log::info!("[reel] {} frames from {}", frames.len(), dir.display());
        Ok(Self { frames })
    }
    pub fn len(&self) -> usize {
        self.frames.len()
    }
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FromIterator<Frame> for Reel {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl Frames for Reel {
    fn capture(&mut self) -> anyhow::Result<Frame> {
        self.frames
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("reel exhausted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use image::RgbImage;

    #[test]
    fn plays_pngs_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(200, 100, Rgb([1, 1, 1]))
            .save(dir.path().join("b.png"))
            .unwrap();
        RgbImage::from_pixel(200, 100, Rgb([2, 2, 2]))
            .save(dir.path().join("a.png"))
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();
        let mut reel = Reel::open(dir.path(), Reel::MINIMAP, Duration::from_millis(100)).unwrap();
        assert_eq!(reel.len(), 2);
        let first = reel.capture().unwrap();
        assert_eq!(first.screen().get_pixel(0, 0), &Rgb([2, 2, 2]));
        assert_eq!(first.minimap().dimensions(), (19, 17));
        let second = reel.capture().unwrap();
        assert_eq!(second.timestamp(), Duration::from_millis(100));
        assert!(reel.capture().is_err());
    }
}
