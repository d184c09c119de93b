use image::RgbImage;
use std::time::Duration;

/// Rectangle in screen-relative coordinates, each component in [0, 1].
/// Keeps fixed UI regions independent of the capture resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Region {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
    /// Pixel rectangle `(x, y, w, h)` clipped to an image of the given size.
    pub fn pixels(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let x = ((self.x * width as f32).round() as u32).min(width);
        let y = ((self.y * height as f32).round() as u32).min(height);
        let w = ((self.w * width as f32).round() as u32).min(width - x);
        let h = ((self.h * height as f32).round() as u32).min(height - y);
        (x, y, w, h)
    }
}

/// One capture: the full screen plus the minimap crop, stamped with the
/// monotonic time since capture started.
#[derive(Debug, Clone)]
pub struct Frame {
    timestamp: Duration,
    screen: RgbImage,
    minimap: RgbImage,
}

impl Frame {
    pub fn new(timestamp: Duration, screen: RgbImage, minimap: RgbImage) -> Self {
        Self {
            timestamp,
            screen,
            minimap,
        }
    }
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }
    pub fn screen(&self) -> &RgbImage {
        &self.screen
    }
    pub fn minimap(&self) -> &RgbImage {
        &self.minimap
    }
    /// Copy of a screen region.
    pub fn crop(&self, region: Region) -> RgbImage {
        let (x, y, w, h) = region.pixels(self.screen.width(), self.screen.height());
        image::imageops::crop_imm(&self.screen, x, y, w, h).to_image()
    }
}

/// Source of frames. Capture may block until the game window is focused.
pub trait Frames: Send {
    fn capture(&mut self) -> anyhow::Result<Frame>;
}

impl<F: Frames + ?Sized> Frames for &mut F {
    fn capture(&mut self) -> anyhow::Result<Frame> {
        (**self).capture()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_clips_to_image() {
        let region = Region::new(0.75, 0.5, 0.5, 0.75);
        assert_eq!(region.pixels(100, 40), (75, 20, 25, 20));
    }

    #[test]
    fn crop_copies_region() {
        let mut screen = RgbImage::new(10, 10);
        screen.put_pixel(5, 5, image::Rgb([9, 9, 9]));
        let frame = Frame::new(Duration::ZERO, screen, RgbImage::new(1, 1));
        let crop = frame.crop(Region::new(0.5, 0.5, 0.2, 0.2));
        assert_eq!(crop.dimensions(), (2, 2));
        assert_eq!(crop.get_pixel(0, 0), &image::Rgb([9, 9, 9]));
    }
}
