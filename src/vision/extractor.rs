use super::*;
use crate::capability::Frame;
use crate::error::Fault;
use image::RgbImage;
use std::time::Duration;

/// Per-band masks of one image, before any readability judgement.
#[derive(Debug, Clone)]
pub struct Layers {
    pub edges: Grid,
    pub floor: Grid,
    pub markers: Grid,
    pub enemies: Grid,
    pub arrow: Vec<(i32, i32)>,
}

/// Signal extractor: classifies minimap pixels into bands.
#[derive(Debug, Clone)]
pub struct Extractor {
    palette: Palette,
    stride: usize,
    min_edges: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Palette::live(), crate::REFERENCE_ACCURACY)
    }
}

impl Extractor {
    pub fn new(palette: Palette, accuracy: u32) -> Self {
        Self {
            palette,
            stride: Self::stride_for(accuracy),
            min_edges: crate::MIN_EDGE_PIXELS,
        }
    }
    pub fn with_min_edges(mut self, min_edges: usize) -> Self {
        self.min_edges = min_edges;
        self
    }
    /// Sampling stride for an accuracy setting: the reference accuracy samples
    /// every pixel, half of it every second pixel, and so on.
    pub fn stride_for(accuracy: u32) -> usize {
        if accuracy == 0 {
            return crate::MAX_SAMPLING_STRIDE;
        }
        let stride = (crate::REFERENCE_ACCURACY as f32 / accuracy as f32).round() as usize;
        stride.clamp(1, crate::MAX_SAMPLING_STRIDE)
    }
    pub fn stride(&self) -> usize {
        self.stride
    }
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn extract(&self, frame: &Frame) -> Result<Observation, Fault> {
        self.observe(frame.minimap(), frame.timestamp())
    }

    /// Builds an observation, or reports the frame unreadable when too few
    /// wall pixels survive. Unreadable frames are skipped, not errors.
    pub fn observe(&self, image: &RgbImage, timestamp: Duration) -> Result<Observation, Fault> {
        let layers = self.classify(image, Some(crate::MINIMAP_WINDOW));
        let edges = layers.edges.count();
        let needed = (self.min_edges / (self.stride * self.stride)).max(1);
        if edges < needed {
            log::debug!("[extractor] unreadable frame: {} < {} edge pixels", edges, needed);
            return Err(Fault::UnreadableFrame { edges });
        }
        let arrow = Arrow::locate(&layers.arrow);
        let anchor = arrow.map(|a| a.centre).unwrap_or_else(|| layers.edges.centre());
        Ok(Observation::new(
            timestamp,
            layers.edges,
            layers.markers,
            layers.enemies,
            anchor,
            arrow.map(|a| a.heading),
            self.stride,
        ))
    }

    /// Classifies sampled pixels. With a window, pixels outside the circle of
    /// that radius (relative to the half-width) are ignored.
    pub fn classify(&self, image: &RgbImage, window: Option<f32>) -> Layers {
        let (w, h) = image.dimensions();
        let mut edges = Grid::new(w, h);
        let mut floor = Grid::new(w, h);
        let mut markers = Grid::new(w, h);
        let mut enemies = Grid::new(w, h);
        let mut arrow = Vec::new();
        let centre = edges.centre();
        let radius = window.map(|r| r * w.min(h) as f32 / 2.0);
        for y in (0..h).step_by(self.stride) {
            for x in (0..w).step_by(self.stride) {
                let (xi, yi) = (x as i32, y as i32);
                if let Some(radius) = radius {
                    if centre.distance(&Point::from((xi, yi))) > radius {
                        continue;
                    }
                }
                match self.palette.classify(image.get_pixel(x, y)) {
                    Class::Edge => edges.set(xi, yi),
                    Class::Floor => floor.set(xi, yi),
                    Class::Marker => markers.set(xi, yi),
                    Class::Enemy => enemies.set(xi, yi),
                    Class::Arrow => arrow.push((xi, yi)),
                    Class::Background => continue,
                }
            }
        }
        let reach = crate::EDGE_FLOOR_REACH * self.stride as i32;
        let edges = edges.and(&floor.dilate(reach));
        Layers {
            edges,
            floor,
            markers,
            enemies,
            arrow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimap() -> RgbImage {
        let mut image = sketch::canvas(96);
        sketch::room(&mut image, 20, 20, 76, 60);
        sketch::room(&mut image, 40, 58, 56, 80);
        sketch::arrow(&mut image, Point::new(48.0, 40.0), 90.0, 12.0);
        image
    }

    #[test]
    fn stride_from_accuracy() {
        assert_eq!(Extractor::stride_for(1440), 1);
        assert_eq!(Extractor::stride_for(2880), 1);
        assert_eq!(Extractor::stride_for(720), 2);
        assert_eq!(Extractor::stride_for(480), 3);
        assert_eq!(Extractor::stride_for(10), crate::MAX_SAMPLING_STRIDE);
        assert_eq!(Extractor::stride_for(0), crate::MAX_SAMPLING_STRIDE);
    }

    #[test]
    fn blank_frame_is_unreadable() {
        let extractor = Extractor::default();
        let result = extractor.observe(&sketch::canvas(96), Duration::ZERO);
        assert_eq!(result.unwrap_err(), Fault::UnreadableFrame { edges: 0 });
    }

    #[test]
    fn sparse_frame_is_unreadable_never_a_pose() {
        let mut image = sketch::canvas(96);
        sketch::room(&mut image, 44, 44, 50, 50);
        sketch::arrow(&mut image, Point::new(48.0, 48.0), 0.0, 12.0);
        let extractor = Extractor::default();
        match extractor.observe(&image, Duration::ZERO) {
            Err(Fault::UnreadableFrame { edges }) => assert!(edges < crate::MIN_EDGE_PIXELS),
            other => panic!("expected unreadable, got {:?}", other),
        }
    }

    #[test]
    fn walls_without_floor_are_ignored() {
        let mut image = sketch::canvas(96);
        sketch::fill(&mut image, 10, 40, 86, 44, Palette::live().edge.pixel());
        let layers = Extractor::default().classify(&image, Some(crate::MINIMAP_WINDOW));
        assert_eq!(layers.edges.count(), 0);
    }

    #[test]
    fn reads_walls_and_heading() {
        let observation = Extractor::default()
            .observe(&minimap(), Duration::from_millis(40))
            .unwrap();
        assert!(observation.edges().count() >= crate::MIN_EDGE_PIXELS);
        assert!(observation.anchor().distance(&Point::new(48.0, 40.0)) < 1.5);
        let heading = observation.heading().unwrap();
        assert!(wrap(heading - 90.0).abs() < 8.0);
        assert_eq!(observation.timestamp(), Duration::from_millis(40));
    }

    #[test]
    fn coarse_sampling_still_reads() {
        let extractor = Extractor::new(Palette::live(), 720);
        let observation = extractor.observe(&minimap(), Duration::ZERO).unwrap();
        assert_eq!(observation.stride(), 2);
        assert!(observation.edges().points().iter().all(|(x, y)| x % 2 == 0 && y % 2 == 0));
    }

    #[test]
    fn corners_outside_window_are_ignored() {
        let mut image = minimap();
        sketch::room(&mut image, 0, 0, 8, 8);
        let with = Extractor::default().classify(&image, Some(crate::MINIMAP_WINDOW));
        let without = Extractor::default().classify(&image, None);
        assert!(!with.edges.get(0, 0));
        assert!(without.edges.get(0, 0));
    }
}
