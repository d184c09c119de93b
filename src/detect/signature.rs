use super::Screen;
use crate::capability::Frame;
use crate::capability::Region;
use crate::vision::Band;

/// A screen region that must be mostly one color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub region: Region,
    pub band: Band,
    pub fill: f32,
}

impl Probe {
    pub const fn new(region: Region, band: Band, fill: f32) -> Self {
        Self { region, band, fill }
    }
    /// Share of sampled region pixels inside the band.
    pub fn coverage(&self, frame: &Frame) -> f32 {
        let screen = frame.screen();
        let (x, y, w, h) = self.region.pixels(screen.width(), screen.height());
        let mut inside = 0usize;
        let mut total = 0usize;
        for py in (y..y + h).step_by(2) {
            for px in (x..x + w).step_by(2) {
                total += 1;
                if self.band.contains(screen.get_pixel(px, py)) {
                    inside += 1;
                }
            }
        }
        if total == 0 { 0.0 } else { inside as f32 / total as f32 }
    }
    pub fn holds(&self, frame: &Frame) -> bool {
        self.coverage(frame) >= self.fill
    }
}

/// All probes of a screen must hold for the screen to match.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub screen: Screen,
    pub probes: Vec<Probe>,
}

impl Signature {
    pub fn matches(&self, frame: &Frame) -> bool {
        !self.probes.is_empty() && self.probes.iter().all(|p| p.holds(frame))
    }

    /// Panel and glyph colors of the supported UI skin at 16:9.
    pub fn table() -> Vec<Signature> {
        const GOLD: Band = Band::new("gold", [235, 200, 130], 1600);
        const VIOLET: Band = Band::new("violet", [160, 120, 220], 1600);
        const NAVY: Band = Band::new("navy", [20, 30, 60], 900);
        const PARCHMENT: Band = Band::new("parchment", [60, 52, 45], 600);
        const WHITE: Band = Band::new("white", [235, 235, 235], 1200);
        const CRIMSON: Band = Band::new("crimson", [150, 30, 40], 1600);
        const CYAN: Band = Band::new("cyan", [80, 220, 230], 1600);
        const BLACK: Band = Band::new("black", [0, 0, 0], 600);
        let header = Region::new(0.35, 0.08, 0.30, 0.05);
        vec![
            Signature {
                screen: Screen::BlessingScreen,
                probes: vec![
                    Probe::new(header, GOLD, 0.5),
                    Probe::new(Region::new(0.10, 0.30, 0.80, 0.10), NAVY, 0.4),
                ],
            },
            Signature {
                screen: Screen::CurioScreen,
                probes: vec![
                    Probe::new(header, VIOLET, 0.5),
                    Probe::new(Region::new(0.10, 0.30, 0.80, 0.10), NAVY, 0.4),
                ],
            },
            Signature {
                screen: Screen::EventDialog,
                probes: vec![
                    Probe::new(Region::new(0.62, 0.25, 0.33, 0.15), PARCHMENT, 0.6),
                    Probe::new(Region::new(0.75, 0.85, 0.12, 0.05), WHITE, 0.5),
                ],
            },
            Signature {
                screen: Screen::BossSkillPrompt,
                probes: vec![Probe::new(Region::new(0.30, 0.30, 0.40, 0.08), CRIMSON, 0.5)],
            },
            Signature {
                screen: Screen::PortalChoice,
                probes: vec![Probe::new(Region::new(0.42, 0.86, 0.16, 0.04), CYAN, 0.5)],
            },
            Signature {
                screen: Screen::CombatActive,
                probes: vec![Probe::new(Region::new(0.92, 0.03, 0.05, 0.06), WHITE, 0.25)],
            },
            Signature {
                screen: Screen::LoadingTransition,
                probes: vec![Probe::new(Region::new(0.20, 0.20, 0.60, 0.60), BLACK, 0.97)],
            },
        ]
    }
}

/// Paints every probe of a screen's signature onto a screen image.
/// Test and replay fixtures use it to fake the UI.
pub fn paint(screen: &mut image::RgbImage, target: Screen) {
    let (w, h) = screen.dimensions();
    for signature in Signature::table().into_iter().filter(|s| s.screen == target) {
        for probe in signature.probes {
            let (x, y, pw, ph) = probe.region.pixels(w, h);
            for py in y..y + ph {
                for px in x..x + pw {
                    screen.put_pixel(px, py, probe.band.pixel());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use image::RgbImage;
    use std::time::Duration;

    fn frame(screen: RgbImage) -> Frame {
        Frame::new(Duration::ZERO, screen, RgbImage::new(1, 1))
    }

    #[test]
    fn each_painted_screen_matches_only_itself() {
        for target in Screen::ALL.into_iter().filter(|s| *s != Screen::Navigating) {
            let mut screen = RgbImage::from_pixel(192, 108, Rgb([90, 110, 90]));
            paint(&mut screen, target);
            let frame = frame(screen);
            let matched = Signature::table()
                .into_iter()
                .filter(|s| s.matches(&frame))
                .map(|s| s.screen)
                .collect::<Vec<_>>();
            assert_eq!(matched, vec![target]);
        }
    }

    #[test]
    fn coverage_counts_band_pixels() {
        let mut screen = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        for y in 0..100 {
            for x in 0..50 {
                screen.put_pixel(x, y, Rgb([235, 235, 235]));
            }
        }
        let probe = Probe::new(
            Region::new(0.0, 0.0, 1.0, 1.0),
            Band::new("white", [235, 235, 235], 100),
            0.5,
        );
        assert!((probe.coverage(&frame(screen)) - 0.5).abs() < 1e-6);
    }
}
