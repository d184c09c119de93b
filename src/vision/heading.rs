use super::Point;
use crate::Degrees;

/// The player marker: an arrow whose apex points along the heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub centre: Point,
    pub heading: Degrees,
}

impl Arrow {
    /// Estimates the arrow from its pixels.
    ///
    /// The apex is the part of a narrow triangle farthest from the centroid,
    /// so the heading is the bearing from the centroid to the mean of the
    /// pixels within half a pixel of the maximum distance.
    pub fn locate(pixels: &[(i32, i32)]) -> Option<Self> {
        if pixels.len() < crate::MIN_ARROW_PIXELS {
            return None;
        }
        let n = pixels.len() as f32;
        let centre = Point::new(
            pixels.iter().map(|(x, _)| *x as f32).sum::<f32>() / n,
            pixels.iter().map(|(_, y)| *y as f32).sum::<f32>() / n,
        );
        let reach = pixels
            .iter()
            .map(|p| centre.distance(&Point::from(*p)))
            .fold(0.0f32, f32::max);
        if reach < 1.0 {
            return None;
        }
        let apex = pixels
            .iter()
            .map(|p| Point::from(*p))
            .filter(|p| centre.distance(p) >= reach - 0.5)
            .collect::<Vec<_>>();
        let tip = Point::new(
            apex.iter().map(|p| p.x).sum::<f32>() / apex.len() as f32,
            apex.iter().map(|p| p.y).sum::<f32>() / apex.len() as f32,
        );
        Some(Self {
            centre,
            heading: centre.bearing(&tip),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::sketch;

    fn arrow_pixels(heading: Degrees) -> Vec<(i32, i32)> {
        let mut image = sketch::canvas(64);
        sketch::arrow(&mut image, Point::new(32.0, 32.0), heading, 12.0);
        image
            .enumerate_pixels()
            .filter(|(_, _, px)| crate::vision::Palette::live().arrow.contains(px))
            .map(|(x, y, _)| (x as i32, y as i32))
            .collect()
    }

    #[test]
    fn recovers_painted_heading() {
        for heading in [0.0, 45.0, 90.0, 160.0, 225.0, 300.0] {
            let arrow = Arrow::locate(&arrow_pixels(heading)).unwrap();
            let error = crate::vision::wrap(arrow.heading - heading).abs();
            assert!(error < 8.0, "painted {} read {}", heading, arrow.heading);
        }
    }

    #[test]
    fn too_few_pixels() {
        assert!(Arrow::locate(&[(1, 1), (2, 2)]).is_none());
    }
}
