use super::Kind;
use super::Waypoint;
use crate::vision::Point;
use image::RgbImage;

/// Decodes the waypoint layer of an annotation image.
///
/// Every 8-connected blob of a marker color becomes one waypoint at the
/// blob's centroid. Blobs are numbered in row-major order of their first
/// pixel; `order` lists those numbers in recording order. Numbers missing
/// from `order` follow in scan order, unknown numbers are skipped.
pub fn decode(image: &RgbImage, order: Option<&[usize]>) -> Vec<Waypoint> {
    let scanned = blobs(image);
    let mut taken = vec![false; scanned.len()];
    let mut waypoints = Vec::with_capacity(scanned.len());
    for &i in order.unwrap_or(&[]) {
        match taken.get(i) {
            Some(false) => {
                taken[i] = true;
                waypoints.push(scanned[i]);
            }
            Some(true) => log::warn!("[annotation] blob {} ordered twice", i),
            None => log::warn!("[annotation] blob {} not in image", i),
        }
    }
    for (i, waypoint) in scanned.into_iter().enumerate() {
        if !taken[i] {
            waypoints.push(waypoint);
        }
    }
    waypoints
}

fn blobs(image: &RgbImage) -> Vec<Waypoint> {
    let (w, h) = image.dimensions();
    let kinds = image
        .pixels()
        .map(Kind::from_marker)
        .collect::<Vec<Option<Kind>>>();
    let mut seen = vec![false; kinds.len()];
    let mut found = Vec::new();
    for start in 0..kinds.len() {
        let Some(kind) = kinds[start] else { continue };
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut stack = vec![start];
        let (mut sx, mut sy, mut n) = (0f64, 0f64, 0f64);
        while let Some(i) = stack.pop() {
            let (x, y) = ((i % w as usize) as i64, (i / w as usize) as i64);
            sx += x as f64;
            sy += y as f64;
            n += 1.0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let (nx, ny) = (x + dx, y + dy);
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    let j = ny as usize * w as usize + nx as usize;
                    if !seen[j] && kinds[j] == Some(kind) {
                        seen[j] = true;
                        stack.push(j);
                    }
                }
            }
        }
        found.push(Waypoint::new(
            kind,
            Point::new((sx / n) as f32, (sy / n) as f32),
        ));
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::sketch;

    fn annotation() -> RgbImage {
        let mut image = sketch::canvas(64);
        sketch::room(&mut image, 0, 0, 64, 64);
        sketch::dot(&mut image, Point::new(50.0, 10.0), 2.0, Kind::Path.marker().pixel());
        sketch::dot(&mut image, Point::new(10.0, 30.0), 2.0, Kind::Interaction.marker().pixel());
        sketch::dot(&mut image, Point::new(30.0, 30.0), 2.0, Kind::Danger.marker().pixel());
        sketch::dot(&mut image, Point::new(20.0, 55.0), 2.0, Kind::Destination.marker().pixel());
        image
    }

    #[test]
    fn scan_order_without_sidecar() {
        let waypoints = decode(&annotation(), None);
        let kinds = waypoints.iter().map(|w| w.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![Kind::Path, Kind::Interaction, Kind::Danger, Kind::Destination]
        );
        assert!(waypoints[0].at.distance(&Point::new(50.0, 10.0)) < 0.01);
        assert!(waypoints[3].at.distance(&Point::new(20.0, 55.0)) < 0.01);
    }

    #[test]
    fn sidecar_reorders() {
        let waypoints = decode(&annotation(), Some(&[2, 0, 9, 2]));
        let kinds = waypoints.iter().map(|w| w.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![Kind::Danger, Kind::Path, Kind::Interaction, Kind::Destination]
        );
    }

    #[test]
    fn touching_markers_of_different_kinds_stay_apart() {
        let mut image = sketch::canvas(16);
        sketch::fill(&mut image, 2, 2, 6, 6, Kind::Path.marker().pixel());
        sketch::fill(&mut image, 6, 2, 10, 6, Kind::Danger.marker().pixel());
        assert_eq!(decode(&image, None).len(), 2);
    }

    #[test]
    fn plain_map_has_no_waypoints() {
        let mut image = sketch::canvas(16);
        sketch::room(&mut image, 0, 0, 16, 16);
        assert!(decode(&image, None).is_empty());
    }
}
