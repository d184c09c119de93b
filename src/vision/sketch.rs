//! Synthetic minimap rendering in the live palette.
//! Lets tests and benchmarks exercise the pipeline without game captures.
use super::Palette;
use super::Point;
use crate::atlas::Kind;
use crate::Degrees;
use image::Rgb;
use image::RgbImage;
use rand::Rng;
use rand::SeedableRng;

pub fn canvas(size: u32) -> RgbImage {
    RgbImage::new(size, size)
}

pub fn fill(image: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    for y in y0.max(0)..y1.min(image.height() as i32) {
        for x in x0.max(0)..x1.min(image.width() as i32) {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Walkable block with a one-pixel wall outline.
pub fn room(image: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32) {
    let palette = Palette::live();
    fill(image, x0, y0, x1, y1, palette.edge.pixel());
    fill(image, x0 + 1, y0 + 1, x1 - 1, y1 - 1, palette.floor.pixel());
}

pub fn dot(image: &mut RgbImage, centre: Point, radius: f32, color: Rgb<u8>) {
    let r = radius.ceil() as i32;
    let (cx, cy) = centre.rounded();
    for y in cy - r..=cy + r {
        for x in cx - r..=cx + r {
            let inside = centre.distance(&Point::from((x, y))) <= radius;
            if inside && x >= 0 && y >= 0 && x < image.width() as i32 && y < image.height() as i32 {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Filled isosceles arrow whose centroid sits at `centre`.
pub fn arrow(image: &mut RgbImage, centre: Point, heading: Degrees, length: f32) {
    let apex = centre.toward(heading, length * 2.0 / 3.0);
    let base = centre.toward(heading, -length / 3.0);
    let left = base.toward(heading + 90.0, length * 0.3);
    let right = base.toward(heading - 90.0, length * 0.3);
    let color = Palette::live().arrow.pixel();
    let r = length.ceil() as i32;
    let (cx, cy) = centre.rounded();
    for y in cy - r..=cy + r {
        for x in cx - r..=cx + r {
            let p = Point::from((x, y));
            let inside = [(apex, left), (left, right), (right, apex)]
                .iter()
                .map(|(a, b)| (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x))
                .fold((false, false), |(neg, pos), c| (neg || c < 0.0, pos || c > 0.0));
            let inside = !(inside.0 && inside.1);
            if inside && x >= 0 && y >= 0 && x < image.width() as i32 && y < image.height() as i32 {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// A deterministic floor plan of overlapping rooms joined by corridors.
pub fn layout(seed: u64, size: u32) -> RgbImage {
    let ref mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
    let mut image = canvas(size);
    let s = size as i32;
    let mut previous: Option<(i32, i32)> = None;
    for _ in 0..7 {
        let w = rng.random_range(s / 8..s / 3);
        let h = rng.random_range(s / 8..s / 3);
        let x = rng.random_range(4..s - w - 4);
        let y = rng.random_range(4..s - h - 4);
        room(&mut image, x, y, x + w, y + h);
        let centre = (x + w / 2, y + h / 2);
        if let Some((px, py)) = previous {
            room(&mut image, px.min(centre.0) - 3, py - 3, px.max(centre.0) + 4, py + 4);
            room(&mut image, centre.0 - 3, py.min(centre.1) - 3, centre.0 + 4, py.max(centre.1) + 4);
        }
        previous = Some(centre);
    }
    image
}

/// Square crop of `map` centred on `centre`, with the player arrow painted at
/// its middle. Outside the map is background.
pub fn minimap(map: &RgbImage, centre: (i32, i32), size: u32, heading: Degrees) -> RgbImage {
    let mut image = canvas(size);
    let half = size as i32 / 2;
    for y in 0..size as i32 {
        for x in 0..size as i32 {
            let mx = centre.0 - half + x;
            let my = centre.1 - half + y;
            if mx >= 0 && my >= 0 && mx < map.width() as i32 && my < map.height() as i32 {
                image.put_pixel(x as u32, y as u32, *map.get_pixel(mx as u32, my as u32));
            }
        }
    }
    arrow(&mut image, Point::from((half, half)), heading, 12.0);
    image
}

/// A recordable stage: a reference minimap taken at (80, 80) facing +y and a
/// 160-pixel annotation with a path marker there and the destination at
/// (80, 120).
pub fn stage(seed: u64) -> (RgbImage, RgbImage) {
    let mut annotation = layout(seed, 160);
    room(&mut annotation, 70, 70, 90, 130);
    let reference = minimap(&annotation, (80, 80), 96, 0.0);
    dot(&mut annotation, Point::new(80.0, 80.0), 1.5, Kind::Path.marker().pixel());
    dot(&mut annotation, Point::new(80.0, 120.0), 1.5, Kind::Destination.marker().pixel());
    (reference, annotation)
}
