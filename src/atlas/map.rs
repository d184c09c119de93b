use super::*;
use crate::vision::Arrow;
use crate::vision::Extractor;
use crate::vision::Grid;
use crate::vision::Palette;
use crate::vision::Point;
use anyhow::Context;
use image::RgbImage;

/// A recorded stage map. Immutable after recording.
///
/// Two images go into a map. The reference is a minimap snapshot taken where
/// the recording started and is what global selection correlates against.
/// The annotation is the stitched map in map space: its wall and floor layers
/// drive pose tracking and detours, its marker blobs are the waypoints.
/// The reference snapshot was taken at the first recorded waypoint.
#[derive(Debug, Clone)]
pub struct RecordedMap {
    name: String,
    reference: Grid,
    anchor: Point,
    spread: Grid,
    layout: Grid,
    neighbourhood: Grid,
    walkable: Grid,
    waypoints: Vec<Waypoint>,
    fingerprint: Fingerprint,
}

impl RecordedMap {
    pub fn record(
        name: impl Into<String>,
        reference: &RgbImage,
        annotation: &RgbImage,
        order: Option<&[usize]>,
    ) -> anyhow::Result<Self> {
        let name = name.into();
        let extractor = Extractor::new(Palette::still(), crate::REFERENCE_ACCURACY);
        let snapshot = extractor.classify(reference, Some(crate::MINIMAP_WINDOW));
        anyhow::ensure!(
            snapshot.edges.count() >= crate::MIN_EDGE_PIXELS,
            "reference of {} has only {} edge pixels",
            name,
            snapshot.edges.count()
        );
        let anchor = Arrow::locate(&snapshot.arrow)
            .map(|arrow| arrow.centre)
            .unwrap_or_else(|| snapshot.edges.centre());
        let waypoints = decode(annotation, order);
        anyhow::ensure!(!waypoints.is_empty(), "annotation of {} has no waypoints", name);
        let layers = extractor.classify(annotation, None);
        let mut walkable = layers.floor;
        for (x, y, pixel) in annotation.enumerate_pixels() {
            if Kind::from_marker(pixel).is_some() {
                walkable.set(x as i32, y as i32);
            }
        }
        let (ax, ay) = anchor.rounded();
        let relative = snapshot
            .edges
            .points()
            .into_iter()
            .map(|(x, y)| (x - ax, y - ay))
            .collect::<Vec<_>>();
        let radius = reference.width().min(reference.height()) as f32 / 2.0 * crate::MINIMAP_WINDOW;
        let fingerprint = Fingerprint::of(&relative, radius);
        log::debug!(
            "[atlas] recorded {}: {} reference edges, {} waypoints",
            name,
            snapshot.edges.count(),
            waypoints.len()
        );
        Ok(Self {
            name,
            spread: snapshot.edges.dilate(1),
            reference: snapshot.edges,
            anchor,
            neighbourhood: layers.edges.dilate(1),
            layout: layers.edges,
            walkable,
            waypoints,
            fingerprint,
        })
    }

    /// Reads `<dir>/reference.png`, `<dir>/annotation.png` and the optional
    /// `<dir>/order.json` (a JSON array of blob numbers).
    pub fn open(name: impl Into<String>, dir: &std::path::Path) -> anyhow::Result<Self> {
        let reference = image::open(dir.join("reference.png"))
            .with_context(|| format!("open {}", dir.join("reference.png").display()))?
            .to_rgb8();
        let annotation = image::open(dir.join("annotation.png"))
            .with_context(|| format!("open {}", dir.join("annotation.png").display()))?
            .to_rgb8();
        let sidecar = dir.join("order.json");
        let order = if sidecar.exists() {
            let text = std::fs::read_to_string(&sidecar)
                .with_context(|| format!("read {}", sidecar.display()))?;
            let order = serde_json::from_str::<Vec<usize>>(&text)
                .with_context(|| format!("parse {}", sidecar.display()))?;
            Some(order)
        } else {
            None
        };
        Self::record(name, &reference, &annotation, order.as_deref())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    /// Edge grid of the reference snapshot.
    pub fn reference(&self) -> &Grid {
        &self.reference
    }
    /// Reference edges dilated by one pixel, correlated against.
    pub fn spread(&self) -> &Grid {
        &self.spread
    }
    /// Player position within the reference snapshot.
    pub fn anchor(&self) -> Point {
        self.anchor
    }
    /// Wall layer in map space.
    pub fn layout(&self) -> &Grid {
        &self.layout
    }
    /// Wall layer dilated by one pixel, tracked against.
    pub fn neighbourhood(&self) -> &Grid {
        &self.neighbourhood
    }
    /// Floor in map space, markers included.
    pub fn walkable(&self) -> &Grid {
        &self.walkable
    }
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }
    /// Map-space position where the reference snapshot was taken.
    pub fn origin(&self) -> Point {
        self.waypoints
            .first()
            .map(|w| w.at)
            .unwrap_or_default()
    }
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}
