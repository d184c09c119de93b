use crate::FINGERPRINT_RINGS;
use crate::Pixels;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

/// Rotation-invariant signature of an edge layout: how many edge pixels fall
/// into each of a fixed number of concentric rings around the anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint([u32; FINGERPRINT_RINGS]);

impl Fingerprint {
    /// `points` are relative to the anchor; anything beyond `radius` is dropped.
    pub fn of(points: &[(i32, i32)], radius: Pixels) -> Self {
        let mut rings = [0u32; FINGERPRINT_RINGS];
        if radius <= 0.0 {
            return Self(rings);
        }
        let width = radius / FINGERPRINT_RINGS as Pixels;
        for (x, y) in points {
            let r = ((*x as Pixels).powi(2) + (*y as Pixels).powi(2)).sqrt();
            let ring = (r / width) as usize;
            if ring < FINGERPRINT_RINGS {
                rings[ring] += 1;
            }
        }
        Self(rings)
    }
    pub fn rings(&self) -> &[u32; FINGERPRINT_RINGS] {
        &self.0
    }
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
    /// L1 distance between the normalized histograms, in [0, 2].
    /// Independent of sampling density.
    pub fn distance(&self, other: &Self) -> f32 {
        let a = self.total().max(1) as f32;
        let b = other.total().max(1) as f32;
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(x, y)| (*x as f32 / a - *y as f32 / b).abs())
            .sum()
    }
    /// Stable hex digest, stored in checkpoints to name the map in use.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for ring in self.0.iter() {
            hasher.update(ring.to_le_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}
