use super::*;
use crate::Confidence;
use crate::atlas::Atlas;
use crate::atlas::Fingerprint;
use crate::atlas::RecordedMap;
use crate::error::Fault;
use crate::vision::Observation;
use crate::vision::Point;
use rayon::prelude::*;

/// Outcome of global map selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub map: String,
    pub confidence: Confidence,
    pub pose: Pose,
}

/// Global map selection: fingerprint prefilter, then a rotation and
/// translation tolerant correlation against each surviving reference.
///
/// Pure function of its inputs. Candidates are scored in parallel and reduced
/// by score, then by name, so repeated calls agree exactly.
#[derive(Debug, Clone)]
pub struct Matcher {
    threshold: Confidence,
    candidates: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(crate::MIN_MAP_CONFIDENCE)
    }
}

impl Matcher {
    pub fn new(threshold: Confidence) -> Self {
        Self {
            threshold,
            candidates: crate::PREFILTER_CANDIDATES,
        }
    }
    pub fn threshold(&self) -> Confidence {
        self.threshold
    }

    pub fn select(&self, observation: &Observation, atlas: &Atlas) -> Result<Selection, Fault> {
        let points = observation.relative_edges();
        let edges = observation.edges();
        let radius = edges.width().min(edges.height()) as f32 / 2.0 * crate::MINIMAP_WINDOW;
        let print = Fingerprint::of(&points, radius);
        let mut ranked = atlas
            .maps()
            .map(|map| (print.distance(map.fingerprint()), map))
            .collect::<Vec<(f32, &RecordedMap)>>();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.name().cmp(b.1.name())));
        ranked.truncate(self.candidates);
        let scored = ranked
            .par_iter()
            .map(|(_, map)| (*map, Self::align(&points, observation.stride(), map)))
            .collect::<Vec<(&RecordedMap, Alignment)>>();
        for (map, alignment) in scored.iter() {
            log::debug!(
                "[matcher] {:<16} score {:.3} at ({}, {}) {:+.0}°",
                map.name(),
                alignment.score,
                alignment.dx,
                alignment.dy,
                alignment.rotation
            );
        }
        let best = scored.into_iter().reduce(|a, b| {
            match b.1.score.total_cmp(&a.1.score) {
                std::cmp::Ordering::Greater => b,
                std::cmp::Ordering::Less => a,
                std::cmp::Ordering::Equal if b.0.name() < a.0.name() => b,
                std::cmp::Ordering::Equal => a,
            }
        });
        match best {
            Some((map, alignment)) if alignment.score >= self.threshold => {
                let origin = map.origin();
                let position = Point::new(origin.x + alignment.dx as f32, origin.y + alignment.dy as f32);
                let heading = observation.heading().unwrap_or(0.0);
                log::info!("[matcher] selected {} ({:.3})", map.name(), alignment.score);
                Ok(Selection {
                    map: map.name().to_string(),
                    confidence: alignment.score,
                    pose: Pose::new(position, heading, alignment.score),
                })
            }
            Some((_, alignment)) => Err(Fault::NoMapMatch {
                attempts: 1,
                best: alignment.score,
            }),
            None => Err(Fault::NoMapMatch {
                attempts: 1,
                best: 0.0,
            }),
        }
    }

    fn align(points: &[(i32, i32)], stride: usize, map: &RecordedMap) -> Alignment {
        correlate(
            points,
            map.spread(),
            map.reference().count(),
            stride,
            map.anchor().rounded(),
            (crate::SELECT_TRANSLATION, crate::SELECT_TRANSLATION_STEP),
            (crate::SELECT_ROTATION, crate::SELECT_ROTATION_STEP),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::Extractor;
    use crate::vision::sketch;
    use std::time::Duration;

    fn atlas() -> Atlas {
        [1, 2, 3]
            .into_iter()
            .map(|seed| {
                let (reference, annotation) = sketch::stage(seed);
                RecordedMap::record(format!("stage-{}", seed), &reference, &annotation, None).unwrap()
            })
            .collect()
    }

    fn observe(seed: u64, at: (i32, i32)) -> Observation {
        let (_, annotation) = sketch::stage(seed);
        let minimap = sketch::minimap(&annotation, at, 96, 30.0);
        Extractor::default().observe(&minimap, Duration::ZERO).unwrap()
    }

    #[test]
    fn selects_the_right_map() {
        let selection = Matcher::default().select(&observe(2, (80, 80)), &atlas()).unwrap();
        assert_eq!(selection.map, "stage-2");
        assert!(selection.confidence > 0.8);
        assert!(selection.pose.position.distance(&Point::new(80.0, 80.0)) <= 1.5);
    }

    #[test]
    fn tolerates_an_offset_start() {
        let selection = Matcher::default().select(&observe(3, (84, 78)), &atlas()).unwrap();
        assert_eq!(selection.map, "stage-3");
        assert!(selection.pose.position.distance(&Point::new(84.0, 78.0)) <= 1.5);
    }

    #[test]
    fn selection_is_deterministic() {
        let atlas = atlas();
        let observation = observe(1, (82, 82));
        let first = Matcher::default().select(&observation, &atlas);
        for _ in 0..4 {
            assert_eq!(Matcher::default().select(&observation, &atlas), first);
        }
    }

    #[test]
    fn unknown_layout_is_no_match() {
        let mut minimap = sketch::canvas(96);
        sketch::room(&mut minimap, 10, 10, 86, 86);
        sketch::arrow(&mut minimap, Point::new(48.0, 48.0), 0.0, 12.0);
        let observation = Extractor::default().observe(&minimap, Duration::ZERO).unwrap();
        match Matcher::new(0.6).select(&observation, &atlas()) {
            Err(Fault::NoMapMatch { attempts, best }) => {
                assert_eq!(attempts, 1);
                assert!(best < 0.6);
            }
            other => panic!("expected no match, got {:?}", other),
        }
    }

    #[test]
    fn empty_atlas_is_no_match() {
        let result = Matcher::default().select(&observe(1, (80, 80)), &Atlas::default());
        assert!(matches!(result, Err(Fault::NoMapMatch { .. })));
    }
}
