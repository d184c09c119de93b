use crate::Confidence;
use crate::Degrees;
use crate::vision::Grid;

/// Best placement of a point set onto a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    pub dx: i32,
    pub dy: i32,
    pub rotation: Degrees,
    pub hits: usize,
    pub score: Confidence,
}

/// Rotates points about the origin, rounding to the pixel grid.
pub fn rotate(points: &[(i32, i32)], degrees: Degrees) -> Vec<(i32, i32)> {
    if degrees == 0.0 {
        return points.to_vec();
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    points
        .iter()
        .map(|(x, y)| {
            let (x, y) = (*x as f32, *y as f32);
            (
                (x * cos - y * sin).round() as i32,
                (x * sin + y * cos).round() as i32,
            )
        })
        .collect()
}

/// How many points land on set cells once shifted by `(dx, dy)`.
pub fn hits(points: &[(i32, i32)], target: &Grid, dx: i32, dy: i32) -> usize {
    points
        .iter()
        .filter(|(x, y)| target.get(x + dx, y + dy))
        .count()
}

/// Symmetric steps `-reach..=reach` by `step`, zero first.
fn sweep(reach: i32, step: i32) -> Vec<i32> {
    let step = step.max(1);
    let mut offsets = vec![0];
    let mut d = step;
    while d <= reach {
        offsets.push(-d);
        offsets.push(d);
        d += step;
    }
    offsets
}

/// Exhaustive search over rotations and translations.
///
/// `points` are relative to the observer, `origin` is where the observer sits
/// on `target` with zero offset. Offsets are visited nearest first, so among
/// equal hit counts the smallest correction wins. `score` divides hits by the
/// geometric mean of the two point counts, with the target count rescaled to
/// the sampling stride of `points`.
pub fn correlate(
    points: &[(i32, i32)],
    target: &Grid,
    target_count: usize,
    stride: usize,
    origin: (i32, i32),
    translation: (i32, i32),
    rotation: (Degrees, Degrees),
) -> Alignment {
    let mut shifts = sweep(translation.0, translation.1)
        .into_iter()
        .flat_map(|dy| sweep(translation.0, translation.1).into_iter().map(move |dx| (dx, dy)))
        .collect::<Vec<_>>();
    shifts.sort_by_key(|(dx, dy)| dx * dx + dy * dy);
    let turns = sweep(
        (rotation.0 / rotation.1.max(f32::EPSILON)).round() as i32,
        1,
    )
    .into_iter()
    .map(|k| k as f32 * rotation.1)
    .collect::<Vec<_>>();
    let mut best = Alignment {
        dx: 0,
        dy: 0,
        rotation: 0.0,
        hits: 0,
        score: 0.0,
    };
    for turn in turns {
        let turned = rotate(points, turn);
        for (dx, dy) in shifts.iter().copied() {
            let h = hits(&turned, target, origin.0 + dx, origin.1 + dy);
            if h > best.hits {
                best = Alignment {
                    dx,
                    dy,
                    rotation: turn,
                    hits: h,
                    score: 0.0,
                };
            }
        }
    }
    best.score = score(best.hits, points.len(), target_count, stride);
    best
}

/// Normalized binary cross-correlation in [0, 1].
pub fn score(hits: usize, observed: usize, reference: usize, stride: usize) -> Confidence {
    let expected = reference as f32 / (stride * stride).max(1) as f32;
    let norm = (observed as f32 * expected).sqrt();
    if norm <= 0.0 {
        0.0
    } else {
        (hits as f32 / norm).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> Grid {
        let mut grid = Grid::new(41, 41);
        for i in 5..36 {
            grid.set(i, 5);
            grid.set(i, 35);
            grid.set(5, i);
            grid.set(35, i);
        }
        grid.set(12, 20);
        grid.set(13, 20);
        grid
    }

    #[test]
    fn sweep_visits_zero_first() {
        assert_eq!(sweep(4, 2), vec![0, -2, 2, -4, 4]);
        assert_eq!(sweep(0, 3), vec![0]);
    }

    #[test]
    fn quarter_rotation() {
        assert_eq!(rotate(&[(4, 0)], 90.0), vec![(0, 4)]);
    }

    #[test]
    fn recovers_a_shift() {
        let target = ring();
        let observed = target
            .points()
            .into_iter()
            .map(|(x, y)| (x - 20 + 4, y - 20 - 2))
            .collect::<Vec<_>>();
        let found = correlate(&observed, &target, target.count(), 1, (20, 20), (6, 2), (0.0, 1.0));
        assert_eq!((found.dx, found.dy), (-4, 2));
        assert_eq!(found.hits, target.count());
        assert!((found.score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unrelated_points_score_low() {
        let target = ring();
        let observed = (0..60).map(|i| (i % 7 - 3, i / 7 - 4)).collect::<Vec<_>>();
        let found = correlate(&observed, &target, target.count(), 1, (20, 20), (2, 2), (0.0, 1.0));
        assert!(found.score < 0.3);
    }
}
