use super::thresholds::Thresholds;
use crate::core::models::protein::RatioMatrix;
use nalgebra::DMatrix;
use serde::Serialize;

/// Stabilization and destabilization fractions of one fold-change matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FloodScores {
    pub stabilization: f64,
    pub destabilization: f64,
}

impl FloodScores {
    pub const ZERO: Self = Self {
        stabilization: 0.0,
        destabilization: 0.0,
    };

    pub fn combined(&self) -> f64 {
        self.stabilization - self.destabilization
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Ascend,
    Descend,
}

impl Direction {
    #[inline]
    fn improves(self, candidate: f64, current: f64) -> bool {
        match self {
            Direction::Ascend => candidate > current,
            Direction::Descend => candidate < current,
        }
    }

    #[inline]
    fn is_start(self, value: f64) -> bool {
        match self {
            Direction::Ascend => value >= 1.0,
            Direction::Descend => value <= 1.0,
        }
    }
}

/// Scores a normalized matrix against `thresholds`.
///
/// Matrices with fewer than half of their cells finite score zero in both directions.
pub fn score(matrix: &RatioMatrix, thresholds: Thresholds) -> FloodScores {
    if !has_enough_data(matrix) {
        return FloodScores::ZERO;
    }
    FloodScores {
        stabilization: flood(matrix, Direction::Ascend, |peak| peak > thresholds.max),
        destabilization: flood(matrix, Direction::Descend, |trough| trough < thresholds.min),
    }
}

/// Fraction of cells whose ascent converges on the most popular peak above `max_threshold`.
pub fn stabilization(matrix: &RatioMatrix, max_threshold: f64) -> f64 {
    if !has_enough_data(matrix) {
        return 0.0;
    }
    flood(matrix, Direction::Ascend, |peak| peak > max_threshold)
}

/// Fraction of cells whose descent converges on the most popular trough below `min_threshold`.
pub fn destabilization(matrix: &RatioMatrix, min_threshold: f64) -> f64 {
    if !has_enough_data(matrix) {
        return 0.0;
    }
    flood(matrix, Direction::Descend, |trough| trough < min_threshold)
}

fn has_enough_data(matrix: &RatioMatrix) -> bool {
    let total = matrix.len();
    let finite = matrix.iter().filter(|v| v.is_finite()).count();
    total > 0 && finite * 2 >= total
}

fn flood<F>(matrix: &RatioMatrix, direction: Direction, counts: F) -> f64
where
    F: Fn(f64) -> bool,
{
    let (rows, cols) = matrix.shape();
    let mut hits = DMatrix::<u32>::zeros(rows, cols);

    for i in 0..rows {
        for j in 0..cols {
            let value = matrix[(i, j)];
            if !value.is_finite() || !direction.is_start(value) {
                continue;
            }
            let extremum = climb(matrix, (i, j), direction);
            if counts(matrix[extremum]) {
                hits[extremum] += 1;
            }
        }
    }

    let best = hits.iter().copied().max().unwrap_or(0);
    best as f64 / matrix.len() as f64
}

/// Walks from `start` to a local extremum of the 4-neighbourhood.
///
/// At each step every finite neighbour is compared with the best candidate so far in the
/// order up, down, left, right, so the first strictly better neighbour wins ties.
fn climb(matrix: &RatioMatrix, start: (usize, usize), direction: Direction) -> (usize, usize) {
    let (rows, cols) = matrix.shape();
    let mut current = start;
    loop {
        let (i, j) = current;
        let mut best = current;
        let mut best_value = matrix[current];

        let neighbours = [
            (i > 0).then(|| (i - 1, j)),
            (i + 1 < rows).then(|| (i + 1, j)),
            (j > 0).then(|| (i, j - 1)),
            (j + 1 < cols).then(|| (i, j + 1)),
        ];
        for cell in neighbours.into_iter().flatten() {
            let value = matrix[cell];
            if value.is_finite() && direction.improves(value, best_value) {
                best = cell;
                best_value = value;
            }
        }

        if best == current {
            return current;
        }
        current = best;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAN: f64 = f64::NAN;

    fn matrix(rows: &[&[f64]]) -> RatioMatrix {
        RatioMatrix::from_fn(rows.len(), rows[0].len(), |i, j| rows[i][j])
    }

    fn scenario_thresholds() -> Thresholds {
        Thresholds::new(0.8, 1.2)
    }

    #[test]
    fn flat_matrix_scores_zero() {
        let m = matrix(&[&[1.0, 1.0], &[1.0, 1.0]]);
        let scores = score(&m, scenario_thresholds());
        assert_eq!(scores, FloodScores::ZERO);
        assert_eq!(scores.combined(), 0.0);
    }

    #[test]
    fn single_dominant_peak_collects_its_basin() {
        let m = matrix(&[&[2.0, 1.5], &[0.5, 0.7]]);
        let scores = score(&m, scenario_thresholds());

        assert_eq!(scores.stabilization, 0.5);
        assert_eq!(scores.destabilization, 0.5);
    }

    #[test]
    fn stabilized_and_destabilized_profiles_score_with_opposite_signs() {
        let stabilized = matrix(&[&[2.0, 1.5], &[0.5, 0.5]]);
        let destabilized = matrix(&[&[0.5, 0.7], &[2.0, 2.0]]);

        let up = score(&stabilized, scenario_thresholds()).combined();
        let down = score(&destabilized, scenario_thresholds()).combined();

        assert_eq!(up, 0.25);
        assert_eq!(down, -0.25);
    }

    #[test]
    fn plateaus_are_their_own_extrema() {
        let m = matrix(&[&[2.0, 2.0], &[0.5, 0.5]]);
        let scores = score(&m, scenario_thresholds());

        assert_eq!(scores.stabilization, 0.25);
        assert_eq!(scores.destabilization, 0.25);
    }

    #[test]
    fn peaks_within_thresholds_are_not_counted() {
        let m = matrix(&[&[1.1, 1.05], &[0.9, 0.95]]);
        assert_eq!(score(&m, scenario_thresholds()), FloodScores::ZERO);
    }

    #[test]
    fn ascent_walks_multiple_steps_to_the_global_peak() {
        let m = matrix(&[
            &[1.0, 1.1, 1.2, 1.3],
            &[1.1, 1.2, 1.3, 1.4],
            &[1.2, 1.3, 1.4, 3.0],
        ]);
        assert_eq!(stabilization(&m, 1.2), 1.0);
        assert_eq!(destabilization(&m, 0.8), 0.0);
    }

    #[test]
    fn ties_between_neighbours_follow_up_down_left_right_order() {
        let m = matrix(&[&[1.0, 2.0, 1.0], &[2.0, 1.0, 1.0], &[1.0, 1.0, 1.0]]);
        assert_eq!(climb(&m, (1, 1), Direction::Ascend), (0, 1));
    }

    #[test]
    fn missing_neighbours_are_never_visited() {
        let m = matrix(&[&[1.0, NAN, 1.0], &[1.5, 1.0, 1.0], &[1.0, 1.0, 1.0]]);
        assert_eq!(climb(&m, (1, 1), Direction::Ascend), (1, 0));
    }

    #[test]
    fn mostly_missing_matrix_scores_zero_regardless_of_values() {
        let m = matrix(&[&[5.0, NAN, NAN], &[NAN, 0.1, NAN]]);
        assert_eq!(score(&m, scenario_thresholds()), FloodScores::ZERO);
        assert_eq!(stabilization(&m, 1.2), 0.0);
        assert_eq!(destabilization(&m, 0.8), 0.0);
    }

    #[test]
    fn half_missing_matrix_is_still_scored() {
        let m = matrix(&[&[5.0, NAN], &[NAN, 1.0]]);
        assert_eq!(stabilization(&m, 1.2), 0.25);
    }

    #[test]
    fn empty_matrix_scores_zero() {
        let m = RatioMatrix::zeros(0, 0);
        assert_eq!(score(&m, scenario_thresholds()), FloodScores::ZERO);
    }

    #[test]
    fn repeated_scoring_is_deterministic() {
        let m = matrix(&[
            &[1.3, 0.7, 1.9, 1.0],
            &[0.6, 1.4, 1.1, 0.4],
            &[1.8, 0.9, 0.5, 2.2],
        ]);
        let first = score(&m, scenario_thresholds());
        for _ in 0..10 {
            assert_eq!(score(&m, scenario_thresholds()), first);
        }
    }
}
