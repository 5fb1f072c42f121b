use crate::core::models::protein::RatioMatrix;

/// Mean absolute difference of `other` from `selected`, cell by cell.
///
/// A cell missing in only one matrix contributes the other matrix's value; a cell missing in
/// both is skipped. The sum is divided by the number of contributing cells, so the result is
/// `NaN` when no cell contributed. Both matrices must have the same shape.
pub fn mean_difference(selected: &RatioMatrix, other: &RatioMatrix) -> f64 {
    let (sum, contributing) = selected.iter().zip(other.iter()).fold(
        (0.0, 0usize),
        |(sum, n), (&s, &p)| match (s.is_finite(), p.is_finite()) {
            (true, true) => (sum + (s - p).abs(), n + 1),
            (false, true) => (sum + p, n + 1),
            (true, false) => (sum + s, n + 1),
            (false, false) => (sum, n),
        },
    );
    if contributing == 0 {
        f64::NAN
    } else {
        sum / contributing as f64
    }
}

/// Distance between two normalized matrices of the same shape.
///
/// Each cell contributes `|a - b|`, or a penalty of `1.0` when either value is missing; the
/// total is divided by the number of cells. Empty matrices are at distance zero.
pub fn pairwise_distance(a: &RatioMatrix, b: &RatioMatrix) -> f64 {
    let cells = a.len();
    if cells == 0 {
        return 0.0;
    }
    let total: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            if x.is_finite() && y.is_finite() {
                (x - y).abs()
            } else {
                1.0
            }
        })
        .sum();
    total / cells as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAN: f64 = f64::NAN;

    fn matrix(values: [f64; 4]) -> RatioMatrix {
        RatioMatrix::from_row_slice(2, 2, &values)
    }

    #[test]
    fn mean_difference_averages_over_contributing_cells() {
        let selected = matrix([1.0, 2.0, NAN, NAN]);
        let other = matrix([1.5, NAN, 0.5, NAN]);
        // |1.0 - 1.5| + 2.0 + 0.5 over three contributing cells
        assert!((mean_difference(&selected, &other) - 3.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn mean_difference_of_fully_missing_pair_is_nan() {
        let empty = matrix([NAN; 4]);
        assert!(mean_difference(&empty, &empty).is_nan());
    }

    #[test]
    fn mean_difference_from_itself_is_zero() {
        let m = matrix([0.5, 1.0, 1.5, 2.0]);
        assert_eq!(mean_difference(&m, &m), 0.0);
    }

    #[test]
    fn distance_penalises_missing_cells() {
        let a = matrix([1.0, 2.0, NAN, 1.0]);
        let b = matrix([1.5, 1.0, 1.0, NAN]);
        assert!((pairwise_distance(&a, &b) - (0.5 + 1.0 + 1.0 + 1.0) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_identity() {
        let a = matrix([0.7, 1.2, 0.9, 2.0]);
        let b = matrix([1.0, 1.0, 1.4, 0.3]);
        assert_eq!(pairwise_distance(&a, &a), 0.0);
        assert_eq!(pairwise_distance(&a, &b), pairwise_distance(&b, &a));
    }
}
