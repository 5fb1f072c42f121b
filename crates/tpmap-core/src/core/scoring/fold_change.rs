use crate::core::models::protein::RatioMatrix;

/// Matrices with fewer cells than this are too small to summarise.
pub const MIN_CELLS_FOR_MEAN_FOLD_CHANGE: usize = 30;

/// Mean of a normalized matrix with missing cells counted as unchanged (`1.0`).
///
/// Returns `NaN` for matrices smaller than [`MIN_CELLS_FOR_MEAN_FOLD_CHANGE`].
pub fn mean_fold_change(matrix: &RatioMatrix) -> f64 {
    let cells = matrix.len();
    if cells < MIN_CELLS_FOR_MEAN_FOLD_CHANGE {
        return f64::NAN;
    }
    let sum: f64 = matrix
        .iter()
        .map(|&v| if v.is_nan() { 1.0 } else { v })
        .sum();
    sum / cells as f64
}
