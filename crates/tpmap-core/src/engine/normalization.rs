use super::config::NormalizationMode;
use crate::core::models::protein::{Protein, RatioMatrix};
use crate::core::models::proteome::ExperimentKind;
use crate::core::stats::median_of_finite;
use tracing::debug;

/// Per-cell population medians of the ratio matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct MedianTable {
    medians: RatioMatrix,
}

impl MedianTable {
    /// Builds the table over every protein's ratio matrix.
    ///
    /// Cells without any finite value fall back to `1.0` for 2D experiments and `0.0` for
    /// 1D experiments. All proteins must share the shape `(rows, cols)`.
    pub fn build(proteins: &[Protein], kind: ExperimentKind, (rows, cols): (usize, usize)) -> Self {
        let fallback = match kind {
            ExperimentKind::TwoDimensional => 1.0,
            ExperimentKind::OneDimensional => 0.0,
        };
        let medians = RatioMatrix::from_fn(rows, cols, |i, j| {
            median_of_finite(proteins.iter().map(|p| p.ratio()[(i, j)])).unwrap_or(fallback)
        });
        debug!(rows, cols, proteins = proteins.len(), "Built median table.");
        Self { medians }
    }

    pub fn medians(&self) -> &RatioMatrix {
        &self.medians
    }

    /// Divides `ratio` by the medians cell by cell; non-finite quotients become `NaN`.
    pub fn normalize(&self, ratio: &RatioMatrix) -> RatioMatrix {
        ratio.zip_map(&self.medians, |value, median| {
            let q = value / median;
            if q.is_finite() { q } else { f64::NAN }
        })
    }
}

/// Computes every protein's normalized matrix under `mode`, in population order.
pub fn normalized_matrices(
    proteins: &[Protein],
    kind: ExperimentKind,
    shape: (usize, usize),
    mode: NormalizationMode,
) -> Vec<RatioMatrix> {
    match mode {
        NormalizationMode::None => proteins.iter().map(|p| p.ratio().clone()).collect(),
        NormalizationMode::Median => {
            let table = MedianTable::build(proteins, kind, shape);
            proteins.iter().map(|p| table.normalize(p.ratio())).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::protein::ProteinInfo;
    use crate::core::models::proteome::{ProteinRecord, Proteome};

    const NAN: f64 = f64::NAN;

    fn proteome(matrices: &[[[f64; 2]; 2]]) -> Proteome {
        let records = matrices
            .iter()
            .enumerate()
            .map(|(k, m)| ProteinRecord {
                info: ProteinInfo::new(format!("P{}", k)),
                abundances: m.iter().map(|row| row.to_vec()).collect(),
                reference: Some(vec![1.0, 1.0]),
            })
            .collect();
        Proteome::import(
            ExperimentKind::TwoDimensional,
            vec![37.0, 40.0],
            vec!["0".to_string(), "1".to_string()],
            records,
        )
        .unwrap()
    }

    #[test]
    fn median_uses_upper_middle_element_and_skips_missing_values() {
        let p = proteome(&[
            [[1.0, 4.0], [NAN, 2.0]],
            [[3.0, 2.0], [NAN, 8.0]],
            [[2.0, NAN], [NAN, 4.0]],
            [[5.0, 1.0], [NAN, 6.0]],
        ]);
        let table = MedianTable::build(p.proteins(), p.kind(), p.shape());

        assert_eq!(table.medians()[(0, 0)], 3.0);
        assert_eq!(table.medians()[(0, 1)], 2.0);
        assert_eq!(table.medians()[(1, 0)], 1.0);
        assert_eq!(table.medians()[(1, 1)], 6.0);
    }

    #[test]
    fn median_normalization_divides_by_the_cell_median() {
        let p = proteome(&[[[1.0, 2.0], [3.0, 4.0]], [[2.0, 4.0], [6.0, 8.0]]]);
        let normalized = normalized_matrices(p.proteins(), p.kind(), p.shape(), NormalizationMode::Median);

        assert_eq!(normalized[0][(0, 0)], 0.5);
        assert_eq!(normalized[1][(1, 1)], 1.0);
    }

    #[test]
    fn no_normalization_is_an_exact_copy() {
        let p = proteome(&[[[1.3, 0.7], [NAN, 2.1]], [[0.9, 1.1], [1.0, 0.2]]]);
        let normalized = normalized_matrices(p.proteins(), p.kind(), p.shape(), NormalizationMode::None);

        for (protein, matrix) in p.proteins().iter().zip(&normalized) {
            for (a, b) in protein.ratio().iter().zip(matrix.iter()) {
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }
    }

    #[test]
    fn zero_median_gives_missing_values_not_infinities() {
        let p = proteome(&[[[0.0, 1.0], [1.0, 1.0]], [[0.0, 1.0], [1.0, 1.0]]]);
        let normalized = normalized_matrices(p.proteins(), p.kind(), p.shape(), NormalizationMode::Median);
        assert!(normalized[0][(0, 0)].is_nan());
    }
}
