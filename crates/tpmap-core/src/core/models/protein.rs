use super::proteome::ExperimentKind;
use crate::core::curve::profile::ThermalProfile;
use crate::core::scoring::effect::Effect;
use crate::core::scoring::flood::FloodScores;
use crate::core::scoring::rank::RankBreakdown;
use nalgebra::DMatrix;
use serde::Serialize;

/// A fold-change matrix: rows are concentrations (2D) or replicates (1D), columns temperatures.
pub type RatioMatrix = DMatrix<f64>;

/// Identity and annotation of a protein, as supplied by the import layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProteinInfo {
    pub accession: String,
    pub description: String,
    pub gene_name: String,
    pub organism_name: String,
    pub organism_identifier: String,
    pub protein_existence: String,
    pub sequence_version: String,
}

impl ProteinInfo {
    pub fn new(accession: impl Into<String>) -> Self {
        Self {
            accession: accession.into(),
            ..Default::default()
        }
    }
}

/// Results attached to a protein by the most recent score computation.
///
/// Every numeric field is `NaN` until computed; optional parts are `None` when the
/// experiment kind does not produce them or when no result could be derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProteinScores {
    pub score: f64,
    pub p_value: f64,
    pub mean_fold_change: f64,
    pub flood: Option<FloodScores>,
    pub effect: Option<Effect>,
    pub thermal: Option<ThermalProfile>,
    pub ranks: Option<RankBreakdown>,
}

impl Default for ProteinScores {
    fn default() -> Self {
        Self {
            score: f64::NAN,
            p_value: f64::NAN,
            mean_fold_change: f64::NAN,
            flood: None,
            effect: None,
            thermal: None,
            ranks: None,
        }
    }
}

/// A single protein of an experiment.
///
/// The raw abundance matrix and reference vector are fixed at import; the ratio matrix is
/// derived from them once, while the normalized matrix and scores are rewritten by the
/// engine whenever the analysis is recomputed.
#[derive(Debug, Clone)]
pub struct Protein {
    pub info: ProteinInfo,
    abundances: RatioMatrix,
    reference: Vec<f64>,
    ratio: RatioMatrix,
    normalized: RatioMatrix,
    scores: ProteinScores,
}

impl Protein {
    /// Builds a protein and derives its ratio matrix.
    ///
    /// For 1D experiments every replicate row is divided by its own reference value; for 2D
    /// experiments every temperature column is divided by the abundance at the reference
    /// concentration. Divisions that do not produce a finite number become `NaN`.
    ///
    /// The caller guarantees that `reference` has one entry per row (1D) or per column (2D).
    pub(crate) fn new(
        info: ProteinInfo,
        abundances: RatioMatrix,
        reference: Vec<f64>,
        kind: ExperimentKind,
    ) -> Self {
        let ratio = RatioMatrix::from_fn(abundances.nrows(), abundances.ncols(), |i, j| {
            let denominator = match kind {
                ExperimentKind::OneDimensional => reference[i],
                ExperimentKind::TwoDimensional => reference[j],
            };
            finite_or_nan(abundances[(i, j)] / denominator)
        });
        let normalized = ratio.clone();
        Self {
            info,
            abundances,
            reference,
            ratio,
            normalized,
            scores: ProteinScores::default(),
        }
    }

    pub fn accession(&self) -> &str {
        &self.info.accession
    }

    pub fn abundances(&self) -> &RatioMatrix {
        &self.abundances
    }

    pub fn reference(&self) -> &[f64] {
        &self.reference
    }

    pub fn ratio(&self) -> &RatioMatrix {
        &self.ratio
    }

    pub fn normalized(&self) -> &RatioMatrix {
        &self.normalized
    }

    pub fn scores(&self) -> &ProteinScores {
        &self.scores
    }

    pub fn score(&self) -> f64 {
        self.scores.score
    }

    pub fn shape(&self) -> (usize, usize) {
        self.ratio.shape()
    }

    /// Smallest normalized value, never above 1.0 (the scan starts from 1.0, NaN is skipped).
    pub fn minimum(&self) -> f64 {
        self.normalized
            .iter()
            .fold(1.0, |min, &v| if v < min { v } else { min })
    }

    /// Largest normalized value, never below 1.0 (the scan starts from 1.0, NaN is skipped).
    pub fn maximum(&self) -> f64 {
        self.normalized
            .iter()
            .fold(1.0, |max, &v| if v > max { v } else { max })
    }

    pub(crate) fn set_normalized(&mut self, normalized: RatioMatrix) {
        debug_assert_eq!(normalized.shape(), self.ratio.shape());
        self.normalized = normalized;
    }

    pub(crate) fn scores_mut(&mut self) -> &mut ProteinScores {
        &mut self.scores
    }

    pub(crate) fn reset_scores(&mut self) {
        self.scores = ProteinScores::default();
    }
}

#[inline]
fn finite_or_nan(value: f64) -> f64 {
    if value.is_finite() { value } else { f64::NAN }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f64]]) -> RatioMatrix {
        let ncols = rows[0].len();
        RatioMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j])
    }

    #[test]
    fn two_dimensional_ratio_divides_each_temperature_column_by_its_reference() {
        let abundances = matrix(&[&[10.0, 20.0], &[15.0, 10.0]]);
        let protein = Protein::new(
            ProteinInfo::new("P1"),
            abundances,
            vec![10.0, 20.0],
            ExperimentKind::TwoDimensional,
        );

        assert_eq!(protein.ratio()[(0, 0)], 1.0);
        assert_eq!(protein.ratio()[(0, 1)], 1.0);
        assert_eq!(protein.ratio()[(1, 0)], 1.5);
        assert_eq!(protein.ratio()[(1, 1)], 0.5);
    }

    #[test]
    fn one_dimensional_ratio_divides_each_replicate_row_by_its_reference() {
        let abundances = matrix(&[&[4.0, 2.0, 1.0], &[8.0, 8.0, 2.0]]);
        let protein = Protein::new(
            ProteinInfo::new("P1"),
            abundances,
            vec![4.0, 8.0],
            ExperimentKind::OneDimensional,
        );

        assert_eq!(protein.ratio().row(0).iter().copied().collect::<Vec<_>>(), vec![1.0, 0.5, 0.25]);
        assert_eq!(protein.ratio().row(1).iter().copied().collect::<Vec<_>>(), vec![1.0, 1.0, 0.25]);
    }

    #[test]
    fn missing_or_zero_reference_produces_nan_not_infinity() {
        let abundances = matrix(&[&[1.0, f64::NAN], &[2.0, 3.0]]);
        let protein = Protein::new(
            ProteinInfo::new("P1"),
            abundances,
            vec![0.0, f64::NAN],
            ExperimentKind::TwoDimensional,
        );

        assert!(protein.ratio().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn normalized_matrix_starts_as_copy_of_ratio() {
        let abundances = matrix(&[&[2.0, 4.0]]);
        let protein = Protein::new(
            ProteinInfo::new("P1"),
            abundances,
            vec![2.0],
            ExperimentKind::OneDimensional,
        );
        assert_eq!(protein.normalized(), protein.ratio());
    }

    #[test]
    fn extremes_are_seeded_at_one_and_skip_missing_values() {
        let abundances = matrix(&[&[1.2, f64::NAN], &[1.1, 1.3]]);
        let protein = Protein::new(
            ProteinInfo::new("P1"),
            abundances,
            vec![1.0, 1.0],
            ExperimentKind::TwoDimensional,
        );

        assert_eq!(protein.minimum(), 1.0);
        assert_eq!(protein.maximum(), 1.3);
    }

    #[test]
    fn fresh_scores_are_missing_rather_than_zero() {
        let scores = ProteinScores::default();
        assert!(scores.score.is_nan());
        assert!(scores.p_value.is_nan());
        assert!(scores.mean_fold_change.is_nan());
        assert!(scores.flood.is_none());
    }
}
