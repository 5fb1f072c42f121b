use crate::core::models::proteome::ExperimentKind;
use crate::core::scoring::thresholds::Thresholds;
use serde::Serialize;

/// Terminal state of a cancellable computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Cancelled => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Cancelled => Outcome::Cancelled,
        }
    }
}

/// Summary of the null distribution built by the bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NullModel {
    pub iterations: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Smallest strictly positive p-value in the population, `1.0` if there is none.
    pub min_positive_p_value: f64,
}

/// What a completed score computation produced, beyond the per-protein results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub kind: ExperimentKind,
    pub proteins: usize,
    pub thresholds: Thresholds,
    /// Proteins with all four replicate curves fitted (1D only).
    pub fully_fitted: Option<usize>,
    /// Proteins with at least one replicate left unfitted (1D only).
    pub partially_fitted: Option<usize>,
    pub null_model: Option<NullModel>,
}
