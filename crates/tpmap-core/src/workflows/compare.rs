use crate::core::models::protein::RatioMatrix;
use crate::core::models::proteome::{ExperimentKind, Proteome};
use crate::core::scoring::distance::{mean_difference, pairwise_distance};
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, TaskProgress};
use crate::engine::state::Outcome;
use nalgebra::DMatrix;
use tracing::{info, instrument};

fn require_two_dimensional(
    proteome: &Proteome,
    operation: &'static str,
) -> Result<(), EngineError> {
    match proteome.kind() {
        ExperimentKind::TwoDimensional => Ok(()),
        found => Err(EngineError::WrongExperimentKind {
            operation,
            expected: ExperimentKind::TwoDimensional,
            found,
        }),
    }
}

/// Mean absolute difference of every protein's normalized matrix from the selected one.
///
/// Values follow population order; the selected protein's own entry is `0.0` unless its
/// matrix is entirely missing.
pub fn mean_differences(proteome: &Proteome, accession: &str) -> Result<Vec<f64>, EngineError> {
    require_two_dimensional(proteome, "mean_differences")?;
    let selected = proteome
        .get(accession)
        .ok_or_else(|| EngineError::UnknownProtein(accession.to_string()))?;

    Ok(proteome
        .proteins()
        .iter()
        .map(|other| mean_difference(selected.normalized(), other.normalized()))
        .collect())
}

/// Symmetric matrix of pairwise distances between all normalized matrices.
///
/// Rows are computed in parallel when the run allows it; entry `(i, j)` follows population
/// order. The diagonal uses the same rule, so a protein with missing cells is at a positive
/// distance from itself.
#[instrument(skip_all, name = "distance_matrix_task")]
pub fn distance_matrix(
    context: &AnalysisContext,
    proteome: &Proteome,
) -> Result<Outcome<DMatrix<f64>>, EngineError> {
    require_two_dimensional(proteome, "distance_matrix")?;
    let n = proteome.len();
    info!(proteins = n, "Computing pairwise distance matrix.");
    context.reporter.report(Progress::PhaseStart {
        name: "Computing Distance Matrix",
    });

    let matrices: Vec<&RatioMatrix> = proteome.proteins().iter().map(|p| p.normalized()).collect();
    let indices: Vec<usize> = (0..n).collect();
    let progress = TaskProgress::start(context.reporter, n as u64, 0.0, 1.0);
    let rows = context.map_items(&indices, |&i| {
        let row: Vec<f64> = (i..n)
            .map(|j| pairwise_distance(matrices[i], matrices[j]))
            .collect();
        progress.advance(1);
        row
    });
    progress.finish();
    context.reporter.report(Progress::PhaseFinish);

    let Some(rows) = rows else {
        info!("Distance matrix cancelled.");
        return Ok(Outcome::Cancelled);
    };

    let mut distances = DMatrix::zeros(n, n);
    for (i, row) in rows.into_iter().enumerate() {
        for (offset, d) in row.into_iter().enumerate() {
            let j = i + offset;
            distances[(i, j)] = d;
            distances[(j, i)] = d;
        }
    }
    Ok(Outcome::Completed(distances))
}
