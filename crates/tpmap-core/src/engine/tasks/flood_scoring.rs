use crate::core::models::protein::RatioMatrix;
use crate::core::scoring::effect::{Effect, classify};
use crate::core::scoring::flood::{self, FloodScores};
use crate::core::scoring::fold_change::mean_fold_change;
use crate::core::scoring::thresholds::Thresholds;
use crate::engine::context::AnalysisContext;
use crate::engine::progress::{Progress, TaskProgress};
use tracing::{info, instrument};

/// Flood-fill result of one 2D protein.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloodResult {
    pub flood: FloodScores,
    pub effect: Option<Effect>,
    pub mean_fold_change: f64,
}

impl FloodResult {
    pub fn score(&self) -> f64 {
        self.flood.combined()
    }
}

/// Scores every normalized matrix against the population thresholds.
#[instrument(skip_all, name = "flood_scoring_task")]
pub fn run(
    context: &AnalysisContext,
    normalized: &[RatioMatrix],
    thresholds: Thresholds,
    (start, span): (f64, f64),
) -> Option<Vec<FloodResult>> {
    info!(
        proteins = normalized.len(),
        min_threshold = thresholds.min,
        max_threshold = thresholds.max,
        "Scoring fold-change matrices."
    );
    context.reporter.report(Progress::PhaseStart {
        name: "Scoring Fold-Change Matrices",
    });

    let progress = TaskProgress::start(context.reporter, normalized.len() as u64, start, span);
    let results = context.map_items(normalized, |matrix| {
        let result = score_matrix(matrix, thresholds);
        progress.advance(1);
        result
    });
    progress.finish();
    context.reporter.report(Progress::PhaseFinish);
    results
}

fn score_matrix(matrix: &RatioMatrix, thresholds: Thresholds) -> FloodResult {
    let flood = flood::score(matrix, thresholds);
    let reference: Vec<f64> = if matrix.ncols() > 0 {
        matrix.column(0).iter().copied().collect()
    } else {
        Vec::new()
    };
    FloodResult {
        flood,
        effect: classify(flood.combined(), &reference, thresholds),
        mean_fold_change: mean_fold_change(matrix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cancel::CancellationToken;
    use crate::engine::config::AnalysisConfig;
    use crate::engine::progress::ProgressReporter;

    fn matrix(rows: [[f64; 2]; 2]) -> RatioMatrix {
        RatioMatrix::from_fn(2, 2, |i, j| rows[i][j])
    }

    #[test]
    fn results_carry_score_effect_and_fold_change() {
        let config = AnalysisConfig::default();
        let reporter = ProgressReporter::new();
        let cancel = CancellationToken::new();
        let context = AnalysisContext::new(&config, &reporter, &cancel);
        let thresholds = Thresholds::new(0.8, 1.2);

        let matrices = vec![
            matrix([[1.0, 1.0], [1.0, 1.0]]),
            matrix([[1.0, 1.5], [0.9, 2.0]]),
            matrix([[0.5, 0.7], [2.0, 2.0]]),
        ];
        let results = run(&context, &matrices, thresholds, (0.5, 0.5)).unwrap();

        assert_eq!(results[0].score(), 0.0);
        assert_eq!(results[0].effect, None);
        assert!(results[0].mean_fold_change.is_nan());

        assert!(results[1].score() > 0.0);
        assert_eq!(results[1].effect, Some(Effect::Stabilized));

        assert!(results[2].score() < 0.0);
        assert_eq!(results[2].effect, Some(Effect::SolubilityOrExpression));
    }
}
