use crate::core::models::protein::RatioMatrix;
use crate::core::scoring::flood;
use crate::core::scoring::thresholds::Thresholds;
use crate::core::stats::{NormalDistribution, RunningStats};
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, TaskProgress};
use crate::engine::state::Outcome;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument};

/// Iterations handed to one worker at a time.
const CHUNK_SIZE: usize = 1024;

const SEED_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

/// Null distribution of combined flood scores under per-cell resampling.
#[derive(Debug, Clone, PartialEq)]
pub struct NullDistribution {
    stats: RunningStats,
    sorted_scores: Vec<f64>,
    normal: NormalDistribution,
}

impl NullDistribution {
    fn from_parts(stats: RunningStats, mut scores: Vec<f64>) -> Self {
        scores.sort_unstable_by(f64::total_cmp);
        Self {
            normal: NormalDistribution::new(stats.mean(), stats.std_dev()),
            stats,
            sorted_scores: scores,
        }
    }

    pub fn iterations(&self) -> usize {
        self.sorted_scores.len()
    }

    pub fn mean(&self) -> f64 {
        self.stats.mean()
    }

    pub fn std_dev(&self) -> f64 {
        self.stats.std_dev()
    }

    /// Resampled scores in ascending order.
    pub fn sorted_scores(&self) -> &[f64] {
        &self.sorted_scores
    }

    /// Two-tailed p-value of an observed score under the normal approximation.
    pub fn p_value(&self, score: f64) -> f64 {
        self.normal.two_tailed_p_value(score)
    }
}

/// Builds the null distribution from `iterations` synthetic matrices.
///
/// Every cell of a synthetic matrix is copied from a protein drawn uniformly from the whole
/// population, and the matrix is scored with neutral thresholds. Iteration `k` draws from its
/// own generator seeded from `(seed, k)`, so results do not depend on how work is split
/// across threads.
///
/// # Errors
///
/// Returns [`EngineError::EmptyPopulation`] when there are no matrices and
/// [`EngineError::InvalidShape`] when a matrix differs from `shape`.
#[instrument(skip_all, name = "bootstrap_task")]
pub fn run(
    context: &AnalysisContext,
    accessions: &[&str],
    normalized: &[RatioMatrix],
    shape: (usize, usize),
    (start, span): (f64, f64),
) -> Result<Outcome<NullDistribution>, EngineError> {
    if normalized.is_empty() {
        return Err(EngineError::EmptyPopulation);
    }
    if let Some((k, matrix)) = normalized
        .iter()
        .enumerate()
        .find(|(_, m)| m.shape() != shape)
    {
        return Err(EngineError::InvalidShape {
            accession: accessions.get(k).map(|a| a.to_string()).unwrap_or_default(),
            expected: shape,
            found: matrix.shape(),
        });
    }

    let iterations = context.config.bootstrap.iterations;
    let seed = context.config.bootstrap.seed;
    info!(iterations, seed, proteins = normalized.len(), "Running bootstrap resampling.");
    context.reporter.report(Progress::PhaseStart {
        name: "Bootstrapping Null Distribution",
    });

    let chunks: Vec<(usize, usize)> = (0..iterations)
        .step_by(CHUNK_SIZE)
        .map(|first| (first, (first + CHUNK_SIZE).min(iterations)))
        .collect();

    let progress = TaskProgress::start(context.reporter, iterations as u64, start, span);
    let partials = context.map_items(&chunks, |&(first, last)| {
        let mut stats = RunningStats::new();
        let mut scores = Vec::with_capacity(last - first);
        for iteration in first..last {
            if context.is_cancelled() {
                break;
            }
            let score = resampled_score(normalized, shape, seed, iteration);
            stats.push(score);
            scores.push(score);
        }
        progress.advance((last - first) as u64);
        (stats, scores)
    });
    progress.finish();
    context.reporter.report(Progress::PhaseFinish);

    let partials = match partials {
        Some(partials) if !context.is_cancelled() => partials,
        _ => {
            info!("Bootstrap cancelled.");
            return Ok(Outcome::Cancelled);
        }
    };

    let (stats, scores) = partials.into_iter().fold(
        (RunningStats::new(), Vec::with_capacity(iterations)),
        |(stats, mut scores), (chunk_stats, chunk_scores)| {
            scores.extend(chunk_scores);
            (stats.merge(chunk_stats), scores)
        },
    );
    let distribution = NullDistribution::from_parts(stats, scores);
    info!(
        mean = distribution.mean(),
        std_dev = distribution.std_dev(),
        "Bootstrap complete."
    );
    Ok(Outcome::Completed(distribution))
}

fn resampled_score(
    normalized: &[RatioMatrix],
    shape: (usize, usize),
    seed: u64,
    iteration: usize,
) -> f64 {
    let mut rng = StdRng::seed_from_u64(
        seed.wrapping_add(iteration as u64)
            .wrapping_mul(SEED_MULTIPLIER),
    );
    let population = normalized.len();
    let synthetic = RatioMatrix::from_fn(shape.0, shape.1, |i, j| {
        normalized[rng.gen_range(0..population)][(i, j)]
    });
    flood::score(&synthetic, Thresholds::NEUTRAL).combined()
}
