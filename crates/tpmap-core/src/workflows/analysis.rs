use crate::core::colour::colour_for;
use crate::core::models::protein::RatioMatrix;
use crate::core::models::proteome::{ExperimentKind, ProteinRecord, Proteome};
use crate::core::scoring::thresholds::Thresholds;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::{AnalysisConfig, NormalizationMode, check_unit_interval};
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::normalization::normalized_matrices;
use crate::engine::progress::{Progress, ProgressReporter, TaskProgress};
use crate::engine::state::{NullModel, Outcome, ScoreSummary};
use crate::engine::tasks;
use crate::engine::NullDistribution;
use crate::workflows::compare;
use nalgebra::DMatrix;
use palette::Srgb;
use tracing::{debug, info, instrument};

const NORMALIZATION_RANGE: (f64, f64) = (0.0, 0.5);
const CURVE_FITTING_RANGE: (f64, f64) = (0.5, 0.45);
const FLOOD_SCORING_RANGE: (f64, f64) = (0.5, 0.1);
const BOOTSTRAP_RANGE: (f64, f64) = (0.6, 0.4);

/// Which derived results are up to date with the current data and configuration.
#[derive(Debug, Clone, Default)]
struct Cache {
    normalized: bool,
    thresholds: bool,
    curves: bool,
    ranks: bool,
    flood: bool,
    null: Option<NullDistribution>,
}

impl Cache {
    fn invalidate_normalization(&mut self) {
        *self = Cache::default();
    }

    fn invalidate_thresholds(&mut self) {
        self.thresholds = false;
        self.flood = false;
    }

    fn invalidate_curves(&mut self) {
        self.curves = false;
        self.ranks = false;
    }
}

/// A loaded experiment together with its analysis settings and derived results.
///
/// Setters record the new value and discard only the cached results that depend on it;
/// [`Analysis::recompute_scores`] then rebuilds whatever is missing, in dependency order.
#[derive(Debug)]
pub struct Analysis {
    config: AnalysisConfig,
    proteome: Option<Proteome>,
    thresholds: Thresholds,
    cache: Cache,
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Analysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            proteome: None,
            thresholds: Thresholds::INITIAL,
            cache: Cache::default(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn proteome(&self) -> Option<&Proteome> {
        self.proteome.as_ref()
    }

    /// Thresholds of the most recent score computation, or the initial cutoffs before one.
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Bootstrap null distribution of the most recent 2D score computation.
    pub fn null_distribution(&self) -> Option<&NullDistribution> {
        self.cache.null.as_ref()
    }

    /// Replaces the loaded experiment with a freshly validated one.
    #[instrument(skip_all, name = "import_proteins")]
    pub fn import_proteins(
        &mut self,
        kind: ExperimentKind,
        temperatures: Vec<f64>,
        labels: Vec<String>,
        records: Vec<ProteinRecord>,
    ) -> Result<&Proteome, EngineError> {
        let proteome = Proteome::import(kind, temperatures, labels, records)?;
        info!(
            %kind,
            proteins = proteome.len(),
            temperatures = proteome.temperatures().len(),
            labels = proteome.labels().len(),
            "Imported proteins."
        );
        self.thresholds = Thresholds::INITIAL;
        self.cache.invalidate_normalization();
        Ok(self.proteome.insert(proteome))
    }

    /// Discards the experiment and every derived result.
    pub fn clear(&mut self) {
        self.proteome = None;
        self.thresholds = Thresholds::INITIAL;
        self.cache.invalidate_normalization();
    }

    pub fn set_normalization(&mut self, mode: NormalizationMode) {
        if self.config.normalization != mode {
            self.config.normalization = mode;
            self.cache.invalidate_normalization();
        }
    }

    pub fn set_percentile_thresholds(
        &mut self,
        min_percentile: f64,
        max_percentile: f64,
    ) -> Result<(), EngineError> {
        check_unit_interval("min_percentile", min_percentile)?;
        check_unit_interval("max_percentile", max_percentile)?;
        let thresholds = &mut self.config.thresholds;
        if thresholds.min_percentile != min_percentile
            || thresholds.max_percentile != max_percentile
        {
            thresholds.min_percentile = min_percentile;
            thresholds.max_percentile = max_percentile;
            self.cache.invalidate_thresholds();
        }
        Ok(())
    }

    /// Sets the weight of Tm shifts in the 1D score. Only the composite is recomputed.
    pub fn set_score_tm_weight(&mut self, weight: f64) -> Result<(), EngineError> {
        check_unit_interval("score_tm_weight", weight)?;
        self.config.score_tm_weight = weight;
        Ok(())
    }

    pub fn set_bootstrap_iterations(&mut self, iterations: usize) {
        if self.config.bootstrap.iterations != iterations {
            self.config.bootstrap.iterations = iterations;
            self.cache.null = None;
        }
    }

    pub fn set_curve_fit_attempts(&mut self, attempts: usize) {
        if self.config.curve_fit.max_attempts != attempts {
            self.config.curve_fit.max_attempts = attempts;
            self.cache.invalidate_curves();
        }
    }

    pub fn set_curve_fit_max_iterations(&mut self, iterations: usize) {
        if self.config.curve_fit.max_iterations != iterations {
            self.config.curve_fit.max_iterations = iterations;
            self.cache.invalidate_curves();
        }
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.config.parallel = parallel;
    }

    /// Maps a normalized ratio to its display colour under the current thresholds.
    pub fn colour_for(&self, ratio: f64) -> Srgb<f64> {
        colour_for(ratio, self.thresholds)
    }

    /// Runs the 1D or 2D pipeline, rebuilding only stale results.
    ///
    /// Progress is reported as [`Progress::Fraction`] events: normalization covers `[0, 0.5)`
    /// and scoring `[0.5, 1]`. Proteins are reordered by score, highest first, with missing
    /// scores last.
    ///
    /// Results are committed only when the run completes. A cancelled or failed run leaves
    /// scores, thresholds, protein order and cached results exactly as they were before the call.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyPopulation`] when nothing has been imported, or the error of
    /// a failing task. Cancellation is not an error: it yields [`Outcome::Cancelled`].
    #[instrument(skip_all, name = "recompute_scores")]
    pub fn recompute_scores(
        &mut self,
        reporter: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Outcome<ScoreSummary>, EngineError> {
        if self.proteome.is_none() {
            return Err(EngineError::EmptyPopulation);
        }
        let snapshot = (self.proteome.clone(), self.thresholds, self.cache.clone());

        let result = self.run_pipeline(reporter, cancel);
        if !matches!(result, Ok(Outcome::Completed(_))) {
            debug!("Restoring the results of the previous computation.");
            (self.proteome, self.thresholds, self.cache) = snapshot;
        }
        result
    }

    fn run_pipeline(
        &mut self,
        reporter: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Outcome<ScoreSummary>, EngineError> {
        let Some(proteome) = self.proteome.as_mut() else {
            return Err(EngineError::EmptyPopulation);
        };
        let context = AnalysisContext::new(&self.config, reporter, cancel);
        info!(kind = %proteome.kind(), proteins = proteome.len(), "Recomputing scores.");

        if !self.cache.normalized {
            if normalize(proteome, &context).is_cancelled() {
                return Ok(Outcome::Cancelled);
            }
            self.cache.invalidate_normalization();
            self.cache.normalized = true;
        } else {
            reporter.report(Progress::Fraction(NORMALIZATION_RANGE.0 + NORMALIZATION_RANGE.1));
        }

        if !self.cache.thresholds {
            self.thresholds = population_thresholds(proteome, &self.config)?;
            self.cache.thresholds = true;
            info!(
                min = self.thresholds.min,
                max = self.thresholds.max,
                "Derived thresholds from population."
            );
        }

        let outcome = match proteome.kind() {
            ExperimentKind::OneDimensional => {
                score_one_dimensional(proteome, &context, &mut self.cache)?
            }
            ExperimentKind::TwoDimensional => {
                score_two_dimensional(proteome, &context, self.thresholds, &mut self.cache)?
            }
        };
        if outcome.is_cancelled() {
            info!("Score computation cancelled.");
            return Ok(Outcome::Cancelled);
        }

        proteome.sort_by_score();
        reporter.report(Progress::Fraction(1.0));

        let summary = summarize(proteome, self.thresholds, self.cache.null.as_ref());
        info!(proteins = summary.proteins, "Score computation complete.");
        Ok(Outcome::Completed(summary))
    }

    /// Mean absolute difference of every protein from `accession`, in population order.
    pub fn mean_differences(&mut self, accession: &str) -> Result<Vec<f64>, EngineError> {
        let proteome = self.ensure_normalized()?;
        compare::mean_differences(proteome, accession)
    }

    /// Pairwise distances between all normalized matrices, in population order.
    pub fn distance_matrix(
        &mut self,
        reporter: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Outcome<DMatrix<f64>>, EngineError> {
        self.ensure_normalized()?;
        let Some(proteome) = self.proteome.as_ref() else {
            return Err(EngineError::EmptyPopulation);
        };
        let context = AnalysisContext::new(&self.config, reporter, cancel);
        compare::distance_matrix(&context, proteome)
    }

    /// Normalizes the population if needed without scoring it.
    fn ensure_normalized(&mut self) -> Result<&Proteome, EngineError> {
        let Some(proteome) = self.proteome.as_mut() else {
            return Err(EngineError::EmptyPopulation);
        };
        if !self.cache.normalized {
            let matrices = normalized_matrices(
                proteome.proteins(),
                proteome.kind(),
                proteome.shape(),
                self.config.normalization,
            );
            for (protein, matrix) in proteome.proteins_mut().iter_mut().zip(matrices) {
                protein.set_normalized(matrix);
                protein.reset_scores();
            }
            self.cache.invalidate_normalization();
            self.cache.normalized = true;
        }
        Ok(proteome)
    }
}

fn normalize(proteome: &mut Proteome, context: &AnalysisContext) -> Outcome<()> {
    context.reporter.report(Progress::PhaseStart {
        name: "Normalizing Ratios",
    });
    let (start, span) = NORMALIZATION_RANGE;
    let progress = TaskProgress::start(context.reporter, proteome.len() as u64, start, span);
    let matrices = normalized_matrices(
        proteome.proteins(),
        proteome.kind(),
        proteome.shape(),
        context.config.normalization,
    );
    if context.is_cancelled() {
        context.reporter.report(Progress::PhaseFinish);
        return Outcome::Cancelled;
    }
    for (protein, matrix) in proteome.proteins_mut().iter_mut().zip(matrices) {
        protein.set_normalized(matrix);
        protein.reset_scores();
        progress.advance(1);
    }
    progress.finish();
    context.reporter.report(Progress::PhaseFinish);
    debug!(mode = %context.config.normalization, "Normalization complete.");
    Outcome::Completed(())
}

fn population_thresholds(
    proteome: &Proteome,
    config: &AnalysisConfig,
) -> Result<Thresholds, EngineError> {
    let minima = proteome.proteins().iter().map(|p| p.minimum()).collect();
    let maxima = proteome.proteins().iter().map(|p| p.maximum()).collect();
    Thresholds::from_population(
        minima,
        maxima,
        config.thresholds.min_percentile,
        config.thresholds.max_percentile,
    )
    .ok_or(EngineError::EmptyPopulation)
}

fn score_one_dimensional(
    proteome: &mut Proteome,
    context: &AnalysisContext,
    cache: &mut Cache,
) -> Result<Outcome<()>, EngineError> {
    if !cache.curves {
        let normalized: Vec<RatioMatrix> =
            proteome.proteins().iter().map(|p| p.normalized().clone()).collect();
        let Some(profiles) = tasks::curve_fitting::run(
            context,
            proteome.temperatures(),
            &normalized,
            CURVE_FITTING_RANGE,
        ) else {
            return Ok(Outcome::Cancelled);
        };
        for (protein, profile) in proteome.proteins_mut().iter_mut().zip(profiles) {
            protein.scores_mut().thermal = Some(profile);
        }
        cache.curves = true;
        cache.ranks = false;
    }

    if !cache.ranks {
        let profiles = proteome
            .proteins()
            .iter()
            .map(|p| {
                p.scores().thermal.as_ref().ok_or_else(|| {
                    EngineError::Internal(format!("missing thermal profile for {}", p.accession()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let breakdowns = tasks::rank_scoring::run(&profiles);
        for (protein, breakdown) in proteome.proteins_mut().iter_mut().zip(breakdowns) {
            protein.scores_mut().ranks = Some(breakdown);
        }
        cache.ranks = true;
    }

    let weight = context.config.score_tm_weight;
    for protein in proteome.proteins_mut() {
        let scores = protein.scores_mut();
        scores.score = scores.ranks.map_or(f64::NAN, |r| r.composite(weight));
    }
    Ok(Outcome::Completed(()))
}

fn score_two_dimensional(
    proteome: &mut Proteome,
    context: &AnalysisContext,
    thresholds: Thresholds,
    cache: &mut Cache,
) -> Result<Outcome<()>, EngineError> {
    let normalized: Vec<RatioMatrix> =
        proteome.proteins().iter().map(|p| p.normalized().clone()).collect();

    if !cache.flood {
        let Some(results) =
            tasks::flood_scoring::run(context, &normalized, thresholds, FLOOD_SCORING_RANGE)
        else {
            return Ok(Outcome::Cancelled);
        };
        for (protein, result) in proteome.proteins_mut().iter_mut().zip(results) {
            let scores = protein.scores_mut();
            scores.score = result.score();
            scores.flood = Some(result.flood);
            scores.effect = result.effect;
            scores.mean_fold_change = result.mean_fold_change;
        }
        cache.flood = true;
    }

    if cache.null.is_none() && context.config.bootstrap.iterations > 0 {
        let accessions: Vec<&str> = proteome.proteins().iter().map(|p| p.accession()).collect();
        let shape = proteome.shape();
        match tasks::bootstrap::run(context, &accessions, &normalized, shape, BOOTSTRAP_RANGE)? {
            Outcome::Completed(null) => cache.null = Some(null),
            Outcome::Cancelled => return Ok(Outcome::Cancelled),
        }
    }

    for protein in proteome.proteins_mut() {
        let scores = protein.scores_mut();
        scores.p_value = match &cache.null {
            Some(null) => null.p_value(scores.score),
            None => f64::NAN,
        };
    }
    Ok(Outcome::Completed(()))
}

fn summarize(
    proteome: &Proteome,
    thresholds: Thresholds,
    null: Option<&NullDistribution>,
) -> ScoreSummary {
    let (fully_fitted, partially_fitted) = match proteome.kind() {
        ExperimentKind::OneDimensional => {
            let fully = proteome
                .proteins()
                .iter()
                .filter(|p| p.scores().thermal.as_ref().is_some_and(|t| t.fitted_count() == 4))
                .count();
            (Some(fully), Some(proteome.len() - fully))
        }
        ExperimentKind::TwoDimensional => (None, None),
    };

    let null_model = match proteome.kind() {
        ExperimentKind::TwoDimensional => null.map(|null| NullModel {
            iterations: null.iterations(),
            mean: null.mean(),
            std_dev: null.std_dev(),
            min_positive_p_value: proteome
                .proteins()
                .iter()
                .map(|p| p.scores().p_value)
                .filter(|&p| p > 0.0)
                .fold(1.0, f64::min),
        }),
        ExperimentKind::OneDimensional => None,
    };

    ScoreSummary {
        kind: proteome.kind(),
        proteins: proteome.len(),
        thresholds,
        fully_fitted,
        partially_fitted,
        null_model,
    }
}
