use crate::core::curve::fitting::{DEFAULT_FIT_SEED, FitOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MIN_PERCENTILE: f64 = 0.20;
pub const DEFAULT_MAX_PERCENTILE: f64 = 0.80;
pub const DEFAULT_SCORE_TM_WEIGHT: f64 = 0.7;
pub const DEFAULT_CURVE_FIT_ATTEMPTS: usize = 10;
pub const DEFAULT_CURVE_FIT_MAX_ITERATIONS: usize = 1000;
pub const DEFAULT_BOOTSTRAP_ITERATIONS: usize = 100_000;
pub const DEFAULT_BOOTSTRAP_SEED: u64 = 123;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Parameter '{parameter}' is out of range: {value} (expected {expected})")]
    OutOfRange {
        parameter: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Unknown normalization mode: '{0}' (expected 'none' or 'median')")]
    UnknownNormalization(String),
}

/// How ratio matrices are normalized before scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    /// Normalized ratios are an exact copy of the ratios.
    None,
    /// Every cell is divided by the population median at that cell.
    #[default]
    Median,
}

impl fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationMode::None => write!(f, "none"),
            NormalizationMode::Median => write!(f, "median"),
        }
    }
}

impl FromStr for NormalizationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(NormalizationMode::None),
            "median" => Ok(NormalizationMode::Median),
            _ => Err(ConfigError::UnknownNormalization(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveFitConfig {
    pub max_attempts: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for CurveFitConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_CURVE_FIT_ATTEMPTS,
            max_iterations: DEFAULT_CURVE_FIT_MAX_ITERATIONS,
            seed: DEFAULT_FIT_SEED,
        }
    }
}

impl From<CurveFitConfig> for FitOptions {
    fn from(config: CurveFitConfig) -> Self {
        FitOptions {
            max_attempts: config.max_attempts,
            max_iterations: config.max_iterations,
            seed: config.seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub iterations: usize,
    pub seed: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_BOOTSTRAP_ITERATIONS,
            seed: DEFAULT_BOOTSTRAP_SEED,
        }
    }
}

/// Population percentiles from which the flood-fill thresholds are derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    pub min_percentile: f64,
    pub max_percentile: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_percentile: DEFAULT_MIN_PERCENTILE,
            max_percentile: DEFAULT_MAX_PERCENTILE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub normalization: NormalizationMode,
    pub thresholds: ThresholdConfig,
    /// Weight of the Tm-shift ranks against the fit-quality ranks in the 1D score.
    pub score_tm_weight: f64,
    pub curve_fit: CurveFitConfig,
    pub bootstrap: BootstrapConfig,
    /// Runs per-protein and per-iteration work on the rayon pool when `true`.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            normalization: NormalizationMode::default(),
            thresholds: ThresholdConfig::default(),
            score_tm_weight: DEFAULT_SCORE_TM_WEIGHT,
            curve_fit: CurveFitConfig::default(),
            bootstrap: BootstrapConfig::default(),
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("min_percentile", self.thresholds.min_percentile)?;
        check_unit_interval("max_percentile", self.thresholds.max_percentile)?;
        check_unit_interval("score_tm_weight", self.score_tm_weight)?;
        Ok(())
    }
}

pub(crate) fn check_unit_interval(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            parameter,
            value: value.to_string(),
            expected: "a value between 0 and 1",
        })
    }
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    normalization: Option<NormalizationMode>,
    min_percentile: Option<f64>,
    max_percentile: Option<f64>,
    score_tm_weight: Option<f64>,
    curve_fit_attempts: Option<usize>,
    curve_fit_max_iterations: Option<usize>,
    curve_fit_seed: Option<u64>,
    bootstrap_iterations: Option<usize>,
    bootstrap_seed: Option<u64>,
    parallel: Option<bool>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalization(mut self, mode: NormalizationMode) -> Self {
        self.normalization = Some(mode);
        self
    }
    pub fn min_percentile(mut self, percentile: f64) -> Self {
        self.min_percentile = Some(percentile);
        self
    }
    pub fn max_percentile(mut self, percentile: f64) -> Self {
        self.max_percentile = Some(percentile);
        self
    }
    pub fn score_tm_weight(mut self, weight: f64) -> Self {
        self.score_tm_weight = Some(weight);
        self
    }
    pub fn curve_fit_attempts(mut self, attempts: usize) -> Self {
        self.curve_fit_attempts = Some(attempts);
        self
    }
    pub fn curve_fit_max_iterations(mut self, iterations: usize) -> Self {
        self.curve_fit_max_iterations = Some(iterations);
        self
    }
    pub fn curve_fit_seed(mut self, seed: u64) -> Self {
        self.curve_fit_seed = Some(seed);
        self
    }
    pub fn bootstrap_iterations(mut self, iterations: usize) -> Self {
        self.bootstrap_iterations = Some(iterations);
        self
    }
    pub fn bootstrap_seed(mut self, seed: u64) -> Self {
        self.bootstrap_seed = Some(seed);
        self
    }
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let thresholds = ThresholdConfig {
            min_percentile: self
                .min_percentile
                .ok_or(ConfigError::MissingParameter("min_percentile"))?,
            max_percentile: self
                .max_percentile
                .ok_or(ConfigError::MissingParameter("max_percentile"))?,
        };
        let curve_fit = CurveFitConfig {
            max_attempts: self
                .curve_fit_attempts
                .ok_or(ConfigError::MissingParameter("curve_fit_attempts"))?,
            max_iterations: self
                .curve_fit_max_iterations
                .ok_or(ConfigError::MissingParameter("curve_fit_max_iterations"))?,
            seed: self.curve_fit_seed.unwrap_or(DEFAULT_FIT_SEED),
        };
        let bootstrap = BootstrapConfig {
            iterations: self
                .bootstrap_iterations
                .ok_or(ConfigError::MissingParameter("bootstrap_iterations"))?,
            seed: self.bootstrap_seed.unwrap_or(DEFAULT_BOOTSTRAP_SEED),
        };
        let config = AnalysisConfig {
            normalization: self
                .normalization
                .ok_or(ConfigError::MissingParameter("normalization"))?,
            thresholds,
            score_tm_weight: self
                .score_tm_weight
                .ok_or(ConfigError::MissingParameter("score_tm_weight"))?,
            curve_fit,
            bootstrap,
            parallel: self.parallel.unwrap_or(true),
        };
        config.validate()?;
        Ok(config)
    }
}
