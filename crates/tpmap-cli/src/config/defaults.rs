use tpmap::engine::config::{self as core_config, NormalizationMode};

pub struct DefaultsConfig {
    pub normalization: NormalizationMode,
    pub min_percentile: f64,
    pub max_percentile: f64,
    pub tm_weight: f64,
    pub curve_fit_attempts: usize,
    pub curve_fit_max_iterations: usize,
    pub bootstrap_iterations: usize,
    pub parallel: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            normalization: NormalizationMode::Median,
            min_percentile: core_config::DEFAULT_MIN_PERCENTILE,
            max_percentile: core_config::DEFAULT_MAX_PERCENTILE,
            tm_weight: core_config::DEFAULT_SCORE_TM_WEIGHT,
            curve_fit_attempts: core_config::DEFAULT_CURVE_FIT_ATTEMPTS,
            curve_fit_max_iterations: core_config::DEFAULT_CURVE_FIT_MAX_ITERATIONS,
            bootstrap_iterations: core_config::DEFAULT_BOOTSTRAP_ITERATIONS,
            parallel: true,
        }
    }
}
