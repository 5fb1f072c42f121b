use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::InputArgs;
use crate::error::{CliError, Result};
use std::str::FromStr;
use tpmap::engine::config::{self as core_config, NormalizationMode};

pub fn build_config(args: &InputArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let file_config = apply_set_values(file_config, &args.set_values)?;

    let normalization = match args.normalization.as_deref().or(file_config.normalization.as_deref()) {
        Some(mode) => mode
            .parse::<NormalizationMode>()
            .map_err(|e| CliError::Config(e.to_string()))?,
        None => defaults.normalization,
    };

    let thresholds = file_config.thresholds.unwrap_or_default();
    let min_percentile = args
        .min_percentile
        .or(thresholds.min_percentile)
        .unwrap_or(defaults.min_percentile);
    let max_percentile = args
        .max_percentile
        .or(thresholds.max_percentile)
        .unwrap_or(defaults.max_percentile);

    let scoring = file_config.scoring.unwrap_or_default();
    let tm_weight = args
        .tm_weight
        .or(scoring.tm_weight)
        .unwrap_or(defaults.tm_weight);

    let curve_fit = file_config.curve_fit.unwrap_or_default();
    let curve_fit_attempts = args
        .curve_fit_attempts
        .or(curve_fit.max_attempts)
        .unwrap_or(defaults.curve_fit_attempts);
    let curve_fit_max_iterations = curve_fit
        .max_iterations
        .unwrap_or(defaults.curve_fit_max_iterations);

    let bootstrap = file_config.bootstrap.unwrap_or_default();
    let bootstrap_iterations = args
        .bootstrap_iterations
        .or(bootstrap.iterations)
        .unwrap_or(defaults.bootstrap_iterations);

    let parallel = if args.single_thread {
        false
    } else {
        file_config.parallel.unwrap_or(defaults.parallel)
    };

    let mut builder = core_config::AnalysisConfigBuilder::new()
        .normalization(normalization)
        .min_percentile(min_percentile)
        .max_percentile(max_percentile)
        .score_tm_weight(tm_weight)
        .curve_fit_attempts(curve_fit_attempts)
        .curve_fit_max_iterations(curve_fit_max_iterations)
        .bootstrap_iterations(bootstrap_iterations)
        .parallel(parallel);
    if let Some(seed) = curve_fit.seed {
        builder = builder.curve_fit_seed(seed);
    }
    if let Some(seed) = bootstrap.seed {
        builder = builder.bootstrap_seed(seed);
    }
    let core_config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        input_path: args.input.clone(),
        kind: args.kind.into(),
        core_config,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str, expected: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", expected, key, value))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "normalization" => {
                config.normalization = Some(value_str.trim().to_string());
            }
            "parallel" => {
                config.parallel = Some(parse_value(key, value_str, "boolean")?);
            }
            "thresholds.min-percentile" => {
                config
                    .thresholds
                    .get_or_insert_with(Default::default)
                    .min_percentile = Some(parse_value(key, value_str, "float")?);
            }
            "thresholds.max-percentile" => {
                config
                    .thresholds
                    .get_or_insert_with(Default::default)
                    .max_percentile = Some(parse_value(key, value_str, "float")?);
            }
            "scoring.tm-weight" => {
                config.scoring.get_or_insert_with(Default::default).tm_weight =
                    Some(parse_value(key, value_str, "float")?);
            }
            "curve-fit.max-attempts" => {
                config
                    .curve_fit
                    .get_or_insert_with(Default::default)
                    .max_attempts = Some(parse_value(key, value_str, "integer")?);
            }
            "curve-fit.max-iterations" => {
                config
                    .curve_fit
                    .get_or_insert_with(Default::default)
                    .max_iterations = Some(parse_value(key, value_str, "integer")?);
            }
            "curve-fit.seed" => {
                config.curve_fit.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "bootstrap.iterations" => {
                config
                    .bootstrap
                    .get_or_insert_with(Default::default)
                    .iterations = Some(parse_value(key, value_str, "integer")?);
            }
            "bootstrap.seed" => {
                config.bootstrap.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value_str, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
