use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::proteome::{ExperimentKind, ImportError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {source}")]
    Import {
        #[from]
        source: ImportError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("No proteins have been imported")]
    EmptyPopulation,

    #[error(
        "Protein '{accession}' has a {found:?} matrix but the population uses {expected:?}"
    )]
    InvalidShape {
        accession: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Protein not found in population: {0}")]
    UnknownProtein(String),

    #[error("Operation '{operation}' requires a {expected} experiment, but a {found} experiment is loaded")]
    WrongExperimentKind {
        operation: &'static str,
        expected: ExperimentKind,
        found: ExperimentKind,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
