use super::labels::{label_order, temperature_order};
use super::protein::{Protein, ProteinInfo, RatioMatrix};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Number of replicate rows in a 1D experiment: two treatment and two vehicle series.
pub const REPLICATES_PER_1D_EXPERIMENT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperimentKind {
    /// Temperature series per replicate, scored by curve fitting and ranking.
    #[serde(rename = "1d")]
    OneDimensional,
    /// Concentration × temperature grid, scored by flood fill and bootstrap.
    #[serde(rename = "2d")]
    TwoDimensional,
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentKind::OneDimensional => write!(f, "1D"),
            ExperimentKind::TwoDimensional => write!(f, "2D"),
        }
    }
}

/// One protein as handed over by the import layer, in the label order of the source table.
#[derive(Debug, Clone)]
pub struct ProteinRecord {
    pub info: ProteinInfo,
    /// Raw abundances indexed `[label][temperature]`.
    pub abundances: Vec<Vec<f64>>,
    /// Reference abundances: one per label row for 1D, one per temperature column for 2D.
    /// When absent, the first temperature (1D) or the lowest concentration (2D) is used.
    pub reference: Option<Vec<f64>>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ImportError {
    #[error("The experiment contains no proteins")]
    EmptyPopulation,

    #[error("No {axis} labels were supplied")]
    EmptyAxis { axis: &'static str },

    #[error("Temperature label {0} is not a finite number")]
    NonFiniteTemperature(f64),

    #[error("Duplicate {axis} label '{label}'")]
    DuplicateLabel { axis: &'static str, label: String },

    #[error("A 1D experiment needs exactly {expected} replicate labels, found {found}")]
    ReplicateCount { expected: usize, found: usize },

    #[error("Protein '{accession}' has {found} abundance rows, expected {expected}")]
    RowCount {
        accession: String,
        expected: usize,
        found: usize,
    },

    #[error("Protein '{accession}' row {row} has {found} values, expected {expected}")]
    RaggedRow {
        accession: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Protein '{accession}' has {found} reference values, expected {expected}")]
    ReferenceLength {
        accession: String,
        expected: usize,
        found: usize,
    },
}

/// The ordered protein population of one experiment.
///
/// Temperatures are stored ascending and labels in numeric-aware ascending order; every
/// protein matrix has `labels().len()` rows and `temperatures().len()` columns.
#[derive(Debug, Clone)]
pub struct Proteome {
    kind: ExperimentKind,
    temperatures: Vec<f64>,
    labels: Vec<String>,
    proteins: Vec<Protein>,
}

impl Proteome {
    /// Validates and imports a population of protein records.
    ///
    /// Temperatures and labels are sorted, and every record's matrix and reference vector are
    /// permuted to match, so callers may pass columns in any order.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] for an empty population, empty or duplicate labels,
    /// non-finite temperatures, a 1D replicate count other than four, or any record whose
    /// matrix or reference vector does not match the label grid.
    pub fn import(
        kind: ExperimentKind,
        temperatures: Vec<f64>,
        labels: Vec<String>,
        records: Vec<ProteinRecord>,
    ) -> Result<Self, ImportError> {
        validate_axes(kind, &temperatures, &labels)?;
        if records.is_empty() {
            return Err(ImportError::EmptyPopulation);
        }

        let temperature_permutation = temperature_order(&temperatures);
        let label_permutation = label_order(&labels);

        let proteins = records
            .into_iter()
            .map(|record| build_protein(record, kind, &temperature_permutation, &label_permutation))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            kind,
            temperatures: temperature_permutation.iter().map(|&i| temperatures[i]).collect(),
            labels: label_permutation.iter().map(|&i| labels[i].clone()).collect(),
            proteins,
        })
    }

    pub fn kind(&self) -> ExperimentKind {
        self.kind
    }

    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn proteins(&self) -> &[Protein] {
        &self.proteins
    }

    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }

    /// Matrix shape shared by every protein: `(labels, temperatures)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.labels.len(), self.temperatures.len())
    }

    pub fn position(&self, accession: &str) -> Option<usize> {
        self.proteins.iter().position(|p| p.accession() == accession)
    }

    pub fn get(&self, accession: &str) -> Option<&Protein> {
        self.proteins.iter().find(|p| p.accession() == accession)
    }

    pub(crate) fn proteins_mut(&mut self) -> &mut [Protein] {
        &mut self.proteins
    }

    /// Orders proteins by score, highest first, with missing scores last.
    pub(crate) fn sort_by_score(&mut self) {
        self.proteins
            .sort_by(|a, b| descending_nan_last(a.score(), b.score()));
    }
}

fn validate_axes(
    kind: ExperimentKind,
    temperatures: &[f64],
    labels: &[String],
) -> Result<(), ImportError> {
    if temperatures.is_empty() {
        return Err(ImportError::EmptyAxis {
            axis: "temperature",
        });
    }
    if labels.is_empty() {
        return Err(ImportError::EmptyAxis {
            axis: "concentration",
        });
    }
    if let Some(&t) = temperatures.iter().find(|t| !t.is_finite()) {
        return Err(ImportError::NonFiniteTemperature(t));
    }

    let mut seen_temperatures = HashSet::new();
    for t in temperatures {
        if !seen_temperatures.insert(t.to_bits()) {
            return Err(ImportError::DuplicateLabel {
                axis: "temperature",
                label: t.to_string(),
            });
        }
    }
    let mut seen_labels = HashSet::new();
    for label in labels {
        if !seen_labels.insert(label.as_str()) {
            return Err(ImportError::DuplicateLabel {
                axis: "concentration",
                label: label.clone(),
            });
        }
    }

    if kind == ExperimentKind::OneDimensional && labels.len() != REPLICATES_PER_1D_EXPERIMENT {
        return Err(ImportError::ReplicateCount {
            expected: REPLICATES_PER_1D_EXPERIMENT,
            found: labels.len(),
        });
    }
    Ok(())
}

fn build_protein(
    record: ProteinRecord,
    kind: ExperimentKind,
    temperature_permutation: &[usize],
    label_permutation: &[usize],
) -> Result<Protein, ImportError> {
    let rows = label_permutation.len();
    let cols = temperature_permutation.len();
    let accession = &record.info.accession;

    if record.abundances.len() != rows {
        return Err(ImportError::RowCount {
            accession: accession.clone(),
            expected: rows,
            found: record.abundances.len(),
        });
    }
    if let Some((row, values)) = record
        .abundances
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() != cols)
    {
        return Err(ImportError::RaggedRow {
            accession: accession.clone(),
            row,
            expected: cols,
            found: values.len(),
        });
    }

    let abundances = RatioMatrix::from_fn(rows, cols, |i, j| {
        record.abundances[label_permutation[i]][temperature_permutation[j]]
    });

    let reference = match record.reference {
        Some(reference) => {
            let permutation = match kind {
                ExperimentKind::OneDimensional => label_permutation,
                ExperimentKind::TwoDimensional => temperature_permutation,
            };
            if reference.len() != permutation.len() {
                return Err(ImportError::ReferenceLength {
                    accession: accession.clone(),
                    expected: permutation.len(),
                    found: reference.len(),
                });
            }
            permutation.iter().map(|&k| reference[k]).collect()
        }
        None => match kind {
            ExperimentKind::OneDimensional => abundances.column(0).iter().copied().collect(),
            ExperimentKind::TwoDimensional => abundances.row(0).iter().copied().collect(),
        },
    };

    Ok(Protein::new(record.info, abundances, reference, kind))
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}
