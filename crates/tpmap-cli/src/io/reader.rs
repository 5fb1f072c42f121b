use crate::error::{CliError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tpmap::core::models::protein::ProteinInfo;
use tpmap::core::models::proteome::ProteinRecord;
use tracing::{debug, warn};

const ACCESSION_COLUMN: &str = "accession";
const DESCRIPTION_COLUMN: &str = "description";
const ABUNDANCE_PREFIX: &str = "ref_";

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("No abundance columns of the form 'ref_<temperature>_<label>' were found")]
    NoAbundanceColumns,

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("Column '{0}' does not carry a numeric temperature")]
    InvalidTemperature(String),

    #[error("Missing abundance column for temperature {temperature} and label '{label}'")]
    MissingGridColumn { temperature: String, label: String },

    #[error("Malformed table: {0}")]
    Csv(String),
}

impl From<csv::Error> for TableError {
    fn from(e: csv::Error) -> Self {
        TableError::Csv(e.to_string())
    }
}

/// An abundance table split into its temperature and label axes.
#[derive(Debug)]
pub struct ExperimentTable {
    pub temperatures: Vec<f64>,
    pub labels: Vec<String>,
    pub records: Vec<ProteinRecord>,
}

/// Column layout resolved from the header row.
#[derive(Debug)]
struct Layout {
    accession: usize,
    description: Option<usize>,
    temperatures: Vec<f64>,
    labels: Vec<String>,
    /// `grid[label][temperature]` is the column holding that abundance.
    grid: Vec<Vec<usize>>,
}

pub fn read_table(path: &Path) -> Result<ExperimentTable> {
    debug!("Reading abundance table from {:?}", path);
    let file = File::open(path)?;
    parse_table(file).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

pub fn parse_table<R: Read>(
    reader: R,
) -> std::result::Result<ExperimentTable, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let layout = resolve_layout(&headers)?;

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let accession = row.get(layout.accession).unwrap_or("").trim();
        if accession.is_empty() {
            warn!(line = line + 2, "Skipping row without accession.");
            continue;
        }

        let mut info = ProteinInfo::new(accession);
        if let Some(column) = layout.description {
            apply_uniprot_description(&mut info, row.get(column).unwrap_or(""));
        }
        let abundances = layout
            .grid
            .iter()
            .map(|columns| columns.iter().map(|&c| parse_cell(row.get(c))).collect())
            .collect();

        records.push(ProteinRecord {
            info,
            abundances,
            reference: None,
        });
    }

    debug!(
        proteins = records.len(),
        temperatures = layout.temperatures.len(),
        labels = layout.labels.len(),
        "Parsed abundance table."
    );
    Ok(ExperimentTable {
        temperatures: layout.temperatures,
        labels: layout.labels,
        records,
    })
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_lowercase()
}

fn resolve_layout(headers: &[String]) -> std::result::Result<Layout, TableError> {
    let mut seen = HashMap::new();
    for (index, header) in headers.iter().enumerate() {
        if seen.insert(header.as_str(), index).is_some() {
            return Err(TableError::DuplicateColumn(header.clone()));
        }
    }

    let accession = *seen
        .get(ACCESSION_COLUMN)
        .ok_or(TableError::MissingColumn(ACCESSION_COLUMN))?;
    let description = seen.get(DESCRIPTION_COLUMN).copied();

    let mut temperature_keys: Vec<String> = Vec::new();
    let mut temperatures: Vec<f64> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    let mut cells: HashMap<(usize, usize), usize> = HashMap::new();

    for (index, header) in headers.iter().enumerate() {
        let Some(rest) = header.strip_prefix(ABUNDANCE_PREFIX) else {
            continue;
        };
        let (temperature_key, label) = rest
            .split_once('_')
            .filter(|(_, label)| !label.is_empty())
            .ok_or_else(|| TableError::InvalidTemperature(header.clone()))?;
        let temperature: f64 = temperature_key
            .parse()
            .ok()
            .filter(|t: &f64| t.is_finite())
            .ok_or_else(|| TableError::InvalidTemperature(header.clone()))?;

        let t = match temperature_keys.iter().position(|k| k == temperature_key) {
            Some(t) => t,
            None => {
                temperature_keys.push(temperature_key.to_string());
                temperatures.push(temperature);
                temperatures.len() - 1
            }
        };
        let l = match labels.iter().position(|existing| existing == label) {
            Some(l) => l,
            None => {
                labels.push(label.to_string());
                labels.len() - 1
            }
        };
        cells.insert((l, t), index);
    }

    if temperatures.is_empty() {
        return Err(TableError::NoAbundanceColumns);
    }

    let grid = (0..labels.len())
        .map(|l| {
            (0..temperatures.len())
                .map(|t| {
                    cells.get(&(l, t)).copied().ok_or_else(|| TableError::MissingGridColumn {
                        temperature: temperature_keys[t].clone(),
                        label: labels[l].clone(),
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Layout {
        accession,
        description,
        temperatures,
        labels,
        grid,
    })
}

fn parse_cell(cell: Option<&str>) -> f64 {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

const UNIPROT_KEYS: [&str; 5] = ["OS=", "OX=", "GN=", "PE=", "SV="];

/// Splits a UniProt-style description (`Name OS=… OX=… GN=… PE=… SV=…`) into its fields.
///
/// Keys only count at the start of the text or after a space; a description without keys
/// is kept whole.
pub fn apply_uniprot_description(info: &mut ProteinInfo, raw: &str) {
    let raw = raw.trim();
    let mut markers: Vec<(usize, &str)> = UNIPROT_KEYS
        .iter()
        .filter_map(|&key| find_key(raw, key).map(|position| (position, key)))
        .collect();
    markers.sort_unstable();

    let description_end = markers.first().map_or(raw.len(), |&(position, _)| position);
    info.description = raw[..description_end].trim().to_string();

    for (k, &(position, key)) in markers.iter().enumerate() {
        let end = markers.get(k + 1).map_or(raw.len(), |&(next, _)| next);
        let value = raw[position + key.len()..end].trim().to_string();
        match key {
            "OS=" => info.organism_name = value,
            "OX=" => info.organism_identifier = value,
            "GN=" => info.gene_name = value,
            "PE=" => info.protein_existence = value,
            _ => info.sequence_version = value,
        }
    }
}

fn find_key(raw: &str, key: &str) -> Option<usize> {
    raw.match_indices(key)
        .map(|(position, _)| position)
        .find(|&position| position == 0 || raw[..position].ends_with(' '))
}
