use nalgebra::DMatrix;
use std::cmp::Ordering;
use std::io::Write;
use tpmap::core::colour::to_hex;
use tpmap::core::curve::profile::Replicate;
use tpmap::core::models::protein::Protein;
use tpmap::core::models::proteome::{ExperimentKind, Proteome};
use tpmap::workflows::analysis::Analysis;

type CsvResult = std::result::Result<(), csv::Error>;

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer)
}

fn identity(protein: &Protein) -> [String; 3] {
    [
        protein.accession().to_string(),
        protein.info.gene_name.clone(),
        protein.info.description.clone(),
    ]
}

/// Writes one row per protein, in population order, with the columns of the experiment kind.
pub fn write_scores<W: Write>(writer: W, proteome: &Proteome) -> CsvResult {
    let mut out = tsv_writer(writer);
    match proteome.kind() {
        ExperimentKind::TwoDimensional => {
            out.write_record([
                "accession",
                "gene",
                "description",
                "score",
                "stabilization",
                "destabilization",
                "mean_fold_change",
                "p_value",
                "effect",
            ])?;
            for protein in proteome.proteins() {
                let scores = protein.scores();
                let (stabilization, destabilization) = scores
                    .flood
                    .map_or((f64::NAN, f64::NAN), |f| (f.stabilization, f.destabilization));
                let mut row = Vec::from(identity(protein));
                row.extend([
                    scores.score.to_string(),
                    stabilization.to_string(),
                    destabilization.to_string(),
                    scores.mean_fold_change.to_string(),
                    scores.p_value.to_string(),
                    scores.effect.map(|e| e.to_string()).unwrap_or_default(),
                ]);
                out.write_record(&row)?;
            }
        }
        ExperimentKind::OneDimensional => {
            let mut header: Vec<String> = [
                "accession",
                "gene",
                "description",
                "score",
                "mean_tm_shift",
                "tm_shift_1",
                "tm_shift_2",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect();
            for replicate in Replicate::ALL {
                header.push(format!("tm_{}", replicate.label().to_lowercase()));
            }
            for replicate in Replicate::ALL {
                header.push(format!("rmse_{}", replicate.label().to_lowercase()));
            }
            header.push("fitted".to_string());
            out.write_record(&header)?;

            for protein in proteome.proteins() {
                let scores = protein.scores();
                let mut row = Vec::from(identity(protein));
                row.push(scores.score.to_string());
                match &scores.thermal {
                    Some(thermal) => {
                        row.extend([
                            thermal.mean_tm_shift.to_string(),
                            thermal.tm_shift_1.to_string(),
                            thermal.tm_shift_2.to_string(),
                        ]);
                        row.extend(
                            Replicate::ALL
                                .iter()
                                .map(|&r| thermal.replicate(r).melting_point.to_string()),
                        );
                        row.extend(
                            Replicate::ALL
                                .iter()
                                .map(|&r| thermal.replicate(r).rmse.to_string()),
                        );
                        row.push(thermal.fitted_count().to_string());
                    }
                    None => {
                        row.extend(std::iter::repeat_n(f64::NAN.to_string(), 11));
                        row.push("0".to_string());
                    }
                }
                out.write_record(&row)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Writes the display colour of every normalized cell as `#rrggbb`, one row per protein.
///
/// Columns are named `<label>_<temperature>` in matrix order.
pub fn write_colours<W: Write>(writer: W, analysis: &Analysis) -> CsvResult {
    let mut out = tsv_writer(writer);
    let Some(proteome) = analysis.proteome() else {
        return Ok(());
    };

    let mut header = vec!["accession".to_string()];
    for label in proteome.labels() {
        for temperature in proteome.temperatures() {
            header.push(format!("{}_{}", label, temperature));
        }
    }
    out.write_record(&header)?;

    for protein in proteome.proteins() {
        let normalized = protein.normalized();
        let mut row = Vec::with_capacity(header.len());
        row.push(protein.accession().to_string());
        for i in 0..normalized.nrows() {
            for j in 0..normalized.ncols() {
                row.push(to_hex(analysis.colour_for(normalized[(i, j)])));
            }
        }
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes a square distance matrix labelled by accession on both axes.
pub fn write_distance_matrix<W: Write>(
    writer: W,
    proteome: &Proteome,
    distances: &DMatrix<f64>,
) -> CsvResult {
    let mut out = tsv_writer(writer);
    let mut header = vec!["accession".to_string()];
    header.extend(proteome.proteins().iter().map(|p| p.accession().to_string()));
    out.write_record(&header)?;

    for (i, protein) in proteome.proteins().iter().enumerate() {
        let mut row = vec![protein.accession().to_string()];
        row.extend(distances.row(i).iter().map(|d| d.to_string()));
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes mean differences from a selected protein, closest first and missing values last.
pub fn write_differences<W: Write>(
    writer: W,
    proteome: &Proteome,
    differences: &[f64],
) -> CsvResult {
    let mut ordered: Vec<(&Protein, f64)> = proteome
        .proteins()
        .iter()
        .zip(differences.iter().copied())
        .collect();
    ordered.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.1.total_cmp(&b.1),
    });

    let mut out = tsv_writer(writer);
    out.write_record(["accession", "gene", "description", "mean_difference"])?;
    for (protein, difference) in ordered {
        let mut row = Vec::from(identity(protein));
        row.push(difference.to_string());
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpmap::core::models::protein::ProteinInfo;
    use tpmap::core::models::proteome::ProteinRecord;
    use tpmap::engine::cancel::CancellationToken;
    use tpmap::engine::config::{AnalysisConfig, NormalizationMode};
    use tpmap::engine::progress::ProgressReporter;

    fn record(accession: &str, gene: &str, rows: Vec<Vec<f64>>) -> ProteinRecord {
        let mut info = ProteinInfo::new(accession);
        info.gene_name = gene.to_string();
        ProteinRecord {
            info,
            abundances: rows,
            reference: None,
        }
    }

    fn scored_analysis() -> Analysis {
        let mut config = AnalysisConfig::default();
        config.normalization = NormalizationMode::None;
        config.bootstrap.iterations = 0;
        let mut analysis = Analysis::new(config);
        analysis
            .import_proteins(
                ExperimentKind::TwoDimensional,
                vec![37.0, 41.0],
                vec!["0".to_string(), "10".to_string()],
                vec![
                    record("FLAT", "FLT", vec![vec![1.0, 1.0], vec![1.0, 1.0]]),
                    record("UP", "UPG", vec![vec![1.0, 1.0], vec![1.0, 2.0]]),
                    record("GAP", "GAP", vec![vec![1.0, 1.0], vec![1.0, f64::NAN]]),
                ],
            )
            .unwrap();
        analysis
            .recompute_scores(&ProgressReporter::new(), &CancellationToken::new())
            .unwrap();
        analysis
    }

    fn lines(bytes: Vec<u8>) -> Vec<Vec<String>> {
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| line.split('\t').map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn two_dimensional_scores_have_one_row_per_protein() {
        let analysis = scored_analysis();
        let mut buffer = Vec::new();
        write_scores(&mut buffer, analysis.proteome().unwrap()).unwrap();

        let rows = lines(buffer);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0], "accession");
        assert_eq!(rows[0].len(), 9);
        assert!(rows[1..].iter().all(|r| r.len() == 9));

        let mut accessions: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
        accessions.sort_unstable();
        assert_eq!(accessions, vec!["FLAT", "GAP", "UP"]);
        let first = &analysis.proteome().unwrap().proteins()[0];
        assert_eq!(rows[1][0], first.accession());
        assert_eq!(rows[1][3].parse::<f64>().unwrap(), first.score());
    }

    #[test]
    fn colours_mark_missing_cells_white() {
        let analysis = scored_analysis();
        let mut buffer = Vec::new();
        write_colours(&mut buffer, &analysis).unwrap();

        let rows = lines(buffer);
        assert_eq!(rows[0], vec!["accession", "0_37", "0_41", "10_37", "10_41"]);
        let gap = rows.iter().find(|r| r[0] == "GAP").unwrap();
        assert_eq!(gap[4], "#ffffff");
        assert!(gap[1..4].iter().all(|hex| hex.len() == 7 && hex.starts_with('#')));
    }

    #[test]
    fn distance_matrix_is_labelled_on_both_axes() {
        let analysis = scored_analysis();
        let proteome = analysis.proteome().unwrap();
        let distances = DMatrix::from_fn(3, 3, |i, j| (i as f64 - j as f64).abs());

        let mut buffer = Vec::new();
        write_distance_matrix(&mut buffer, proteome, &distances).unwrap();

        let rows = lines(buffer);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][1], proteome.proteins()[0].accession());
        assert_eq!(rows[1][0], proteome.proteins()[0].accession());
        assert_eq!(rows[1][1], "0");
        assert_eq!(rows[3][1], "2");
    }

    #[test]
    fn differences_are_sorted_with_missing_values_last() {
        let analysis = scored_analysis();
        let proteome = analysis.proteome().unwrap();
        let differences = vec![f64::NAN, 0.5, 0.0];

        let mut buffer = Vec::new();
        write_differences(&mut buffer, proteome, &differences).unwrap();

        let rows = lines(buffer);
        let accessions: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
        let expected = [
            proteome.proteins()[2].accession(),
            proteome.proteins()[1].accession(),
            proteome.proteins()[0].accession(),
        ];
        assert_eq!(accessions, expected);
        assert_eq!(rows[3][3], "NaN");
    }
}
