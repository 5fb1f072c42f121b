pub mod difference;
pub mod distance;
pub mod score;

use crate::cli::InputArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::io::read_table;
use crate::ui::{UiEvent, progress_callback};
use tokio::sync::mpsc;
use tpmap::engine::progress::ProgressReporter;
use tpmap::engine::state::Outcome;
use tpmap::workflows::analysis::Analysis;
use tracing::info;

/// Builds the configuration, reads the input table and imports it into a fresh analysis.
fn load_analysis(args: &InputArgs) -> Result<Analysis> {
    info!("Building analysis configuration...");
    let app_config = build_config(args)?;

    info!("Loading abundance table from {:?}", &app_config.input_path);
    let table = read_table(&app_config.input_path)?;

    let mut analysis = Analysis::new(app_config.core_config);
    let proteome = analysis.import_proteins(
        app_config.kind,
        table.temperatures,
        table.labels,
        table.records,
    )?;
    println!(
        "Loaded {} proteins ({} experiment, {} temperatures x {} labels).",
        proteome.len(),
        proteome.kind(),
        proteome.temperatures().len(),
        proteome.labels().len()
    );
    Ok(analysis)
}

fn progress_reporter(ui_sender: mpsc::Sender<UiEvent>) -> ProgressReporter<'static> {
    ProgressReporter::with_callback(progress_callback(ui_sender))
}

fn completed<T>(outcome: Outcome<T>) -> Result<T> {
    outcome.completed().ok_or(CliError::Cancelled)
}
