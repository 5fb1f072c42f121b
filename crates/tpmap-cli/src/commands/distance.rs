use super::{completed, load_analysis, progress_reporter};
use crate::cli::DistanceArgs;
use crate::error::Result;
use crate::io::{write_output, writer};
use crate::ui::UiEvent;
use tokio::sync::mpsc;
use tpmap::engine::cancel::CancellationToken;
use tracing::info;

pub async fn run(
    args: DistanceArgs,
    ui_sender: mpsc::Sender<UiEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut analysis = load_analysis(&args.input)?;
    let reporter = progress_reporter(ui_sender);

    println!("Computing pairwise distances...");
    let outcome =
        tokio::task::block_in_place(|| analysis.distance_matrix(&reporter, &cancel))?;
    let distances = completed(outcome)?;
    info!(proteins = distances.nrows(), "Distance matrix complete.");

    let Some(proteome) = analysis.proteome() else {
        return Ok(());
    };
    write_output(&args.output, |w| {
        writer::write_distance_matrix(w, proteome, &distances)
    })?;
    println!("✓ Distance matrix written to: {}", args.output.display());
    Ok(())
}
