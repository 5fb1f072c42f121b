use super::{completed, load_analysis, progress_reporter};
use crate::cli::ScoreArgs;
use crate::error::Result;
use crate::io::{write_output, writer};
use crate::ui::UiEvent;
use tokio::sync::mpsc;
use tpmap::engine::cancel::CancellationToken;
use tpmap::engine::state::ScoreSummary;
use tracing::info;

pub async fn run(
    args: ScoreArgs,
    ui_sender: mpsc::Sender<UiEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut analysis = load_analysis(&args.input)?;
    let reporter = progress_reporter(ui_sender);

    println!("Scoring proteins...");
    info!("Invoking the score computation...");
    let outcome =
        tokio::task::block_in_place(|| analysis.recompute_scores(&reporter, &cancel))?;
    let summary = completed(outcome)?;
    print_summary(&summary);

    let Some(proteome) = analysis.proteome() else {
        return Ok(());
    };
    write_output(&args.output, |w| writer::write_scores(w, proteome))?;
    println!("✓ Scores written to: {}", args.output.display());

    if let Some(path) = &args.colours {
        write_output(path, |w| writer::write_colours(w, &analysis))?;
        println!("✓ Colours written to: {}", path.display());
    }
    Ok(())
}

fn print_summary(summary: &ScoreSummary) {
    info!(?summary, "Score computation finished.");
    println!(
        "Scored {} proteins ({}); thresholds {:.4} / {:.4}.",
        summary.proteins, summary.kind, summary.thresholds.min, summary.thresholds.max
    );
    if let (Some(fully), Some(partially)) = (summary.fully_fitted, summary.partially_fitted) {
        println!(
            "  Curves: {} fully fitted, {} with unfitted replicates.",
            fully, partially
        );
    }
    match &summary.null_model {
        Some(null) => println!(
            "  Null model: {} iterations, mean {:.4}, sd {:.4}, smallest p-value {:.3e}.",
            null.iterations, null.mean, null.std_dev, null.min_positive_p_value
        ),
        None if summary.fully_fitted.is_none() => {
            println!("  No bootstrap was run; p-values are not available.")
        }
        None => {}
    }
}
