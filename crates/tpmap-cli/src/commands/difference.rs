use super::load_analysis;
use crate::cli::DifferenceArgs;
use crate::error::Result;
use crate::io::{write_output, writer};
use tracing::info;

pub async fn run(args: DifferenceArgs) -> Result<()> {
    let mut analysis = load_analysis(&args.input)?;

    info!(protein = %args.protein, "Computing mean differences.");
    let differences = analysis.mean_differences(&args.protein)?;

    let Some(proteome) = analysis.proteome() else {
        return Ok(());
    };
    write_output(&args.output, |w| {
        writer::write_differences(w, proteome, &differences)
    })?;
    println!(
        "✓ Differences from {} written to: {}",
        args.protein,
        args.output.display()
    );
    Ok(())
}
