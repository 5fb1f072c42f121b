use crate::core::curve::fitting::FitOptions;
use crate::core::curve::profile::ThermalProfile;
use crate::core::models::protein::RatioMatrix;
use crate::engine::context::AnalysisContext;
use crate::engine::progress::{Progress, TaskProgress};
use tracing::{info, instrument};

/// Fits the four replicate curves of every protein.
///
/// Progress is reported as the overall fraction range `[start, start + span]`.
#[instrument(skip_all, name = "curve_fitting_task")]
pub fn run(
    context: &AnalysisContext,
    temperatures: &[f64],
    normalized: &[RatioMatrix],
    (start, span): (f64, f64),
) -> Option<Vec<ThermalProfile>> {
    let options: FitOptions = context.config.curve_fit.into();
    info!(
        proteins = normalized.len(),
        max_attempts = options.max_attempts,
        max_iterations = options.max_iterations,
        "Fitting denaturation curves."
    );
    context.reporter.report(Progress::PhaseStart {
        name: "Fitting Denaturation Curves",
    });

    let progress = TaskProgress::start(context.reporter, normalized.len() as u64, start, span);
    let profiles = context.map_items(normalized, |matrix| {
        let profile = ThermalProfile::from_normalized(temperatures, matrix, &options);
        progress.advance(1);
        profile
    });
    progress.finish();
    context.reporter.report(Progress::PhaseFinish);

    if let Some(profiles) = &profiles {
        let fully_fitted = profiles.iter().filter(|p| p.fitted_count() == 4).count();
        info!(
            fully_fitted,
            partially_fitted = profiles.len() - fully_fitted,
            "Curve fitting complete."
        );
    }
    profiles
}
