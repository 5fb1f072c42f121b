use crate::core::curve::profile::ThermalProfile;
use crate::core::scoring::rank::{RankBreakdown, RankTables};
use tracing::{debug, instrument};

/// Builds the population rank lists once and ranks every profile against them.
#[instrument(skip_all, name = "rank_scoring_task")]
pub fn run(profiles: &[&ThermalProfile]) -> Vec<RankBreakdown> {
    let tables = RankTables::from_profiles(profiles.iter().copied());
    debug!(
        proteins = profiles.len(),
        ranked = tables.ranked_count(),
        "Built rank tables."
    );
    profiles.iter().map(|p| tables.breakdown(p)).collect()
}
