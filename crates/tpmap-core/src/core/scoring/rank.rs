use crate::core::curve::profile::{Replicate, ThermalProfile};
use serde::Serialize;

/// Finite values of one metric across the population, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq)]
struct RankList {
    sorted: Vec<f64>,
}

impl RankList {
    fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        sorted.sort_unstable_by(f64::total_cmp);
        Self { sorted }
    }

    fn len(&self) -> usize {
        self.sorted.len()
    }

    /// 1-based rank counted from the largest value; missing values rank last.
    fn rank_from_top(&self, value: f64) -> usize {
        if !value.is_finite() {
            return self.len();
        }
        let not_greater = self.sorted.partition_point(|&x| x <= value);
        1 + self.len() - not_greater
    }

    /// 1-based rank counted from the smallest value; missing values rank last.
    fn rank_from_bottom(&self, value: f64) -> usize {
        if !value.is_finite() {
            return self.len();
        }
        1 + self.sorted.partition_point(|&x| x < value)
    }

    fn rank(&self, value: f64, end: End) -> usize {
        match end {
            End::Top => self.rank_from_top(value),
            End::Bottom => self.rank_from_bottom(value),
        }
    }

    /// Maps a rank to `[0, 1)`, where the best rank scores highest.
    fn score(&self, rank: usize) -> f64 {
        let n = self.len();
        if n == 0 {
            return 0.0;
        }
        (rank as f64 - n as f64).abs() / n as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Top,
    Bottom,
}

impl End {
    fn of_shift(shift: f64) -> Self {
        if shift > 0.0 { End::Top } else { End::Bottom }
    }
}

/// Per-metric rank scores of one protein, each in `[0, 1)` with higher meaning better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankBreakdown {
    pub mean_tm_shift: f64,
    pub tm_shift_1: f64,
    pub tm_shift_2: f64,
    pub rmse_treatment_1: f64,
    pub rmse_treatment_2: f64,
    pub rmse_vehicle_1: f64,
    pub rmse_vehicle_2: f64,
    pub treatment_agreement: f64,
    pub vehicle_agreement: f64,
}

impl RankBreakdown {
    /// Weighted composite on a 0 to 10 scale.
    ///
    /// `tm_weight` balances the two Tm-shift ranks against the six fit-quality ranks.
    pub fn composite(&self, tm_weight: f64) -> f64 {
        let shift = 3.0 * self.tm_shift_1 + 3.0 * self.tm_shift_2;
        let quality = self.rmse_vehicle_1
            + self.rmse_vehicle_2
            + self.rmse_treatment_1
            + self.rmse_treatment_2
            + self.vehicle_agreement
            + self.treatment_agreement;
        (tm_weight * shift + (1.0 - tm_weight) * quality) / 6.0 * 10.0
    }
}

/// Sorted reference lists of every ranked metric, built once per population.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankTables {
    mean_tm_shift: RankList,
    tm_shift_1: RankList,
    tm_shift_2: RankList,
    rmse: [RankList; 4],
    treatment_agreement: RankList,
    vehicle_agreement: RankList,
}

impl RankTables {
    pub fn from_profiles<'a, I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = &'a ThermalProfile>,
    {
        let profiles: Vec<&ThermalProfile> = profiles.into_iter().collect();
        let list = |metric: &dyn Fn(&ThermalProfile) -> f64| {
            RankList::from_values(profiles.iter().map(|p| metric(p)))
        };

        Self {
            mean_tm_shift: list(&|p| p.mean_tm_shift.abs()),
            tm_shift_1: list(&|p| p.tm_shift_1),
            tm_shift_2: list(&|p| p.tm_shift_2),
            rmse: Replicate::ALL.map(|r| list(&|p| p.replicate(r).rmse)),
            treatment_agreement: list(&|p| p.treatment_agreement),
            vehicle_agreement: list(&|p| p.vehicle_agreement),
        }
    }

    /// Number of proteins with a finite mean Tm shift.
    pub fn ranked_count(&self) -> usize {
        self.mean_tm_shift.len()
    }

    pub fn breakdown(&self, profile: &ThermalProfile) -> RankBreakdown {
        let (rank_1, rank_2) = self.tm_shift_ranks(profile.tm_shift_1, profile.tm_shift_2);
        let rmse = |r: Replicate| {
            let list = &self.rmse[r.row()];
            list.score(list.rank_from_bottom(profile.replicate(r).rmse))
        };

        RankBreakdown {
            mean_tm_shift: self
                .mean_tm_shift
                .score(self.mean_tm_shift.rank_from_top(profile.mean_tm_shift.abs())),
            tm_shift_1: self.tm_shift_1.score(rank_1),
            tm_shift_2: self.tm_shift_2.score(rank_2),
            rmse_treatment_1: rmse(Replicate::Treatment1),
            rmse_treatment_2: rmse(Replicate::Treatment2),
            rmse_vehicle_1: rmse(Replicate::Vehicle1),
            rmse_vehicle_2: rmse(Replicate::Vehicle2),
            treatment_agreement: self
                .treatment_agreement
                .score(self.treatment_agreement.rank_from_bottom(profile.treatment_agreement)),
            vehicle_agreement: self
                .vehicle_agreement
                .score(self.vehicle_agreement.rank_from_bottom(profile.vehicle_agreement)),
        }
    }

    /// Ranks the two replicate Tm shifts in the direction they agree on.
    ///
    /// Shifts of the same sign rank from the matching end of their lists. When the signs
    /// disagree each shift is first ranked in its own direction; the better-ranked shift sets
    /// the direction and the other shift is re-ranked from that end, which penalises the
    /// disagreement.
    fn tm_shift_ranks(&self, shift_1: f64, shift_2: f64) -> (usize, usize) {
        let (list_1, list_2) = (&self.tm_shift_1, &self.tm_shift_2);
        match (shift_1.is_finite(), shift_2.is_finite()) {
            (true, true) if shift_1 >= 0.0 && shift_2 >= 0.0 => {
                (list_1.rank_from_top(shift_1), list_2.rank_from_top(shift_2))
            }
            (true, true) if shift_1 <= 0.0 && shift_2 <= 0.0 => {
                (list_1.rank_from_bottom(shift_1), list_2.rank_from_bottom(shift_2))
            }
            (true, true) => {
                let (end_1, end_2) = (End::of_shift(shift_1), End::of_shift(shift_2));
                let rank_1 = list_1.rank(shift_1, end_1);
                let rank_2 = list_2.rank(shift_2, end_2);
                if rank_1 > rank_2 {
                    (list_1.rank(shift_1, end_2), rank_2)
                } else {
                    (rank_1, list_2.rank(shift_2, end_1))
                }
            }
            (true, false) => (list_1.rank(shift_1, End::of_shift(shift_1)), list_2.len()),
            (false, true) => (list_1.len(), list_2.rank(shift_2, End::of_shift(shift_2))),
            (false, false) => (list_1.len(), list_2.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::curve::profile::ReplicateCurve;

    const EPS: f64 = 1e-12;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn replicate(rmse: f64) -> ReplicateCurve {
        ReplicateCurve {
            fit: None,
            melting_point: f64::NAN,
            rmse,
            area_under_curve: f64::NAN,
        }
    }

    fn profile(shift_1: f64, shift_2: f64, rmse: f64, agreement: f64) -> ThermalProfile {
        ThermalProfile {
            replicates: [replicate(rmse); 4],
            tm_shift_1: shift_1,
            tm_shift_2: shift_2,
            treatment_spread: (shift_1 - shift_2).abs(),
            mean_tm_shift: (shift_1 + shift_2) / 2.0,
            same_direction: shift_1.signum() == shift_2.signum(),
            shift_exceeds_spread: false,
            treatment_agreement: agreement,
            vehicle_agreement: agreement,
        }
    }

    #[test]
    fn ranks_count_strictly_better_values() {
        let list = RankList::from_values([3.0, 1.0, 2.0, 2.0, f64::NAN]);
        assert_eq!(list.len(), 4);
        assert_eq!(list.rank_from_top(3.0), 1);
        assert_eq!(list.rank_from_top(2.0), 2);
        assert_eq!(list.rank_from_top(1.0), 4);
        assert_eq!(list.rank_from_bottom(1.0), 1);
        assert_eq!(list.rank_from_bottom(2.0), 2);
        assert_eq!(list.rank_from_bottom(3.0), 4);
    }

    #[test]
    fn missing_values_take_the_worst_rank_and_score_zero() {
        let list = RankList::from_values([1.0, 2.0, 3.0]);
        let rank = list.rank_from_top(f64::NAN);
        assert_eq!(rank, 3);
        assert_eq!(list.score(rank), 0.0);
        assert!(approx_eq(list.score(1), 2.0 / 3.0));
    }

    #[test]
    fn empty_lists_score_zero() {
        let list = RankList::default();
        assert_eq!(list.score(list.rank_from_top(f64::NAN)), 0.0);
    }

    #[test]
    fn consistent_positive_shifts_rank_from_the_top() {
        let profiles = [
            profile(4.0, 4.0, 0.01, 0.1),
            profile(1.0, 1.0, 0.02, 0.2),
            profile(-2.0, -2.0, 0.03, 0.3),
        ];
        let tables = RankTables::from_profiles(&profiles);

        assert_eq!(tables.tm_shift_ranks(4.0, 4.0), (1, 1));
        assert_eq!(tables.tm_shift_ranks(1.0, 1.0), (2, 2));
        assert_eq!(tables.tm_shift_ranks(-2.0, -2.0), (1, 1));
    }

    #[test]
    fn contradicting_shifts_are_re_ranked_in_the_stronger_direction() {
        let profiles = [
            profile(5.0, -1.0, 0.01, 0.1),
            profile(3.0, -3.0, 0.01, 0.1),
            profile(-4.0, 4.0, 0.01, 0.1),
            profile(1.0, 2.0, 0.01, 0.1),
        ];
        let tables = RankTables::from_profiles(&profiles);

        // 5.0 is first from the top and -1.0 second from the bottom; -1.0 is re-ranked from
        // the top, where it is third.
        assert_eq!(tables.tm_shift_ranks(5.0, -1.0), (1, 3));
        // 1.0 is third from the top and -3.0 first from the bottom; 1.0 is re-ranked from
        // the bottom.
        assert_eq!(tables.tm_shift_ranks(1.0, -3.0), (2, 1));
        // Equal ranks keep the first shift's direction.
        assert_eq!(tables.tm_shift_ranks(-4.0, 4.0), (1, 4));
    }

    #[test]
    fn single_missing_shift_ranks_last_and_other_follows_its_sign() {
        let profiles = [
            profile(2.0, 1.0, 0.01, 0.1),
            profile(-3.0, f64::NAN, 0.01, 0.1),
        ];
        let tables = RankTables::from_profiles(&profiles);
        assert_eq!(tables.tm_shift_ranks(-3.0, f64::NAN), (1, 1));
        assert_eq!(tables.tm_shift_ranks(f64::NAN, f64::NAN), (2, 1));
    }

    #[test]
    fn fit_quality_metrics_rank_from_the_low_end() {
        let profiles = [
            profile(1.0, 1.0, 0.01, 0.5),
            profile(1.0, 1.0, 0.05, 0.1),
        ];
        let tables = RankTables::from_profiles(&profiles);

        let first = tables.breakdown(&profiles[0]);
        assert!(approx_eq(first.rmse_vehicle_1, 0.5));
        assert_eq!(first.treatment_agreement, 0.0);

        let second = tables.breakdown(&profiles[1]);
        assert_eq!(second.rmse_treatment_2, 0.0);
        assert!(approx_eq(second.vehicle_agreement, 0.5));
    }

    #[test]
    fn composite_weights_shift_against_fit_quality() {
        let breakdown = RankBreakdown {
            mean_tm_shift: 0.9,
            tm_shift_1: 0.5,
            tm_shift_2: 0.5,
            rmse_treatment_1: 0.25,
            rmse_treatment_2: 0.25,
            rmse_vehicle_1: 0.25,
            rmse_vehicle_2: 0.25,
            treatment_agreement: 0.25,
            vehicle_agreement: 0.25,
        };

        assert!(approx_eq(breakdown.composite(1.0), 5.0));
        assert!(approx_eq(breakdown.composite(0.0), 2.5));
        assert!(approx_eq(breakdown.composite(0.7), 0.7 * 5.0 + 0.3 * 2.5));
    }

    #[test]
    fn best_protein_outscores_worst_at_any_weight() {
        let profiles = [
            profile(4.0, 4.2, 0.01, 0.1),
            profile(0.5, 0.4, 0.05, 0.9),
            profile(f64::NAN, f64::NAN, f64::NAN, f64::NAN),
        ];
        let tables = RankTables::from_profiles(&profiles);
        assert_eq!(tables.ranked_count(), 2);

        for weight in [0.0, 0.3, 0.7, 1.0] {
            let best = tables.breakdown(&profiles[0]).composite(weight);
            let middle = tables.breakdown(&profiles[1]).composite(weight);
            let missing = tables.breakdown(&profiles[2]).composite(weight);
            assert!(best > middle);
            assert_eq!(missing, 0.0);
        }
    }
}
