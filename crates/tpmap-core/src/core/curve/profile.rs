use super::fitting::{CurveFit, FitOptions, fit};
use super::melting::{area_under_curve, melting_point};
use crate::core::models::protein::RatioMatrix;
use serde::Serialize;

/// The four replicate series of a 1D experiment, in sorted label order (`t1, t2, v1, v2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Replicate {
    Treatment1,
    Treatment2,
    Vehicle1,
    Vehicle2,
}

impl Replicate {
    pub const ALL: [Replicate; 4] = [
        Replicate::Treatment1,
        Replicate::Treatment2,
        Replicate::Vehicle1,
        Replicate::Vehicle2,
    ];

    /// Row of the replicate in a 1D ratio matrix.
    pub fn row(self) -> usize {
        match self {
            Replicate::Treatment1 => 0,
            Replicate::Treatment2 => 1,
            Replicate::Vehicle1 => 2,
            Replicate::Vehicle2 => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Replicate::Treatment1 => "T1",
            Replicate::Treatment2 => "T2",
            Replicate::Vehicle1 => "V1",
            Replicate::Vehicle2 => "V2",
        }
    }
}

/// Curve-derived metrics of one replicate series. Missing results are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReplicateCurve {
    pub fit: Option<CurveFit>,
    pub melting_point: f64,
    pub rmse: f64,
    pub area_under_curve: f64,
}

impl ReplicateCurve {
    fn from_series(temperatures: &[f64], values: &[f64], options: &FitOptions) -> Self {
        let fit = fit(temperatures, values, options);
        let (lower, upper) = temperature_range(temperatures);
        let (melting_point, rmse) = match &fit {
            Some(f) => (melting_point(&f.curve, lower, upper), f.rmse),
            None => (f64::NAN, f64::NAN),
        };
        Self {
            fit,
            melting_point,
            rmse,
            area_under_curve: area_under_curve(temperatures, values),
        }
    }
}

/// Per-protein melting behaviour across the four replicate series of a 1D experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermalProfile {
    pub replicates: [ReplicateCurve; 4],
    /// `Tm(T1) - Tm(V1)`.
    pub tm_shift_1: f64,
    /// `Tm(T2) - Tm(V2)`.
    pub tm_shift_2: f64,
    /// `|Tm(T1) - Tm(T2)|`.
    pub treatment_spread: f64,
    pub mean_tm_shift: f64,
    pub same_direction: bool,
    pub shift_exceeds_spread: bool,
    /// Sum over temperatures of `||T1| - |T2||` on the normalized ratios.
    pub treatment_agreement: f64,
    /// Sum over temperatures of `||V1| - |V2||` on the normalized ratios.
    pub vehicle_agreement: f64,
}

impl ThermalProfile {
    /// Fits all four replicate rows of `normalized` and derives the shift metrics.
    ///
    /// `normalized` must have one row per [`Replicate`] and one column per temperature.
    pub fn from_normalized(
        temperatures: &[f64],
        normalized: &RatioMatrix,
        options: &FitOptions,
    ) -> Self {
        let series = |r: Replicate| -> Vec<f64> { normalized.row(r.row()).iter().copied().collect() };
        let replicates = Replicate::ALL
            .map(|r| ReplicateCurve::from_series(temperatures, &series(r), options));

        let tm = |r: Replicate| replicates[r.row()].melting_point;
        let tm_shift_1 = tm(Replicate::Treatment1) - tm(Replicate::Vehicle1);
        let tm_shift_2 = tm(Replicate::Treatment2) - tm(Replicate::Vehicle2);
        let treatment_spread = (tm(Replicate::Treatment1) - tm(Replicate::Treatment2)).abs();

        Self {
            replicates,
            tm_shift_1,
            tm_shift_2,
            treatment_spread,
            mean_tm_shift: (tm_shift_1 + tm_shift_2) / 2.0,
            same_direction: (tm_shift_1 > 0.0 && tm_shift_2 > 0.0)
                || (tm_shift_1 < 0.0 && tm_shift_2 < 0.0),
            // Signed: only stabilizing shifts can exceed the spread.
            shift_exceeds_spread: tm_shift_1 > treatment_spread && tm_shift_2 > treatment_spread,
            treatment_agreement: agreement(
                &series(Replicate::Treatment1),
                &series(Replicate::Treatment2),
            ),
            vehicle_agreement: agreement(&series(Replicate::Vehicle1), &series(Replicate::Vehicle2)),
        }
    }

    pub fn replicate(&self, replicate: Replicate) -> &ReplicateCurve {
        &self.replicates[replicate.row()]
    }

    pub fn fitted_count(&self) -> usize {
        self.replicates.iter().filter(|r| r.fit.is_some()).count()
    }
}

fn agreement(first: &[f64], second: &[f64]) -> f64 {
    first
        .iter()
        .zip(second)
        .map(|(a, b)| (a.abs() - b.abs()).abs())
        .sum()
}

fn temperature_range(temperatures: &[f64]) -> (f64, f64) {
    temperatures
        .iter()
        .filter(|t| t.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
            (lo.min(t), hi.max(t))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::curve::model::DenaturationCurve;

    fn temperatures() -> Vec<f64> {
        (0..10).map(|i| 37.0 + 3.0 * i as f64).collect()
    }

    fn profile_matrix(curves: [DenaturationCurve; 4]) -> RatioMatrix {
        let temps = temperatures();
        RatioMatrix::from_fn(4, temps.len(), |i, j| curves[i].value(temps[j]))
    }

    fn curve_with_tm(tm: f64) -> DenaturationCurve {
        let b = 45.0;
        DenaturationCurve::new(b * tm, b, 0.0)
    }

    #[test]
    fn replicate_rows_follow_sorted_label_order() {
        let rows: Vec<usize> = Replicate::ALL.iter().map(|r| r.row()).collect();
        assert_eq!(rows, vec![0, 1, 2, 3]);
        assert_eq!(Replicate::Vehicle2.label(), "V2");
    }

    #[test]
    fn stabilized_profile_has_consistent_positive_shifts() {
        let matrix = profile_matrix([
            curve_with_tm(54.0),
            curve_with_tm(54.5),
            curve_with_tm(50.0),
            curve_with_tm(50.2),
        ]);
        let profile = ThermalProfile::from_normalized(&temperatures(), &matrix, &FitOptions::default());

        assert_eq!(profile.fitted_count(), 4);
        assert!((profile.tm_shift_1 - 4.0).abs() < 0.05);
        assert!((profile.tm_shift_2 - 4.3).abs() < 0.05);
        assert!((profile.treatment_spread - 0.5).abs() < 0.05);
        assert!((profile.mean_tm_shift - 4.15).abs() < 0.05);
        assert!(profile.same_direction);
        assert!(profile.shift_exceeds_spread);
        assert!(profile.replicate(Replicate::Treatment1).rmse < 1e-3);
    }

    #[test]
    fn destabilizing_shifts_never_exceed_the_spread() {
        let matrix = profile_matrix([
            curve_with_tm(48.0),
            curve_with_tm(48.5),
            curve_with_tm(52.0),
            curve_with_tm(52.2),
        ]);
        let profile = ThermalProfile::from_normalized(&temperatures(), &matrix, &FitOptions::default());

        assert!((profile.tm_shift_1 + 4.0).abs() < 0.05);
        assert!((profile.tm_shift_2 + 3.7).abs() < 0.05);
        assert!(profile.same_direction);
        assert!(!profile.shift_exceeds_spread);
    }

    #[test]
    fn unshifted_replicates_have_no_direction() {
        let matrix = profile_matrix([curve_with_tm(52.0); 4]);
        let profile = ThermalProfile::from_normalized(&temperatures(), &matrix, &FitOptions::default());

        assert_eq!(profile.tm_shift_1, 0.0);
        assert!(!profile.same_direction);
        assert!(!profile.shift_exceeds_spread);
    }

    #[test]
    fn identical_replicates_agree_perfectly() {
        let curve = curve_with_tm(52.0);
        let matrix = profile_matrix([curve, curve, curve, curve]);
        let profile = ThermalProfile::from_normalized(&temperatures(), &matrix, &FitOptions::default());

        assert_eq!(profile.treatment_agreement, 0.0);
        assert_eq!(profile.vehicle_agreement, 0.0);
    }

    #[test]
    fn unfittable_replicates_propagate_missing_shifts() {
        let temps = temperatures();
        let mut matrix = profile_matrix([curve_with_tm(52.0); 4]);
        matrix.row_mut(0).fill(f64::NAN);
        let options = FitOptions::default();
        let profile = ThermalProfile::from_normalized(&temps, &matrix, &options);

        assert!(profile.replicate(Replicate::Treatment1).fit.is_none());
        assert!(profile.tm_shift_1.is_nan());
        assert!(profile.mean_tm_shift.is_nan());
        assert!(!profile.same_direction);
        assert!(profile.treatment_agreement.is_nan());
        assert!(!profile.tm_shift_2.is_nan());
    }

    #[test]
    fn zero_budget_gives_no_fits_but_keeps_area() {
        let matrix = profile_matrix([curve_with_tm(52.0); 4]);
        let options = FitOptions {
            max_attempts: 0,
            ..FitOptions::default()
        };
        let profile = ThermalProfile::from_normalized(&temperatures(), &matrix, &options);

        assert_eq!(profile.fitted_count(), 0);
        assert!(profile.replicates.iter().all(|r| r.melting_point.is_nan()));
        assert!(profile.replicates.iter().all(|r| r.area_under_curve.is_finite()));
    }
}
