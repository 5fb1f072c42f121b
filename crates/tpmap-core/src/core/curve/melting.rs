use super::model::DenaturationCurve;

/// Width of the bracketing interval at which the bisection stops, in degrees.
pub const MELTING_POINT_ACCURACY: f64 = 1e-4;

const HALF_DENATURED: f64 = 0.5;

/// Finds the temperature in `[lower, upper]` at which the curve crosses 0.5.
///
/// The curve must fall from above 0.5 to below 0.5 across the interval. Each step keeps the
/// half whose endpoints straddle the crossing in that decreasing direction; if neither half
/// does, the crossing is not bracketed and `NaN` is returned instead of a guess.
pub fn melting_point(curve: &DenaturationCurve, lower: f64, upper: f64) -> f64 {
    if !lower.is_finite() || !upper.is_finite() || lower > upper {
        return f64::NAN;
    }

    let (mut lower, mut upper) = (lower, upper);
    loop {
        let mid = (lower + upper) / 2.0;
        if upper - lower < MELTING_POINT_ACCURACY {
            return mid;
        }

        let lower_y = curve.value(lower);
        let mid_y = curve.value(mid);
        let upper_y = curve.value(upper);

        if mid_y == HALF_DENATURED {
            return mid;
        } else if lower_y > HALF_DENATURED && mid_y < HALF_DENATURED {
            upper = mid;
        } else if mid_y > HALF_DENATURED && upper_y < HALF_DENATURED {
            lower = mid;
        } else {
            return f64::NAN;
        }
    }
}

/// Root-mean-square error of the curve over paired observations.
///
/// Uses `n - 1` degrees of freedom; pairs with a non-finite value are skipped and fewer than
/// two usable pairs give `NaN`.
pub fn rmse(curve: &DenaturationCurve, temperatures: &[f64], values: &[f64]) -> f64 {
    let (sum, n) = temperatures
        .iter()
        .zip(values)
        .filter(|(t, v)| t.is_finite() && v.is_finite())
        .fold((0.0, 0usize), |(sum, n), (&t, &v)| {
            let residual = v - curve.value(t);
            (sum + residual * residual, n + 1)
        });
    if n < 2 {
        return f64::NAN;
    }
    (sum / (n - 1) as f64).sqrt()
}

/// Area under the observed series by the trapezoid rule over consecutive finite points.
pub fn area_under_curve(temperatures: &[f64], values: &[f64]) -> f64 {
    let points: Vec<(f64, f64)> = temperatures
        .iter()
        .zip(values)
        .filter(|(t, v)| t.is_finite() && v.is_finite())
        .map(|(&t, &v)| (t, v))
        .collect();
    if points.len() < 2 {
        return f64::NAN;
    }
    points
        .windows(2)
        .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analytic_melting_point(curve: &DenaturationCurve) -> f64 {
        curve.a / (curve.b + (1.0 - 2.0 * curve.plateau).ln())
    }

    #[test]
    fn bisection_matches_analytic_melting_point_without_plateau() {
        let curve = DenaturationCurve::new(3000.0, 60.0, 0.0);
        let tm = melting_point(&curve, 40.0, 60.0);
        assert!((tm - 50.0).abs() < MELTING_POINT_ACCURACY);
    }

    #[test]
    fn bisection_matches_analytic_melting_point_with_plateau() {
        let curve = DenaturationCurve::new(2800.0, 52.0, 0.15);
        let expected = analytic_melting_point(&curve);
        let tm = melting_point(&curve, 37.0, 67.0);
        assert!((tm - expected).abs() < MELTING_POINT_ACCURACY);
    }

    #[test]
    fn bisection_returns_nan_when_crossing_is_outside_interval() {
        let curve = DenaturationCurve::new(3000.0, 60.0, 0.0);
        assert!(melting_point(&curve, 55.0, 70.0).is_nan());
        assert!(melting_point(&curve, 30.0, 45.0).is_nan());
    }

    #[test]
    fn bisection_returns_nan_when_plateau_never_drops_below_half() {
        let curve = DenaturationCurve::new(3000.0, 60.0, 0.6);
        assert!(melting_point(&curve, 37.0, 67.0).is_nan());
    }

    #[test]
    fn rmse_uses_n_minus_one_degrees_of_freedom() {
        let curve = DenaturationCurve::new(3000.0, 60.0, 0.0);
        let temps = [40.0, 50.0, 60.0];
        let values: Vec<f64> = temps.iter().map(|&t| curve.value(t) + 0.1).collect();
        let expected = (3.0 * 0.01_f64 / 2.0).sqrt();
        assert!((rmse(&curve, &temps, &values) - expected).abs() < 1e-12);
    }

    #[test]
    fn rmse_of_fewer_than_two_points_is_nan() {
        let curve = DenaturationCurve::SEED;
        assert!(rmse(&curve, &[40.0], &[0.9]).is_nan());
        assert!(rmse(&curve, &[40.0, 50.0], &[0.9, f64::NAN]).is_nan());
    }

    #[test]
    fn trapezoid_area_skips_missing_points() {
        let temps = [40.0, 50.0, 60.0, 70.0];
        let values = [1.0, 0.5, f64::NAN, 0.0];
        let area = area_under_curve(&temps, &values);
        assert!((area - (7.5 + 5.0)).abs() < 1e-12);
    }
}
