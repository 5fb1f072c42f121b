use super::melting::rmse;
use super::model::DenaturationCurve;
use nalgebra::{Matrix3, Vector3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

pub const DEFAULT_FIT_SEED: u64 = 123;

const SEED_A_SPREAD: f64 = 1000.0;
const SEED_B_SPREAD: f64 = 10.0;
const MIN_SEED_PARAMETER: f64 = 1e-4;

const INITIAL_DAMPING: f64 = 1e-3;
const MIN_DAMPING: f64 = 1e-12;
const MAX_DAMPING: f64 = 1e20;
const DIAGONAL_FLOOR: f64 = 1e-12;
const COST_TOLERANCE: f64 = 1e-10;
const PARAMETER_TOLERANCE: f64 = 1e-10;

/// Budget and seeding for a multi-start curve fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitOptions {
    pub max_attempts: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            max_iterations: 1000,
            seed: DEFAULT_FIT_SEED,
        }
    }
}

/// A fitted denaturation curve together with its RMSE over the fitted points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveFit {
    pub curve: DenaturationCurve,
    pub rmse: f64,
}

#[derive(Debug, Error, PartialEq)]
enum FitError {
    #[error("no convergence within {0} iterations")]
    IterationLimit(usize),
    #[error("residuals or Jacobian became non-finite")]
    NonFinite,
    #[error("damping grew without reducing the cost")]
    Stalled,
}

/// Fits the denaturation model to a temperature series.
///
/// Points with a missing value are dropped together with their temperature. Each attempt runs
/// a Levenberg–Marquardt descent from the current seed; converged fits with `b < 0` are
/// rejected as non-physical and the remaining fits compete on RMSE. After every attempt the
/// seed is redrawn around the canonical `(3000, 50, 0)` from a generator seeded with
/// `options.seed`, so identical inputs always produce identical fits.
///
/// Returns `None` when there is nothing to fit, when either budget is zero, or when no
/// attempt produced an acceptable curve.
pub fn fit(temperatures: &[f64], values: &[f64], options: &FitOptions) -> Option<CurveFit> {
    if options.max_attempts == 0 || options.max_iterations == 0 {
        return None;
    }

    let (temps, observed): (Vec<f64>, Vec<f64>) = temperatures
        .iter()
        .zip(values)
        .filter(|(t, v)| t.is_finite() && v.is_finite())
        .map(|(&t, &v)| (t, v))
        .unzip();
    if temps.is_empty() {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut start = DenaturationCurve::SEED;
    let mut best: Option<CurveFit> = None;

    for attempt in 0..options.max_attempts {
        match levenberg_marquardt(&temps, &observed, start, options.max_iterations) {
            Ok(curve) if curve.b >= 0.0 => {
                let error = rmse(&curve, &temps, &observed);
                let improves = match &best {
                    None => true,
                    Some(current) => error < current.rmse,
                };
                if improves {
                    best = Some(CurveFit { curve, rmse: error });
                }
            }
            Ok(curve) => trace!(attempt, b = curve.b, "Rejected non-physical fit."),
            Err(e) => trace!(attempt, "Fit attempt failed: {}", e),
        }
        start = perturbed_seed(&mut rng);
    }

    best
}

fn perturbed_seed(rng: &mut StdRng) -> DenaturationCurve {
    let a = sample_around(rng, DenaturationCurve::SEED.a, SEED_A_SPREAD);
    let b = sample_around(rng, DenaturationCurve::SEED.b, SEED_B_SPREAD);
    DenaturationCurve::new(
        a.max(MIN_SEED_PARAMETER),
        b.max(MIN_SEED_PARAMETER),
        DenaturationCurve::SEED.plateau,
    )
}

fn sample_around(rng: &mut StdRng, mean: f64, spread: f64) -> f64 {
    match Normal::new(mean, spread) {
        Ok(normal) => normal.sample(rng),
        Err(_) => mean,
    }
}

fn sum_of_squares(params: &Vector3<f64>, temps: &[f64], observed: &[f64]) -> f64 {
    let curve = DenaturationCurve::from_vector(params);
    temps
        .iter()
        .zip(observed)
        .map(|(&t, &y)| {
            let r = y - curve.value(t);
            r * r
        })
        .sum()
}

/// Accumulates `JᵀJ` and `Jᵀr` for the current parameters.
fn normal_equations(
    params: &Vector3<f64>,
    temps: &[f64],
    observed: &[f64],
) -> (Matrix3<f64>, Vector3<f64>) {
    let curve = DenaturationCurve::from_vector(params);
    temps.iter().zip(observed).fold(
        (Matrix3::zeros(), Vector3::zeros()),
        |(jtj, jtr), (&t, &y)| {
            let g = curve.gradient(t);
            let r = y - curve.value(t);
            (jtj + g * g.transpose(), jtr + g * r)
        },
    )
}

fn levenberg_marquardt(
    temps: &[f64],
    observed: &[f64],
    start: DenaturationCurve,
    max_iterations: usize,
) -> Result<DenaturationCurve, FitError> {
    let mut params = start.to_vector();
    let mut cost = sum_of_squares(&params, temps, observed);
    if !cost.is_finite() {
        return Err(FitError::NonFinite);
    }
    let mut damping = INITIAL_DAMPING;

    for _ in 0..max_iterations {
        if cost == 0.0 {
            return Ok(DenaturationCurve::from_vector(&params));
        }

        let (jtj, jtr) = normal_equations(&params, temps, observed);
        if jtj.iter().chain(jtr.iter()).any(|v| !v.is_finite()) {
            return Err(FitError::NonFinite);
        }

        let mut damped = jtj;
        for k in 0..3 {
            damped[(k, k)] += damping * jtj[(k, k)].max(DIAGONAL_FLOOR);
        }

        let step = match damped.lu().solve(&jtr) {
            Some(step) if step.iter().all(|v| v.is_finite()) => step,
            _ => {
                damping *= 10.0;
                if damping > MAX_DAMPING {
                    return Err(FitError::Stalled);
                }
                continue;
            }
        };

        let step_is_negligible =
            step.norm() <= PARAMETER_TOLERANCE * (params.norm() + PARAMETER_TOLERANCE);
        let candidate = params + step;
        let candidate_cost = sum_of_squares(&candidate, temps, observed);

        if candidate_cost.is_finite() && candidate_cost <= cost {
            let reduction = cost - candidate_cost;
            params = candidate;
            cost = candidate_cost;
            damping = (damping / 10.0).max(MIN_DAMPING);
            if reduction <= COST_TOLERANCE * cost || step_is_negligible {
                return Ok(DenaturationCurve::from_vector(&params));
            }
        } else {
            if step_is_negligible {
                return Ok(DenaturationCurve::from_vector(&params));
            }
            damping *= 10.0;
            if damping > MAX_DAMPING {
                return Err(FitError::Stalled);
            }
        }
    }

    Err(FitError::IterationLimit(max_iterations))
}
