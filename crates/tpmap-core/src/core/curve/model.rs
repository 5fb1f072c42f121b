use nalgebra::Vector3;
use serde::Serialize;

/// The denaturation model `f(T) = (1 - p) / (1 + exp(-(a / T - b))) + p`.
///
/// `a` and `b` shape the sigmoid in inverse temperature and `p` (the plateau) is the
/// fraction of protein that stays soluble at high temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DenaturationCurve {
    pub a: f64,
    pub b: f64,
    pub plateau: f64,
}

impl DenaturationCurve {
    /// Canonical starting point for curve fitting.
    pub const SEED: Self = Self::new(3000.0, 50.0, 0.0);

    pub const fn new(a: f64, b: f64, plateau: f64) -> Self {
        Self { a, b, plateau }
    }

    pub(crate) fn from_vector(params: &Vector3<f64>) -> Self {
        Self::new(params[0], params[1], params[2])
    }

    pub(crate) fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.a, self.b, self.plateau)
    }

    #[inline]
    pub fn value(&self, temperature: f64) -> f64 {
        let s = logistic(self.a / temperature - self.b);
        (1.0 - self.plateau) * s + self.plateau
    }

    /// Partial derivatives `(df/da, df/db, df/dp)` at `temperature`.
    #[inline]
    pub fn gradient(&self, temperature: f64) -> Vector3<f64> {
        let s = logistic(self.a / temperature - self.b);
        let slope = (1.0 - self.plateau) * s * (1.0 - s);
        Vector3::new(slope / temperature, -slope, 1.0 - s)
    }
}

/// Logistic function evaluated without overflow for large `|z|`.
#[inline]
fn logistic(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
