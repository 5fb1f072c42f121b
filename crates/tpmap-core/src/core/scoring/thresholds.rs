use crate::core::stats::select_percentile;
use serde::Serialize;

/// Lower and upper fold-change cutoffs used by the flood scorer and the colour map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub min: f64,
    pub max: f64,
}

impl Thresholds {
    /// Cutoffs in effect before any population has been scored.
    pub const INITIAL: Self = Self::new(0.80, 1.50);

    /// Cutoffs of the bootstrap null model, where any departure from 1.0 counts.
    pub const NEUTRAL: Self = Self::new(1.0, 1.0);

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Derives thresholds from per-protein extremes.
    ///
    /// `minima` and `maxima` are sorted here; the thresholds are the values at
    /// `floor((n - 1) * percentile)`. Returns `None` for an empty population or a percentile
    /// outside `[0, 1]`.
    pub fn from_population(
        mut minima: Vec<f64>,
        mut maxima: Vec<f64>,
        min_percentile: f64,
        max_percentile: f64,
    ) -> Option<Self> {
        minima.sort_unstable_by(f64::total_cmp);
        maxima.sort_unstable_by(f64::total_cmp);
        Some(Self::new(
            select_percentile(&minima, min_percentile)?,
            select_percentile(&maxima, max_percentile)?,
        ))
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::INITIAL
    }
}
