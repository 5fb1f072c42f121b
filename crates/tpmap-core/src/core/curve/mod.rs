//! # Denaturation Curves
//!
//! Everything needed to turn a 1D temperature series into curve-derived metrics.
//!
//! - [`model`] - The three-parameter denaturation sigmoid and its analytic gradient
//! - [`fitting`] - Multi-start Levenberg–Marquardt least squares with deterministic restarts
//! - [`melting`] - Melting temperature by bisection and fit quality (RMSE)
//! - [`profile`] - Per-protein replicate fits and the Tm shift and agreement metrics built on them

pub mod fitting;
pub mod melting;
pub mod model;
pub mod profile;
