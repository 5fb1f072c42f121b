//! # Scoring Module
//!
//! Per-protein scoring kernels. All functions are pure: they read matrices and population
//! summaries and return values without touching shared state.
//!
//! - [`thresholds`] - Fold-change thresholds and their derivation from population percentiles
//! - [`flood`] - Gradient ascent/descent flood fill over a concentration × temperature matrix
//! - [`effect`] - Labelling a combined 2D score as stabilization, destabilization or a
//!   solubility/expression change
//! - [`fold_change`] - Mean fold change of a normalized matrix
//! - [`distance`] - Distances between proteins' normalized matrices
//! - [`rank`] - Population rank scoring of 1D thermal profiles

pub mod distance;
pub mod effect;
pub mod flood;
pub mod fold_change;
pub mod rank;
pub mod thresholds;
