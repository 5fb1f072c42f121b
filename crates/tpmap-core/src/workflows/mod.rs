//! # Workflows Module
//!
//! High-level entry points that drive a complete TPP analysis over a loaded experiment.
//!
//! ## Overview
//!
//! [`analysis::Analysis`] is the session object callers interact with. It owns the imported
//! [`Proteome`](crate::core::models::proteome::Proteome), the active
//! [`AnalysisConfig`](crate::engine::config::AnalysisConfig) and every derived result:
//! normalized matrices, population thresholds, fitted curves, rank breakdowns, flood scores
//! and the bootstrap null distribution.
//!
//! ## Recomputation
//!
//! Setters record the new value and drop only the cached results that depend on it:
//!
//! - **Normalization mode** invalidates everything downstream.
//! - **Percentile thresholds** invalidate the thresholds, flood scores and p-values. The null
//!   distribution is scored with neutral thresholds and survives.
//! - **Tm weight** only recomposes the 1D scores from the cached rank breakdowns.
//! - **Bootstrap iterations** invalidate the null distribution.
//! - **Curve-fit budget** invalidates fitted curves and ranks.
//!
//! [`analysis::Analysis::recompute_scores`] then rebuilds the missing pieces in dependency
//! order, reporting an overall completion fraction and honouring cancellation between and
//! within phases.
//!
//! ## Comparisons
//!
//! The [`compare`] workflows measure how similar 2D proteins are to each other: the mean
//! difference from one selected protein and the full pairwise distance matrix.

pub mod analysis;
pub mod compare;
