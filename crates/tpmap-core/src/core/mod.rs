//! # Core Module
//!
//! Stateless building blocks of the scoring engine: the experiment data model, the
//! denaturation curve and its fitter, the matrix and rank scorers, and small statistical
//! helpers shared across them.
//!
//! ## Architecture
//!
//! - **Data Model** ([`models`]) - Proteins, proteomes, label ordering and import validation
//! - **Curve Fitting** ([`curve`]) - The three-parameter denaturation model, Levenberg–Marquardt
//!   multi-start fitting, melting temperatures and fit quality
//! - **Scoring** ([`scoring`]) - Flood-fill matrix scoring, rank scoring, effect labels,
//!   fold change summaries and inter-protein distances
//! - **Statistics** ([`stats`]) - Medians, percentiles, mergeable running moments and the
//!   normal distribution
//! - **Colour Mapping** ([`colour`]) - Ratio-to-colour interpolation for table renderers
//!
//! Nothing in this layer holds state between calls; every function takes its inputs
//! explicitly and returns plain values.

pub mod colour;
pub mod curve;
pub mod models;
pub mod scoring;
pub mod stats;
