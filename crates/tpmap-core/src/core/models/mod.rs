//! # Core Models Module
//!
//! Data structures describing one loaded thermal proteome profiling experiment.
//!
//! ## Key Components
//!
//! - [`labels`] - Numeric-aware ordering of concentration and replicate labels
//! - [`protein`] - A single protein with its raw abundances, ratio matrices and derived scores
//! - [`proteome`] - The ordered protein population of one experiment, built through a
//!   validating import that enforces rectangular, label-consistent matrices
//!
//! Matrices are stored as `nalgebra::DMatrix<f64>` with rows indexed by concentration (2D) or
//! replicate (1D) and columns by temperature. Missing measurements are `NaN`, never zero.

pub mod labels;
pub mod protein;
pub mod proteome;
