//! # Engine Module
//!
//! This module implements the stateful side of the scoring engine: configuration, progress
//! reporting, cancellation, population-level normalization and the parallel tasks that turn
//! a normalized proteome into scores.
//!
//! ## Overview
//!
//! The engine sits between the stateless kernels in [`crate::core`] and the public entry
//! points in [`crate::workflows`]. It builds population caches (median tables, rank lists,
//! thresholds) once, freezes them, and shares them read-only with worker threads; each
//! protein's results are then written back by a single owner after the parallel phase.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Analysis parameters, their defaults and validation
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation
//! - **Progress Monitoring** ([`progress`]) - Progress events and the reporter that forwards them
//! - **Cancellation** ([`cancel`]) - A cooperative flag checked between units of work
//! - **State Tracking** ([`state`]) - Terminal outcomes and score summaries
//!
//! ## Key Capabilities
//!
//! - **Median normalization** across the protein population, recomputed in full on change
//! - **Parallel curve fitting and bootstrap resampling** behind the `parallel` feature, with a
//!   runtime single-thread toggle
//! - **Deterministic randomness** from configurable seeds, independent of thread count
//! - **Cooperative cancellation** surfaced as a distinct outcome rather than an error

pub mod cancel;
pub mod config;
pub(crate) mod context;
pub mod error;
pub(crate) mod normalization;
pub mod progress;
pub mod state;
pub(crate) mod tasks;

pub use tasks::bootstrap::NullDistribution;
