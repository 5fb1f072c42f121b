//! # TPMAP Core Library
//!
//! A scoring and inference engine for thermal proteome profiling (TPP) experiments, in which
//! protein abundance is measured across a grid of temperatures and, optionally, compound
//! concentrations to detect ligand-induced thermal (de)stabilization.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture to keep the numerical kernels
//! independent from orchestration and from the user-facing entry points.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Protein`, `Proteome`), the
//!   denaturation curve model and its fitter, the 2D flood-fill scorer, the 1D rank scorer,
//!   and supporting statistics.
//!
//! - **[`engine`]: The Logic Core.** Configuration, errors, progress reporting, cancellation,
//!   median normalization and the parallel tasks (curve fitting, flood scoring, bootstrap
//!   significance) that run over a whole population.
//!
//! - **[`workflows`]: The Public API.** The `Analysis` session that owns a loaded experiment,
//!   exposes configuration setters that invalidate exactly the affected cached state, and
//!   recomputes scores end to end.

pub mod core;
pub mod engine;
pub mod workflows;
