//! Tasks that compute per-protein results over a normalized population.
//!
//! Each task reads frozen inputs (normalized matrices, thresholds, rank lists), fans the work
//! out through [`AnalysisContext::map_items`](crate::engine::context::AnalysisContext), and
//! returns plain result vectors in population order. Writing the results back onto proteins
//! is left to the caller. A task returns `None` when it observed a cancellation request.

pub mod bootstrap;
pub mod curve_fitting;
pub mod flood_scoring;
pub mod rank_scoring;
