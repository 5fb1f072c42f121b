use super::cancel::CancellationToken;
use super::config::AnalysisConfig;
use super::progress::ProgressReporter;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Read-only view of one run's configuration, progress sink and cancellation flag.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub config: &'a AnalysisConfig,
    pub reporter: &'a ProgressReporter<'a>,
    pub cancel: &'a CancellationToken,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        config: &'a AnalysisConfig,
        reporter: &'a ProgressReporter<'a>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            config,
            reporter,
            cancel,
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Applies `f` to every item, in parallel when the `parallel` feature is enabled and the
    /// run allows it. Output order follows input order.
    ///
    /// Cancellation is checked before each item; returns `None` once it has been requested.
    pub fn map_items<T, R, F>(&self, items: &[T], f: F) -> Option<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        let guarded = |item: &T| {
            if self.is_cancelled() {
                None
            } else {
                Some(f(item))
            }
        };

        #[cfg(feature = "parallel")]
        if self.config.parallel {
            return items.par_iter().map(guarded).collect();
        }

        items.iter().map(guarded).collect()
    }
}
