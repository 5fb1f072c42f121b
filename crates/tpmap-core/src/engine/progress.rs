use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total: u64 },
    TaskIncrement { amount: u64 },
    TaskFinish,

    /// Overall completion of the running computation, in `[0, 1]`.
    Fraction(f64),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

/// Counts completed units of one task and maps them onto a slice of the overall fraction.
///
/// Safe to advance from worker threads; each call reports the increment together with the
/// updated overall fraction `start + span * done / total`.
pub(crate) struct TaskProgress<'r, 'a> {
    reporter: &'r ProgressReporter<'a>,
    done: AtomicU64,
    total: u64,
    start: f64,
    span: f64,
}

impl<'r, 'a> TaskProgress<'r, 'a> {
    pub(crate) fn start(reporter: &'r ProgressReporter<'a>, total: u64, start: f64, span: f64) -> Self {
        reporter.report(Progress::TaskStart { total });
        reporter.report(Progress::Fraction(start));
        Self {
            reporter,
            done: AtomicU64::new(0),
            total,
            start,
            span,
        }
    }

    pub(crate) fn advance(&self, amount: u64) {
        let done = self.done.fetch_add(amount, Ordering::Relaxed) + amount;
        self.reporter.report(Progress::TaskIncrement { amount });
        if self.total > 0 {
            let fraction = self.start + self.span * (done.min(self.total) as f64 / self.total as f64);
            self.reporter.report(Progress::Fraction(fraction));
        }
    }

    pub(crate) fn finish(self) {
        self.reporter.report(Progress::Fraction(self.start + self.span));
        self.reporter.report(Progress::TaskFinish);
    }
}
