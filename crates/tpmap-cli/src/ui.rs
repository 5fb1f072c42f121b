use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::{mpsc, watch};
use tpmap::engine::progress::{Progress, ProgressCallback};
use tracing::warn;

/// Bar positions per unit of overall fraction.
const RESOLUTION: u64 = 1000;
const TEMPLATE: &str = "{percent:>3}% [{wide_bar:.cyan/blue}] {msg}";

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Draws one overall bar for the running computation.
///
/// The bar follows [`Progress::Fraction`]; its message names the current phase and, while a
/// task is counting items, how many are done. Log lines are printed above the bar.
pub struct UiManager {
    mp: MultiProgress,
    overall: Option<ProgressBar>,
    phase: Option<&'static str>,
    task: Option<(u64, u64)>,
    events: mpsc::Receiver<UiEvent>,
    shutdown: watch::Receiver<bool>,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, events) = mpsc::channel(1024);
        let (shutdown_sender, shutdown) = watch::channel(false);
        let manager = Self {
            mp: MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(12)),
            overall: None,
            phase: None,
            task: None,
            events,
            shutdown,
        };
        (manager, event_sender, shutdown_sender)
    }

    /// Handles events until shutdown is signalled, then drains what is still queued.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        if let Some(bar) = self.overall.take() {
            bar.finish_and_clear();
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => {
                self.mp.println(line).ok();
            }
            UiEvent::Progress(progress) => self.apply(progress),
        }
    }

    fn apply(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                self.phase = Some(name);
                self.task = None;
            }
            Progress::PhaseFinish => {
                if let Some(name) = self.phase.take() {
                    self.mp.println(format!("✓ {}", name)).ok();
                }
                self.task = None;
            }
            Progress::TaskStart { total } => self.task = Some((0, total)),
            Progress::TaskIncrement { amount } => {
                if let Some((done, total)) = self.task.as_mut() {
                    *done = (*done + amount).min(*total);
                }
            }
            Progress::TaskFinish => self.task = None,
            Progress::Fraction(fraction) => {
                let position = (fraction.clamp(0.0, 1.0) * RESOLUTION as f64).round() as u64;
                self.overall_bar().set_position(position);
            }
        }

        if let Some(bar) = &self.overall {
            bar.set_message(self.message());
        }
    }

    fn overall_bar(&mut self) -> &ProgressBar {
        let mp = &self.mp;
        self.overall.get_or_insert_with(|| {
            let style = ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
            mp.add(ProgressBar::new(RESOLUTION).with_style(style))
        })
    }

    fn message(&self) -> String {
        match (self.phase, self.task) {
            (Some(name), Some((done, total))) => format!("{} {}/{}", name, done, total),
            (Some(name), None) => name.to_string(),
            (None, _) => String::new(),
        }
    }
}

/// Engine callback that forwards progress to the UI task without blocking worker threads.
pub fn progress_callback(sender: mpsc::Sender<UiEvent>) -> ProgressCallback<'static> {
    Box::new(move |progress: Progress| {
        // A dropped fraction is superseded by the next one.
        if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
            if !matches!(e.into_inner(), UiEvent::Progress(Progress::Fraction(_))) {
                warn!("Failed to send progress update to UI channel.");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> UiManager {
        let (manager, _sender, _shutdown) = UiManager::new();
        manager.mp.set_draw_target(ProgressDrawTarget::hidden());
        manager
    }

    fn send(manager: &mut UiManager, progress: Progress) {
        manager.handle_event(UiEvent::Progress(progress));
    }

    fn bar(manager: &UiManager) -> &ProgressBar {
        manager.overall.as_ref().unwrap()
    }

    #[test]
    fn bar_appears_with_the_first_fraction() {
        let mut manager = manager();
        send(&mut manager, Progress::PhaseStart { name: "Normalizing" });
        assert!(manager.overall.is_none());

        send(&mut manager, Progress::Fraction(0.42));

        assert_eq!(bar(&manager).position(), 420);
        assert_eq!(bar(&manager).length(), Some(RESOLUTION));
        assert_eq!(bar(&manager).message(), "Normalizing");
    }

    #[test]
    fn message_counts_items_of_the_running_task() {
        let mut manager = manager();
        send(&mut manager, Progress::PhaseStart { name: "Scoring" });
        send(&mut manager, Progress::TaskStart { total: 10 });
        send(&mut manager, Progress::Fraction(0.5));
        send(&mut manager, Progress::TaskIncrement { amount: 3 });
        assert_eq!(bar(&manager).message(), "Scoring 3/10");

        send(&mut manager, Progress::TaskIncrement { amount: 20 });
        assert_eq!(bar(&manager).message(), "Scoring 10/10");

        send(&mut manager, Progress::TaskFinish);
        assert_eq!(bar(&manager).message(), "Scoring");
    }

    #[test]
    fn finished_phase_clears_the_message_but_keeps_the_bar() {
        let mut manager = manager();
        send(&mut manager, Progress::PhaseStart { name: "Scoring" });
        send(&mut manager, Progress::Fraction(0.6));

        send(&mut manager, Progress::PhaseFinish);

        assert!(manager.phase.is_none());
        assert_eq!(bar(&manager).message(), "");
        assert_eq!(bar(&manager).position(), 600);
    }

    #[test]
    fn out_of_range_fractions_are_clamped() {
        let mut manager = manager();
        send(&mut manager, Progress::Fraction(1.5));
        assert_eq!(bar(&manager).position(), RESOLUTION);

        send(&mut manager, Progress::Fraction(-0.2));
        assert_eq!(bar(&manager).position(), 0);
    }

    #[test]
    fn log_lines_print_without_a_bar() {
        let mut manager = manager();
        manager.handle_event(UiEvent::Log("engine says hello".to_string()));
        assert!(manager.overall.is_none());
    }

    #[tokio::test]
    async fn callback_forwards_progress_events() {
        let (sender, mut receiver) = mpsc::channel(1);
        let callback = progress_callback(sender);

        callback(Progress::PhaseStart { name: "Testing" });

        match receiver.recv().await.unwrap() {
            UiEvent::Progress(Progress::PhaseStart { name }) => assert_eq!(name, "Testing"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn run_drains_queued_events_and_stops_on_shutdown() {
        let (manager, sender, shutdown) = UiManager::new();
        manager.mp.set_draw_target(ProgressDrawTarget::hidden());
        sender
            .send(UiEvent::Progress(Progress::Fraction(0.3)))
            .await
            .unwrap();
        shutdown.send(true).unwrap();

        manager.run().await;
    }
}
