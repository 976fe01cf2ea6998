//! Coarse progress reporting while the loop runs.

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::time::Duration;

use super::LoopOutcome;

/// Progress observation emitted every `progress_every` trials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Index of the trial that just finished.
    pub trial: usize,
    pub total: usize,
    /// Wall duration of that whole trial.
    pub last: Duration,
}

impl Progress {
    pub fn percent(&self) -> usize {
        self.trial * 100 / self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%  last:{:?}", self.percent(), self.last)
    }
}

/// Receives progress from [`super::BenchmarkLoop`].
pub trait ProgressSink {
    fn observe(&mut self, progress: &Progress);

    /// Called after every trial with the number of completed trials.
    fn tick(&mut self, _completed: usize) {}

    /// Called once when the loop ends; `None` when it was aborted.
    fn finish(&mut self, _outcome: Option<&LoopOutcome>) {}
}

impl ProgressSink for Vec<Progress> {
    fn observe(&mut self, progress: &Progress) {
        self.push(progress.clone());
    }
}

/// Prints progress lines to stdout underneath an indicatif bar.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} trials {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        Self { bar }
    }
}

impl ProgressSink for ConsoleProgress {
    fn observe(&mut self, progress: &Progress) {
        self.bar.suspend(|| println!("{}", progress));
        self.bar.set_message(format!("last {:?}", progress.last));
    }

    fn tick(&mut self, completed: usize) {
        self.bar.set_position(completed as u64);
    }

    fn finish(&mut self, outcome: Option<&LoopOutcome>) {
        match outcome {
            Some(LoopOutcome::Completed { .. }) => self.bar.finish_with_message("completed"),
            Some(LoopOutcome::Cancelled { .. }) => self.bar.abandon_with_message("cancelled"),
            None => self.bar.abandon_with_message("aborted"),
        }
    }
}
