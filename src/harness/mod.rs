//! Repeated-trial measurement of the acquire/work/release lifecycle.

pub mod bench_loop;
pub mod cancel;
pub mod progress;
pub mod trial;

use std::fmt;

use crate::timing::{Stopwatch, StopwatchError};

pub use bench_loop::{BenchmarkLoop, LoopOutcome};
pub use cancel::CancellationToken;
pub use progress::{ConsoleProgress, Progress, ProgressSink};
pub use trial::{run_trial, ReleasePolicy};

/// One timed step of a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Acquire,
    Work,
    Release,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Acquire, Phase::Work, Phase::Release];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Acquire => "acquire",
            Phase::Work => "work",
            Phase::Release => "release",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One stopwatch per phase, all sized for the same number of trials.
#[derive(Debug)]
pub struct PhaseStopwatches {
    pub acquire: Stopwatch,
    pub work: Stopwatch,
    pub release: Stopwatch,
}

impl PhaseStopwatches {
    pub fn new(trials: usize) -> Result<Self, StopwatchError> {
        Ok(Self {
            acquire: Stopwatch::new(trials)?,
            work: Stopwatch::new(trials)?,
            release: Stopwatch::new(trials)?,
        })
    }

    pub fn get(&self, phase: Phase) -> &Stopwatch {
        match phase {
            Phase::Acquire => &self.acquire,
            Phase::Work => &self.work,
            Phase::Release => &self.release,
        }
    }

    /// Forget every lap of trial `trial` and later in all three phases.
    pub fn rewind(&mut self, trial: usize) {
        self.acquire.truncate(trial);
        self.work.truncate(trial);
        self.release.truncate(trial);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Phase, &Stopwatch)> {
        Phase::ALL.into_iter().map(move |phase| (phase, self.get(phase)))
    }

    /// Trials whose release lap completed.
    pub fn completed_trials(&self) -> usize {
        self.release.len()
    }
}
