//! The bounded trial loop.

use std::time::Instant;
use tracing::{debug, info};

use super::trial::{run_trial, ReleasePolicy};
use super::{CancellationToken, PhaseStopwatches, Progress, ProgressSink};
use crate::backend::{Query, ResourceClient, ResourceId};
use crate::error::{BenchError, TrialError};

/// How a loop that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// Every requested trial ran.
    Completed { trials: usize },
    /// The token was set before trial `trials`.
    Cancelled { trials: usize },
}

impl LoopOutcome {
    /// Number of trials that ran to completion.
    pub fn trials(&self) -> usize {
        match *self {
            LoopOutcome::Completed { trials } | LoopOutcome::Cancelled { trials } => trials,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoopOutcome::Cancelled { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoopOutcome::Completed { .. } => "completed",
            LoopOutcome::Cancelled { .. } => "cancelled",
        }
    }
}

/// Runs trials sequentially until the count is exhausted, the token is set
/// or a trial fails.
#[derive(Debug, Clone)]
pub struct BenchmarkLoop {
    trials: usize,
    progress_every: usize,
    release: ReleasePolicy,
}

impl BenchmarkLoop {
    pub fn new(trials: usize, progress_every: usize) -> Result<Self, BenchError> {
        if trials == 0 {
            return Err(BenchError::Configuration("trial count must be at least 1".into()));
        }
        if progress_every == 0 {
            return Err(BenchError::Configuration("progress interval must be at least 1".into()));
        }
        Ok(Self {
            trials,
            progress_every,
            release: ReleasePolicy::default(),
        })
    }

    pub fn with_release_policy(mut self, release: ReleasePolicy) -> Self {
        self.release = release;
        self
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub async fn run<C, P>(
        &self,
        stopwatches: &mut PhaseStopwatches,
        client: &C,
        resource: &ResourceId,
        query: &Query,
        cancel: &CancellationToken,
        progress: &mut P,
    ) -> Result<LoopOutcome, TrialError>
    where
        C: ResourceClient,
        P: ProgressSink + ?Sized,
    {
        let result = self
            .drive(stopwatches, client, resource, query, cancel, progress)
            .await;
        progress.finish(result.as_ref().ok());
        result
    }

    async fn drive<C, P>(
        &self,
        stopwatches: &mut PhaseStopwatches,
        client: &C,
        resource: &ResourceId,
        query: &Query,
        cancel: &CancellationToken,
        progress: &mut P,
    ) -> Result<LoopOutcome, TrialError>
    where
        C: ResourceClient,
        P: ProgressSink + ?Sized,
    {
        for trial in 0..self.trials {
            if cancel.is_cancelled() {
                info!(trial, total = self.trials, "cancelled before trial");
                return Ok(LoopOutcome::Cancelled { trials: trial });
            }

            let start = Instant::now();
            run_trial(client, resource, query, stopwatches, self.release, trial).await?;
            let finish = Instant::now();

            progress.tick(trial + 1);
            if trial % self.progress_every == 0 {
                progress.observe(&Progress {
                    trial,
                    total: self.trials,
                    last: finish.duration_since(start),
                });
            }
        }

        debug!(trials = self.trials, "all trials completed");
        Ok(LoopOutcome::Completed {
            trials: self.trials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_configuration() {
        assert!(matches!(BenchmarkLoop::new(0, 1), Err(BenchError::Configuration(_))));
        assert!(matches!(BenchmarkLoop::new(10, 0), Err(BenchError::Configuration(_))));
        assert_eq!(BenchmarkLoop::new(10, 3).unwrap().trials(), 10);
    }

    #[test]
    fn outcome_reports_trials_run() {
        let done = LoopOutcome::Completed { trials: 100 };
        let stopped = LoopOutcome::Cancelled { trials: 5 };
        assert_eq!(done.trials(), 100);
        assert!(!done.is_cancelled());
        assert_eq!(stopped.trials(), 5);
        assert!(stopped.is_cancelled());
        assert_eq!(stopped.label(), "cancelled");
    }
}
