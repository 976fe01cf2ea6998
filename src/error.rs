//! Error taxonomy of a benchmark run.

use std::io;
use thiserror::Error;

use crate::backend::BackendError;
use crate::harness::Phase;
use crate::report::ReportError;
use crate::timing::StopwatchError;

/// Top level error of a run. Every variant is fatal.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("provisioning error: {0}")]
    Provisioning(#[source] BackendError),

    #[error(transparent)]
    Trial(#[from] TrialError),

    #[error("profiling error: {0}")]
    Profiling(String),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<StopwatchError> for BenchError {
    fn from(err: StopwatchError) -> Self {
        BenchError::Configuration(err.to_string())
    }
}

/// Cause of a failed trial step.
#[derive(Debug, Error)]
pub enum TrialFailure {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Stopwatch(#[from] StopwatchError),
}

/// A trial step failed; the run is aborted.
#[derive(Debug, Error)]
#[error("trial {trial} failed during {phase}: {source}")]
pub struct TrialError {
    /// Index of the failing trial.
    pub trial: usize,
    pub phase: Phase,
    #[source]
    pub source: TrialFailure,
}

impl TrialError {
    pub fn new(trial: usize, phase: Phase, source: impl Into<TrialFailure>) -> Self {
        Self {
            trial,
            phase,
            source: source.into(),
        }
    }

    /// Trials that completed before the failing one.
    pub fn completed(&self) -> usize {
        self.trial
    }
}
