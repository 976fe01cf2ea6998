//! CPU profiling around the measurement loop.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
#[cfg(unix)]
use tracing::{debug, info};

use crate::error::BenchError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProfileConfig {
    pub enabled: bool,
    /// Flamegraph SVG written when the profiler stops.
    pub output: PathBuf,
    /// Sampling frequency in Hz.
    pub frequency: i32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: PathBuf::from("cpu.svg"),
            frequency: 1000,
        }
    }
}

/// Records a profile bracketing the whole run.
pub trait Profiler {
    /// Begin recording. Failure here is fatal to the run.
    fn start(&mut self) -> Result<(), BenchError>;

    /// Stop recording and write the artifact, if any.
    fn stop(&mut self) -> Result<Option<PathBuf>, BenchError>;
}

/// Profiler used when profiling is disabled.
#[derive(Debug, Default)]
pub struct NoopProfiler;

impl Profiler for NoopProfiler {
    fn start(&mut self) -> Result<(), BenchError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<Option<PathBuf>, BenchError> {
        Ok(None)
    }
}

/// Sampling profiler writing a flamegraph.
pub struct PprofProfiler {
    output: PathBuf,
    frequency: i32,
    #[cfg(unix)]
    guard: Option<pprof::ProfilerGuard<'static>>,
}

impl PprofProfiler {
    pub fn new(output: PathBuf, frequency: i32) -> Self {
        Self {
            output,
            frequency,
            #[cfg(unix)]
            guard: None,
        }
    }
}

#[cfg(unix)]
impl Profiler for PprofProfiler {
    fn start(&mut self) -> Result<(), BenchError> {
        // Fail before the run if the artifact cannot be written at all.
        std::fs::File::create(&self.output).map_err(|e| {
            BenchError::Profiling(format!("cannot create {}: {}", self.output.display(), e))
        })?;

        let guard = pprof::ProfilerGuardBuilder::default()
            .frequency(self.frequency)
            .blocklist(&["libc", "libgcc", "pthread", "vdso"])
            .build()
            .map_err(|e| BenchError::Profiling(format!("failed to start profiler: {}", e)))?;
        self.guard = Some(guard);
        info!("CPU profiling at {}Hz, output: {}", self.frequency, self.output.display());
        Ok(())
    }

    fn stop(&mut self) -> Result<Option<PathBuf>, BenchError> {
        let Some(guard) = self.guard.take() else {
            return Ok(None);
        };

        let report = guard
            .report()
            .build()
            .map_err(|e| BenchError::Profiling(format!("failed to build profiler report: {}", e)))?;
        let samples: isize = report.data.values().copied().sum();
        debug!(samples, stacks = report.data.len(), "profiler stopped");

        let file = std::fs::File::create(&self.output)?;
        report
            .flamegraph(file)
            .map_err(|e| BenchError::Profiling(format!("failed to write flamegraph: {}", e)))?;
        Ok(Some(self.output.clone()))
    }
}

#[cfg(not(unix))]
impl Profiler for PprofProfiler {
    fn start(&mut self) -> Result<(), BenchError> {
        Err(BenchError::Profiling(format!(
            "CPU profiling is not supported on this platform (requested {})",
            self.output.display()
        )))
    }

    fn stop(&mut self) -> Result<Option<PathBuf>, BenchError> {
        Ok(None)
    }
}

/// Profiler selected by the configuration.
pub fn from_config(config: &ProfileConfig) -> Box<dyn Profiler> {
    if config.enabled {
        Box::new(PprofProfiler::new(config.output.clone(), config.frequency))
    } else {
        Box::new(NoopProfiler)
    }
}
