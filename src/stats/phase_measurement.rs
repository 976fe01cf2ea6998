//! Per-phase measurement for lifecycle benchmarking
//!
//! This module pairs a phase's converted samples with their statistics.

use serde::Serialize;

use crate::report::DisplayUnit;
use crate::stats::robust_statistics::RobustStatistics;
use crate::timing::Stopwatch;

/// Phase measurement with all statistical data
#[derive(Debug, Clone, Serialize)]
pub struct PhaseMeasurement {
    pub phase: String,
    pub unit: String,
    pub statistics: Option<RobustStatistics>,
    #[serde(skip)]
    pub raw_samples: Vec<f64>,
}

impl PhaseMeasurement {
    pub fn from_stopwatch(phase: &str, stopwatch: &Stopwatch, unit: &DisplayUnit) -> Self {
        let raw_samples = unit.convert(&stopwatch.elapsed());
        Self {
            phase: phase.to_string(),
            unit: unit.name.clone(),
            statistics: RobustStatistics::from_samples(&raw_samples),
            raw_samples,
        }
    }

    pub fn samples(&self) -> usize {
        self.raw_samples.len()
    }
}
