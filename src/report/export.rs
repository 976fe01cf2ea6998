//! Raw sample and summary export.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::ReportError;
use crate::stats::PhaseMeasurement;

/// Machine readable summary of a finished run.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub trials_requested: usize,
    pub trials_run: usize,
    pub outcome: &'a str,
    pub unit: &'a str,
    pub phases: &'a [PhaseMeasurement],
}

/// One row per trial, one column per phase. Missing samples are left blank.
pub fn write_samples_csv(path: &Path, phases: &[PhaseMeasurement]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["trial".to_string()];
    header.extend(phases.iter().map(|m| format!("{}_{}", m.phase, m.unit)));
    writer.write_record(&header)?;

    let rows = phases.iter().map(PhaseMeasurement::samples).max().unwrap_or(0);
    for trial in 0..rows {
        let mut record = vec![trial.to_string()];
        record.extend(phases.iter().map(|m| {
            m.raw_samples
                .get(trial)
                .map(|v| format!("{:.6}", v))
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }

    writer.flush().map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_summary_json(path: &Path, summary: &RunSummary<'_>) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer).map_err(io_err)?;
    writer.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::RobustStatistics;

    fn measurement(phase: &str, samples: &[f64]) -> PhaseMeasurement {
        PhaseMeasurement {
            phase: phase.to_string(),
            unit: "ms".to_string(),
            statistics: RobustStatistics::from_samples(samples),
            raw_samples: samples.to_vec(),
        }
    }

    #[test]
    fn csv_has_one_row_per_trial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.csv");
        let phases = [
            measurement("acquire", &[1.0, 2.0]),
            measurement("work", &[0.5, 0.25]),
            measurement("release", &[0.125]),
        ];
        write_samples_csv(&path, &phases).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "trial,acquire_ms,work_ms,release_ms");
        assert_eq!(lines[1], "0,1.000000,0.500000,0.125000");
        assert_eq!(lines[2], "1,2.000000,0.250000,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn summary_json_lists_phase_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let phases = [measurement("acquire", &[1.0, 3.0]), measurement("work", &[])];
        let summary = RunSummary {
            trials_requested: 10,
            trials_run: 2,
            outcome: "cancelled",
            unit: "ms",
            phases: &phases,
        };
        write_summary_json(&path, &summary).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["trials_run"], 2);
        assert_eq!(value["outcome"], "cancelled");
        assert_eq!(value["phases"][0]["statistics"]["mean"], 2.0);
        assert!(value["phases"][1]["statistics"].is_null());
        assert!(value["phases"][0].get("raw_samples").is_none());
    }
}
