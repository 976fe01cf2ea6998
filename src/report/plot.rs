//! SVG distribution plots.
//!
//! Every phase gets one file with three stacked panels: a histogram, the
//! cumulative distribution and the samples in trial order. An empty sample
//! set still produces the file, with empty panels.

use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{DisplayUnit, ReportError};
use crate::timing::Stopwatch;

const MAX_BINS: usize = 100;

pub struct DistributionReporter {
    out_dir: PathBuf,
    unit: DisplayUnit,
    size: (u32, u32),
}

impl DistributionReporter {
    pub fn new(out_dir: impl Into<PathBuf>, unit: DisplayUnit) -> Self {
        Self {
            out_dir: out_dir.into(),
            unit,
            size: (900, 1200),
        }
    }

    /// Plot the completed laps of `stopwatch` to `<out_dir>/<name>.svg`.
    pub fn render(&self, name: &str, stopwatch: &Stopwatch) -> Result<PathBuf, ReportError> {
        let samples = self.unit.convert(&stopwatch.elapsed());
        self.render_samples(name, &samples)
    }

    /// Plot samples already expressed in the display unit.
    fn render_samples(&self, name: &str, samples: &[f64]) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.out_dir).map_err(|source| ReportError::Write {
            path: self.out_dir.clone(),
            source,
        })?;

        let path = self.out_dir.join(format!("{name}.svg"));
        self.draw(&path, name, samples)
            .map_err(|message| ReportError::Draw {
                path: path.clone(),
                message,
            })?;
        debug!(path = %path.display(), samples = samples.len(), "wrote distribution plot");
        Ok(path)
    }

    fn draw(&self, path: &Path, name: &str, samples: &[f64]) -> Result<(), String> {
        let root = SVGBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let title = format!("{}: {} samples ({})", name, samples.len(), self.unit.name);
        let root = root
            .titled(&title, ("sans-serif", 22))
            .map_err(|e| e.to_string())?;
        let panels = root.split_evenly((3, 1));
        let unit = self.unit.name.as_str();

        histogram(&panels[0], samples, unit).map_err(|e| e.to_string())?;
        cumulative(&panels[1], samples, unit).map_err(|e| e.to_string())?;
        sequence(&panels[2], samples, unit).map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())
    }
}

fn caption(panel: &str, samples: &[f64]) -> String {
    if samples.is_empty() {
        format!("{panel} (no samples)")
    } else {
        panel.to_string()
    }
}

/// Axis range covering all samples, never empty.
fn value_range(samples: &[f64]) -> Range<f64> {
    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }

    let span = max - min;
    if span <= f64::EPSILON * max.abs().max(1.0) {
        let pad = if min != 0.0 { min.abs() * 0.05 } else { 1.0 };
        return (min - pad)..(max + pad);
    }
    let pad = span * 0.02;
    (min - pad)..(max + pad)
}

fn bin_counts(samples: &[f64], range: &Range<f64>) -> Vec<u64> {
    let bins = ((samples.len() as f64).sqrt().ceil() as usize).clamp(1, MAX_BINS);
    let width = (range.end - range.start) / bins as f64;
    let mut counts = vec![0u64; bins];
    for &v in samples {
        let idx = (((v - range.start) / width).max(0.0) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

fn histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    samples: &[f64],
    unit: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let range = value_range(samples);
    let counts = bin_counts(samples, &range);
    let width = (range.end - range.start) / counts.len() as f64;
    let peak = counts.iter().copied().max().unwrap_or(0);

    let mut chart = ChartBuilder::on(area)
        .caption(caption("histogram", samples), ("sans-serif", 16))
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(56)
        .build_cartesian_2d(range.clone(), 0u64..peak + 1)?;
    chart
        .configure_mesh()
        .x_desc(format!("latency ({unit})"))
        .y_desc("count")
        .draw()?;

    chart.draw_series(
        counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(i, &count)| {
                let x0 = range.start + i as f64 * width;
                Rectangle::new([(x0, 0), (x0 + width, count)], BLUE.mix(0.6).filled())
            }),
    )?;
    Ok(())
}

fn cumulative<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    samples: &[f64],
    unit: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(caption("cumulative distribution", samples), ("sans-serif", 16))
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(56)
        .build_cartesian_2d(value_range(samples), 0f64..100f64)?;
    chart
        .configure_mesh()
        .x_desc(format!("latency ({unit})"))
        .y_desc("percentile")
        .draw()?;

    if !sorted.is_empty() {
        chart.draw_series(LineSeries::new(
            sorted
                .iter()
                .enumerate()
                .map(|(i, &v)| (v, (i + 1) as f64 * 100.0 / n)),
            &RED,
        ))?;
    }
    Ok(())
}

fn sequence<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    samples: &[f64],
    unit: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let trials = samples.len().max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(caption("sequence", samples), ("sans-serif", 16))
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(56)
        .build_cartesian_2d(0f64..trials, value_range(samples))?;
    chart
        .configure_mesh()
        .x_desc("trial")
        .y_desc(format!("latency ({unit})"))
        .draw()?;

    chart.draw_series(
        samples
            .iter()
            .enumerate()
            .map(|(i, &v)| Circle::new((i as f64, v), 1, GREEN.filled())),
    )?;
    Ok(())
}
