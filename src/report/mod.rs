//! Plots and exports produced after a run.

pub mod export;
pub mod plot;
pub mod unit;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use export::{write_samples_csv, write_summary_json, RunSummary};
pub use plot::DistributionReporter;
pub use unit::DisplayUnit;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to draw {}: {message}", path.display())]
    Draw { path: PathBuf, message: String },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
}
