//! Lifecycle Latency Benchmark Library
//!
//! Measures how long it takes to acquire a handle to a remote resource, run
//! one query through it and release it, over many sequential trials, and
//! plots the latency distribution of each phase.

pub mod backend;
pub mod config;
pub mod core;
pub mod error;
pub mod harness;
pub mod profiling;
pub mod report;
pub mod stats;
pub mod timing;
pub mod ui;
pub mod utils;

pub use crate::core::{execute, run_benchmark, RunReport};
pub use config::{BenchConfig, Cli};
pub use error::BenchError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
