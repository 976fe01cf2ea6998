//! Utility functions and helpers for lifecycle benchmarking
//!
//! This module provides host information and logging setup used by the binary.

use sysinfo::System;
use tracing_subscriber::EnvFilter;

/// Host the benchmark runs on
#[derive(Debug, Clone)]
pub struct HostInfo {
    pub os: String,
    pub cpu: String,
    pub logical_cpus: usize,
    pub total_memory_mib: u64,
}

/// Collect OS, CPU and memory information
pub fn host_info() -> HostInfo {
    let mut sys = System::new();
    sys.refresh_cpu_all();
    sys.refresh_memory();

    let cpu = cpu_brand()
        .or_else(|| sys.cpus().first().map(|c| c.brand().trim().to_string()))
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    HostInfo {
        os: os_info::get().to_string(),
        cpu,
        logical_cpus: sys.cpus().len(),
        total_memory_mib: sys.total_memory() / (1024 * 1024),
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn cpu_brand() -> Option<String> {
    raw_cpuid::CpuId::new()
        .get_processor_brand_string()
        .map(|brand| brand.as_str().trim().to_string())
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn cpu_brand() -> Option<String> {
    None
}

/// Install the tracing subscriber; `RUST_LOG` wins over `--verbose`
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
