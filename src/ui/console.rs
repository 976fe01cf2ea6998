//! Console presentation of a run: banners, parameters and the summary table.

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use std::path::PathBuf;

use crate::config::{BackendConfig, BenchConfig};
use crate::harness::LoopOutcome;
use crate::stats::PhaseMeasurement;
use crate::utils::helpers::HostInfo;

const WIDTH: usize = 60;

pub fn print_title(title: &str) {
    let separator = "=".repeat(WIDTH);
    println!("\n{}", separator);
    println!("{:^60}", title.bold().cyan());
    println!("{}\n", separator);
}

pub fn print_section(name: &str) {
    println!("{}", name.bold().yellow());
    println!("{}", "━".repeat(name.chars().count().max(20)));
}

pub fn print_host(host: &HostInfo) {
    print_section("System Information");
    println!("OS:      {}", host.os);
    println!("CPU:     {} ({} logical)", host.cpu, host.logical_cpus);
    println!("Memory:  {} MiB", host.total_memory_mib);
    println!();
}

pub fn print_parameters(config: &BenchConfig) {
    print_section("Benchmark Parameters");
    println!("Trials:          {}", config.trials);
    println!("Progress every:  {}", config.progress_every);
    println!("Unit:            {}", config.unit);
    match &config.backend {
        BackendConfig::Simulated(sim) => println!(
            "Backend:         simulated (connect {}us, query {}us, close {}us)",
            sim.connect_latency_us, sim.query_latency_us, sim.close_latency_us
        ),
        BackendConfig::Tcp(tcp) => println!(
            "Backend:         tcp {} (timeout {}ms)",
            tcp.address, tcp.timeout_ms
        ),
    }
    println!("Resource:        {}", config.resource.name);
    println!("Query:           {}", config.query);
    println!("Output:          {}", config.output_dir.display());
    if config.profile.enabled {
        println!("CPU profile:     {}", config.profile.output.display());
    }
    println!();
}

pub fn print_outcome(outcome: &LoopOutcome, requested: usize) {
    match outcome {
        LoopOutcome::Completed { trials } => {
            println!("\n{} {} trials", "✅ Completed".bold().green(), trials);
        }
        LoopOutcome::Cancelled { trials } => {
            println!(
                "\n{} after {} of {} trials",
                "⚠️ Cancelled".bold().yellow(),
                trials,
                requested
            );
        }
    }
}

/// Per-phase statistics as a table.
pub fn summary_table(phases: &[PhaseMeasurement]) -> Table {
    let unit = phases.first().map(|m| m.unit.as_str()).unwrap_or("");
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Phase".to_string(),
            "Samples".to_string(),
            format!("Mean ({unit})"),
            format!("Median ({unit})"),
            format!("P95 ({unit})"),
            format!("P99 ({unit})"),
            format!("Max ({unit})"),
            format!("MAD ({unit})"),
        ]);

    for m in phases {
        let mut row = vec![Cell::new(&m.phase), Cell::new(m.samples())];
        match &m.statistics {
            Some(s) => row.extend(
                [s.mean, s.median, s.p95, s.p99, s.max, s.mad]
                    .iter()
                    .map(|v| Cell::new(format!("{:.4}", v))),
            ),
            None => row.extend((0..6).map(|_| Cell::new("-"))),
        }
        table.add_row(row);
    }
    table
}

pub fn print_summary(phases: &[PhaseMeasurement]) {
    println!();
    print_section("Latency Summary");
    println!("{}", summary_table(phases));
}

pub fn print_artifacts(paths: &[PathBuf]) {
    println!();
    print_section("Artifacts");
    for path in paths {
        println!("  • {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::RobustStatistics;

    #[test]
    fn table_lists_every_phase() {
        let phases = vec![
            PhaseMeasurement {
                phase: "acquire".into(),
                unit: "ms".into(),
                statistics: RobustStatistics::from_samples(&[1.0, 2.0, 3.0]),
                raw_samples: vec![1.0, 2.0, 3.0],
            },
            PhaseMeasurement {
                phase: "work".into(),
                unit: "ms".into(),
                statistics: None,
                raw_samples: vec![],
            },
        ];
        let rendered = summary_table(&phases).to_string();
        assert!(rendered.contains("acquire"));
        assert!(rendered.contains("2.0000"));
        assert!(rendered.contains("Median (ms)"));
        assert!(rendered.contains("work"));
    }
}
