//! Run orchestration.
//!
//! Order of a run: validate configuration, provision the resource, start the
//! profiler, drive the trial loop, stop the profiler, report, drop the
//! resource. Teardown runs on every path once provisioning succeeded, and a
//! failed trial skips reporting entirely.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::backend::{Query, ResourceAdmin, ResourceClient, ResourceId, SimulatedService, TcpEndpoint};
use crate::config::{BackendConfig, BenchConfig};
use crate::error::BenchError;
use crate::harness::{
    BenchmarkLoop, CancellationToken, ConsoleProgress, LoopOutcome, PhaseStopwatches, ProgressSink,
};
use crate::profiling::{self, Profiler};
use crate::report::{write_samples_csv, write_summary_json, DisplayUnit, DistributionReporter, RunSummary};
use crate::stats::PhaseMeasurement;
use crate::ui::console;
use crate::utils::helpers::host_info;

/// Result of a run that reached reporting.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: LoopOutcome,
    /// One entry per phase, in lifecycle order.
    pub phases: Vec<PhaseMeasurement>,
    pub artifacts: Vec<PathBuf>,
}

/// Everything derived from the configuration before anything remote happens.
struct Plan {
    bench: BenchmarkLoop,
    unit: DisplayUnit,
    query: Query,
    stopwatches: PhaseStopwatches,
}

impl Plan {
    fn from_config(config: &BenchConfig) -> Result<Self, BenchError> {
        config.validate()?;
        Ok(Self {
            bench: BenchmarkLoop::new(config.trials, config.progress_every)?
                .with_release_policy(config.release_policy),
            unit: config.display_unit()?,
            query: config.query(),
            stopwatches: PhaseStopwatches::new(config.trials)?,
        })
    }
}

/// Run the configured benchmark with console output and Ctrl-C handling.
pub async fn run_benchmark(config: BenchConfig) -> Result<RunReport, BenchError> {
    console::print_title("Lifecycle Latency Benchmark");
    console::print_host(&host_info());
    console::print_parameters(&config);

    let cancel = CancellationToken::new();
    let listener = cancel.cancel_on_ctrl_c();
    let mut profiler = profiling::from_config(&config.profile);
    let mut progress = ConsoleProgress::new(config.trials);

    let result = match &config.backend {
        BackendConfig::Simulated(latency) => {
            let service = SimulatedService::new(latency.clone());
            execute(&config, &service, &service, profiler.as_mut(), &cancel, &mut progress).await
        }
        BackendConfig::Tcp(tcp) => {
            let endpoint = TcpEndpoint::new(tcp);
            execute(&config, &endpoint, &endpoint, profiler.as_mut(), &cancel, &mut progress).await
        }
    };
    listener.abort();

    let report = result?;
    console::print_outcome(&report.outcome, config.trials);
    console::print_summary(&report.phases);
    console::print_artifacts(&report.artifacts);
    Ok(report)
}

/// Provision, measure, report and tear down against the given collaborators.
pub async fn execute<A, C, P, S>(
    config: &BenchConfig,
    admin: &A,
    client: &C,
    profiler: &mut P,
    cancel: &CancellationToken,
    progress: &mut S,
) -> Result<RunReport, BenchError>
where
    A: ResourceAdmin,
    C: ResourceClient,
    P: Profiler + ?Sized,
    S: ProgressSink + ?Sized,
{
    let plan = Plan::from_config(config)?;

    info!(resource = %config.resource.name, "provisioning resource");
    let resource = admin
        .create_resource(&config.resource)
        .await
        .map_err(BenchError::Provisioning)?;

    let measured = measure(config, plan, client, &resource, profiler, cancel, progress).await;

    info!(resource = %resource, "dropping resource");
    match (measured, admin.destroy_resource(&resource).await) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(e)) => Err(BenchError::Provisioning(e)),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(teardown)) => {
            warn!("failed to drop {} while unwinding: {}", resource, teardown);
            Err(e)
        }
    }
}

async fn measure<C, P, S>(
    config: &BenchConfig,
    mut plan: Plan,
    client: &C,
    resource: &ResourceId,
    profiler: &mut P,
    cancel: &CancellationToken,
    progress: &mut S,
) -> Result<RunReport, BenchError>
where
    C: ResourceClient,
    P: Profiler + ?Sized,
    S: ProgressSink + ?Sized,
{
    profiler.start()?;
    let looped = plan
        .bench
        .run(&mut plan.stopwatches, client, resource, &plan.query, cancel, progress)
        .await;
    let profile = profiler.stop().unwrap_or_else(|e| {
        warn!("profiling could not be stopped: {}", e);
        None
    });
    let outcome = looped?;

    let reporter = DistributionReporter::new(&config.output_dir, plan.unit.clone());
    let mut phases = Vec::with_capacity(3);
    let mut artifacts = Vec::new();
    for (phase, stopwatch) in plan.stopwatches.iter() {
        artifacts.push(reporter.render(phase.name(), stopwatch)?);
        phases.push(PhaseMeasurement::from_stopwatch(phase.name(), stopwatch, &plan.unit));
    }

    if config.export_samples {
        let csv_path = config.output_dir.join("samples.csv");
        write_samples_csv(&csv_path, &phases)?;
        artifacts.push(csv_path);

        let json_path = config.output_dir.join("summary.json");
        write_summary_json(
            &json_path,
            &RunSummary {
                trials_requested: config.trials,
                trials_run: outcome.trials(),
                outcome: outcome.label(),
                unit: &plan.unit.name,
                phases: &phases,
            },
        )?;
        artifacts.push(json_path);
    }
    artifacts.extend(profile);

    Ok(RunReport {
        outcome,
        phases,
        artifacts,
    })
}
