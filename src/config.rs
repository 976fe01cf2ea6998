//! Run configuration: an optional JSON settings file overridden by CLI flags.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{Query, ResourceSpec, SimulatedConfig, TcpConfig};
use crate::error::BenchError;
use crate::harness::ReleasePolicy;
use crate::profiling::ProfileConfig;
use crate::report::DisplayUnit;

/// Settings file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "bench.json";

/// Measure acquire/work/release latency of a remote resource
#[derive(Parser, Debug, Default)]
#[command(name = "lifecycle-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of trials to run
    #[arg(short = 'n', long)]
    pub trials: Option<usize>,

    /// Print a progress line every N trials
    #[arg(short, long)]
    pub progress_every: Option<usize>,

    /// Display unit for plots and tables (ns, us, ms, s)
    #[arg(short, long)]
    pub unit: Option<String>,

    /// Directory receiving the plots and exports
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Benchmark a line-oriented TCP endpoint instead of the simulated service
    #[arg(long, value_name = "HOST:PORT")]
    pub tcp: Option<String>,

    /// Timeout for each remote call against a TCP endpoint, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Statement executed once per trial
    #[arg(long)]
    pub query: Option<String>,

    /// Disable CPU profiling
    #[arg(long)]
    pub no_profile: bool,

    /// Where to write the CPU profile flamegraph
    #[arg(long)]
    pub profile_output: Option<PathBuf>,

    /// Also write samples.csv and summary.json
    #[arg(long)]
    pub export_samples: bool,

    /// Keep going when closing a connection fails
    #[arg(long)]
    pub best_effort_release: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Which remote service is benchmarked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Kind")]
pub enum BackendConfig {
    Simulated(SimulatedConfig),
    Tcp(TcpConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Simulated(SimulatedConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BenchConfig {
    #[serde(deserialize_with = "validate_positive_usize")]
    pub trials: usize,
    #[serde(deserialize_with = "validate_positive_usize")]
    pub progress_every: usize,
    pub unit: String,
    pub output_dir: PathBuf,
    pub export_samples: bool,
    pub release_policy: ReleasePolicy,
    pub resource: ResourceSpec,
    pub query: String,
    pub backend: BackendConfig,
    pub profile: ProfileConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            progress_every: 100,
            unit: "ms".to_string(),
            output_dir: PathBuf::from("."),
            export_samples: false,
            release_policy: ReleasePolicy::Strict,
            resource: ResourceSpec::default(),
            query: "SELECT count(1) FROM projects".to_string(),
            backend: BackendConfig::default(),
            profile: ProfileConfig::default(),
        }
    }
}

fn validate_positive_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = usize::deserialize(deserializer)?;
    if value > 0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom("Value must be positive"))
    }
}

impl BenchConfig {
    /// Read a settings file.
    pub fn from_file(path: &Path) -> Result<Self, BenchError> {
        let content = fs::read_to_string(path).map_err(|e| {
            BenchError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| BenchError::Configuration(format!("invalid {}: {}", path.display(), e)))
    }

    /// Settings file (explicit, else `bench.json` if present, else defaults)
    /// with the CLI flags applied on top, validated.
    pub fn load(cli: &Cli) -> Result<Self, BenchError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, cli: &Cli) {
        if let Some(trials) = cli.trials {
            self.trials = trials;
        }
        if let Some(every) = cli.progress_every {
            self.progress_every = every;
        }
        if let Some(unit) = &cli.unit {
            self.unit = unit.clone();
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(query) = &cli.query {
            self.query = query.clone();
        }
        if let Some(address) = &cli.tcp {
            let mut tcp = match &self.backend {
                BackendConfig::Tcp(tcp) => tcp.clone(),
                BackendConfig::Simulated(_) => TcpConfig::default(),
            };
            tcp.address = address.clone();
            self.backend = BackendConfig::Tcp(tcp);
        }
        if let (Some(timeout_ms), BackendConfig::Tcp(tcp)) = (cli.timeout_ms, &mut self.backend) {
            tcp.timeout_ms = timeout_ms;
        }
        if cli.no_profile {
            self.profile.enabled = false;
        }
        if let Some(output) = &cli.profile_output {
            self.profile.output = output.clone();
        }
        if cli.export_samples {
            self.export_samples = true;
        }
        if cli.best_effort_release {
            self.release_policy = ReleasePolicy::BestEffort;
        }
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.trials == 0 {
            return Err(BenchError::Configuration("trial count must be at least 1".into()));
        }
        if self.progress_every == 0 {
            return Err(BenchError::Configuration("progress interval must be at least 1".into()));
        }
        self.display_unit()?;
        if self.query.trim().is_empty() {
            return Err(BenchError::Configuration("query must not be empty".into()));
        }
        if self.resource.name.trim().is_empty() {
            return Err(BenchError::Configuration("resource name must not be empty".into()));
        }
        if self.profile.enabled && self.profile.frequency <= 0 {
            return Err(BenchError::Configuration("profiling frequency must be positive".into()));
        }
        Ok(())
    }

    pub fn display_unit(&self) -> Result<DisplayUnit, BenchError> {
        DisplayUnit::from_name(&self.unit)
            .ok_or_else(|| BenchError::Configuration(format!("unknown unit `{}`", self.unit)))
    }

    pub fn query(&self) -> Query {
        Query::new(self.query.clone())
    }
}
