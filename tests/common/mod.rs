#![allow(dead_code)]

use std::cell::Cell;
use std::io;
use std::path::{Path, PathBuf};

use lifecycle_bench::backend::{
    BackendError, Query, ResourceAdmin, ResourceClient, ResourceId, ResourceSpec,
};
use lifecycle_bench::harness::CancellationToken;
use lifecycle_bench::profiling::Profiler;
use lifecycle_bench::{BenchConfig, BenchError};

fn refused(what: &str) -> BackendError {
    BackendError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, what.to_string()))
}

/// Scriptable remote service. Trial indices are derived from call counts.
#[derive(Default)]
pub struct FakeService {
    pub fail_create: bool,
    pub fail_destroy: bool,
    pub fail_connect_at: Option<usize>,
    pub fail_query_at: Option<usize>,
    pub fail_close_at: Option<usize>,
    /// Cancel this token once the given number of trials has been released.
    pub cancel_after: Option<(usize, CancellationToken)>,

    pub created: Cell<bool>,
    pub destroyed: Cell<bool>,
    pub connects: Cell<usize>,
    pub queries: Cell<usize>,
    pub closes: Cell<usize>,
    pub released: Cell<usize>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(trials: usize, token: &CancellationToken) -> Self {
        Self {
            cancel_after: Some((trials, token.clone())),
            ..Self::default()
        }
    }

    fn bump(counter: &Cell<usize>) -> usize {
        let n = counter.get();
        counter.set(n + 1);
        n
    }
}

impl ResourceAdmin for FakeService {
    async fn create_resource(&self, spec: &ResourceSpec) -> Result<ResourceId, BackendError> {
        if self.fail_create {
            return Err(refused("create"));
        }
        self.created.set(true);
        Ok(ResourceId::new(spec.name.clone()))
    }

    async fn destroy_resource(&self, _id: &ResourceId) -> Result<(), BackendError> {
        if self.fail_destroy {
            return Err(refused("destroy"));
        }
        self.destroyed.set(true);
        Ok(())
    }
}

impl ResourceClient for FakeService {
    type Connection = usize;

    async fn connect(&self, _resource: &ResourceId) -> Result<usize, BackendError> {
        let trial = Self::bump(&self.connects);
        if self.fail_connect_at == Some(trial) {
            return Err(refused("connect"));
        }
        Ok(trial)
    }

    async fn execute_query(&self, _connection: &mut usize, _query: &Query) -> Result<(), BackendError> {
        let trial = Self::bump(&self.queries);
        if self.fail_query_at == Some(trial) {
            return Err(BackendError::ConnectionClosed);
        }
        Ok(())
    }

    async fn close(&self, connection: usize) -> Result<(), BackendError> {
        Self::bump(&self.closes);
        if self.fail_close_at == Some(connection) {
            return Err(refused("close"));
        }
        let released = Self::bump(&self.released) + 1;
        if let Some((after, token)) = &self.cancel_after {
            if released == *after {
                token.cancel();
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeProfiler {
    pub fail_start: bool,
    pub fail_stop: bool,
    pub started: bool,
    pub stopped: bool,
}

impl Profiler for FakeProfiler {
    fn start(&mut self) -> Result<(), BenchError> {
        if self.fail_start {
            return Err(BenchError::Profiling("no profiler available".into()));
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<Option<PathBuf>, BenchError> {
        self.stopped = true;
        if self.fail_stop {
            return Err(BenchError::Profiling("profiler wedged".into()));
        }
        Ok(None)
    }
}

pub fn config(trials: usize, progress_every: usize, output_dir: &Path) -> BenchConfig {
    let mut config = BenchConfig {
        trials,
        progress_every,
        output_dir: output_dir.to_path_buf(),
        ..BenchConfig::default()
    };
    config.profile.enabled = false;
    config
}

pub fn svg_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "svg"))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}
