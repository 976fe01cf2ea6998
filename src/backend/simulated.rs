//! In-process stand-in for a remote database service.
//!
//! Databases live in a shared catalog; every call sleeps for a configurable
//! latency before touching it, which stands in for the network round trip.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

use super::{BackendError, Query, ResourceAdmin, ResourceClient, ResourceId, ResourceSpec};

/// Per-call latencies of the simulated service, in microseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SimulatedConfig {
    pub connect_latency_us: u64,
    pub query_latency_us: u64,
    pub close_latency_us: u64,
}

#[derive(Debug, Default)]
struct Database {
    tables: HashMap<String, u64>,
}

/// Open session on a simulated database.
#[derive(Debug)]
pub struct Session {
    id: u64,
    database: String,
}

impl Session {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Simulated database service implementing both collaborator traits.
#[derive(Debug, Clone, Default)]
pub struct SimulatedService {
    catalog: Arc<Mutex<HashMap<String, Database>>>,
    latency: SimulatedConfig,
    next_session: Arc<AtomicU64>,
    open_sessions: Arc<AtomicUsize>,
}

impl SimulatedService {
    pub fn new(latency: SimulatedConfig) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Sessions opened by `connect` and not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    pub async fn database_exists(&self, name: &str) -> bool {
        self.catalog.lock().await.contains_key(name)
    }

    async fn round_trip(micros: u64) {
        if micros > 0 {
            sleep(Duration::from_micros(micros)).await;
        }
    }
}

/// Extract the table of a `SELECT count(1) FROM <table>` statement.
fn count_target(sql: &str) -> Option<&str> {
    let sql = sql.trim().trim_end_matches(';');
    let mut tokens = sql.split_whitespace();
    let select = tokens.next()?;
    let count = tokens.next()?;
    let from = tokens.next()?;
    let table = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }

    let count = count.to_ascii_lowercase();
    let is_count = count == "count(1)" || count == "count(*)";
    if select.eq_ignore_ascii_case("select") && is_count && from.eq_ignore_ascii_case("from") {
        Some(table)
    } else {
        None
    }
}

impl ResourceAdmin for SimulatedService {
    async fn create_resource(&self, spec: &ResourceSpec) -> Result<ResourceId, BackendError> {
        Self::round_trip(self.latency.connect_latency_us).await;

        let mut catalog = self.catalog.lock().await;
        if catalog.contains_key(&spec.name) {
            return Err(BackendError::AlreadyExists(spec.name.clone()));
        }
        let database = Database {
            tables: spec.tables.iter().map(|t| (t.clone(), 0)).collect(),
        };
        catalog.insert(spec.name.clone(), database);
        debug!(database = %spec.name, tables = spec.tables.len(), "created simulated database");
        Ok(ResourceId::new(spec.name.clone()))
    }

    async fn destroy_resource(&self, id: &ResourceId) -> Result<(), BackendError> {
        Self::round_trip(self.latency.close_latency_us).await;

        match self.catalog.lock().await.remove(id.as_str()) {
            Some(_) => {
                debug!(database = %id, "dropped simulated database");
                Ok(())
            }
            None => Err(BackendError::NotFound(id.to_string())),
        }
    }
}

impl ResourceClient for SimulatedService {
    type Connection = Session;

    async fn connect(&self, resource: &ResourceId) -> Result<Session, BackendError> {
        Self::round_trip(self.latency.connect_latency_us).await;

        if !self.database_exists(resource.as_str()).await {
            return Err(BackendError::NotFound(resource.to_string()));
        }
        let id = self.next_session.fetch_add(1, Ordering::SeqCst);
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Session {
            id,
            database: resource.as_str().to_string(),
        })
    }

    async fn execute_query(&self, connection: &mut Session, query: &Query) -> Result<(), BackendError> {
        Self::round_trip(self.latency.query_latency_us).await;

        let table = count_target(&query.sql)
            .ok_or_else(|| BackendError::UnsupportedQuery(query.sql.clone()))?;
        let catalog = self.catalog.lock().await;
        let database = catalog
            .get(&connection.database)
            .ok_or_else(|| BackendError::NotFound(connection.database.clone()))?;
        let rows = database
            .tables
            .get(table)
            .ok_or_else(|| BackendError::NotFound(format!("{}.{}", connection.database, table)))?;
        debug!(session = connection.id, table, rows, "count query");
        Ok(())
    }

    async fn close(&self, connection: Session) -> Result<(), BackendError> {
        Self::round_trip(self.latency.close_latency_us).await;

        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
        debug!(session = connection.id, "session closed");
        Ok(())
    }
}
