//! Remote resource collaborators.
//!
//! The harness only talks to the remote side through two traits:
//! [`ResourceAdmin`] provisions and drops the backing store once per run,
//! [`ResourceClient`] opens, uses and closes a connection once per trial.

pub mod simulated;
pub mod tcp;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

pub use simulated::{SimulatedConfig, SimulatedService};
pub use tcp::{TcpConfig, TcpEndpoint};

/// Errors reported by a remote collaborator.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("resource `{0}` already exists")]
    AlreadyExists(String),

    #[error("resource `{0}` not found")]
    NotFound(String),

    #[error("unsupported query: {0}")]
    UnsupportedQuery(String),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Identifier of a provisioned resource, as returned by [`ResourceAdmin::create_resource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to provision before the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceSpec {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<String>,
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            name: "alpha".to_string(),
            tables: vec!["projects".to_string()],
        }
    }
}

/// The fixed statement executed once per trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub sql: String,
}

impl Query {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }
}

/// Provisioning side of the remote service, used once at start and once at end.
#[allow(async_fn_in_trait)]
pub trait ResourceAdmin {
    async fn create_resource(&self, spec: &ResourceSpec) -> Result<ResourceId, BackendError>;

    async fn destroy_resource(&self, id: &ResourceId) -> Result<(), BackendError>;
}

/// Client side of the remote service, used once per trial.
#[allow(async_fn_in_trait)]
pub trait ResourceClient {
    type Connection;

    async fn connect(&self, resource: &ResourceId) -> Result<Self::Connection, BackendError>;

    /// Run `query` to completion. The result set is discarded.
    async fn execute_query(
        &self,
        connection: &mut Self::Connection,
        query: &Query,
    ) -> Result<(), BackendError>;

    async fn close(&self, connection: Self::Connection) -> Result<(), BackendError>;
}
