//! Line-oriented TCP endpoint.
//!
//! The endpoint already exists, so provisioning only checks that it accepts
//! connections. Each trial opens a fresh connection, writes the query as one
//! line, waits for a one-line reply and shuts the connection down.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::{BackendError, Query, ResourceAdmin, ResourceClient, ResourceId, ResourceSpec};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TcpConfig {
    pub address: String,
    pub timeout_ms: u64,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:7878".to_string(),
            timeout_ms: 5_000,
        }
    }
}

/// Connection to the endpoint with a reusable reply buffer.
#[derive(Debug)]
pub struct TcpConnection {
    stream: BufStream<TcpStream>,
    reply: String,
}

#[derive(Debug, Clone)]
pub struct TcpEndpoint {
    address: String,
    timeout: Duration,
}

impl TcpEndpoint {
    pub fn new(config: &TcpConfig) -> Self {
        Self {
            address: config.address.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, BackendError>
    where
        F: Future<Output = std::io::Result<T>>,
    {
        match timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(BackendError::from),
            Err(_) => Err(BackendError::Timeout {
                operation,
                timeout: self.timeout,
            }),
        }
    }
}

impl ResourceAdmin for TcpEndpoint {
    async fn create_resource(&self, spec: &ResourceSpec) -> Result<ResourceId, BackendError> {
        let mut probe = self.bounded("probe", TcpStream::connect(&self.address)).await?;
        self.bounded("probe", probe.shutdown()).await?;
        debug!(address = %self.address, resource = %spec.name, "endpoint reachable");
        Ok(ResourceId::new(self.address.clone()))
    }

    async fn destroy_resource(&self, id: &ResourceId) -> Result<(), BackendError> {
        debug!(address = %id, "endpoint is not owned by the benchmark, nothing to drop");
        Ok(())
    }
}

impl ResourceClient for TcpEndpoint {
    type Connection = TcpConnection;

    async fn connect(&self, resource: &ResourceId) -> Result<TcpConnection, BackendError> {
        let stream = self.bounded("connect", TcpStream::connect(resource.as_str())).await?;
        stream.set_nodelay(true)?;
        Ok(TcpConnection {
            stream: BufStream::new(stream),
            reply: String::new(),
        })
    }

    async fn execute_query(
        &self,
        connection: &mut TcpConnection,
        query: &Query,
    ) -> Result<(), BackendError> {
        let request = format!("{}\n", query.sql.trim_end());
        let stream = &mut connection.stream;
        self.bounded("query", async {
            stream.write_all(request.as_bytes()).await?;
            stream.flush().await
        })
        .await?;

        connection.reply.clear();
        let read = self
            .bounded("query", connection.stream.read_line(&mut connection.reply))
            .await?;
        if read == 0 {
            return Err(BackendError::ConnectionClosed);
        }
        Ok(())
    }

    async fn close(&self, mut connection: TcpConnection) -> Result<(), BackendError> {
        self.bounded("close", connection.stream.shutdown()).await
    }
}
