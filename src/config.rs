use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::algorithm::apsp::Strategy;
use crate::{Error, Result};

/// Configuration for the shortest-path service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// interface to bind, defaults to all interfaces
    pub host: String,
    /// TCP port, defaults to 8000
    pub port: u16,
    /// APSP scheduling strategy
    pub strategy: Strategy,
    /// worker count for the `worker_pool` strategy, defaults to the number of CPUs
    pub workers: usize,
    /// how long a connection may take to deliver its request
    pub read_timeout_ms: u64,
    /// fixed part of the computation budget
    pub compute_timeout_base_ms: u64,
    /// computation budget added per node of the submitted graph
    pub compute_timeout_per_node_ms: u64,
    /// largest accepted request line, delimiter excluded
    pub max_request_bytes: usize,
    pub max_nodes: usize,
    pub max_edges: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            strategy: Strategy::WorkerPool,
            workers: num_cpus::get().max(1),
            read_timeout_ms: 30_000,
            compute_timeout_base_ms: 10_000,
            compute_timeout_per_node_ms: 10,
            max_request_bytes: 64 * 1024 * 1024,
            max_nodes: 20_000,
            max_edges: 2_000_000,
        }
    }
}

impl ServiceConfig {
    /// Loads a TOML config file; keys that are absent keep their defaults
    pub fn load<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!("failed to read config file {:?}: {}", path.as_ref(), e))
        })?;

        Self::load_from_str(&data)
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<ServiceConfig>(toml_str)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        if self.max_request_bytes == 0 || self.max_nodes == 0 || self.max_edges == 0 {
            return Err(Error::Config("request limits must be greater than zero".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        Ok(())
    }

    /// Resolves `host:port` to the address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| Error::Config(format!("cannot resolve {}:{}", self.host, self.port)))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Computation budget for a graph with `node_count` nodes
    pub fn compute_timeout(&self, node_count: usize) -> Duration {
        let per_node = self.compute_timeout_per_node_ms.saturating_mul(node_count as u64);
        Duration::from_millis(self.compute_timeout_base_ms.saturating_add(per_node))
    }
}
