//! Graph Paths - shortest paths over weighted graphs, served over TCP
//!
//! A client submits a weighted directed graph as one line of JSON. The service
//! answers with either the all-pairs shortest-path (APSP) matrix or a single
//! source-to-target path, computed with Dijkstra's algorithm.
//!
//! The APSP orchestrator runs one Dijkstra per source node under one of three
//! concurrency strategies (sequential, unbounded fan-out, bounded worker pool);
//! all of them produce identical result matrices.

pub mod algorithm;
pub mod config;
pub mod data_structures;
pub mod graph;
pub mod service;

pub use algorithm::{
    apsp::{AllPairsShortestPaths, CancelFlag, PathInfo, Progress, ResultMatrix, Strategy},
    dijkstra::Dijkstra,
    ShortestPathAlgorithm, ShortestPathResult,
};
pub use config::ServiceConfig;
/// Re-export main types for convenient use
pub use graph::directed::DirectedGraph;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid vertex ID: {0}")]
    InvalidVertex(usize),

    #[error("Invalid node identifier: {0:?}")]
    InvalidNodeId(String),

    #[error("Negative edge weight: {0}")]
    NegativeWeight(f64),

    #[error("Edge weight is not a finite number: {0}")]
    NonFiniteWeight(f64),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Source vertex not found in graph")]
    SourceNotFound,

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Too many {what}: {actual} exceeds the limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        limit: usize,
        actual: usize,
    },

    #[error("Path cost from {from} to {to} is not representable")]
    DistanceOverflow { from: String, to: String },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Computation cancelled")]
    Cancelled,

    #[error("Algorithm execution error: {0}")]
    AlgorithmError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Machine-readable code sent in error responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidVertex(_) | Error::SourceNotFound | Error::UnknownNode(_) => "unknown_node",
            Error::InvalidNodeId(_)
            | Error::NegativeWeight(_)
            | Error::NonFiniteWeight(_)
            | Error::MalformedRequest(_)
            | Error::Json(_) => "malformed_request",
            Error::LimitExceeded { .. } => "limit_exceeded",
            Error::DistanceOverflow { .. } => "distance_overflow",
            Error::Timeout(_) => "timeout",
            Error::Cancelled => "cancelled",
            Error::AlgorithmError(_) => "internal_error",
            Error::Config(_) => "invalid_configuration",
            Error::Io(_) => "io_error",
        }
    }
}

/// Result type for the library
pub type Result<T> = std::result::Result<T, Error>;
