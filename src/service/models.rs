use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

use num_traits::{Float, Zero};

use crate::algorithm::apsp::ResultMatrix;
use crate::config::ServiceConfig;
use crate::graph::{DirectedGraph, Graph};
use crate::{Error, Result};

/// Edge weight used on the wire
pub type Weight = OrderedFloat<f64>;

/// Distance reported by the point-to-point variant for an unreachable target.
///
/// This differs from the all-pairs convention (`-1`); the two are kept apart
/// because existing clients read them per endpoint.
pub const POINT_TO_POINT_UNREACHABLE: f64 = f64::MAX;

/// An outgoing edge as submitted by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    #[serde(alias = "to")]
    pub target: String,
    #[serde(alias = "time")]
    pub weight: f64,
    #[serde(default, alias = "edgeType", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// One request line: a graph, plus an optional start/end pair
///
/// The graph may be given as `nodes` (node -> list of edges), as
/// `adjacency_list` (node -> {target: weight}), or both. A node listed with no
/// edges is an isolated node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphRequest {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nodes: BTreeMap<String, Vec<EdgeSpec>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub adjacency_list: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_node: Option<String>,
}

/// What a request asks the service to compute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    AllPairs,
    PointToPoint { start: String, end: String },
}

impl GraphRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a request from an existing graph, preserving categories
    pub fn from_graph<W>(graph: &DirectedGraph<W>) -> Self
    where
        W: Float + Zero + Debug + Copy,
    {
        let mut request = GraphRequest::new();
        for (vertex, id) in graph.node_ids().enumerate() {
            let edges = graph
                .edges(vertex)
                .iter()
                .filter_map(|edge| {
                    Some(EdgeSpec {
                        target: graph.node_id(edge.target)?.to_string(),
                        weight: edge.weight.to_f64()?,
                        category: edge.category.clone(),
                    })
                })
                .collect();
            request.nodes.insert(id.to_string(), edges);
        }
        request
    }

    pub fn add_node(&mut self, id: &str) -> &mut Self {
        self.nodes.entry(id.to_string()).or_default();
        self
    }

    pub fn add_edge(&mut self, from: &str, to: &str, weight: f64, category: Option<&str>) -> &mut Self {
        self.nodes.entry(from.to_string()).or_default().push(EdgeSpec {
            target: to.to_string(),
            weight,
            category: category.map(str::to_string),
        });
        self
    }

    /// Turns this into a point-to-point request
    pub fn between(mut self, start: &str, end: &str) -> Self {
        self.start_node = Some(start.to_string());
        self.end_node = Some(end.to_string());
        self
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum::<usize>()
            + self.adjacency_list.values().map(BTreeMap::len).sum::<usize>()
    }

    pub fn query(&self) -> Result<Query> {
        match (&self.start_node, &self.end_node) {
            (None, None) => Ok(Query::AllPairs),
            (Some(start), Some(end)) => Ok(Query::PointToPoint {
                start: start.clone(),
                end: end.clone(),
            }),
            _ => Err(Error::MalformedRequest(
                "start_node and end_node must be given together".to_string(),
            )),
        }
    }

    /// Builds the graph, enforcing the configured size limits first
    pub fn into_graph(self, config: &ServiceConfig) -> Result<DirectedGraph<Weight>> {
        let edge_count = self.edge_count();
        if edge_count > config.max_edges {
            return Err(Error::LimitExceeded {
                what: "edges",
                limit: config.max_edges,
                actual: edge_count,
            });
        }

        let mut graph = DirectedGraph::with_capacity(self.nodes.len() + self.adjacency_list.len());
        for (from, edges) in &self.nodes {
            graph.add_node(from)?;
            for edge in edges {
                graph.add_edge_with_category(from, &edge.target, OrderedFloat(edge.weight), edge.category.as_deref())?;
            }
        }
        for (from, targets) in &self.adjacency_list {
            graph.add_node(from)?;
            for (to, weight) in targets {
                graph.add_edge(from, to, OrderedFloat(*weight))?;
            }
        }

        if graph.vertex_count() > config.max_nodes {
            return Err(Error::LimitExceeded {
                what: "nodes",
                limit: config.max_nodes,
                actual: graph.vertex_count(),
            });
        }
        Ok(graph)
    }
}

/// Point-to-point answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointToPointResponse {
    /// Path cost, or [`POINT_TO_POINT_UNREACHABLE`]
    pub distance: f64,
    pub path: Vec<String>,
}

impl PointToPointResponse {
    pub fn is_reachable(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Error response for the protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        let details = match err {
            Error::LimitExceeded { what, limit, actual } => Some(serde_json::json!({
                "what": what,
                "limit": limit,
                "actual": actual,
            })),
            _ => None,
        };
        ErrorResponse {
            error: err.code().to_string(),
            message: err.to_string(),
            details,
        }
    }
}

/// One response line
///
/// Untagged on the wire; variants are tried in declaration order when decoding,
/// so the shapes with required fields come before the open-ended matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Error(ErrorResponse),
    PointToPoint(PointToPointResponse),
    AllPairs(ResultMatrix),
}
