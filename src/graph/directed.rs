use crate::graph::traits::Graph;
use crate::{Error, Result};
use num_traits::{Float, Zero};
use std::collections::HashMap;
use std::fmt::Debug;

/// An outgoing edge stored in its source node's adjacency list
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<W> {
    /// Index of the target node
    pub target: usize,

    /// Non-negative edge cost
    pub weight: W,

    /// Provenance tag (e.g. "trip", "transfer"); never used by the algorithms
    pub category: Option<String>,
}

/// A directed graph keyed by string identifiers, using adjacency lists
///
/// Identifiers are interned to dense indices in insertion order, so the same
/// sequence of `add_node`/`add_edge` calls always yields the same layout.
#[derive(Debug, Clone)]
pub struct DirectedGraph<W>
where
    W: Float + Zero + Debug + Copy,
{
    /// Node identifiers, indexed by vertex ID
    ids: Vec<String>,

    /// Identifier -> vertex ID
    index: HashMap<String, usize>,

    /// Outgoing edges for each vertex
    outgoing_edges: Vec<Vec<Edge<W>>>,
}

impl<W> Default for DirectedGraph<W>
where
    W: Float + Zero + Debug + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<W> DirectedGraph<W>
where
    W: Float + Zero + Debug + Copy,
{
    /// Creates a new empty directed graph
    pub fn new() -> Self {
        DirectedGraph {
            ids: Vec::new(),
            index: HashMap::new(),
            outgoing_edges: Vec::new(),
        }
    }

    /// Creates a new empty directed graph with room for `vertices` nodes
    pub fn with_capacity(vertices: usize) -> Self {
        DirectedGraph {
            ids: Vec::with_capacity(vertices),
            index: HashMap::with_capacity(vertices),
            outgoing_edges: Vec::with_capacity(vertices),
        }
    }

    /// Adds a node and returns its vertex ID. Adding an existing node is a no-op
    /// that returns the existing ID.
    pub fn add_node(&mut self, id: &str) -> Result<usize> {
        if let Some(&vertex) = self.index.get(id) {
            return Ok(vertex);
        }
        validate_id(id)?;

        let vertex = self.ids.len();
        self.ids.push(id.to_string());
        self.index.insert(id.to_string(), vertex);
        self.outgoing_edges.push(Vec::new());
        Ok(vertex)
    }

    /// Adds a directed edge, creating either endpoint if it is not yet present.
    /// Parallel edges are kept.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: W) -> Result<()> {
        self.add_edge_with_category(from, to, weight, None)
    }

    /// Adds a directed edge carrying a category tag
    pub fn add_edge_with_category(
        &mut self,
        from: &str,
        to: &str,
        weight: W,
        category: Option<&str>,
    ) -> Result<()> {
        validate_weight(weight)?;
        let source = self.add_node(from)?;
        let target = self.add_node(to)?;

        self.outgoing_edges[source].push(Edge {
            target,
            weight,
            category: category.map(str::to_string),
        });
        Ok(())
    }

    /// Returns the vertex ID of a node identifier
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Returns the identifier of a vertex
    pub fn node_id(&self, vertex: usize) -> Option<&str> {
        self.ids.get(vertex).map(String::as_str)
    }

    /// Iterates over node identifiers in vertex ID order
    pub fn node_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids.iter().map(String::as_str)
    }

    /// Returns the outgoing edges of a vertex with their categories
    pub fn edges(&self, vertex: usize) -> &[Edge<W>] {
        self.outgoing_edges
            .get(vertex)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Maps a sequence of vertex IDs back to node identifiers
    pub fn path_ids(&self, path: &[usize]) -> Result<Vec<String>> {
        path.iter()
            .map(|&vertex| {
                self.node_id(vertex)
                    .map(str::to_string)
                    .ok_or(Error::InvalidVertex(vertex))
            })
            .collect()
    }
}

impl<W> Graph<W> for DirectedGraph<W>
where
    W: Float + Zero + Debug + Copy,
{
    fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    fn edge_count(&self) -> usize {
        self.outgoing_edges.iter().map(|edges| edges.len()).sum()
    }

    fn outgoing_edges(&self, vertex: usize) -> Box<dyn Iterator<Item = (usize, W)> + '_> {
        Box::new(self.edges(vertex).iter().map(|edge| (edge.target, edge.weight)))
    }

    fn has_vertex(&self, vertex: usize) -> bool {
        vertex < self.ids.len()
    }

    fn has_edge(&self, from: usize, to: usize) -> bool {
        self.edges(from).iter().any(|edge| edge.target == to)
    }

    fn get_edge_weight(&self, from: usize, to: usize) -> Option<W> {
        self.edges(from)
            .iter()
            .filter(|edge| edge.target == to)
            .map(|edge| edge.weight)
            .fold(None, |lightest, weight| match lightest {
                Some(current) if current <= weight => Some(current),
                _ => Some(weight),
            })
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.chars().any(char::is_control) {
        return Err(Error::InvalidNodeId(id.to_string()));
    }
    Ok(())
}

fn validate_weight<W>(weight: W) -> Result<()>
where
    W: Float + Zero + Debug + Copy,
{
    let value = weight.to_f64().unwrap_or(f64::NAN);
    if !weight.is_finite() {
        return Err(Error::NonFiniteWeight(value));
    }
    if weight < W::zero() {
        return Err(Error::NegativeWeight(value));
    }
    Ok(())
}
