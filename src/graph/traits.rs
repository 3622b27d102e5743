use std::fmt::Debug;
use num_traits::{Float, Zero};

/// Trait representing a weighted directed graph
///
/// Vertices are dense indices in `0..vertex_count()`. Implementations are
/// read-only views; the algorithms never mutate the graph they run on.
pub trait Graph<W>: Debug
where
    W: Float + Zero + Debug + Copy,
{
    /// Returns the number of vertices in the graph
    fn vertex_count(&self) -> usize;

    /// Returns the number of edges in the graph
    fn edge_count(&self) -> usize;

    /// Returns an iterator over the outgoing edges from a vertex
    fn outgoing_edges(&self, vertex: usize) -> Box<dyn Iterator<Item = (usize, W)> + '_>;

    /// Returns true if the vertex exists in the graph
    fn has_vertex(&self, vertex: usize) -> bool;

    /// Returns true if there's an edge between the two vertices
    fn has_edge(&self, from: usize, to: usize) -> bool;

    /// Gets the weight of the lightest edge between two vertices, if any
    fn get_edge_weight(&self, from: usize, to: usize) -> Option<W>;
}
