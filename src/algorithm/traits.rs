use std::fmt::Debug;
use num_traits::{Float, Zero};
use crate::algorithm::path::reconstruct_path;
use crate::graph::Graph;
use crate::Result;

/// Result of a shortest path algorithm execution
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPathResult<W>
where
    W: Float + Zero + Debug + Copy,
{
    /// Distances from source to each vertex; `None` means unreachable
    pub distances: Vec<Option<W>>,

    /// Predecessor vertices in the shortest path tree
    pub predecessors: Vec<Option<usize>>,

    /// Source vertex ID
    pub source: usize,
}

impl<W> ShortestPathResult<W>
where
    W: Float + Zero + Debug + Copy,
{
    /// Distance to `target`, or `None` if it is unreachable
    pub fn distance(&self, target: usize) -> Option<W> {
        self.distances.get(target).copied().flatten()
    }

    pub fn is_reachable(&self, target: usize) -> bool {
        self.distance(target).is_some()
    }
}

/// Trait for shortest path algorithms
pub trait ShortestPathAlgorithm<W, G>
where
    W: Float + Zero + Debug + Copy,
    G: Graph<W>,
{
    /// Compute shortest paths from a source vertex to all other vertices
    fn compute_shortest_paths(&self, graph: &G, source: usize) -> Result<ShortestPathResult<W>>;

    /// Get the name of the algorithm
    fn name(&self) -> &'static str;

    /// Get the shortest path from source to target as a sequence of vertices
    fn get_path(&self, result: &ShortestPathResult<W>, target: usize) -> Option<Vec<usize>> {
        if !result.is_reachable(target) {
            return None;
        }

        let path = reconstruct_path(&result.predecessors, result.source, target);
        if path.is_empty() {
            None
        } else {
            Some(path)
        }
    }
}
