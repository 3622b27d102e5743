use std::fmt::Debug;
use num_traits::{Float, Zero};

use crate::graph::Graph;
use crate::algorithm::apsp::CancelFlag;
use crate::algorithm::path::reconstruct_path;
use crate::algorithm::{ShortestPathAlgorithm, ShortestPathResult};
use crate::data_structures::BinaryHeapWrapper;
use crate::{Error, Result};

/// Queue pops between two looks at the cancel flag
const CANCEL_CHECK_INTERVAL: usize = 256;

/// Classic Dijkstra's algorithm implementation
#[derive(Debug, Clone, Default)]
pub struct Dijkstra {
    cancel: Option<CancelFlag>,
}

impl Dijkstra {
    /// Creates a new Dijkstra algorithm instance
    pub fn new() -> Self {
        Dijkstra { cancel: None }
    }

    /// Abandons a run with [`Error::Cancelled`] once `cancel` is raised
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, CancelFlag::is_cancelled)
    }

    /// Point-to-point shortest path from `source` to `target`.
    ///
    /// Stops as soon as `target` is settled. Returns the distance (`None` when
    /// unreachable) and the path, which is empty when unreachable.
    pub fn shortest_path<W, G>(&self, graph: &G, source: usize, target: usize) -> Result<(Option<W>, Vec<usize>)>
    where
        W: Float + Zero + Debug + Copy + Ord,
        G: Graph<W>,
    {
        if !graph.has_vertex(target) {
            return Err(Error::InvalidVertex(target));
        }

        let result = self.run(graph, source, Some(target))?;
        match result.distance(target) {
            Some(distance) => {
                let path = reconstruct_path(&result.predecessors, source, target);
                if path.is_empty() {
                    return Err(Error::AlgorithmError(format!(
                        "vertex {} has distance {:?} but no predecessor chain to {}",
                        target, distance, source
                    )));
                }
                Ok((Some(distance), path))
            }
            None => Ok((None, Vec::new())),
        }
    }

    fn run<W, G>(&self, graph: &G, source: usize, target: Option<usize>) -> Result<ShortestPathResult<W>>
    where
        W: Float + Zero + Debug + Copy + Ord,
        G: Graph<W>,
    {
        if !graph.has_vertex(source) {
            return Err(Error::SourceNotFound);
        }

        let n = graph.vertex_count();

        // Initialize distances and predecessors
        let mut distances: Vec<Option<W>> = vec![None; n];
        let mut predecessors: Vec<Option<usize>> = vec![None; n];

        // Distance to source is 0
        distances[source] = Some(W::zero());

        let mut queue = BinaryHeapWrapper::new();
        queue.push(source, W::zero());

        let mut pops = 0usize;
        while let Some((u, dist_u)) = queue.pop() {
            pops += 1;
            if pops % CANCEL_CHECK_INTERVAL == 0 && self.is_cancelled() {
                return Err(Error::Cancelled);
            }

            // Stale entry: a shorter path to u was found after this one was queued
            if let Some(current_dist) = distances[u] {
                if current_dist < dist_u {
                    continue;
                }
            }

            // Settled nodes never improve again
            if target == Some(u) {
                break;
            }

            for (v, weight) in graph.outgoing_edges(u) {
                let new_dist = dist_u + weight;

                let should_update = match distances[v] {
                    None => true,
                    Some(current_dist) => new_dist < current_dist,
                };

                if should_update {
                    distances[v] = Some(new_dist);
                    predecessors[v] = Some(u);
                    queue.push(v, new_dist);
                }
            }
        }

        Ok(ShortestPathResult {
            distances,
            predecessors,
            source,
        })
    }
}

impl<W, G> ShortestPathAlgorithm<W, G> for Dijkstra
where
    W: Float + Zero + Debug + Copy + Ord,
    G: Graph<W>,
{
    fn name(&self) -> &'static str {
        "Dijkstra"
    }

    fn compute_shortest_paths(&self, graph: &G, source: usize) -> Result<ShortestPathResult<W>> {
        self.run(graph, source, None)
    }
}
