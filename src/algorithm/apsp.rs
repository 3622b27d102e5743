//! All-pairs shortest paths: one Dijkstra run per source node.
//!
//! Three strategies schedule the per-source runs. They differ only in how much
//! runs at once, never in the matrix they produce:
//!
//! - [`Strategy::Sequential`] runs one source after another on the caller's thread.
//! - [`Strategy::Unbounded`] spawns one rayon task per source, all at once.
//! - [`Strategy::WorkerPool`] spawns a fixed number of worker tasks that pull
//!   sources from a bounded queue.
//!
//! Concurrent strategies run their tasks on a shared rayon pool (the global one
//! unless [`AllPairsShortestPaths::with_thread_pool`] is given), so concurrent
//! runs share a fixed set of threads. Rows are computed without holding any
//! lock and then inserted into the shared matrix under a single mutex.

use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::debug;
use num_traits::{Float, Zero};
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};

use crate::algorithm::path::reconstruct_path;
use crate::algorithm::{dijkstra::Dijkstra, ShortestPathAlgorithm};
use crate::graph::{DirectedGraph, Graph};
use crate::{Error, Result};

/// Distance reported for an unreachable destination in the all-pairs matrix
pub const UNREACHABLE_DISTANCE: f64 = -1.0;

/// Shortest path between one ordered pair of nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathInfo {
    /// Node identifiers from source to destination, empty if unreachable
    pub path: Vec<String>,

    /// Total path cost, or [`UNREACHABLE_DISTANCE`]
    pub distance: f64,
}

impl PathInfo {
    pub fn unreachable() -> Self {
        PathInfo {
            path: Vec::new(),
            distance: UNREACHABLE_DISTANCE,
        }
    }

    pub fn is_reachable(&self) -> bool {
        !self.path.is_empty()
    }
}

/// source -> destination -> path; self-pairs are omitted
pub type ResultMatrix = BTreeMap<String, BTreeMap<String, PathInfo>>;

/// How the per-source Dijkstra runs are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One source at a time
    Sequential,
    /// One concurrent task per source node
    Unbounded,
    /// Fixed number of workers pulling sources from a queue
    #[default]
    WorkerPool,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Sequential, Strategy::Unbounded, Strategy::WorkerPool];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Unbounded => "unbounded",
            Strategy::WorkerPool => "worker_pool",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "sequential" => Ok(Strategy::Sequential),
            "unbounded" => Ok(Strategy::Unbounded),
            "worker_pool" | "pool" => Ok(Strategy::WorkerPool),
            other => Err(Error::Config(format!("unknown strategy: {}", other))),
        }
    }
}

/// Shared stop signal for an in-flight all-pairs computation
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every worker to stop starting new sources
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Number of matrix rows a run has finished, readable while it is in flight
#[derive(Debug, Clone, Default)]
pub struct Progress(Arc<AtomicUsize>);

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn row_done(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// All-pairs shortest path orchestrator
#[derive(Debug, Clone)]
pub struct AllPairsShortestPaths {
    strategy: Strategy,
    workers: usize,
    cancel: CancelFlag,
    progress: Progress,
    pool: Option<Arc<ThreadPool>>,
}

impl Default for AllPairsShortestPaths {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl AllPairsShortestPaths {
    pub fn new(strategy: Strategy) -> Self {
        AllPairsShortestPaths {
            strategy,
            workers: num_cpus::get().max(1),
            cancel: CancelFlag::new(),
            progress: Progress::new(),
            pool: None,
        }
    }

    /// Sets the worker count used by [`Strategy::WorkerPool`]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Runs concurrent strategies on `pool` instead of rayon's global pool
    pub fn with_thread_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Computes the full result matrix for `graph`
    pub fn run<W>(&self, graph: &DirectedGraph<W>) -> Result<ResultMatrix>
    where
        W: Float + Zero + Debug + Copy + Ord + Send + Sync,
    {
        let start = Instant::now();
        let matrix = match self.strategy {
            Strategy::Sequential => self.run_sequential(graph),
            Strategy::Unbounded => self.run_unbounded(graph),
            Strategy::WorkerPool => self.run_worker_pool(graph),
        }?;
        debug!(
            "APSP ({}) over {} nodes / {} edges finished in {:?}",
            self.strategy,
            graph.vertex_count(),
            graph.edge_count(),
            start.elapsed()
        );
        Ok(matrix)
    }

    fn run_sequential<W>(&self, graph: &DirectedGraph<W>) -> Result<ResultMatrix>
    where
        W: Float + Zero + Debug + Copy + Ord,
    {
        let mut matrix = ResultMatrix::new();
        for source in 0..graph.vertex_count() {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let (id, row) = source_row(graph, source, &self.cancel)?;
            matrix.insert(id, row);
            self.progress.row_done();
        }
        Ok(matrix)
    }

    /// Opens a rayon scope whose spawned tasks run on the configured pool.
    ///
    /// `op` itself runs on the calling thread, so a dispatcher blocked on the
    /// job queue never holds a pool thread.
    fn in_scope<'scope, OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce(&rayon::Scope<'scope>) -> R,
    {
        match &self.pool {
            Some(pool) => pool.in_place_scope(op),
            None => rayon::in_place_scope(op),
        }
    }

    fn run_unbounded<W>(&self, graph: &DirectedGraph<W>) -> Result<ResultMatrix>
    where
        W: Float + Zero + Debug + Copy + Ord + Send + Sync,
    {
        let collector = RowCollector::new(&self.progress);

        self.in_scope(|scope| {
            for source in 0..graph.vertex_count() {
                let collector = &collector;
                let cancel = &self.cancel;
                scope.spawn(move |_| {
                    if !cancel.is_cancelled() {
                        collector.record(source_row(graph, source, cancel));
                    }
                });
            }
        });

        collector.finish(&self.cancel)
    }

    fn run_worker_pool<W>(&self, graph: &DirectedGraph<W>) -> Result<ResultMatrix>
    where
        W: Float + Zero + Debug + Copy + Ord + Send + Sync,
    {
        let collector = RowCollector::new(&self.progress);
        let workers = self.workers.min(graph.vertex_count()).max(1);
        let (jobs, queue) = flume::bounded::<usize>(workers * 2);

        self.in_scope(|scope| {
            for _ in 0..workers {
                let queue = queue.clone();
                let collector = &collector;
                let cancel = &self.cancel;
                scope.spawn(move |_| {
                    // Ends once the dispatcher has closed the queue and it is drained
                    for source in queue.iter() {
                        if cancel.is_cancelled() {
                            continue;
                        }
                        collector.record(source_row(graph, source, cancel));
                    }
                });
            }
            drop(queue);

            for source in 0..graph.vertex_count() {
                if self.cancel.is_cancelled() || jobs.send(source).is_err() {
                    break;
                }
            }
            // Close the queue only after every source has been enqueued
            drop(jobs);
        });

        collector.finish(&self.cancel)
    }
}

/// Rows produced by concurrent workers, plus the first failure seen
struct RowCollector<'a> {
    matrix: Mutex<ResultMatrix>,
    failure: Mutex<Option<Error>>,
    progress: &'a Progress,
}

impl<'a> RowCollector<'a> {
    fn new(progress: &'a Progress) -> Self {
        RowCollector {
            matrix: Mutex::new(ResultMatrix::new()),
            failure: Mutex::new(None),
            progress,
        }
    }

    fn record(&self, row: Result<(String, BTreeMap<String, PathInfo>)>) {
        match row {
            Ok((id, row)) => {
                let mut matrix = self.matrix.lock().unwrap_or_else(|e| e.into_inner());
                matrix.insert(id, row);
                self.progress.row_done();
            }
            Err(err) => {
                let mut failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
                failure.get_or_insert(err);
            }
        }
    }

    fn finish(self, cancel: &CancelFlag) -> Result<ResultMatrix> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some(err) = self.failure.into_inner().unwrap_or_else(|e| e.into_inner()) {
            return Err(err);
        }
        Ok(self.matrix.into_inner().unwrap_or_else(|e| e.into_inner()))
    }
}

/// Runs Dijkstra from `source` and builds its row of the matrix
fn source_row<W>(
    graph: &DirectedGraph<W>,
    source: usize,
    cancel: &CancelFlag,
) -> Result<(String, BTreeMap<String, PathInfo>)>
where
    W: Float + Zero + Debug + Copy + Ord,
{
    let source_id = graph
        .node_id(source)
        .ok_or(Error::InvalidVertex(source))?
        .to_string();
    let result = Dijkstra::new()
        .with_cancel_flag(cancel.clone())
        .compute_shortest_paths(graph, source)?;

    let mut row = BTreeMap::new();
    for (target, target_id) in graph.node_ids().enumerate() {
        if target == source {
            continue;
        }

        let info = match result.distance(target) {
            None => PathInfo::unreachable(),
            Some(distance) => {
                let path = reconstruct_path(&result.predecessors, source, target);
                if path.is_empty() {
                    return Err(Error::AlgorithmError(format!(
                        "{} is at distance {:?} from {} but has no predecessor chain",
                        target_id, distance, source_id
                    )));
                }
                PathInfo {
                    path: graph.path_ids(&path)?,
                    distance: finite_distance(distance, &source_id, target_id)?,
                }
            }
        };
        row.insert(target_id.to_string(), info);
    }

    Ok((source_id, row))
}

/// Converts a path cost for the wire; sums that overflowed to infinity are rejected
pub(crate) fn finite_distance<W: Float + Debug>(distance: W, from: &str, to: &str) -> Result<f64> {
    match distance.to_f64() {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(Error::DistanceOverflow {
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}
