use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use rayon::ThreadPool;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;

use crate::algorithm::apsp::{finite_distance, AllPairsShortestPaths, CancelFlag, Progress};
use crate::algorithm::dijkstra::Dijkstra;
use crate::config::ServiceConfig;
use crate::graph::{DirectedGraph, Graph};
use crate::service::models::*;
use crate::service::protocol::{decode_request, discard_frame, read_frame, write_frame, OVERSIZED_FRAME};
use crate::{Error, Result};

/// Most bytes of an oversized request read and dropped before replying
const MAX_DISCARD_BYTES: u64 = 1024 * 1024 * 1024;

/// Serves one connection: reads a request, computes, writes one reply, closes.
///
/// Failures before the reply is written are reported to the client as an error
/// reply. Only I/O failures on the reply itself are returned to the caller.
/// Concurrent APSP strategies run on `pool`.
pub async fn handle_connection<S>(stream: S, config: &ServiceConfig, pool: &Arc<ThreadPool>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);

    let reply = match serve_request(&mut reader, config, pool).await {
        Ok(Some(reply)) => reply,
        Ok(None) => {
            debug!("peer closed the connection without sending a request");
            return Ok(());
        }
        Err(err) => {
            warn!("request rejected: {}", err);
            if is_oversized_frame(&err) {
                // Unread input would reset the connection before the peer sees the reply
                skip_rest_of_frame(&mut reader, config).await;
            }
            Reply::Error(ErrorResponse::from(&err))
        }
    };

    write_frame(&mut write_half, &reply).await?;
    write_half.shutdown().await?;
    Ok(())
}

fn is_oversized_frame(err: &Error) -> bool {
    matches!(err, Error::LimitExceeded { what, .. } if *what == OVERSIZED_FRAME)
}

async fn skip_rest_of_frame<R>(reader: &mut BufReader<R>, config: &ServiceConfig)
where
    R: AsyncRead + Unpin,
{
    match timeout(config.read_timeout(), discard_frame(reader, MAX_DISCARD_BYTES)).await {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => debug!("oversized request still unfinished after {} bytes", MAX_DISCARD_BYTES),
        Ok(Err(err)) => debug!("failed to skip oversized request: {}", err),
        Err(_) => debug!("oversized request still arriving after {:?}", config.read_timeout()),
    }
}

async fn serve_request<R>(
    reader: &mut BufReader<R>,
    config: &ServiceConfig,
    pool: &Arc<ThreadPool>,
) -> Result<Option<Reply>>
where
    R: AsyncRead + Unpin,
{
    let frame = match timeout(config.read_timeout(), read_frame(reader, config.max_request_bytes)).await {
        Ok(frame) => frame?,
        Err(_) => {
            return Err(Error::Timeout(format!(
                "no complete request within {:?}",
                config.read_timeout()
            )))
        }
    };
    let Some(frame) = frame else {
        return Ok(None);
    };

    let request = decode_request(&frame)?;
    let query = request.query()?;
    let graph = Arc::new(request.into_graph(config)?);
    debug!(
        "decoded graph with {} nodes and {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    let reply = match query {
        Query::AllPairs => Reply::AllPairs(all_pairs(graph, config, pool).await?),
        Query::PointToPoint { start, end } => {
            Reply::PointToPoint(point_to_point(graph, &start, &end, config).await?)
        }
    };
    Ok(Some(reply))
}

async fn all_pairs(
    graph: Arc<DirectedGraph<Weight>>,
    config: &ServiceConfig,
    pool: &Arc<ThreadPool>,
) -> Result<crate::ResultMatrix> {
    let node_count = graph.vertex_count();
    let budget = config.compute_timeout(node_count);
    let cancel = CancelFlag::new();
    let progress = Progress::new();
    let apsp = AllPairsShortestPaths::new(config.strategy)
        .with_workers(config.workers)
        .with_thread_pool(Arc::clone(pool))
        .with_cancel_flag(cancel.clone())
        .with_progress(progress.clone());

    let start = Instant::now();
    let task = tokio::task::spawn_blocking(move || apsp.run(&*graph));
    match timeout(budget, task).await {
        Ok(joined) => {
            let matrix = joined.map_err(|e| Error::AlgorithmError(format!("APSP task failed: {}", e)))??;
            debug!("APSP ({}) answered in {:?}", config.strategy, start.elapsed());
            Ok(matrix)
        }
        Err(_) => {
            // Workers stop picking up sources and abandon the rows in flight
            cancel.cancel();
            Err(Error::Timeout(format!(
                "computation exceeded {:?} with {} of {} rows done",
                budget,
                progress.rows(),
                node_count
            )))
        }
    }
}

async fn point_to_point(
    graph: Arc<DirectedGraph<Weight>>,
    start: &str,
    end: &str,
    config: &ServiceConfig,
) -> Result<PointToPointResponse> {
    let source = graph
        .node_index(start)
        .ok_or_else(|| Error::UnknownNode(start.to_string()))?;
    let target = graph
        .node_index(end)
        .ok_or_else(|| Error::UnknownNode(end.to_string()))?;
    let budget = config.compute_timeout(graph.vertex_count());
    let cancel = CancelFlag::new();
    let dijkstra = Dijkstra::new().with_cancel_flag(cancel.clone());
    let (start, end) = (start.to_string(), end.to_string());

    let task = tokio::task::spawn_blocking(move || -> Result<PointToPointResponse> {
        let (distance, path) = dijkstra.shortest_path(&*graph, source, target)?;
        Ok(match distance {
            Some(distance) => PointToPointResponse {
                distance: finite_distance(distance, &start, &end)?,
                path: graph.path_ids(&path)?,
            },
            None => PointToPointResponse {
                distance: POINT_TO_POINT_UNREACHABLE,
                path: Vec::new(),
            },
        })
    });

    match timeout(budget, task).await {
        Ok(joined) => joined.map_err(|e| Error::AlgorithmError(format!("shortest path task failed: {}", e)))?,
        Err(_) => {
            cancel.cancel();
            Err(Error::Timeout(format!("computation exceeded {:?}", budget)))
        }
    }
}
