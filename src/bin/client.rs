use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use graph_paths::graph::generators::generate_line_graph;
use graph_paths::service::client::send_request;
use graph_paths::service::{GraphRequest, Reply};
use tokio::task::JoinSet;

/// Load generator: N concurrent clients, each submitting its own random graph
#[derive(Debug, Parser)]
#[command(name = "graph-paths-client", version)]
struct Cli {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    addr: String,

    /// Number of concurrent clients
    #[arg(short, long, default_value_t = 4)]
    clients: usize,

    /// Nodes per generated graph
    #[arg(short, long, default_value_t = 50)]
    nodes: usize,

    /// Maximum forward links per node
    #[arg(short, long, default_value_t = 3)]
    max_edges: usize,

    /// Base seed; client i uses seed + i
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Ask for a single path instead of the full matrix
    #[arg(long, requires = "end")]
    start: Option<String>,

    #[arg(long, requires = "start")]
    end: Option<String>,
}

async fn run_client(id: usize, cli: &Cli) -> graph_paths::Result<String> {
    let graph = generate_line_graph(cli.nodes, cli.max_edges, cli.seed + id as u64)?;
    let mut request = GraphRequest::from_graph(&graph);
    if let (Some(start), Some(end)) = (&cli.start, &cli.end) {
        request = request.between(start, end);
    }

    let started = Instant::now();
    let reply = send_request(cli.addr.as_str(), &request).await?;
    let elapsed = started.elapsed();

    Ok(match reply {
        Reply::AllPairs(matrix) => {
            let pairs: usize = matrix.values().map(|row| row.len()).sum();
            let unreachable: usize = matrix
                .values()
                .flat_map(|row| row.values())
                .filter(|info| !info.is_reachable())
                .count();
            format!(
                "{} sources, {} pairs ({} unreachable) in {:?}",
                matrix.len(),
                pairs,
                unreachable,
                elapsed
            )
        }
        Reply::PointToPoint(answer) if answer.is_reachable() => {
            format!("distance {} via {} in {:?}", answer.distance, answer.path.join(" -> "), elapsed)
        }
        Reply::PointToPoint(_) => format!("unreachable (answered in {:?})", elapsed),
        Reply::Error(err) => format!("server error {}: {}", err.error, err.message),
    })
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Arc::new(Cli::parse());

    let mut clients = JoinSet::new();
    for id in 0..cli.clients {
        let cli = Arc::clone(&cli);
        clients.spawn(async move { (id, run_client(id, &cli).await) });
    }

    while let Some(joined) = clients.join_next().await {
        match joined {
            Ok((id, Ok(summary))) => println!("[client {}] {}", id, summary),
            Ok((id, Err(err))) => println!("[client {}] failed: {}", id, err),
            Err(err) => println!("client task panicked: {}", err),
        }
    }
}
