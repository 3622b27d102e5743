use clap::Parser;
use graph_paths::service::Server;
use graph_paths::{ServiceConfig, Strategy};
use log::{error, info};
use std::path::PathBuf;

/// Shortest-path service: one JSON graph per line in, one JSON result per line out
#[derive(Debug, Parser)]
#[command(name = "graph-paths-server", version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// All-pairs scheduling strategy
    #[arg(short, long, value_enum)]
    strategy: Option<Strategy>,

    /// Worker count for the worker-pool strategy
    #[arg(short, long)]
    workers: Option<usize>,
}

fn load_config(cli: &Cli) -> graph_paths::Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            std::process::exit(2);
        }
    };

    let addr = format!("{}:{}", config.host, config.port);
    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(err) => {
            error!("failed to bind {}: {}", addr, err);
            std::process::exit(1);
        }
    };

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    if let Err(err) = server.run_until(shutdown).await {
        error!("server stopped: {}", err);
        std::process::exit(1);
    }
    info!("bye");
}
