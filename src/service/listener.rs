use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::service::handler::handle_connection;
use crate::{Error, Result};

/// Pause after a failed accept, so a persistent failure (e.g. out of file
/// descriptors) does not spin the loop
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Connection bookkeeping owned by the listener and shared with its handlers
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    accepted: AtomicU64,
    active: AtomicUsize,
}

impl ConnectionRegistry {
    /// Total connections accepted so far
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Connections whose handler is still running
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    fn open(self: &Arc<Self>) -> ConnectionGuard {
        let id = self.accepted.fetch_add(1, Ordering::Relaxed) + 1;
        self.active.fetch_add(1, Ordering::Relaxed);
        ConnectionGuard {
            id,
            registry: Arc::clone(self),
        }
    }
}

/// Marks a connection active until dropped
struct ConnectionGuard {
    id: u64,
    registry: Arc<ConnectionRegistry>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.active.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Builds the thread pool that all connections share for APSP work
pub fn build_compute_pool(workers: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("apsp-worker-{}", i))
        .build()
        .map_err(|e| Error::Config(format!("failed to start compute pool: {}", e)))
}

/// TCP listener that hands every connection to its own handler task
pub struct Server {
    listener: TcpListener,
    config: Arc<ServiceConfig>,
    registry: Arc<ConnectionRegistry>,
    pool: Arc<ThreadPool>,
}

impl Server {
    /// Validates the config and binds the listening socket
    pub async fn bind(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        let addr = config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        let pool = build_compute_pool(config.workers)?;
        Ok(Server {
            listener,
            config: Arc::new(config),
            registry: Arc::new(ConnectionRegistry::default()),
            pool: Arc::new(pool),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Accepts connections forever
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves. Handlers already running
    /// are left to finish on their own.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            "listening on {} (strategy: {}, workers: {})",
            self.local_addr()?,
            self.config.strategy,
            self.config.workers
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(
                        "shutting down listener after {} connections ({} still active)",
                        self.registry.accepted(),
                        self.registry.active()
                    );
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let guard = self.registry.open();
                        let config = Arc::clone(&self.config);
                        let pool = Arc::clone(&self.pool);
                        debug!("connection #{} from {}", guard.id, peer);

                        tokio::spawn(async move {
                            if let Err(err) = handle_connection(stream, &config, &pool).await {
                                warn!("connection #{} from {} dropped: {}", guard.id, peer, err);
                            }
                            drop(guard);
                        });
                    }
                    Err(err) => {
                        warn!("failed to accept connection: {}", err);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }
        }
    }
}

/// Bind and serve until the process is stopped
pub async fn start_server(config: ServiceConfig) -> Result<()> {
    let server = Server::bind(config).await?;
    server.run().await
}
