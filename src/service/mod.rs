pub mod client;
pub mod handler;
pub mod listener;
pub mod models;
pub mod protocol;

pub use listener::{build_compute_pool, start_server, ConnectionRegistry, Server};
pub use models::{GraphRequest, Reply};
