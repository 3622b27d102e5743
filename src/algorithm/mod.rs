pub mod traits;
pub mod path;
pub mod dijkstra;
pub mod apsp;

pub use traits::{ShortestPathAlgorithm, ShortestPathResult};
pub use path::reconstruct_path;
