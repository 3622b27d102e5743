use crate::graph::DirectedGraph;
use crate::Result;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand::rngs::StdRng;

/// Generates a connected bidirectional graph shaped like a transit line network.
///
/// Nodes are named "0".."n-1". Every node `i` links forward to between one and
/// `max_edges_per_node` of its successors `i+1, i+2, ...` with an integer weight
/// in `1..=10`, and every link is added in both directions.
pub fn generate_line_graph(
    node_count: usize,
    max_edges_per_node: usize,
    seed: u64,
) -> Result<DirectedGraph<OrderedFloat<f64>>> {
    let mut graph = DirectedGraph::with_capacity(node_count);
    let mut rng = StdRng::seed_from_u64(seed);
    let max_edges = max_edges_per_node.max(1);

    for i in 0..node_count {
        graph.add_node(&i.to_string())?;
    }

    for i in 0..node_count {
        let edge_count = rng.gen_range(1..=max_edges);
        for j in 1..=edge_count {
            if i + j >= node_count {
                break;
            }
            let from = i.to_string();
            let to = (i + j).to_string();
            let weight = OrderedFloat(rng.gen_range(1..=10) as f64);
            graph.add_edge_with_category(&from, &to, weight, Some("direct"))?;
            graph.add_edge_with_category(&to, &from, weight, Some("direct"))?;
        }
    }

    Ok(graph)
}

/// Generates a sparse random directed graph with about `edge_factor * n` edges.
///
/// Weights are drawn from `1.0..100.0`, or from `1..=4` when `integer_weights`
/// is set, which produces many equal-cost paths. Self-loops are skipped, so some
/// nodes usually end up unreachable from others.
pub fn generate_random_graph(
    node_count: usize,
    edge_factor: f64,
    integer_weights: bool,
    seed: u64,
) -> Result<DirectedGraph<OrderedFloat<f64>>> {
    let mut graph = DirectedGraph::with_capacity(node_count);
    let mut rng = StdRng::seed_from_u64(seed);

    for i in 0..node_count {
        graph.add_node(&format!("n{}", i))?;
    }
    if node_count == 0 {
        return Ok(graph);
    }

    let edge_count = (edge_factor * node_count as f64) as usize;
    for _ in 0..edge_count {
        let u = rng.gen_range(0..node_count);
        let v = rng.gen_range(0..node_count);
        if u == v {
            continue;
        }
        let weight = if integer_weights {
            OrderedFloat(rng.gen_range(1..=4) as f64)
        } else {
            OrderedFloat(rng.gen_range(1.0..100.0))
        };
        graph.add_edge(&format!("n{}", u), &format!("n{}", v), weight)?;
    }

    Ok(graph)
}
