use graph_paths::algorithm::dijkstra::Dijkstra;
use graph_paths::algorithm::reconstruct_path;
use graph_paths::algorithm::traits::ShortestPathAlgorithm;
use graph_paths::graph::generators::generate_random_graph;
use graph_paths::graph::{DirectedGraph, Graph};
use graph_paths::{CancelFlag, Error};
use ordered_float::OrderedFloat;

type G = DirectedGraph<OrderedFloat<f64>>;

fn cell(x: usize, y: usize) -> String {
    format!("{},{}", x, y)
}

// Test helper function to create a grid graph, skipping blocked cells
fn create_test_grid(width: usize, height: usize, blocked: &[(usize, usize)]) -> G {
    let mut graph = DirectedGraph::new();

    for y in 0..height {
        for x in 0..width {
            graph.add_node(&cell(x, y)).unwrap();
        }
    }

    // Define possible moves (8 directions)
    let directions = [
        (0, -1, 1.0), (1, 0, 1.0), (0, 1, 1.0), (-1, 0, 1.0),
        (1, -1, 1.4), (1, 1, 1.4), (-1, 1, 1.4), (-1, -1, 1.4),
    ];

    for y in 0..height {
        for x in 0..width {
            if blocked.contains(&(x, y)) {
                continue;
            }
            for (dx, dy, cost) in directions {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;

                if nx >= 0 && ny >= 0 && nx < width as i32 && ny < height as i32 {
                    let (nx, ny) = (nx as usize, ny as usize);
                    if !blocked.contains(&(nx, ny)) {
                        graph.add_edge(&cell(x, y), &cell(nx, ny), OrderedFloat(cost)).unwrap();
                    }
                }
            }
        }
    }

    graph
}

fn get_path(result: &graph_paths::ShortestPathResult<OrderedFloat<f64>>, target: usize) -> Option<Vec<usize>> {
    <Dijkstra as ShortestPathAlgorithm<OrderedFloat<f64>, G>>::get_path(&Dijkstra::new(), result, target)
}

// Sum of the lightest edge weights along consecutive path vertices
fn path_cost(graph: &G, path: &[usize]) -> OrderedFloat<f64> {
    path.windows(2)
        .map(|pair| graph.get_edge_weight(pair[0], pair[1]).expect("path uses a missing edge"))
        .fold(OrderedFloat(0.0), |acc, w| acc + w)
}

#[test]
fn test_path_finding_simple_grid() {
    let graph = create_test_grid(10, 10, &[]);
    let source = graph.node_index("0,0").unwrap();
    let target = graph.node_index("9,9").unwrap();

    let result = Dijkstra::new().compute_shortest_paths(&graph, source).unwrap();
    let path = get_path(&result, target).expect("Dijkstra should construct a path");

    assert_eq!(path[0], source, "Path should start at source");
    assert_eq!(path[path.len() - 1], target, "Path should end at target");
    // Nine diagonal steps
    assert_eq!(path.len(), 10);
    assert_eq!(result.distance(target), Some(path_cost(&graph, &path)));
}

#[test]
fn test_path_finding_with_obstacles() {
    // A wall in column 5 with a gap in the bottom two rows
    let wall: Vec<(usize, usize)> = (0..8).map(|y| (5, y)).collect();
    let graph = create_test_grid(10, 10, &wall);
    let source = graph.node_index("0,0").unwrap();
    let target = graph.node_index("9,0").unwrap();

    let result = Dijkstra::new().compute_shortest_paths(&graph, source).unwrap();
    let path = get_path(&result, target).expect("path around the wall");

    for vertex in &path {
        let id = graph.node_id(*vertex).unwrap();
        assert!(!wall.iter().any(|&(x, y)| cell(x, y) == id), "path crosses the wall at {}", id);
    }
    assert!(path.iter().any(|&v| graph.node_id(v).unwrap().ends_with(",8") || graph.node_id(v).unwrap().ends_with(",9")));
    assert_eq!(result.distance(target), Some(path_cost(&graph, &path)));

    // Blocked cells have no incoming edges at all
    let blocked = graph.node_index("5,3").unwrap();
    assert_eq!(result.distance(blocked), None);
    assert_eq!(get_path(&result, blocked), None);
}

#[test]
fn test_worked_example_prefers_cheaper_three_hop_route() {
    let mut graph: G = DirectedGraph::new();
    for (a, b, w) in [("A", "B", 2.0), ("A", "C", 4.0), ("B", "C", 1.0), ("B", "D", 7.0), ("C", "D", 3.0)] {
        graph.add_edge(a, b, OrderedFloat(w)).unwrap();
        graph.add_edge(b, a, OrderedFloat(w)).unwrap();
    }
    let a = graph.node_index("A").unwrap();
    let d = graph.node_index("D").unwrap();

    let (distance, path) = Dijkstra::new().shortest_path(&graph, a, d).unwrap();
    assert_eq!(distance, Some(OrderedFloat(6.0)));
    assert_eq!(graph.path_ids(&path).unwrap(), vec!["A", "B", "C", "D"]);
}

#[test]
fn test_stale_queue_entries_are_skipped() {
    // C is first queued at 10 via the direct edge, then improved to 2 via B
    let mut graph: G = DirectedGraph::new();
    graph.add_edge("A", "C", OrderedFloat(10.0)).unwrap();
    graph.add_edge("A", "B", OrderedFloat(1.0)).unwrap();
    graph.add_edge("B", "C", OrderedFloat(1.0)).unwrap();
    graph.add_edge("C", "D", OrderedFloat(1.0)).unwrap();

    let a = graph.node_index("A").unwrap();
    let result = Dijkstra::new().compute_shortest_paths(&graph, a).unwrap();
    let c = graph.node_index("C").unwrap();
    let d = graph.node_index("D").unwrap();
    assert_eq!(result.distance(c), Some(OrderedFloat(2.0)));
    assert_eq!(result.distance(d), Some(OrderedFloat(3.0)));
    assert_eq!(graph.path_ids(&get_path(&result, d).unwrap()).unwrap(), vec!["A", "B", "C", "D"]);
}

#[test]
fn test_equal_cost_paths_resolve_the_same_way_every_run() {
    // Two routes of cost 2 from S to T
    let mut graph: G = DirectedGraph::new();
    graph.add_edge("S", "L", OrderedFloat(1.0)).unwrap();
    graph.add_edge("S", "R", OrderedFloat(1.0)).unwrap();
    graph.add_edge("L", "T", OrderedFloat(1.0)).unwrap();
    graph.add_edge("R", "T", OrderedFloat(1.0)).unwrap();
    let s = graph.node_index("S").unwrap();
    let t = graph.node_index("T").unwrap();

    let first = Dijkstra::new().compute_shortest_paths(&graph, s).unwrap();
    for _ in 0..20 {
        let again = Dijkstra::new().compute_shortest_paths(&graph, s).unwrap();
        assert_eq!(again, first);
    }
    // L was queued before R, so it settles first and claims T
    assert_eq!(graph.path_ids(&get_path(&first, t).unwrap()).unwrap(), vec!["S", "L", "T"]);
}

#[test]
fn test_early_exit_matches_full_run() {
    for seed in 0..10 {
        let graph = generate_random_graph(60, 2.5, true, seed).unwrap();
        let dijkstra = Dijkstra::new();
        for source in (0..graph.vertex_count()).step_by(7) {
            let full = dijkstra.compute_shortest_paths(&graph, source).unwrap();
            for target in 0..graph.vertex_count() {
                let (distance, path) = dijkstra.shortest_path(&graph, source, target).unwrap();
                assert_eq!(distance, full.distance(target), "seed {} {}->{}", seed, source, target);
                assert_eq!(path, get_path(&full, target).unwrap_or_default());
            }
        }
    }
}

#[test]
fn test_distances_and_paths_never_disagree() {
    for seed in 0..10 {
        let graph = generate_random_graph(40, 1.2, false, seed).unwrap();
        for source in 0..graph.vertex_count() {
            let result = Dijkstra::new().compute_shortest_paths(&graph, source).unwrap();
            assert_eq!(result.distances.len(), graph.vertex_count());
            for target in 0..graph.vertex_count() {
                let path = reconstruct_path(&result.predecessors, source, target);
                match result.distance(target) {
                    Some(distance) => {
                        assert_eq!(path.first(), Some(&source));
                        assert_eq!(path.last(), Some(&target));
                        assert_eq!(path_cost(&graph, &path), distance);
                    }
                    None => assert!(path.is_empty()),
                }
            }
        }
    }
}

#[test]
fn test_reconstruct_path_edge_cases() {
    // 0 -> 1 -> 2, 3 unreachable
    let predecessors = vec![None, Some(0), Some(1), None];

    assert_eq!(reconstruct_path(&predecessors, 0, 2), vec![0, 1, 2]);
    assert_eq!(reconstruct_path(&predecessors, 0, 0), vec![0]);
    assert!(reconstruct_path(&predecessors, 0, 3).is_empty());
    assert!(reconstruct_path(&predecessors, 0, 9).is_empty());

    // A chain that loops without reaching the source
    let looping = vec![None, Some(2), Some(1)];
    assert!(reconstruct_path(&looping, 0, 1).is_empty());
}

#[test]
fn test_unknown_source_is_rejected() {
    let mut graph: G = DirectedGraph::new();
    graph.add_node("only").unwrap();

    assert!(matches!(
        Dijkstra::new().compute_shortest_paths(&graph, 5),
        Err(Error::SourceNotFound)
    ));
    assert!(matches!(
        Dijkstra::new().shortest_path(&graph, 0, 5),
        Err(Error::InvalidVertex(5))
    ));
}

#[test]
fn test_raised_cancel_flag_abandons_search() {
    let mut graph: G = DirectedGraph::new();
    for i in 0..1_000 {
        graph
            .add_edge(&i.to_string(), &(i + 1).to_string(), OrderedFloat(1.0))
            .unwrap();
    }
    let (first, last) = (graph.node_index("0").unwrap(), graph.node_index("1000").unwrap());

    let cancel = CancelFlag::new();
    let dijkstra = Dijkstra::new().with_cancel_flag(cancel.clone());
    let (distance, _) = dijkstra.shortest_path(&graph, first, last).unwrap();
    assert_eq!(distance, Some(OrderedFloat(1_000.0)));

    cancel.cancel();
    assert!(matches!(
        dijkstra.compute_shortest_paths(&graph, first),
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        dijkstra.shortest_path(&graph, first, last),
        Err(Error::Cancelled)
    ));
}
