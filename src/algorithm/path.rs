/// Walks predecessor links from `target` back to `source` and returns the
/// vertices in source-to-target order.
///
/// Returns an empty path when the chain never reaches `source` (the target is
/// unreachable) or when the links loop. `source == target` yields `[source]`.
pub fn reconstruct_path(predecessors: &[Option<usize>], source: usize, target: usize) -> Vec<usize> {
    if source >= predecessors.len() || target >= predecessors.len() {
        return Vec::new();
    }

    let mut path = vec![target];
    let mut current = target;

    while current != source {
        // A simple path visits each vertex at most once
        if path.len() > predecessors.len() {
            return Vec::new();
        }
        match predecessors[current] {
            Some(pred) => {
                path.push(pred);
                current = pred;
            }
            None => return Vec::new(),
        }
    }

    path.reverse();
    path
}
