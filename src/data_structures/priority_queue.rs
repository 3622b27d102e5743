use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::Debug;

/// A min-priority queue over `BinaryHeap` for shortest path algorithms
///
/// Entries with equal priority pop in insertion order, which keeps Dijkstra's
/// choice among equal-cost paths reproducible.
#[derive(Debug)]
pub struct BinaryHeapWrapper<V, P>
where
    V: Copy + Eq + Debug + Ord,
    P: PartialOrd + Copy + Debug + Ord,
{
    /// The underlying binary heap, keyed by (priority, insertion sequence)
    heap: BinaryHeap<Reverse<(P, u64, V)>>,

    /// Sequence number handed to the next pushed entry
    next_seq: u64,
}

impl<V, P> Default for BinaryHeapWrapper<V, P>
where
    V: Copy + Eq + Debug + Ord,
    P: PartialOrd + Copy + Debug + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, P> BinaryHeapWrapper<V, P>
where
    V: Copy + Eq + Debug + Ord,
    P: PartialOrd + Copy + Debug + Ord,
{
    /// Creates a new empty priority queue
    pub fn new() -> Self {
        BinaryHeapWrapper {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Returns true if the priority queue is empty
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the number of elements in the priority queue
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Pushes an element with the given priority into the priority queue
    pub fn push(&mut self, vertex: V, priority: P) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((priority, seq, vertex)));
    }

    /// Removes the element with the lowest priority
    pub fn pop(&mut self) -> Option<(V, P)> {
        self.heap
            .pop()
            .map(|Reverse((priority, _, vertex))| (vertex, priority))
    }

    /// Returns the element with the lowest priority without removing it
    pub fn peek(&self) -> Option<(V, P)> {
        self.heap
            .peek()
            .map(|Reverse((priority, _, vertex))| (*vertex, *priority))
    }
}

#[cfg(test)]
mod tests {
    use super::BinaryHeapWrapper;

    #[test]
    fn pops_lowest_priority_first() {
        let mut queue = BinaryHeapWrapper::new();
        queue.push(1usize, 5u32);
        queue.push(2, 1);
        queue.push(3, 3);

        assert_eq!(queue.peek(), Some((2, 1)));
        assert_eq!(queue.pop(), Some((2, 1)));
        assert_eq!(queue.pop(), Some((3, 3)));
        assert_eq!(queue.pop(), Some((1, 5)));
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_priorities_pop_in_insertion_order() {
        let mut queue = BinaryHeapWrapper::new();
        queue.push(9usize, 2u32);
        queue.push(4, 2);
        queue.push(7, 2);

        assert_eq!(queue.len(), 3);
        let order: Vec<usize> = std::iter::from_fn(|| queue.pop().map(|(v, _)| v)).collect();
        assert_eq!(order, vec![9, 4, 7]);
    }
}
