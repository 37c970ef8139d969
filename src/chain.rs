//! Admissible-point chain: a doubly linked list over sequence indices.
//!
//! The pipeline never moves sample values around. It keeps one arena of
//! [`Link`] slots, addressed by the original sequence index, and threads a
//! doubly linked list through the slots that are still admissible. Dropping
//! a point is two pointer writes plus one cached edge weight; nothing is
//! freed and nothing is ever re-inserted.
//!
//! A single sentinel value equal to the sequence length marks "no further
//! node". Only the forward direction needs it: backward walks stop at node 0,
//! which links to itself as its own predecessor.

/// One arena slot: neighbor indices plus the weight of the edge arriving
/// from `prev`.
#[derive(Debug, Clone, Copy)]
struct Link {
    prev: usize,
    next: usize,
    /// `|x[i] - x[prev]|^p` for the edge ending at this node; 0 at node 0.
    weight: f64,
}

/// Doubly linked chain over a shrinking subset of `0..n`, stored as a
/// fixed-size arena so membership updates never allocate.
///
/// Freshly created chains have every slot detached (`next` pointing at the
/// sentinel); [`join`](Chain::join) wires nodes together and is also how
/// interior points are excised later. See [`crate::extrema::seed_extrema`]
/// for the function that populates a chain.
#[derive(Debug, Clone)]
pub struct Chain {
    links: Vec<Link>,
}

impl Chain {
    /// Arena for a sequence of length `n`, with all slots detached.
    pub(crate) fn new(n: usize) -> Self {
        let links = (0..n)
            .map(|_| Link {
                prev: 0,
                next: n,
                weight: 0.0,
            })
            .collect();
        Self { links }
    }

    /// Index value that terminates forward traversal.
    #[inline]
    pub fn sentinel(&self) -> usize {
        self.links.len()
    }

    /// Successor of node `i`, or the sentinel past the last node.
    #[inline]
    pub fn next(&self, i: usize) -> usize {
        self.links[i].next
    }

    /// Predecessor of node `i`; node 0 is its own predecessor.
    #[inline]
    pub fn prev(&self, i: usize) -> usize {
        self.links[i].prev
    }

    /// Cached weight of the edge from `prev(i)` to `i`.
    #[inline]
    pub fn weight(&self, i: usize) -> f64 {
        self.links[i].weight
    }

    /// Make `b` the direct successor of `a` with edge weight `w`.
    ///
    /// Any nodes previously sitting between the two leave the chain. Their
    /// slots keep stale pointers, which is fine: traversal can no longer
    /// reach them.
    pub(crate) fn join(&mut self, a: usize, b: usize, w: f64) {
        debug_assert!(a < b, "chain edges must run forward: {a} !< {b}");
        debug_assert!(b < self.links.len());
        self.links[a].next = b;
        self.links[b].prev = a;
        self.links[b].weight = w;
    }

    /// Surviving node indices in increasing order, starting at node 0.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            chain: self,
            cursor: 0,
        }
    }

    /// Sum of all surviving edge weights. Walking from node 0 and adding the
    /// per-node `weight` counts each edge exactly once (node 0 contributes 0).
    pub fn total_weight(&self) -> f64 {
        self.nodes().map(|i| self.links[i].weight).sum()
    }
}

/// Forward iterator over surviving node indices.
pub struct Nodes<'a> {
    chain: &'a Chain,
    cursor: usize,
}

impl Iterator for Nodes<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cursor >= self.chain.links.len() {
            return None;
        }
        let current = self.cursor;
        self.cursor = self.chain.links[current].next;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::Chain;

    #[test]
    fn fresh_chain_holds_only_node_zero() {
        let chain = Chain::new(5);
        assert_eq!(chain.sentinel(), 5);
        assert_eq!(chain.nodes().collect::<Vec<_>>(), vec![0]);
        assert_eq!(chain.total_weight(), 0.0);
    }

    #[test]
    fn empty_chain_yields_nothing() {
        let chain = Chain::new(0);
        assert_eq!(chain.nodes().count(), 0);
        assert_eq!(chain.total_weight(), 0.0);
    }

    #[test]
    fn join_wires_and_excises() {
        let mut chain = Chain::new(6);
        chain.join(0, 2, 1.0);
        chain.join(2, 4, 2.0);
        chain.join(4, 5, 4.0);
        assert_eq!(chain.nodes().collect::<Vec<_>>(), vec![0, 2, 4, 5]);
        assert_eq!(chain.total_weight(), 7.0);

        // Bridging across node 4 drops it from traversal.
        chain.join(2, 5, 8.0);
        assert_eq!(chain.nodes().collect::<Vec<_>>(), vec![0, 2, 5]);
        assert_eq!(chain.prev(5), 2);
        assert_eq!(chain.total_weight(), 9.0);
    }
}
