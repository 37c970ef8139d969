//! Third elimination pass: pairwise merging of optimal intervals.
//!
//! After the earlier passes every short stretch of the chain is locally
//! optimal. This stage treats the chain as a row of optimal intervals and
//! repeatedly fuses adjacent pairs: a merge either proves that no cross-
//! boundary jump can beat the points already kept, or it finds the single
//! best jump and excises everything between its endpoints. Rounds halve the
//! interval count, so the whole schedule costs a logarithmic number of
//! passes over the boundary list.

use crate::chain::Chain;
use crate::utils::edge_weight;

/// Edges per optimal interval when merging starts.
///
/// [`collapse_short_windows`](crate::window::collapse_short_windows)
/// guarantees optimality for up to three edges, so four-edge segments are
/// the first size that still needs proving. This is also the largest seed
/// stride [`Merger::merge_rounds`] accepts: configured strides above it are
/// capped, since a wider elementary interval is not known to be optimal and
/// its interior jumps would never be examined.
pub const DEFAULT_SEGMENT_LEN: usize = 4;

/// Join candidate harvested on one side of a merge: a running extremum
/// together with the summed edge weight between it and the shared boundary.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    node: usize,
    cost: f64,
}

/// Pairwise interval merger that owns its candidate scratch buffers.
///
/// The buffers are cleared, never dropped, between merges, so a full run
/// touches the allocator only while they first grow.
pub struct Merger {
    left_mins: Vec<Candidate>,
    left_maxs: Vec<Candidate>,
    right_mins: Vec<Candidate>,
    right_maxs: Vec<Candidate>,
}

impl Merger {
    pub fn new() -> Self {
        Self {
            left_mins: Vec::new(),
            left_maxs: Vec::new(),
            right_mins: Vec::new(),
            right_maxs: Vec::new(),
        }
    }

    /// Fuse optimal intervals until a single one spans the whole chain.
    ///
    /// Boundaries are seeded every `segment_len` surviving edges (plus the
    /// terminal node), then each round merges adjacent interval pairs and
    /// drops the shared boundaries, shrinking the list roughly by half in
    /// place. Strides above [`DEFAULT_SEGMENT_LEN`] are capped: merging only
    /// proves intervals optimal pairwise, so every seed interval must already
    /// be within the size the short-window pass certified.
    pub fn merge_rounds(&mut self, x: &[f64], p: f64, chain: &mut Chain, segment_len: usize) {
        debug_assert!(segment_len >= 1);
        let stride = segment_len.min(DEFAULT_SEGMENT_LEN);
        let sentinel = chain.sentinel();
        if sentinel == 0 {
            return;
        }

        let mut bounds: Vec<usize> = Vec::new();
        let mut node = 0usize;
        let mut count = 0usize;
        while node < sentinel {
            if count % stride == 0 {
                bounds.push(node);
            }
            count += 1;
            node = chain.next(node);
        }
        // The terminal node bounds the last interval even when the stride
        // does not land on it.
        let last = sentinel - 1;
        if bounds.last() != Some(&last) {
            bounds.push(last);
        }

        let mut len = bounds.len();
        while len > 2 {
            #[cfg(feature = "tracing")]
            let round_span = tracing::trace_span!("merge_round", boundaries = len);
            #[cfg(feature = "tracing")]
            let _round = round_span.enter();

            // Compact survivors in place: reads at k stay ahead of writes.
            let mut write = 1usize;
            let mut k = 0usize;
            while k + 2 < len {
                self.merge_pair(x, p, chain, bounds[k], bounds[k + 1], bounds[k + 2]);
                bounds[write] = bounds[k + 2];
                write += 1;
                k += 2;
            }
            if k + 1 < len {
                // odd tail interval carries over to the next round
                bounds[write] = bounds[k + 1];
                write += 1;
            }
            len = write;
        }
    }

    /// Merge the adjacent optimal intervals `[a, v]` and `[v, b]`.
    ///
    /// Walking outward from `v` collects running extrema as join candidates;
    /// only a left minimum paired with a right maximum (or vice versa) can
    /// beat the edges it would replace. If the best such pair has strictly
    /// positive balance, everything between the pair is excised.
    fn merge_pair(&mut self, x: &[f64], p: f64, chain: &mut Chain, a: usize, v: usize, b: usize) {
        if a == v || v == b {
            return;
        }
        debug_assert!(a < v && v < b);

        self.left_mins.clear();
        self.left_maxs.clear();
        self.right_mins.clear();
        self.right_maxs.clear();

        // [a, v): accumulate the edge cost before stepping left.
        let mut cost = 0.0f64;
        let mut node = v;
        let (mut lo, mut hi) = (x[v], x[v]);
        while node != a {
            cost += chain.weight(node);
            node = chain.prev(node);
            if x[node] > hi {
                hi = x[node];
                self.left_maxs.push(Candidate { node, cost });
            }
            if x[node] < lo {
                lo = x[node];
                self.left_mins.push(Candidate { node, cost });
            }
        }

        // (v, b]: step right before accumulating the edge cost.
        let mut cost = 0.0f64;
        let mut node = v;
        let (mut lo, mut hi) = (x[v], x[v]);
        while node != b {
            node = chain.next(node);
            cost += chain.weight(node);
            if x[node] > hi {
                hi = x[node];
                self.right_maxs.push(Candidate { node, cost });
            }
            if x[node] < lo {
                lo = x[node];
                self.right_mins.push(Candidate { node, cost });
            }
        }

        let mut best = Join::default();
        sweep(x, p, &self.left_mins, &self.right_maxs, &mut best);
        sweep(x, p, &self.left_maxs, &self.right_mins, &mut best);

        if best.balance > 0.0 {
            chain.join(best.left, best.right, best.jump);
        }
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}

/// Best join found so far across both candidate cross-products.
#[derive(Debug, Default, Clone, Copy)]
struct Join {
    balance: f64,
    jump: f64,
    left: usize,
    right: usize,
}

/// Scan one cross-product of candidate lists for the join with the best
/// balance (jump weight minus the weight it erases).
///
/// Both lists are ordered outward from the boundary, with costs growing and
/// extremum gaps shrinking, so `cursor` only ever moves forward across the
/// outer loop.
fn sweep(x: &[f64], p: f64, left: &[Candidate], right: &[Candidate], best: &mut Join) {
    let mut cursor = 0usize;
    for l in left {
        for (j, r) in right.iter().enumerate().skip(cursor) {
            let jump = edge_weight(x[l.node], x[r.node], p);
            let balance = jump - l.cost - r.cost;
            if balance > best.balance {
                *best = Join {
                    balance,
                    jump,
                    left: l.node,
                    right: r.node,
                };
                cursor = j;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Merger, DEFAULT_SEGMENT_LEN};
    use crate::extrema::seed_extrema;
    use crate::window::collapse_short_windows;

    fn reduce(x: &[f64], p: f64, segment_len: usize) -> (f64, Vec<usize>) {
        let mut chain = seed_extrema(x, p);
        collapse_short_windows(x, p, &mut chain);
        let mut merger = Merger::new();
        merger.merge_rounds(x, p, &mut chain, segment_len);
        (chain.total_weight(), chain.nodes().collect())
    }

    #[test]
    fn finds_a_jump_spanning_many_short_intervals() {
        // Small oscillations around a big swell: at p = 3 the direct jump
        // from the global minimum to the global maximum dominates, and only
        // the merge stage looks far enough to see it.
        let x = [
            5.0, 0.0, 4.0, 1.0, 5.0, 2.0, 6.0, 3.0, 7.0, 4.0, 8.0, 5.0, 9.0, 6.0, 10.0, 7.0,
        ];
        let p = 3.0;
        let (value, nodes) = reduce(&x, p, DEFAULT_SEGMENT_LEN);

        // Quadratic reference: best sum over subsequences ending at j.
        let n = x.len();
        let mut dp = vec![0.0f64; n];
        for j in 1..n {
            let mut bestj = 0.0f64;
            for i in 0..j {
                let cand = dp[i] + (x[j] - x[i]).abs().powf(p);
                if cand > bestj {
                    bestj = cand;
                }
            }
            dp[j] = bestj;
        }
        assert!((value - dp[n - 1]).abs() <= 1e-9 * dp[n - 1]);
        assert!(nodes.contains(&1), "global minimum must survive merging");
        assert_eq!(*nodes.first().unwrap(), 0);
        assert_eq!(*nodes.last().unwrap(), n - 1);
    }

    #[test]
    fn segment_length_never_changes_the_value() {
        let x = [
            0.0, 3.0, -1.0, 4.0, 2.0, 8.0, -3.0, 1.0, 0.5, 6.0, -2.0, 2.5, 7.0, -4.0, 3.0,
        ];
        let baseline = reduce(&x, 2.5, DEFAULT_SEGMENT_LEN).0;
        for segment_len in [1usize, 2, 3, 5, 8, 64] {
            let (value, _) = reduce(&x, 2.5, segment_len);
            assert!(
                (value - baseline).abs() <= 1e-9 * baseline.max(1.0),
                "segment_len={segment_len}: {value} != {baseline}"
            );
        }
    }

    #[test]
    fn oversized_segment_lengths_still_find_long_jumps() {
        // Five surviving edges summing to 19, beaten by the direct
        // |3 - 0|^3 = 27 jump. A stride past the surviving-edge count would
        // seed only the two outer boundaries and never search across them;
        // the cap keeps the jump reachable.
        let x = [3.0, 1.0, 2.0, 1.0, 2.0, 0.0];
        for segment_len in [5usize, 6, 9, 64] {
            let (value, nodes) = reduce(&x, 3.0, segment_len);
            assert_eq!(value, 27.0, "segment_len={segment_len}");
            assert_eq!(nodes, vec![0, 5]);
        }
    }

    #[test]
    fn already_optimal_chain_is_left_alone() {
        // Total variation: every extremum stays at p = 1.
        let x = [0.0, 2.0, -1.0, 3.0, 0.0, 4.0, 1.0, 5.0];
        let (value, nodes) = reduce(&x, 1.0, DEFAULT_SEGMENT_LEN);
        assert_eq!(nodes, (0..x.len()).collect::<Vec<_>>());
        assert_eq!(value, 2.0 + 3.0 + 4.0 + 3.0 + 4.0 + 3.0 + 4.0);
    }
}
