//! Second elimination pass: make every three-edge window optimal.
//!
//! If the direct jump across a short window strictly outweighs the edges
//! inside it, the interior points can never appear in an optimal subsequence
//! and are excised on the spot. The merging stage relies on this
//! postcondition when it seeds its initial intervals.

use crate::chain::Chain;
use crate::utils::edge_weight;

const WINDOW_EDGES: usize = 3;

/// Slide a three-edge window along the chain, replacing the windowed edges
/// by the direct jump wherever the jump strictly wins.
///
/// On a tie (`windowed >= jump`) the interior points stay. After an
/// excision the window is rebuilt around the new edge by backtracking, since
/// windows further left may have stopped being optimal; when node 0 blocks
/// the backtrack the window extends forward instead.
pub fn collapse_short_windows(x: &[f64], p: f64, chain: &mut Chain) {
    let sentinel = chain.sentinel();
    let mut begin = 0usize;
    let mut end = 0usize;
    let mut windowed = 0.0f64;

    for _ in 0..WINDOW_EDGES {
        end = chain.next(end);
        if end == sentinel {
            return; // chain shorter than one full window
        }
        windowed += chain.weight(end);
    }

    loop {
        let jump = edge_weight(x[begin], x[end], p);
        if windowed >= jump {
            // interior points are significant; slide the window one edge
            end = chain.next(end);
            if end == sentinel {
                return;
            }
            begin = chain.next(begin);
            windowed -= chain.weight(begin);
            windowed += chain.weight(end);
        } else {
            chain.join(begin, end, jump);
            begin = end;
            windowed = 0.0;
            for _ in 0..WINDOW_EDGES {
                if begin > 0 {
                    windowed += chain.weight(begin);
                    begin = chain.prev(begin);
                } else {
                    end = chain.next(end);
                    if end == sentinel {
                        return;
                    }
                    windowed += chain.weight(end);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::collapse_short_windows;
    use crate::extrema::seed_extrema;

    #[test]
    fn excises_a_dominated_window() {
        // |9 - 0|^2 = 81 beats 25 + 1 + 25, so the two interior extrema go.
        let x = [0.0, 5.0, 4.0, 9.0];
        let mut chain = seed_extrema(&x, 2.0);
        collapse_short_windows(&x, 2.0, &mut chain);
        assert_eq!(chain.nodes().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(chain.total_weight(), 81.0);
    }

    #[test]
    fn keeps_interior_points_on_a_tie_or_loss() {
        // At p = 1 the windowed sum 5 + 1 + 5 dominates the jump of 9.
        let x = [0.0, 5.0, 4.0, 9.0];
        let mut chain = seed_extrema(&x, 1.0);
        collapse_short_windows(&x, 1.0, &mut chain);
        assert_eq!(chain.nodes().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(chain.total_weight(), 11.0);
    }

    #[test]
    fn backtracks_into_a_second_excision() {
        // The first excision (0..3) re-exposes a window that a later, larger
        // jump also dominates; the rebuilt window must catch it.
        let x = [0.0, 5.0, 4.0, 9.0, 8.0, 20.0];
        let mut chain = seed_extrema(&x, 2.0);
        collapse_short_windows(&x, 2.0, &mut chain);
        assert_eq!(chain.nodes().collect::<Vec<_>>(), vec![0, 5]);
        assert_eq!(chain.total_weight(), 400.0);
    }

    #[test]
    fn short_chains_pass_through_untouched() {
        let x = [1.0, 9.0, 2.0];
        let mut chain = seed_extrema(&x, 2.0);
        collapse_short_windows(&x, 2.0, &mut chain);
        assert_eq!(chain.nodes().collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
