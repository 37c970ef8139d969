//! First elimination pass: reduce the sequence to its local extrema.
//!
//! An interior point of a monotone run can be dropped without lowering any
//! candidate sum: whichever subsequence used it does at least as well routed
//! through the run's endpoints. One linear scan therefore shrinks the input
//! to an alternating skeleton before the costlier stages run.

use crate::chain::Chain;
use crate::utils::edge_weight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    None,
    Rising,
    Falling,
}

/// Build the initial admissible chain for `x`: node 0, the terminal node,
/// and every interior direction reversal.
///
/// Flat steps neither record a point nor reset the trend, so a plateau
/// between two rises is dropped whole while a plateau at a turning point
/// keeps exactly one of its points. Inputs shorter than two points come back
/// as a chain holding at most node 0.
pub fn seed_extrema(x: &[f64], p: f64) -> Chain {
    let n = x.len();
    let mut chain = Chain::new(n);
    if n < 2 {
        return chain;
    }

    let mut last = 0usize;
    let mut trend = Trend::None;
    for i in 0..n {
        let record = if i + 1 == n {
            // the terminal point always stays
            true
        } else if x[i + 1] > x[i] {
            let turned = trend == Trend::Falling;
            trend = Trend::Rising;
            turned
        } else if x[i + 1] < x[i] {
            let turned = trend == Trend::Rising;
            trend = Trend::Falling;
            turned
        } else {
            false
        };
        if record {
            chain.join(last, i, edge_weight(x[i], x[last], p));
            last = i;
        }
    }
    chain
}
