//! Pipeline driver and public entry points.
//!
//! The computation runs in four passes over one shared chain:
//! 1. Reduce the sequence to its local extrema.
//! 2. Make every three-edge window optimal.
//! 3. Merge adjacent optimal intervals until one spans the chain.
//! 4. Walk the surviving edges once and sum their weights.
//!
//! Each pass only removes points, so the chain after pass 3 *is* the optimal
//! partition and its edge-weight sum is the p-variation.

use crate::chain::Chain;
use crate::extrema::seed_extrema;
use crate::merge::{Merger, DEFAULT_SEGMENT_LEN};
use crate::utils::edge_weight;
use crate::window::collapse_short_windows;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// p-variation engine for a single `(sequence, exponent)` instance.
///
/// Typical usage:
/// ```
/// use pvar::PvarEngine;
///
/// let x = [0.0, 1.0, 0.0, 1.0, 0.0];
/// let engine = PvarEngine::new(&x, 1.0);
/// let (value, partition) = engine.run();
/// assert_eq!(value, 4.0);
/// assert_eq!(partition, vec![0, 1, 2, 3, 4]);
/// ```
pub struct PvarEngine<'a> {
    x: &'a [f64],
    p: f64,
    segment_len: usize,
}

impl<'a> PvarEngine<'a> {
    /// Create a new engine with the default merge segment length.
    pub fn new(x: &'a [f64], p: f64) -> Self {
        Self::with_segment_len(x, p, DEFAULT_SEGMENT_LEN)
    }

    /// Create a new engine with an explicit merge segment length.
    ///
    /// The segment length only schedules how the merge rounds are seeded;
    /// any positive value yields the same variation. Strides above
    /// [`DEFAULT_SEGMENT_LEN`] are capped when the boundaries are laid out,
    /// since the passes before merging certify optimality only for short
    /// stretches.
    ///
    /// # Panics
    /// Panics if `segment_len == 0`.
    pub fn with_segment_len(x: &'a [f64], p: f64, segment_len: usize) -> Self {
        assert!(segment_len > 0, "segment_len must be positive");
        Self { x, p, segment_len }
    }

    /// The sequence under analysis.
    pub fn sequence(&self) -> &[f64] {
        self.x
    }

    /// The variation exponent.
    pub fn exponent(&self) -> f64 {
        self.p
    }

    /// Return the configured merge segment length.
    pub fn segment_len(&self) -> usize {
        self.segment_len
    }

    /// Run the pipeline, returning the p-variation together with an optimal
    /// partition (the surviving indices, in increasing order).
    ///
    /// A partition with the maximal sum is generally not unique; the one
    /// returned is the full set of points the elimination passes could not
    /// discard, so it always contains node 0 and the terminal node.
    pub fn run(&self) -> (f64, Vec<usize>) {
        match self.x.len() {
            0 => (0.0, Vec::new()),
            1 => (0.0, vec![0]),
            2 => (edge_weight(self.x[0], self.x[1], self.p), vec![0, 1]),
            _ => {
                let chain = self.reduce();
                (chain.total_weight(), chain.nodes().collect())
            }
        }
    }

    /// Run the pipeline and return only the p-variation.
    pub fn value(&self) -> f64 {
        if self.x.len() > 2 {
            self.reduce().total_weight()
        } else {
            self.run().0
        }
    }

    /// Elimination passes 1 through 3, shared by [`run`](Self::run) and
    /// [`value`](Self::value).
    fn reduce(&self) -> Chain {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("pvar_pipeline", len = self.x.len());
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mut chain = {
            #[cfg(feature = "tracing")]
            let span = tracing::trace_span!("seed_extrema");
            #[cfg(feature = "tracing")]
            let _enter = span.enter();
            seed_extrema(self.x, self.p)
        };

        {
            #[cfg(feature = "tracing")]
            let span = tracing::trace_span!("collapse_short_windows");
            #[cfg(feature = "tracing")]
            let _enter = span.enter();
            collapse_short_windows(self.x, self.p, &mut chain);
        }

        {
            #[cfg(feature = "tracing")]
            let span = tracing::trace_span!("merge_rounds", segment_len = self.segment_len);
            #[cfg(feature = "tracing")]
            let _enter = span.enter();
            let mut merger = Merger::new();
            merger.merge_rounds(self.x, self.p, &mut chain, self.segment_len);
        }

        chain
    }
}

/// Compute the p-variation of `x`,
/// `sup { sum |x[i_k] - x[i_{k-1}]|^p }` over increasing index subsequences.
///
/// Sequences with fewer than two points have variation 0; exactly two points
/// give `|x[0] - x[1]|^p`. The supremum interpretation requires `p >= 1`,
/// which is not validated here.
pub fn pvar(x: &[f64], p: f64) -> f64 {
    PvarEngine::new(x, p).value()
}

/// Compute the p-variation of many independent sequences on the rayon pool.
///
/// Results line up index-for-index with `sequences` and are bitwise equal to
/// serial [`pvar`] calls.
#[cfg(feature = "parallel")]
pub fn pvar_many<S>(sequences: &[S], p: f64) -> Vec<f64>
where
    S: AsRef<[f64]> + Sync,
{
    sequences
        .par_iter()
        .map(|s| pvar(s.as_ref(), p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{pvar, PvarEngine};

    #[test]
    fn trivial_lengths() {
        assert_eq!(pvar(&[], 2.0), 0.0);
        assert_eq!(pvar(&[3.5], 2.0), 0.0);
        assert_eq!(pvar(&[2.0, 5.0], 3.0), 27.0);
    }

    #[test]
    fn zigzag_total_variation() {
        assert_eq!(pvar(&[0.0, 1.0, 0.0], 1.0), 2.0);
        assert_eq!(pvar(&[0.0, 1.0, 0.0, 1.0, 0.0], 1.0), 4.0);
    }

    #[test]
    fn monotone_sequences_collapse_to_their_endpoints() {
        let (value, partition) = PvarEngine::new(&[1.0, 2.0, 3.0, 4.0, 5.0], 2.0).run();
        assert_eq!(value, 16.0);
        assert_eq!(partition, vec![0, 4]);
    }

    #[test]
    fn partition_weights_reproduce_the_value() {
        let x = [0.0, 10.0, 5.0, 6.0, 1.0, 11.0];
        let engine = PvarEngine::new(&x, 1.0);
        let (value, partition) = engine.run();
        assert_eq!(value, 31.0);
        let replayed: f64 = partition
            .windows(2)
            .map(|w| (x[w[1]] - x[w[0]]).abs())
            .sum();
        assert_eq!(replayed, value);
    }

    #[test]
    fn value_agrees_with_run() {
        let x = [0.3, -1.2, 4.0, 0.0, 2.5, 2.5, -3.0, 1.0];
        let engine = PvarEngine::new(&x, 2.2);
        assert_eq!(engine.value(), engine.run().0);
    }

    #[test]
    #[should_panic(expected = "segment_len must be positive")]
    fn zero_segment_len_is_rejected() {
        let _ = PvarEngine::with_segment_len(&[1.0, 2.0], 2.0, 0);
    }
}
