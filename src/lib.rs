//! Exact p-variation of real-valued sequences.
//!
//! For a sequence `x[0..n]` and an exponent `p >= 1`, the p-variation is
//! the supremum of `sum |x[i_k] - x[i_{k-1}]|^p` over all increasing index
//! subsequences. It is a standard roughness measure for sample paths; at
//! `p = 1` it coincides with the total variation.
//!
//! ## Core idea
//! The supremum over exponentially many subsequences is computed by
//! *eliminating* points that provably cannot appear in an optimal one:
//! 1. Interior points of monotone runs go first (only local extrema matter).
//! 2. Short windows are checked directly and collapsed when a single jump
//!    beats them.
//! 3. Adjacent optimal intervals are merged pairwise, with running-extremum
//!    candidates bounding where a longer jump could still win.
//! 4. One walk over the surviving chain sums the edge weights.
//!
//! The survivors form an optimal partition, so the exact value and the
//! partition realizing it come out of the same run.
//!
//! ## Quick start
//! ```
//! let x = [1.0, 3.0, 0.0, 4.0];
//! let value = pvar::pvar(&x, 2.0);
//! assert_eq!(value, 4.0 + 9.0 + 16.0);
//! ```
//!
//! For the optimal partition, or to tune the merge schedule, drive the
//! [`PvarEngine`] directly; `pvar_many` fans independent sequences out to a
//! rayon pool when the `parallel` feature is enabled.

pub mod builder;
pub mod chain;
pub mod engine;
pub mod extrema;
pub mod merge;
pub mod utils;
pub mod window;

pub use crate::builder::PvarEngineBuilder;
pub use crate::chain::Chain;
pub use crate::engine::pvar;
#[cfg(feature = "parallel")]
pub use crate::engine::pvar_many;
pub use crate::engine::PvarEngine;
pub use crate::merge::DEFAULT_SEGMENT_LEN;
