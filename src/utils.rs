//! Small numeric helpers shared across the pipeline stages.

/// Weight of the direct edge between two sample values: `|a - b|^p`.
///
/// Every stage prices candidate edges through this single function, so the
/// value of an admissible chain is always a plain sum of `edge_weight` terms.
#[inline]
pub fn edge_weight(a: f64, b: f64, p: f64) -> f64 {
    (a - b).abs().powf(p)
}
