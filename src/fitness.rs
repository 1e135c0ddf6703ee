//! The Bayesian-blocks "events" fitness function.

/// Block fitness `f(N, T) = N * ln(N / T)` for a block with event count
/// `N` and width `T`, with the convention `f(0, T) = 0` (an empty block
/// contributes nothing to the total log-likelihood). `T` is guaranteed
/// non-negative by the cell-grid invariant; fitness is undefined (and
/// never called) for `T <= 0` when `N > 0`.
#[inline]
pub fn block_fitness(n: f64, t: f64) -> f64 {
    if n > 0.0 && t > 0.0 {
        n * (n.ln() - t.ln())
    } else {
        0.0
    }
}
