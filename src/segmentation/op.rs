//! Optimal Partitioning: exact Θ(n²) change-point DP.

use super::{EngineResult, Segmenter};
use crate::event::CellGrid;
use crate::fitness::block_fitness;

/// Exact dynamic program over all `O(n)` predecessors at each step.
/// `best[k] = max_{0 <= r < k} best[r] + f(N(r,k], T(r,k]) - gamma`,
/// `best[0] = -gamma`; reconstructed via a `prev` back-pointer table.
pub struct OptimalPartitioning;

impl Segmenter for OptimalPartitioning {
    fn segment(&self, grid: &CellGrid, gamma: f64) -> EngineResult {
        let n = grid.len();
        let mut best = vec![f64::NEG_INFINITY; n + 1];
        let mut prev = vec![0usize; n + 1];
        best[0] = -gamma;

        for k in 1..=n {
            let mut best_val = f64::NEG_INFINITY;
            let mut best_r = 0usize;
            for r in 0..k {
                let count = grid.count_between(r, k);
                let width = grid.width_between(r, k);
                let candidate = best[r] + block_fitness(count, width) - gamma;
                if candidate > best_val {
                    best_val = candidate;
                    best_r = r;
                }
            }
            best[k] = best_val;
            prev[k] = best_r;
        }

        let mut change_points = Vec::new();
        let mut k = n;
        loop {
            change_points.push(k);
            if k == 0 {
                break;
            }
            k = prev[k];
        }
        change_points.reverse();

        EngineResult {
            change_points,
            best_fitness: best[n],
        }
    }
}
