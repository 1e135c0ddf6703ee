//! Pruned Exact Linear Time (PELT): the same change-point recurrence as
//! Optimal Partitioning, with an admissible pruning of predecessor
//! candidates that makes the expected cost linear in `n` for data with
//! many true change points.

use super::{EngineResult, Segmenter};
use crate::event::CellGrid;
use crate::fitness::block_fitness;

pub struct Pelt;

impl Segmenter for Pelt {
    fn segment(&self, grid: &CellGrid, gamma: f64) -> EngineResult {
        let n = grid.len();
        let mut best = vec![f64::NEG_INFINITY; n + 1];
        let mut prev = vec![0usize; n + 1];
        best[0] = -gamma;

        // R_1 = {0}; grows by admitting k and shrinks by the pruning rule
        // `r survives iff best[r] + f(N(r,k], T(r,k]) >= best[k]` (spec.md §4.4).
        let mut candidates: Vec<usize> = vec![0];

        for k in 1..=n {
            let mut best_val = f64::NEG_INFINITY;
            let mut best_r = candidates[0];
            for &r in &candidates {
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

            candidates.retain(|&r| {
                let count = grid.count_between(r, k);
                let width = grid.width_between(r, k);
                best[r] + block_fitness(count, width) >= best[k]
            });
            candidates.push(k);
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

        // The sign convention differs: PELT's internal table is the same
        // maximization DP as OP's, but the reported fitness follows the
        // minimization-style convention some PELT implementations use
        // (`-fitness + gamma` per change point), so `fitness_OP ==
        // -fitness_PELT` holds for identical inputs (spec.md §4.4).
        EngineResult {
            change_points,
            best_fitness: -best[n],
        }
    }
}
