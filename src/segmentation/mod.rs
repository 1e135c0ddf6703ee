//! Bayesian-blocks change-point search: Optimal Partitioning (OP) and
//! Pruned Exact Linear Time (PELT) over a chromosome's cell grid.

mod op;
mod pelt;

use crate::event::CellGrid;
use crate::prior::Prior;

pub use op::OptimalPartitioning;
pub use pelt::Pelt;

/// Result of running a segmentation engine over one chromosome's cell
/// grid: the change-point cell indices (`0 = tau_0 < ... < tau_m = n`)
/// and the best total fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResult {
    pub change_points: Vec<usize>,
    pub best_fitness: f64,
}

/// A change-point search strategy over a fixed cell grid and prior. Both
/// `OptimalPartitioning` and `Pelt` implement the same recurrence
/// (spec.md §4.3/§4.4); they must agree on `change_points` for identical
/// inputs.
pub trait Segmenter {
    fn segment(&self, grid: &CellGrid, gamma: f64) -> EngineResult;
}

/// Selects between the two engines, matching the CLI's `--method` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Op,
    Pelt,
}

impl Method {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OP" => Some(Method::Op),
            "PELT" => Some(Method::Pelt),
            _ => None,
        }
    }
}

/// The outcome of segmenting a single chromosome: boundaries in original
/// coordinate space (one more than the block count), the prior used, the
/// best fitness, and the block count.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromSegmentation {
    pub boundaries: Vec<i64>,
    pub gamma: f64,
    pub best_fitness: f64,
    pub n_blocks: usize,
}

/// Segment one chromosome's midpoint coordinates, returning `None` when
/// the chromosome is degenerate (fewer than two distinct coordinates, or
/// the engine collapses to a single boundary) per spec.md §4.5 step 6.
pub fn segment_chromosome(
    coordinates: &[i64],
    prior: &Prior,
    method: Method,
) -> Option<ChromSegmentation> {
    let grid = CellGrid::build(coordinates)?;
    let gamma = prior.gamma(grid.len());

    let result = match method {
        Method::Op => OptimalPartitioning.segment(&grid, gamma),
        Method::Pelt => Pelt.segment(&grid, gamma),
    };

    if result.change_points.len() < 2 {
        return None;
    }

    let boundaries: Vec<i64> = result
        .change_points
        .iter()
        .map(|&idx| grid.boundary_coordinate(idx))
        .collect();

    Some(ChromSegmentation {
        n_blocks: boundaries.len() - 1,
        boundaries,
        gamma,
        best_fitness: result.best_fitness,
    })
}
