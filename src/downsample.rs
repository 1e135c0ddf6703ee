//! Weighted or uniform random sampling without replacement, seeded for
//! reproducibility (spec.md §4.8).

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::error::{BlockifyError, Result};
use crate::event::Event;

/// Sample `n` of `rows` without replacement. If `naive`, every row is
/// equiprobable; otherwise weights are column-4 (`Event::weight`).
/// Seeded when `seed` is given for bit-identical reproducibility; rows
/// are returned in ascending original order, never sampled order.
pub fn downsample(rows: &[Event], n: usize, seed: Option<u64>, naive: bool) -> Result<Vec<Event>> {
    if n > rows.len() {
        return Err(BlockifyError::invalid_argument(
            "cannot sample more rows than the table contains",
        ));
    }

    let mut rng = match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_entropy(),
    };

    let mut indices: Vec<usize> = if naive {
        index::sample(&mut rng, rows.len(), n).into_vec()
    } else {
        weighted_sample(&mut rng, rows, n)?
    };

    indices.sort_unstable();
    Ok(indices.into_iter().map(|i| rows[i].clone()).collect())
}

/// Repeated weighted draw-without-replacement: pick one index from the
/// remaining pool proportional to its weight, remove it, repeat. O(n*k)
/// but downsampling is a peripheral utility (spec.md §1), not a
/// performance-critical path.
fn weighted_sample(rng: &mut SmallRng, rows: &[Event], n: usize) -> Result<Vec<usize>> {
    let mut remaining: Vec<usize> = (0..rows.len()).collect();
    let mut chosen = Vec::with_capacity(n);
    for _ in 0..n {
        let weights: Vec<f64> = remaining.iter().map(|&i| rows[i].weight.max(0.0)).collect();
        let dist = WeightedIndex::new(&weights).map_err(|_| {
            BlockifyError::invalid_argument("column-4 weights must sum to a positive value")
        })?;
        let pick = dist.sample(rng);
        chosen.push(remaining.remove(pick));
    }
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted_rows() -> Vec<Event> {
        vec![
            Event::new("chr1", 0, 1, 1.0),
            Event::new("chr1", 1, 2, 5.0),
            Event::new("chr1", 2, 3, 1.0),
            Event::new("chr1", 3, 4, 10.0),
            Event::new("chr1", 4, 5, 1.0),
        ]
    }

    #[test]
    fn test_rejects_n_greater_than_row_count() {
        let rows = weighted_rows();
        assert!(downsample(&rows, rows.len() + 1, Some(0), false).is_err());
    }

    #[test]
    fn test_seeded_reproducibility_weighted() {
        let rows = weighted_rows();
        let a = downsample(&rows, 2, Some(42), false).unwrap();
        let b = downsample(&rows, 2, Some(42), false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeded_reproducibility_naive() {
        let rows = weighted_rows();
        let a = downsample(&rows, 3, Some(7), true).unwrap();
        let b = downsample(&rows, 3, Some(7), true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_result_preserves_ascending_original_order() {
        let rows = weighted_rows();
        let result = downsample(&rows, 4, Some(1), false).unwrap();
        let mut sorted = result.clone();
        sorted.sort_by_key(|e| e.start);
        assert_eq!(result, sorted);
    }

    #[test]
    fn test_full_sample_returns_every_row_in_order() {
        let rows = weighted_rows();
        let result = downsample(&rows, rows.len(), Some(3), false).unwrap();
        assert_eq!(result, rows);
    }
}
