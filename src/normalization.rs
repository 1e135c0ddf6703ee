//! Library-size-scaled event-rate tracks over a set of regions
//! (bedGraph-style output).

use crate::error::{BlockifyError, Result};
use crate::event::Event;
use crate::interval::{count_overlaps, is_sorted, Interval};

/// One normalized region: coordinates plus the value column (count or rate).
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRegion {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub value: f64,
}

/// Normalize `regions` against `events`, scaling raw overlap counts by
/// `library_factor` and, if `length_factor` is given, further dividing by
/// the region's length-scaled width (spec.md §4.6).
///
/// Both `events` and `regions` must already be sorted by `(chrom, start)`;
/// `library_factor` must be positive, and `length_factor`, if present,
/// must be positive too.
pub fn normalize(
    events: &[Event],
    regions: &[Interval],
    library_factor: f64,
    length_factor: Option<f64>,
) -> Result<Vec<NormalizedRegion>> {
    let event_intervals: Vec<Interval> = events.iter().map(Event::interval).collect();
    if !is_sorted(&event_intervals) {
        return Err(BlockifyError::unsorted_input(
            "events must be sorted by (chrom, start)",
        ));
    }
    if !is_sorted(regions) {
        return Err(BlockifyError::unsorted_input(
            "regions must be sorted by (chrom, start)",
        ));
    }
    if library_factor <= 0.0 {
        return Err(BlockifyError::invalid_argument(
            "libraryFactor must be positive",
        ));
    }
    if let Some(l) = length_factor {
        if l <= 0.0 {
            return Err(BlockifyError::invalid_argument(
                "lengthFactor must be positive",
            ));
        }
    }

    let scaling_constant = events.len() as f64 / library_factor;
    let raw_counts = count_overlaps(regions, &event_intervals);

    let mut out = Vec::with_capacity(regions.len());
    for (region, &raw) in regions.iter().zip(raw_counts.iter()) {
        let norm_count = if scaling_constant > 0.0 {
            raw as f64 / scaling_constant
        } else {
            0.0
        };
        let value = match length_factor {
            None => norm_count,
            Some(l) => {
                let width = (region.end - region.start) as f64;
                norm_count / (width / l)
            }
        };
        out.push(NormalizedRegion {
            chrom: region.chrom.clone(),
            start: region.start,
            end: region.end,
            value,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(chrom: &str, coords: &[(i64, i64)]) -> Vec<Event> {
        coords
            .iter()
            .map(|&(s, e)| Event::new(chrom, s, e, 1.0))
            .collect()
    }

    #[test]
    fn test_normalized_count_no_length_factor() {
        let e = events("chr1", &[(0, 1), (1, 2), (5, 6), (5, 6)]);
        let regions = vec![Interval::new("chr1", 0, 3), Interval::new("chr1", 4, 7)];
        let result = normalize(&e, &regions, 1e6, None).unwrap();
        assert_eq!(result.len(), 2);
        let k = 4.0 / 1e6;
        assert!((result[0].value - 2.0 / k).abs() < 1e-9);
        assert!((result[1].value - 2.0 / k).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_rate_with_length_factor() {
        let e = events("chr1", &[(0, 1), (1, 2)]);
        let regions = vec![Interval::new("chr1", 0, 10)];
        let result = normalize(&e, &regions, 1e6, Some(1000.0)).unwrap();
        let k = 2.0 / 1e6;
        let norm_count = 2.0 / k;
        let expected = norm_count / (10.0 / 1000.0);
        assert!((result[0].value - expected).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip_raw_counts_sum_to_event_count() {
        let e = events("chr1", &[(0, 1), (2, 3), (4, 5), (6, 7)]);
        let regions = vec![
            Interval::new("chr1", 0, 2),
            Interval::new("chr1", 2, 4),
            Interval::new("chr1", 4, 8),
        ];
        let event_intervals: Vec<Interval> = e.iter().map(Event::interval).collect();
        let raw = count_overlaps(&regions, &event_intervals);
        assert_eq!(raw.iter().sum::<usize>(), e.len());
    }

    #[test]
    fn test_rejects_nonpositive_library_factor() {
        let e = events("chr1", &[(0, 1)]);
        let regions = vec![Interval::new("chr1", 0, 2)];
        assert!(normalize(&e, &regions, 0.0, None).is_err());
        assert!(normalize(&e, &regions, -1.0, None).is_err());
    }

    #[test]
    fn test_rejects_unsorted_regions() {
        let e = events("chr1", &[(0, 1)]);
        let regions = vec![Interval::new("chr1", 5, 6), Interval::new("chr1", 0, 1)];
        assert!(normalize(&e, &regions, 1e6, None).is_err());
    }
}
