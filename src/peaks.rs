//! Peak-calling pipeline: per-block Poisson tail tests against a scaled
//! background, multiple-testing correction, and the tighten / summit /
//! merge / size-filter refinements, in that order (spec.md §4.7).

use statrs::distribution::{DiscreteCDF, Poisson};

use crate::config::FLOAT_MAX_RECIP;
use crate::correction;
use crate::error::{BlockifyError, Result};
use crate::event::Event;
use crate::interval::{count_overlaps, is_sorted, merge_within_distance, Interval};

/// Enrichment tests the upper tail (`P(X >= Input)`); depletion tests the
/// lower tail (`P(X <= Input)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Enrichment,
    Depletion,
}

impl Measure {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "enrichment" => Some(Measure::Enrichment),
            "depletion" => Some(Measure::Depletion),
            _ => None,
        }
    }
}

/// Which metric a summit run is maximized over. Not exposed on the CLI
/// (which only toggles `--summit` on/off); `PValue` is the default used
/// by every caller, matching the one CLI-visible behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummitMetric {
    PValue,
    Density,
}

/// Exactly one of a raw p-value cutoff or a named correction procedure
/// with a family-wise alpha.
#[derive(Debug, Clone)]
pub enum Significance {
    Cutoff(f64),
    Correction { name: String, alpha: f64 },
}

#[derive(Debug, Clone)]
pub struct CallConfig {
    pub measure: Measure,
    pub significance: Significance,
    pub distance: Option<i64>,
    pub min: i64,
    pub max: i64,
    pub pseudocount: f64,
    pub tight: bool,
    pub summit: bool,
    pub summit_metric: SummitMetric,
}

impl CallConfig {
    fn validate(&self) -> Result<()> {
        if self.pseudocount < 0.0 {
            return Err(BlockifyError::invalid_argument(
                "pseudocount must be non-negative",
            ));
        }
        if self.min > self.max {
            return Err(BlockifyError::invalid_argument("min must not exceed max"));
        }
        match &self.significance {
            Significance::Cutoff(q) => {
                if !(0.0..=1.0).contains(q) {
                    return Err(BlockifyError::invalid_argument(
                        "pValueCutoff must be in [0, 1]",
                    ));
                }
            }
            Significance::Correction { alpha, .. } => {
                if !(0.0..=1.0).contains(alpha) {
                    return Err(BlockifyError::invalid_argument("alpha must be in [0, 1]"));
                }
            }
        }
        if let Some(d) = self.distance {
            if d < 0 {
                return Err(BlockifyError::invalid_argument(
                    "distance must be non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// One scored region: the full set of intermediate columns from spec.md
/// §6's intermediate CSV.
#[derive(Debug, Clone)]
pub struct PeakRecord {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub input: f64,
    pub background: f64,
    pub normed_bg: f64,
    pub net_density: f64,
    pub p_value: f64,
    pub neg_log10_p_value: f64,
    pub corrected_p_value: Option<f64>,
    pub neg_log10_corrected: Option<f64>,
    pub rejected: Option<bool>,
    pub significant: bool,
}

/// A final called peak (BED6).
#[derive(Debug, Clone, PartialEq)]
pub struct Peak {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub name: String,
    pub score: i32,
    pub strand: char,
}

fn poisson_p_value(input: f64, lambda: f64, measure: Measure) -> f64 {
    if lambda <= 0.0 {
        // A zero-rate background: any positive count is maximally
        // enriched (p -> 0), any count is never depleted (p = 1).
        return match measure {
            Measure::Enrichment if input > 0.0 => FLOAT_MAX_RECIP,
            Measure::Enrichment => 1.0,
            Measure::Depletion => 1.0,
        };
    }
    let dist = Poisson::new(lambda).expect("lambda > 0 validated above");
    let p = match measure {
        Measure::Enrichment => {
            let k = input as u64;
            if k == 0 {
                1.0
            } else {
                dist.sf(k - 1)
            }
        }
        Measure::Depletion => dist.cdf(input as u64),
    };
    if p <= 0.0 {
        FLOAT_MAX_RECIP
    } else {
        p
    }
}

/// Group consecutive same-chromosome, end-to-start-abutting regions into
/// run ids, computed once from the *original* (pre-tighten) boundaries so
/// tightening cannot change summit grouping (spec.md §3 "Block"
/// contiguity, §4.7 step 1).
fn run_ids(regions: &[Interval]) -> Vec<usize> {
    let mut ids = Vec::with_capacity(regions.len());
    let mut current = 0usize;
    for (i, r) in regions.iter().enumerate() {
        if i > 0 {
            let prev = &regions[i - 1];
            if !(prev.chrom == r.chrom && prev.end == r.start) {
                current += 1;
            }
        }
        ids.push(current);
    }
    ids
}

/// Replace each region by the span of the events of `events` that overlap
/// it: `[min(event.start), max(event.end)]`. A region with no overlapping
/// event produces no row at all, matching the underlying `intersect(wa=True,
/// wb=True)` semantics this tightening is built on: such a region never
/// appears in the intersection and is dropped before scoring, not kept with
/// its original boundaries.
fn tighten_regions(regions: &[Interval], events: &[Event]) -> Vec<Option<Interval>> {
    let event_intervals: Vec<Interval> = events.iter().map(Event::interval).collect();
    regions
        .iter()
        .map(|r| {
            let mut lo = i64::MAX;
            let mut hi = i64::MIN;
            for ev in &event_intervals {
                if ev.chrom != r.chrom {
                    continue;
                }
                if ev.overlaps(r) {
                    lo = lo.min(ev.start);
                    hi = hi.max(ev.end);
                }
            }
            if lo <= hi {
                Some(Interval::new(r.chrom.clone(), lo, hi))
            } else {
                None
            }
        })
        .collect()
}

/// Score `regions` against `events` and `background`, apply
/// significance selection, and run the tighten / summit / merge /
/// size-filter refinements in spec.md §4.7's order. Returns the final
/// peak list and the full per-region intermediate rows (for
/// `--intermediate`), in that order.
pub fn call_peaks(
    events: &[Event],
    regions: &[Interval],
    background: &[Event],
    config: &CallConfig,
) -> Result<(Vec<Peak>, Vec<PeakRecord>)> {
    config.validate()?;

    let event_intervals: Vec<Interval> = events.iter().map(Event::interval).collect();
    let background_intervals: Vec<Interval> = background.iter().map(Event::interval).collect();

    if !is_sorted(&event_intervals) {
        return Err(BlockifyError::unsorted_input(
            "input events must be sorted by (chrom, start)",
        ));
    }
    if !is_sorted(regions) {
        return Err(BlockifyError::unsorted_input(
            "regions must be sorted by (chrom, start)",
        ));
    }
    if !is_sorted(&background_intervals) {
        return Err(BlockifyError::unsorted_input(
            "background must be sorted by (chrom, start)",
        ));
    }
    if background.is_empty() {
        return Err(BlockifyError::invalid_argument(
            "background must be non-empty",
        ));
    }

    let region_runs = run_ids(regions);

    // Tightening can drop regions outright (no overlapping event); filter
    // `runs` in lockstep so it stays index-aligned with `scored_regions`.
    let (scored_regions, runs): (Vec<Interval>, Vec<usize>) = if config.tight {
        tighten_regions(regions, events)
            .into_iter()
            .zip(region_runs.iter())
            .filter_map(|(tightened, &run)| tightened.map(|iv| (iv, run)))
            .unzip()
    } else {
        (regions.to_vec(), region_runs)
    };

    let pseudocount_floor = config.pseudocount.floor();
    let scale = events.len() as f64 / background.len() as f64;

    let raw_input = count_overlaps(&scored_regions, &event_intervals);
    let raw_background = count_overlaps(&scored_regions, &background_intervals);

    let mut p_values = Vec::with_capacity(scored_regions.len());
    let mut rows: Vec<PeakRecord> = Vec::with_capacity(scored_regions.len());

    for (i, region) in scored_regions.iter().enumerate() {
        let input = raw_input[i] as f64 + pseudocount_floor;
        let background_count = raw_background[i] as f64;
        let normed_bg = background_count * scale + config.pseudocount;
        let width = (region.end - region.start).max(1) as f64;
        let net_density = (input - normed_bg) / width;
        let p = poisson_p_value(input, normed_bg, config.measure);
        p_values.push(p);

        rows.push(PeakRecord {
            chrom: region.chrom.clone(),
            start: region.start,
            end: region.end,
            input,
            background: background_count,
            normed_bg,
            net_density,
            p_value: p,
            neg_log10_p_value: -p.log10(),
            corrected_p_value: None,
            neg_log10_corrected: None,
            rejected: None,
            significant: false,
        });
    }

    match &config.significance {
        Significance::Cutoff(q) => {
            for row in rows.iter_mut() {
                row.significant = row.p_value <= *q;
            }
        }
        Significance::Correction { name, alpha } => {
            let (rejected, corrected) = correction::correct(name, &p_values, *alpha)?;
            for (row, (&rej, &corr)) in rows.iter_mut().zip(rejected.iter().zip(corrected.iter())) {
                row.rejected = Some(rej);
                row.corrected_p_value = Some(corr);
                row.neg_log10_corrected = Some(-corr.log10());
                row.significant = rej;
            }
        }
    }

    let mut significant_idx: Vec<usize> = (0..rows.len()).filter(|&i| rows[i].significant).collect();

    if config.summit {
        significant_idx = apply_summit(&significant_idx, &runs, &rows, config.summit_metric);
    }

    let mut surviving: Vec<Interval> = significant_idx
        .iter()
        .map(|&i| scored_regions[i].clone())
        .collect();

    if let Some(distance) = config.distance {
        surviving = merge_within_distance(&surviving, distance);
    }

    let peaks: Vec<Peak> = surviving
        .into_iter()
        .filter(|iv| {
            let len = iv.end - iv.start;
            len >= config.min && len <= config.max
        })
        .enumerate()
        .map(|(i, iv)| Peak {
            chrom: iv.chrom,
            start: iv.start,
            end: iv.end,
            name: format!("peak_{}", i + 1),
            score: 1,
            strand: '.',
        })
        .collect();

    Ok((peaks, rows))
}

fn apply_summit(
    significant_idx: &[usize],
    runs: &[usize],
    rows: &[PeakRecord],
    metric: SummitMetric,
) -> Vec<usize> {
    let metric_value = |i: usize| -> f64 {
        match metric {
            SummitMetric::PValue => rows[i]
                .neg_log10_corrected
                .unwrap_or(rows[i].neg_log10_p_value),
            SummitMetric::Density => rows[i].net_density,
        }
    };

    let mut survivors = Vec::new();
    let mut run_start = 0usize;
    while run_start < significant_idx.len() {
        let mut run_end = run_start + 1;
        while run_end < significant_idx.len()
            && runs[significant_idx[run_end]] == runs[significant_idx[run_start]]
        {
            run_end += 1;
        }
        let run = &significant_idx[run_start..run_end];
        let best = run.iter().map(|&i| metric_value(i)).fold(f64::NEG_INFINITY, f64::max);
        for &i in run {
            if (metric_value(i) - best).abs() < 1e-12 {
                survivors.push(i);
            }
        }
        run_start = run_end;
    }
    survivors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(chrom: &str, start: i64, end: i64) -> Interval {
        Interval::new(chrom, start, end)
    }

    fn events(chrom: &str, n: i64, start: i64) -> Vec<Event> {
        (0..n).map(|i| Event::new(chrom, start + i, start + i + 1, 1.0)).collect()
    }

    fn base_config(significance: Significance) -> CallConfig {
        CallConfig {
            measure: Measure::Enrichment,
            significance,
            distance: None,
            min: 0,
            max: i64::MAX,
            pseudocount: 1.0,
            tight: false,
            summit: false,
            summit_metric: SummitMetric::PValue,
        }
    }

    #[test]
    fn test_rejects_negative_pseudocount() {
        let mut config = base_config(Significance::Cutoff(0.05));
        config.pseudocount = -1.0;
        let e = events("chr1", 5, 0);
        let regions = vec![region("chr1", 0, 5)];
        let bg = events("chr1", 5, 0);
        assert!(call_peaks(&e, &regions, &bg, &config).is_err());
    }

    #[test]
    fn test_enriched_region_is_significant_with_loose_cutoff() {
        let config = base_config(Significance::Cutoff(0.5));
        let input_events = events("chr1", 50, 0);
        let bg_events = events("chr1", 2, 1000);
        let regions = vec![region("chr1", 0, 50)];
        let (peaks, rows) = call_peaks(&input_events, &regions, &bg_events, &config).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(peaks.len(), 1);
        assert!(rows[0].p_value < 0.5);
    }

    #[test]
    fn test_tightening_cutoff_yields_subset_of_peaks() {
        let input_events = events("chr1", 100, 0);
        let bg_events = events("chr1", 5, 1000);
        let regions = vec![
            region("chr1", 0, 20),
            region("chr1", 20, 40),
            region("chr1", 40, 60),
        ];
        let loose = base_config(Significance::Cutoff(0.5));
        let strict = base_config(Significance::Cutoff(0.001));
        let (loose_peaks, _) = call_peaks(&input_events, &regions, &bg_events, &loose).unwrap();
        let (strict_peaks, _) = call_peaks(&input_events, &regions, &bg_events, &strict).unwrap();
        assert!(strict_peaks.len() <= loose_peaks.len());
    }

    #[test]
    fn test_tight_pulls_region_to_event_span() {
        let input_events = vec![Event::new("chr1", 5, 6, 1.0), Event::new("chr1", 8, 9, 1.0)];
        let bg_events = events("chr1", 2, 1000);
        let regions = vec![region("chr1", 0, 20)];
        let mut config = base_config(Significance::Cutoff(1.0));
        config.tight = true;
        let (_, rows) = call_peaks(&input_events, &regions, &bg_events, &config).unwrap();
        assert_eq!(rows[0].start, 5);
        assert_eq!(rows[0].end, 9);
    }

    #[test]
    fn test_tight_drops_regions_with_no_overlapping_events() {
        let input_events = vec![Event::new("chr1", 5, 6, 1.0), Event::new("chr1", 8, 9, 1.0)];
        let bg_events = events("chr1", 2, 1000);
        let regions = vec![region("chr1", 0, 20), region("chr1", 500, 520)];
        let mut config = base_config(Significance::Cutoff(1.0));
        config.tight = true;
        let (_, rows) = call_peaks(&input_events, &regions, &bg_events, &config).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start, 5);
        assert_eq!(rows[0].end, 9);
    }

    #[test]
    fn test_size_filter_drops_short_peaks() {
        let input_events = events("chr1", 200, 0);
        let bg_events = events("chr1", 5, 1000);
        let regions = vec![region("chr1", 0, 2), region("chr1", 100, 160)];
        let mut config = base_config(Significance::Cutoff(1.0));
        config.min = 10;
        let (peaks, _) = call_peaks(&input_events, &regions, &bg_events, &config).unwrap();
        assert!(peaks.iter().all(|p| p.end - p.start >= 10));
    }

    #[test]
    fn test_merge_joins_adjacent_significant_regions() {
        let input_events = events("chr1", 200, 0);
        let bg_events = events("chr1", 5, 1000);
        let regions = vec![region("chr1", 0, 50), region("chr1", 50, 100)];
        let mut config = base_config(Significance::Cutoff(1.0));
        config.distance = Some(0);
        let (peaks, _) = call_peaks(&input_events, &regions, &bg_events, &config).unwrap();
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].start, 0);
        assert_eq!(peaks[0].end, 100);
    }

    #[test]
    fn test_correction_marks_rejected_and_corrected_columns() {
        let input_events = events("chr1", 100, 0);
        let bg_events = events("chr1", 5, 1000);
        let regions = vec![region("chr1", 0, 50), region("chr1", 200, 220)];
        let config = base_config(Significance::Correction {
            name: "bonferroni".to_string(),
            alpha: 0.05,
        });
        let (_, rows) = call_peaks(&input_events, &regions, &bg_events, &config).unwrap();
        assert!(rows.iter().all(|r| r.corrected_p_value.is_some()));
        assert!(rows.iter().all(|r| r.rejected.is_some()));
    }
}
