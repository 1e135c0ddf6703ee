//! Per-chromosome driver: groups sorted events by chromosome in
//! first-seen order, derives each chromosome's cell grid, runs the
//! chosen segmentation engine, and assembles the block table.

use rayon::prelude::*;

use crate::error::{BlockifyError, Result};
use crate::event::{coordinate_sequence, Event};
use crate::interval::{is_sorted, Interval};
use crate::prior::Prior;
use crate::segmentation::{segment_chromosome, ChromSegmentation, Method};

/// One chromosome's segmentation outcome: its blocks and the bookkeeping
/// fields of spec.md §3's "Segmentation record" (`γ`, best fitness, block
/// count).
#[derive(Debug, Clone)]
pub struct ChromRecord {
    pub chrom: String,
    pub blocks: Vec<Interval>,
    pub gamma: f64,
    pub best_fitness: f64,
    pub n_blocks: usize,
}

/// The full segmentation result: per-chromosome records in first-seen
/// order, plus the flattened block list and totals.
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    pub records: Vec<ChromRecord>,
}

impl SegmentationResult {
    pub fn total_blocks(&self) -> usize {
        self.records.iter().map(|r| r.n_blocks).sum()
    }

    pub fn total_fitness(&self) -> f64 {
        self.records.iter().map(|r| r.best_fitness).sum()
    }

    pub fn blocks(&self) -> Vec<Interval> {
        self.records
            .iter()
            .flat_map(|r| r.blocks.iter().cloned())
            .collect()
    }
}

/// First-seen order of chromosome labels appearing in `events`, assuming
/// `events` is already grouped by chromosome (spec.md §4.5 step 1).
fn first_seen_chromosomes(events: &[Event]) -> Vec<String> {
    let mut order = Vec::new();
    let mut last: Option<&str> = None;
    for e in events {
        if last != Some(e.chrom.as_str()) {
            order.push(e.chrom.clone());
            last = Some(e.chrom.as_str());
        }
    }
    order
}

/// Run segmentation over every chromosome present in `events`, in
/// first-seen order. `events` must already be sorted by `(chrom, start)`;
/// verbose progress (matching the original tool's `"[i/n] Processing
/// chrom"` / `"--Found N blocks"` lines) is printed to stderr when
/// `verbose` is set.
pub fn segment_events(
    events: &[Event],
    prior: &Prior,
    method: Method,
    verbose: bool,
) -> Result<SegmentationResult> {
    let event_intervals: Vec<Interval> = events.iter().map(Event::interval).collect();
    if !is_sorted(&event_intervals) {
        return Err(BlockifyError::unsorted_input(
            "input events must be sorted by (chrom, start)",
        ));
    }

    let chroms = first_seen_chromosomes(events);
    let n = chroms.len();

    let outcomes: Vec<Option<ChromRecord>> = chroms
        .par_iter()
        .enumerate()
        .map(|(i, chrom)| {
            if verbose {
                eprintln!("[{}/{}] Processing {}", i + 1, n, chrom);
            }
            let chrom_events: Vec<&Event> =
                events.iter().filter(|e| &e.chrom == chrom).collect();
            let coords: Vec<i64> = coordinate_sequence(
                &chrom_events.iter().map(|e| (*e).clone()).collect::<Vec<_>>(),
            );

            let record = segment_chromosome(&coords, prior, method).map(|seg: ChromSegmentation| {
                let blocks: Vec<Interval> = seg
                    .boundaries
                    .windows(2)
                    .map(|w| Interval::new(chrom.clone(), w[0], w[1]))
                    .collect();
                ChromRecord {
                    chrom: chrom.clone(),
                    n_blocks: blocks.len(),
                    blocks,
                    gamma: seg.gamma,
                    best_fitness: seg.best_fitness,
                }
            });

            if verbose {
                match &record {
                    Some(r) => eprintln!("--Found {} blocks", r.n_blocks),
                    None => eprintln!("--Skipped, no blocks found"),
                }
            }

            record
        })
        .collect();

    // Rebuild in first-seen order regardless of which rayon worker
    // finished first; skipped (degenerate) chromosomes contribute nothing.
    let records: Vec<ChromRecord> = outcomes.into_iter().flatten().collect();

    Ok(SegmentationResult { records })
}
