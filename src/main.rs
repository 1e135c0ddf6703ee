#![allow(clippy::too_many_arguments)]

//! blockify: Bayesian-blocks segmentation and peak calling for
//! one-dimensional genomic event data.
//!
//! Usage: blockify <COMMAND> [OPTIONS]

use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use blockify::config;
use blockify::correction;
use blockify::downsample::downsample;
use blockify::driver::{segment_events, SegmentationResult};
use blockify::error::{BlockifyError, Result};
use blockify::event::Event;
use blockify::interval::Interval;
use blockify::io::{
    read_events, read_intervals, write_bedgraph, write_blocks, write_intermediate_csv, write_peaks,
};
use blockify::normalization::normalize;
use blockify::peaks::{call_peaks, CallConfig, Measure, Significance, SummitMetric};
use blockify::prior::Prior;
use blockify::segmentation::Method;

#[derive(Parser)]
#[command(name = "blockify")]
#[command(version)]
#[command(about = "Bayesian-blocks peak caller for one-dimensional genomic event data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// The `--p0 | --prior` and `--method` options shared by every
/// segmentation-driven subcommand.
#[derive(clap::Args, Clone)]
struct SegmentOptions {
    /// Empirical false-positive rate used to calibrate the prior (default 0.05)
    #[arg(long, conflicts_with = "prior")]
    p0: Option<f64>,

    /// Explicit per-change-point penalty gamma
    #[arg(long)]
    prior: Option<f64>,

    /// Segmentation engine
    #[arg(long, default_value_t = config::DEFAULT_METHOD.to_string())]
    method: String,
}

impl SegmentOptions {
    fn resolve(&self) -> Result<(Prior, Method)> {
        let prior = match (self.p0, self.prior) {
            (Some(_), Some(_)) => {
                return Err(BlockifyError::invalid_argument(
                    "--p0 and --prior are mutually exclusive",
                ))
            }
            (None, Some(gamma)) => Prior::explicit(gamma)?,
            (Some(p0), None) => Prior::empirical(p0)?,
            (None, None) => Prior::empirical(config::DEFAULT_P0)?,
        };
        let method = Method::parse(&self.method).ok_or_else(|| {
            BlockifyError::invalid_argument(format!("unknown --method: {}", self.method))
        })?;
        Ok((prior, method))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Segment per-chromosome events into Bayesian blocks
    Segment {
        /// Input qBED/BED event table
        #[arg(short, long)]
        input: PathBuf,

        /// Output blocks table
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        segment: SegmentOptions,

        /// Print per-chromosome progress to stderr
        #[arg(long)]
        verbose: bool,
    },

    /// Produce a normalized, library-scaled event-rate track
    Normalize {
        /// Input qBED/BED event table
        #[arg(short, long)]
        input: PathBuf,

        /// Output bedGraph track
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        segment: SegmentOptions,

        /// Regions to normalize (BED3); segments `input` first if absent
        #[arg(short, long)]
        regions: Option<PathBuf>,

        /// Library-size scaling factor
        #[arg(short = 'k', long, default_value_t = config::DEFAULT_LIBRARY_FACTOR)]
        library_factor: f64,

        /// Optional per-length rate scaling factor
        #[arg(short = 'l', long)]
        length_factor: Option<f64>,

        /// Print per-chromosome progress to stderr
        #[arg(long)]
        verbose: bool,
    },

    /// Call significant peaks against a background track
    Call {
        /// Input qBED/BED event table
        #[arg(short, long)]
        input: PathBuf,

        /// Output BED6 peaks
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        segment: SegmentOptions,

        /// Regions to score (BED3); segments `input` first if absent
        #[arg(short, long)]
        regions: Option<PathBuf>,

        /// Background qBED/BED event table
        #[arg(short = 'b', long = "background")]
        background: PathBuf,

        /// Family-wise alpha for the chosen correction procedure
        #[arg(short, long, conflicts_with = "p_value_cutoff")]
        alpha: Option<f64>,

        /// Multiple-testing correction procedure name
        #[arg(long, default_value_t = config::DEFAULT_CORRECTION.to_string())]
        correction: String,

        /// Raw p-value cutoff (bypasses multiple-testing correction)
        #[arg(short = 'p', long = "pValueCutoff")]
        p_value_cutoff: Option<f64>,

        /// Merge significant regions within this many bp
        #[arg(short, long)]
        distance: Option<i64>,

        /// Minimum peak size
        #[arg(long, default_value_t = 0)]
        min: i64,

        /// Maximum peak size
        #[arg(long, default_value_t = i64::MAX)]
        max: i64,

        /// Pseudocount added to Input and Normed_bg
        #[arg(short = 'c', long, default_value_t = config::DEFAULT_PSEUDOCOUNT)]
        pseudocount: f64,

        /// Enrichment or depletion
        #[arg(long, default_value_t = config::DEFAULT_MEASURE.to_string())]
        measure: String,

        /// Pull region boundaries to the span of overlapping events
        #[arg(long, conflicts_with = "summit")]
        tight: bool,

        /// Keep only the most significant block in each run of significant blocks
        #[arg(long, conflicts_with = "tight")]
        summit: bool,

        /// Optional path to write the intermediate per-region statistics CSV
        #[arg(long)]
        intermediate: Option<PathBuf>,
    },

    /// Downsample rows without replacement
    Downsample {
        /// Input qBED/BED event table
        #[arg(short, long)]
        input: PathBuf,

        /// Output qBED/BED event table
        #[arg(short, long)]
        output: PathBuf,

        /// Number of rows to sample
        #[arg(short = 'n', long)]
        number: usize,

        /// Random seed for reproducible sampling
        #[arg(short, long)]
        seed: Option<u64>,

        /// Sample uniformly instead of weighting by column 4
        #[arg(long)]
        naive: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Segment {
            input,
            output,
            segment,
            verbose,
        } => run_segment(input, output, segment, verbose),

        Commands::Normalize {
            input,
            output,
            segment,
            regions,
            library_factor,
            length_factor,
            verbose,
        } => run_normalize(
            input,
            output,
            segment,
            regions,
            library_factor,
            length_factor,
            verbose,
        ),

        Commands::Call {
            input,
            output,
            segment,
            regions,
            background,
            alpha,
            correction,
            p_value_cutoff,
            distance,
            min,
            max,
            pseudocount,
            measure,
            tight,
            summit,
            intermediate,
        } => run_call(
            input,
            output,
            segment,
            regions,
            background,
            alpha,
            correction,
            p_value_cutoff,
            distance,
            min,
            max,
            pseudocount,
            measure,
            tight,
            summit,
            intermediate,
        ),

        Commands::Downsample {
            input,
            output,
            number,
            seed,
            naive,
        } => run_downsample(input, output, number, seed, naive),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_segment(
    input: PathBuf,
    output: PathBuf,
    segment: SegmentOptions,
    verbose: bool,
) -> Result<()> {
    let (prior, method) = segment.resolve()?;
    let events = read_events(input)?;
    let result = segment_events(&events, &prior, method, verbose)?;

    let file = std::fs::File::create(output)?;
    let mut handle = std::io::BufWriter::new(file);
    write_blocks(&mut handle, &result.blocks())?;
    Ok(())
}

/// Produce sorted regions: the caller's `-r` file, or the blocks from
/// segmenting `events` first (spec.md §6 "If -r absent, segment first").
fn resolve_regions(
    regions: Option<PathBuf>,
    events: &[Event],
    prior: &Prior,
    method: Method,
) -> Result<Vec<Interval>> {
    match regions {
        Some(path) => read_intervals(path),
        None => {
            let result: SegmentationResult = segment_events(events, prior, method, false)?;
            Ok(result.blocks())
        }
    }
}

fn run_normalize(
    input: PathBuf,
    output: PathBuf,
    segment: SegmentOptions,
    regions: Option<PathBuf>,
    library_factor: f64,
    length_factor: Option<f64>,
    verbose: bool,
) -> Result<()> {
    let (prior, method) = segment.resolve()?;
    let events = read_events(&input)?;
    if verbose {
        eprintln!("Normalizing {} events", events.len());
    }
    let regions = resolve_regions(regions, &events, &prior, method)?;
    let normalized = normalize(&events, &regions, library_factor, length_factor)?;

    let file = std::fs::File::create(output)?;
    let mut handle = std::io::BufWriter::new(file);
    write_bedgraph(&mut handle, &normalized)?;
    Ok(())
}

fn run_call(
    input: PathBuf,
    output: PathBuf,
    segment: SegmentOptions,
    regions: Option<PathBuf>,
    background: PathBuf,
    alpha: Option<f64>,
    correction_name: String,
    p_value_cutoff: Option<f64>,
    distance: Option<i64>,
    min: i64,
    max: i64,
    pseudocount: f64,
    measure: String,
    tight: bool,
    summit: bool,
    intermediate: Option<PathBuf>,
) -> Result<()> {
    let (prior, method) = segment.resolve()?;
    let events = read_events(&input)?;
    let regions = resolve_regions(regions, &events, &prior, method)?;
    let background_events = read_events(&background)?;

    let significance = match (alpha, p_value_cutoff) {
        (Some(_), Some(_)) => {
            return Err(BlockifyError::invalid_argument(
                "--alpha and --pValueCutoff are mutually exclusive",
            ))
        }
        (None, None) => {
            return Err(BlockifyError::invalid_argument(
                "exactly one of --alpha or --pValueCutoff is required",
            ))
        }
        (Some(alpha), None) => {
            // Validate the name eagerly so a typo fails before any statistics run.
            correction::correct(&correction_name, &[0.5], alpha)?;
            Significance::Correction {
                name: correction_name,
                alpha,
            }
        }
        (None, Some(q)) => Significance::Cutoff(q),
    };

    let measure = Measure::parse(&measure)
        .ok_or_else(|| BlockifyError::invalid_argument(format!("unknown --measure: {measure}")))?;

    let config = CallConfig {
        measure,
        significance,
        distance,
        min,
        max,
        pseudocount,
        tight,
        summit,
        summit_metric: SummitMetric::PValue,
    };

    let (peaks, rows) = call_peaks(&events, &regions, &background_events, &config)?;

    let file = std::fs::File::create(&output)?;
    let mut handle = std::io::BufWriter::new(file);
    write_peaks(&mut handle, &peaks)?;

    if let Some(path) = intermediate {
        let file = std::fs::File::create(path)?;
        let mut handle = std::io::BufWriter::new(file);
        write_intermediate_csv(&mut handle, &rows)?;
    }

    Ok(())
}

fn run_downsample(
    input: PathBuf,
    output: PathBuf,
    number: usize,
    seed: Option<u64>,
    naive: bool,
) -> Result<()> {
    let rows = read_events(input)?;
    let sampled = downsample(&rows, number, seed, naive)?;

    let file = std::fs::File::create(output)?;
    let mut handle = std::io::BufWriter::new(file);
    for e in &sampled {
        writeln!(handle, "{}\t{}\t{}\t{}", e.chrom, e.start, e.end, e.weight)?;
    }
    Ok(())
}
