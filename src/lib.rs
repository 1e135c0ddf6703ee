#![allow(clippy::too_many_arguments)]

//! blockify: a Bayesian-blocks peak caller for one-dimensional genomic
//! event data (transposon insertion sites / "calling cards").
//!
//! Segments per-chromosome event positions into piecewise-constant
//! rate blocks via Optimal Partitioning or PELT, then scores those
//! blocks against a background track with a Poisson tail test, optional
//! multiple-testing correction, and a handful of boundary refinements.
//!
//! # Example
//!
//! ```rust,no_run
//! use blockify::{driver, io, prior::Prior, segmentation::Method};
//!
//! let events = io::read_events("events.qbed").unwrap();
//! let prior = Prior::empirical(0.05).unwrap();
//! let result = driver::segment_events(&events, &prior, Method::Pelt, false).unwrap();
//! println!("total blocks: {}", result.total_blocks());
//! ```

pub mod config;
pub mod correction;
pub mod downsample;
pub mod driver;
pub mod error;
pub mod event;
pub mod fitness;
pub mod interval;
pub mod io;
pub mod normalization;
pub mod peaks;
pub mod prior;
pub mod segmentation;

pub use driver::{segment_events, ChromRecord, SegmentationResult};
pub use error::{BlockifyError, Result};
pub use event::Event;
pub use interval::Interval;
pub use prior::Prior;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::driver::{segment_events, ChromRecord, SegmentationResult};
    pub use crate::error::{BlockifyError, Result};
    pub use crate::event::Event;
    pub use crate::interval::Interval;
    pub use crate::normalization::{normalize, NormalizedRegion};
    pub use crate::peaks::{call_peaks, CallConfig, Measure, Peak, PeakRecord, Significance};
    pub use crate::prior::Prior;
    pub use crate::segmentation::Method;
}

#[cfg(test)]
mod tests {
    use crate::driver::segment_events;
    use crate::event::Event;
    use crate::prior::Prior;
    use crate::segmentation::Method;

    #[test]
    fn test_basic_workflow() {
        let events: Vec<Event> = (1..=99).map(|x| Event::new("chr1", x - 1, x, 1.0)).collect();
        let prior = Prior::empirical(0.05).unwrap();
        let result = segment_events(&events, &prior, Method::Pelt, false).unwrap();
        assert_eq!(result.total_blocks(), 1);
    }
}
