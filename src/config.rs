//! Crate-wide constants and CLI default values.

/// Largest finite IEEE-754 double, used as the floor for zero p-values
/// so that `-log10(p)` stays finite.
pub const FLOAT_MAX: f64 = f64::MAX;

/// `1 / FLOAT_MAX`, substituted for any p-value that underflows to zero.
pub const FLOAT_MAX_RECIP: f64 = 1.0 / f64::MAX;

/// Default empirical false-positive rate for the segmentation prior.
pub const DEFAULT_P0: f64 = 0.05;

/// Default segmentation method.
pub const DEFAULT_METHOD: &str = "PELT";

/// Default library-size normalization factor.
pub const DEFAULT_LIBRARY_FACTOR: f64 = 1e6;

/// Default pseudocount added to peak-calling statistics.
pub const DEFAULT_PSEUDOCOUNT: f64 = 1.0;

/// Default multiple-testing correction procedure name.
pub const DEFAULT_CORRECTION: &str = "bonferroni";

/// Default peak-calling measure.
pub const DEFAULT_MEASURE: &str = "enrichment";
