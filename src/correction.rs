//! Multiple-testing correction registry: `(p_vector, alpha) ->
//! (rejected_vector, corrected_p_vector)`, one procedure per named
//! method (spec.md §9 "Multiple-testing correction registry").

use crate::error::{BlockifyError, Result};

/// Run the named correction procedure. Returns `(rejected, corrected_p)`,
/// both in the same order as `p_values`. Unknown names are
/// `InvalidArgument`.
pub fn correct(name: &str, p_values: &[f64], alpha: f64) -> Result<(Vec<bool>, Vec<f64>)> {
    match name.to_lowercase().as_str() {
        "bonferroni" => Ok(bonferroni(p_values, alpha)),
        "holm" => Ok(holm(p_values, alpha)),
        "sidak" => Ok(sidak(p_values, alpha)),
        "hochberg" => Ok(hochberg(p_values, alpha)),
        "bh" | "fdr_bh" | "benjamini-hochberg" => Ok(benjamini_hochberg(p_values, alpha)),
        "by" | "fdr_by" | "benjamini-yekutieli" => Ok(benjamini_yekutieli(p_values, alpha)),
        other => Err(BlockifyError::invalid_argument(format!(
            "unknown multiple-testing correction: {other}"
        ))),
    }
}

fn ascending_order(p_values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..p_values.len()).collect();
    order.sort_by(|&a, &b| p_values[a].partial_cmp(&p_values[b]).unwrap());
    order
}

fn scatter(order: &[usize], sorted_corrected: &[f64], alpha: f64) -> (Vec<bool>, Vec<f64>) {
    let n = order.len();
    let mut corrected = vec![0.0; n];
    let mut rejected = vec![false; n];
    for (rank, &orig_idx) in order.iter().enumerate() {
        corrected[orig_idx] = sorted_corrected[rank];
        rejected[orig_idx] = sorted_corrected[rank] <= alpha;
    }
    (rejected, corrected)
}

fn bonferroni(p_values: &[f64], alpha: f64) -> (Vec<bool>, Vec<f64>) {
    let m = p_values.len() as f64;
    let corrected: Vec<f64> = p_values.iter().map(|&p| (p * m).min(1.0)).collect();
    let rejected = corrected.iter().map(|&p| p <= alpha).collect();
    (rejected, corrected)
}

fn sidak(p_values: &[f64], alpha: f64) -> (Vec<bool>, Vec<f64>) {
    let m = p_values.len() as f64;
    let corrected: Vec<f64> = p_values
        .iter()
        .map(|&p| (1.0 - (1.0 - p).powf(m)).min(1.0))
        .collect();
    let rejected = corrected.iter().map(|&p| p <= alpha).collect();
    (rejected, corrected)
}

/// Holm-Bonferroni step-down: sort ascending, `corrected_i = max_{j<=i}
/// (m - j + 1) * p_(j)`, enforced monotone non-decreasing, clipped to 1.
fn holm(p_values: &[f64], alpha: f64) -> (Vec<bool>, Vec<f64>) {
    let m = p_values.len();
    let order = ascending_order(p_values);
    let mut sorted_corrected = vec![0.0; m];
    let mut running_max: f64 = 0.0;
    for (rank, &idx) in order.iter().enumerate() {
        let factor = (m - rank) as f64;
        let candidate = (p_values[idx] * factor).min(1.0);
        running_max = running_max.max(candidate);
        sorted_corrected[rank] = running_max;
    }
    scatter(&order, &sorted_corrected, alpha)
}

/// Hochberg step-up: sort ascending, `corrected_i = min_{j>=i} (m - j + 1)
/// * p_(j)`, enforced monotone non-increasing from the top, clipped to 1.
fn hochberg(p_values: &[f64], alpha: f64) -> (Vec<bool>, Vec<f64>) {
    let m = p_values.len();
    let order = ascending_order(p_values);
    let mut sorted_corrected = vec![0.0; m];
    let mut running_min = f64::INFINITY;
    for rank in (0..m).rev() {
        let idx = order[rank];
        let factor = (m - rank) as f64;
        let candidate = (p_values[idx] * factor).min(1.0);
        running_min = running_min.min(candidate);
        sorted_corrected[rank] = running_min;
    }
    scatter(&order, &sorted_corrected, alpha)
}

/// Benjamini-Hochberg FDR: sort ascending, `corrected_i = min_{j>=i} (m/j)
/// * p_(j)`, cumulative min from the top, clipped to 1.
fn benjamini_hochberg(p_values: &[f64], alpha: f64) -> (Vec<bool>, Vec<f64>) {
    let m = p_values.len();
    let order = ascending_order(p_values);
    let mut sorted_corrected = vec![0.0; m];
    let mut running_min = f64::INFINITY;
    for rank in (0..m).rev() {
        let idx = order[rank];
        let factor = m as f64 / (rank + 1) as f64;
        let candidate = (p_values[idx] * factor).min(1.0);
        running_min = running_min.min(candidate);
        sorted_corrected[rank] = running_min;
    }
    scatter(&order, &sorted_corrected, alpha)
}

/// Benjamini-Yekutieli FDR (valid under arbitrary dependence): same as BH
/// but scaled by the harmonic number `c(m) = sum_{i=1}^{m} 1/i`.
fn benjamini_yekutieli(p_values: &[f64], alpha: f64) -> (Vec<bool>, Vec<f64>) {
    let m = p_values.len();
    let harmonic: f64 = (1..=m).map(|i| 1.0 / i as f64).sum();
    let order = ascending_order(p_values);
    let mut sorted_corrected = vec![0.0; m];
    let mut running_min = f64::INFINITY;
    for rank in (0..m).rev() {
        let idx = order[rank];
        let factor = (m as f64 * harmonic) / (rank + 1) as f64;
        let candidate = (p_values[idx] * factor).min(1.0);
        running_min = running_min.min(candidate);
        sorted_corrected[rank] = running_min;
    }
    scatter(&order, &sorted_corrected, alpha)
}
