//! Weighted median estimation over a fixed-bin histogram.
//!
//! [`binned_median`] approximates the weighted median of a bounded-range
//! sample in O(n) time and O(n_bins) memory. The motif aligner calls it once
//! per query column while centering distance distributions, so a constant
//! per-call cost matters more than exactness; the returned value is the mean
//! of the bucket containing the median, which is within one bucket width of
//! the true weighted median.

use crate::{Result, VelellaError};

/// Default number of histogram buckets.
pub const DEFAULT_MEDIAN_BINS: usize = 1000;

/// Weighted median of `values` (with per-value `counts`) over `[vmin, vmax]`.
///
/// The range is split into `n_bins` equal-width buckets. Each bucket
/// accumulates the total count and count-weighted value sum of the samples
/// falling into it; the first bucket whose cumulative count reaches half the
/// total yields the estimate `sum / count`. Degenerate inputs collapse:
/// `vmax == vmin` returns `vmin`, and an empty bucket satisfying the
/// cumulative condition returns `vmin`.
///
/// # Errors
///
/// Returns [`VelellaError::InvalidInput`] if `values` and `counts` differ in
/// length, `n_bins` is zero, or either bound is non-finite.
pub fn binned_median(
    values: &[f64],
    counts: &[f64],
    vmin: f64,
    vmax: f64,
    n_bins: usize,
) -> Result<f64> {
    if values.len() != counts.len() {
        return Err(VelellaError::InvalidInput(format!(
            "binned_median: {} values but {} counts",
            values.len(),
            counts.len()
        )));
    }
    if n_bins == 0 {
        return Err(VelellaError::InvalidInput(
            "binned_median: n_bins must be at least 1".into(),
        ));
    }
    if !vmin.is_finite() || !vmax.is_finite() {
        return Err(VelellaError::InvalidInput(
            "binned_median: bounds must be finite".into(),
        ));
    }
    if vmax == vmin {
        return Ok(vmin);
    }

    let mut bucket_count = vec![0.0; n_bins];
    let mut bucket_sum = vec![0.0; n_bins];
    let scale = (n_bins - 1) as f64 / (vmax - vmin);
    for (&v, &c) in values.iter().zip(counts) {
        let idx = (((v - vmin) * scale).floor() as usize).min(n_bins - 1);
        bucket_count[idx] += c;
        bucket_sum[idx] += v * c;
    }

    let half = bucket_count.iter().sum::<f64>() / 2.0;
    let mut cumulative = 0.0;
    for b in 0..n_bins {
        cumulative += bucket_count[b];
        if cumulative >= half {
            if bucket_count[b] == 0.0 {
                return Ok(vmin);
            }
            return Ok(bucket_sum[b] / bucket_count[b]);
        }
    }
    Ok(vmax)
}
