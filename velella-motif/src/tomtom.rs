//! TOMTOM-style motif-to-motif comparison.
//!
//! For each (query, target) pair the aligner computes a per-column distance
//! matrix, recenters it by each query column's binned-median background,
//! scores every ungapped offset on both target orientations, and converts
//! the best alignment score into a p-value.

use velella_core::median::DEFAULT_MEDIAN_BINS;
use velella_core::{binned_median, Result, VelellaError};

use crate::dist::convolve_columns;
use crate::meme::Motif;
use crate::pwm::{Pwm, Strand};

/// Default number of score bins for the rigorous p-value convolution.
pub const DEFAULT_SCORE_BINS: usize = 100;

/// How [`tomtom`] converts an alignment score into a p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PValueMode {
    /// `max(1e-15, exp(-|score|/100))`. This has no probabilistic meaning;
    /// it stays the default because downstream consumers of the classic
    /// output expect it.
    Heuristic,
    /// Exact convolution of per-column score distributions, with each
    /// overlap column's null score drawn uniformly from the centered scores
    /// against the (orientation-adjusted) target's own columns.
    TargetColumns,
}

/// Options for [`tomtom`].
#[derive(Debug, Clone)]
pub struct TomtomOptions {
    /// Bins for discretizing column scores in [`PValueMode::TargetColumns`].
    pub n_score_bins: usize,
    /// Bins for the median estimator used to center each query column.
    pub n_median_bins: usize,
    /// Also align against the reverse-complemented target.
    pub reverse_complement: bool,
    /// P-value conversion mode.
    pub p_value: PValueMode,
}

impl Default for TomtomOptions {
    fn default() -> Self {
        Self {
            n_score_bins: DEFAULT_SCORE_BINS,
            n_median_bins: DEFAULT_MEDIAN_BINS,
            reverse_complement: true,
            p_value: PValueMode::Heuristic,
        }
    }
}

/// Q x T result matrices from [`tomtom`], indexed `[query][target]`.
#[derive(Debug, Clone)]
pub struct TomtomResults {
    /// P-value of the best alignment.
    pub p_values: Vec<Vec<f64>>,
    /// Score of the best alignment.
    pub scores: Vec<Vec<f64>>,
    /// Target position under the query's first column.
    pub offsets: Vec<Vec<i64>>,
    /// Number of columns shared at the best offset.
    pub overlaps: Vec<Vec<usize>>,
    /// Orientation of the target in the best alignment.
    pub strands: Vec<Vec<Strand>>,
}

struct Alignment {
    offset: i64,
    overlap: usize,
    score: f64,
}

struct Comparison {
    score: f64,
    offset: i64,
    overlap: usize,
    strand: Strand,
    p_value: f64,
}

/// Compare every query against every target.
///
/// # Errors
///
/// Fails on zero `n_score_bins` or `n_median_bins`. Empty query or target
/// lists yield empty (or empty-row) matrices.
pub fn tomtom(
    queries: &[Motif],
    targets: &[Motif],
    options: &TomtomOptions,
) -> Result<TomtomResults> {
    if options.n_score_bins == 0 {
        return Err(VelellaError::InvalidInput(
            "tomtom: n_score_bins must be at least 1".into(),
        ));
    }
    if options.n_median_bins == 0 {
        return Err(VelellaError::InvalidInput(
            "tomtom: n_median_bins must be at least 1".into(),
        ));
    }

    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<Comparison>> = {
        use rayon::prelude::*;
        queries
            .par_iter()
            .map(|q| {
                targets
                    .iter()
                    .map(|t| compare(q, t, options))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<_>>()?
    };
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<Comparison>> = queries
        .iter()
        .map(|q| {
            targets
                .iter()
                .map(|t| compare(q, t, options))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<_>>()?;

    let mut results = TomtomResults {
        p_values: Vec::with_capacity(rows.len()),
        scores: Vec::with_capacity(rows.len()),
        offsets: Vec::with_capacity(rows.len()),
        overlaps: Vec::with_capacity(rows.len()),
        strands: Vec::with_capacity(rows.len()),
    };
    for row in rows {
        results.p_values.push(row.iter().map(|c| c.p_value).collect());
        results.scores.push(row.iter().map(|c| c.score).collect());
        results.offsets.push(row.iter().map(|c| c.offset).collect());
        results.overlaps.push(row.iter().map(|c| c.overlap).collect());
        results.strands.push(row.iter().map(|c| c.strand).collect());
    }
    Ok(results)
}

fn compare(query: &Motif, target: &Motif, options: &TomtomOptions) -> Result<Comparison> {
    let q = &query.pwm;
    let t = &target.pwm;

    let d_fwd = centered_distances(q, t, options.n_median_bins)?;
    let best_fwd = best_alignment(&d_fwd, q.width(), t.width());

    let (best, strand, d) = if options.reverse_complement {
        let t_rc = t.reverse_complement();
        let d_rc = centered_distances(q, &t_rc, options.n_median_bins)?;
        let best_rc = best_alignment(&d_rc, q.width(), t.width());
        if best_rc.score > best_fwd.score {
            (best_rc, Strand::Reverse, d_rc)
        } else {
            (best_fwd, Strand::Forward, d_fwd)
        }
    } else {
        (best_fwd, Strand::Forward, d_fwd)
    };

    let p_value = match options.p_value {
        PValueMode::Heuristic => (-best.score.abs() / 100.0).exp().max(1e-15),
        PValueMode::TargetColumns => {
            convolution_p_value(&d, &best, q.width(), t.width(), options.n_score_bins)
        }
    };

    Ok(Comparison {
        score: best.score,
        offset: best.offset,
        overlap: best.overlap,
        strand,
        p_value,
    })
}

/// Column distance matrix `d[tp][qp] = -sqrt(sum_a (q - t)^2)`, recentered
/// by subtracting each query column's binned median over the target
/// columns.
fn centered_distances(query: &Pwm, target: &Pwm, n_median_bins: usize) -> Result<Vec<Vec<f64>>> {
    let wq = query.width();
    let wt = target.width();
    let qm = query.matrix();
    let tm = target.matrix();

    let mut d = vec![vec![0.0f64; wq]; wt];
    for (tp, trow) in tm.iter().enumerate() {
        for (qp, qrow) in qm.iter().enumerate() {
            let mut ss = 0.0;
            for a in 0..4 {
                let diff = qrow[a] - trow[a];
                ss += diff * diff;
            }
            d[tp][qp] = -ss.sqrt();
        }
    }

    let counts = vec![1.0; wt];
    let mut column = vec![0.0; wt];
    for qp in 0..wq {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for tp in 0..wt {
            column[tp] = d[tp][qp];
            lo = lo.min(column[tp]);
            hi = hi.max(column[tp]);
        }
        let m = binned_median(&column, &counts, lo, hi, n_median_bins)?;
        for tp in 0..wt {
            d[tp][qp] -= m;
        }
    }
    Ok(d)
}

/// Score every ungapped offset of the query against the target. `offset` is
/// the target position under the query's first column; ascending iteration
/// resolves score ties toward the smallest offset.
fn best_alignment(d: &[Vec<f64>], wq: usize, wt: usize) -> Alignment {
    let mut best = Alignment {
        offset: 0,
        overlap: 0,
        score: f64::NEG_INFINITY,
    };
    for offset in -(wq as i64 - 1)..=(wt as i64 - 1) {
        let mut score = 0.0;
        let mut overlap = 0usize;
        for qp in 0..wq {
            let tp = qp as i64 + offset;
            if tp >= 0 && (tp as usize) < wt {
                score += d[tp as usize][qp];
                overlap += 1;
            }
        }
        if score > best.score {
            best = Alignment {
                offset,
                overlap,
                score,
            };
        }
    }
    best
}

/// Exact survival probability of the reported alignment under the
/// target-columns null: each overlap column's score is an independent
/// uniform draw from that query column's centered scores.
///
/// The observed score is re-derived from the same discretized cells the
/// convolution uses, so the lookup cannot drift out of the attainable range
/// the way a floor of the real-valued score could.
fn convolution_p_value(
    d: &[Vec<f64>],
    best: &Alignment,
    wq: usize,
    wt: usize,
    n_score_bins: usize,
) -> f64 {
    let cols: Vec<usize> = (0..wq)
        .filter(|&qp| {
            let tp = qp as i64 + best.offset;
            tp >= 0 && (tp as usize) < wt
        })
        .collect();

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &qp in &cols {
        for tp in 0..wt {
            lo = lo.min(d[tp][qp]);
            hi = hi.max(d[tp][qp]);
        }
    }
    if hi == lo {
        // Every draw is identical and the null score is deterministic.
        let deterministic = lo * cols.len() as f64;
        return if best.score <= deterministic + 1e-12 {
            1.0
        } else {
            0.0
        };
    }

    let bin = (hi - lo) / n_score_bins as f64;
    let columns: Vec<Vec<i64>> = cols
        .iter()
        .map(|&qp| {
            (0..wt)
                .map(|tp| (d[tp][qp] / bin).round() as i64)
                .collect()
        })
        .collect();
    let log2_choice = -(wt as f64).log2();
    let (smallest, log_sf) = convolve_columns(&columns, log2_choice);

    let observed: i64 = cols
        .iter()
        .map(|&qp| {
            let tp = (qp as i64 + best.offset) as usize;
            (d[tp][qp] / bin).round() as i64
        })
        .sum();
    let k = (observed - smallest).clamp(0, log_sf.len() as i64 - 1) as usize;
    log_sf[k].to_prob()
}
