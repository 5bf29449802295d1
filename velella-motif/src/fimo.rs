//! FIMO-style motif scanning with distribution-derived p-values.
//!
//! For each motif the scanner builds a log-odds matrix and its exact
//! discretized score distribution, derives the score cutoff matching the
//! requested p-value threshold, and slides the matrix over every sequence
//! window on one or both strands.

use velella_core::Result;

use crate::dist::{ScoreDistribution, DEFAULT_BIN_SIZE};
use crate::meme::Motif;
use crate::onehot::OneHot;
use crate::pwm::{LogPwm, Strand, DEFAULT_EPSILON};

/// Options for [`fimo`].
#[derive(Debug, Clone)]
pub struct FimoOptions {
    /// Maximum allowed p-value for a reported hit.
    pub threshold: f64,
    /// Bin width for the score distribution.
    pub bin_size: f64,
    /// Additive pseudocount for the log-odds transform.
    pub eps: f64,
    /// Also scan the reverse complement of each sequence. Reverse-strand
    /// hits carry positions in the reverse-complement coordinate frame
    /// (0-based from the 5' end of the reverse complement); they are not
    /// translated back to forward coordinates.
    pub reverse_complement: bool,
}

impl Default for FimoOptions {
    fn default() -> Self {
        Self {
            threshold: 1e-4,
            bin_size: DEFAULT_BIN_SIZE,
            eps: DEFAULT_EPSILON,
            reverse_complement: true,
        }
    }
}

/// A single motif occurrence.
#[derive(Debug, Clone)]
pub struct Hit {
    /// Index of the sequence the hit was found in.
    pub sequence: usize,
    /// 0-based window start, in the coordinate frame of `strand`.
    pub start: usize,
    /// Exclusive window end (`start + width`).
    pub end: usize,
    /// Strand the window was scored on.
    pub strand: Strand,
    /// Log-odds score of the window.
    pub score: f64,
    /// Survival probability of the score under the uniform background.
    pub p_value: f64,
}

/// All hits for one motif across the scanned sequences.
#[derive(Debug, Clone)]
pub struct MotifResult {
    /// Name of the motif the hits belong to.
    pub name: String,
    /// Hits in scan order: per sequence, forward strand then reverse,
    /// each in ascending start position.
    pub hits: Vec<Hit>,
}

/// Scan `sequences` with `motifs` and report every window whose p-value
/// passes `options.threshold`.
///
/// Results are one [`MotifResult`] per motif, in motif order; hit order
/// within a result is deterministic (see [`MotifResult::hits`]) whether or
/// not the `parallel` feature is enabled.
///
/// # Errors
///
/// Fails on sequences containing symbols outside the alphabet and ignore
/// set, and on invalid `bin_size`/`eps` options. An empty motif or sequence
/// list is not an error and yields empty results.
pub fn fimo(
    motifs: &[Motif],
    sequences: &[&[u8]],
    options: &FimoOptions,
) -> Result<Vec<MotifResult>> {
    // Encode every sequence once; the per-motif scans share the encodings.
    let forward: Vec<OneHot> = sequences
        .iter()
        .map(|s| OneHot::encode(s))
        .collect::<Result<_>>()?;
    let reverse: Option<Vec<OneHot>> = options
        .reverse_complement
        .then(|| forward.iter().map(OneHot::reverse_complement).collect());

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        motifs
            .par_iter()
            .map(|m| scan_motif(m, &forward, reverse.as_deref(), options))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        motifs
            .iter()
            .map(|m| scan_motif(m, &forward, reverse.as_deref(), options))
            .collect()
    }
}

fn scan_motif(
    motif: &Motif,
    forward: &[OneHot],
    reverse: Option<&[OneHot]>,
    options: &FimoOptions,
) -> Result<MotifResult> {
    let log_pwm = motif.pwm.log_odds(options.eps)?;
    let dist = ScoreDistribution::from_log_pwm(&log_pwm, options.bin_size)?;
    let score_threshold = dist.score_threshold(options.threshold);

    let mut hits = Vec::new();
    for (si, onehot) in forward.iter().enumerate() {
        scan_strand(
            &log_pwm,
            &dist,
            onehot,
            si,
            Strand::Forward,
            score_threshold,
            &mut hits,
        );
        if let Some(reverse) = reverse {
            scan_strand(
                &log_pwm,
                &dist,
                &reverse[si],
                si,
                Strand::Reverse,
                score_threshold,
                &mut hits,
            );
        }
    }

    Ok(MotifResult {
        name: motif.name.clone(),
        hits,
    })
}

fn scan_strand(
    log_pwm: &LogPwm,
    dist: &ScoreDistribution,
    onehot: &OneHot,
    sequence: usize,
    strand: Strand,
    score_threshold: f64,
    hits: &mut Vec<Hit>,
) {
    let w = log_pwm.width();
    if onehot.len() < w {
        return;
    }
    let matrix = log_pwm.matrix();
    for start in 0..=onehot.len() - w {
        let mut score = 0.0;
        for (j, row) in matrix.iter().enumerate() {
            // Ignored bases contribute nothing to the window score.
            if let Some(a) = onehot.symbol_index(start + j) {
                score += row[a];
            }
        }
        if score > score_threshold {
            hits.push(Hit {
                sequence,
                start,
                end: start + w,
                strand,
                score,
                p_value: dist.p_value(score),
            });
        }
    }
}
