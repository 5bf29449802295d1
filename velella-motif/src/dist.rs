//! Discretized score distributions for p-value assignment.
//!
//! Maps a log-odds matrix to the exact distribution of window scores over
//! all length-w words drawn from the uniform background. Cell scores are
//! discretized into fixed-width bins, the per-position distributions are
//! convolved in log2 space, and the resulting log-PDF is folded in place
//! into a log2 survival function so that a window score looks up
//! `Pr(S >= score)` directly.

use velella_core::{Log2Prob, Result, VelellaError};

use crate::pwm::LogPwm;

/// Log2 of the uniform per-base background probability.
const LOG2_BACKGROUND: f64 = -2.0;

/// Default bin width for score discretization.
pub const DEFAULT_BIN_SIZE: f64 = 0.1;

/// Convolve per-column integer score distributions into a log2 survival
/// function.
///
/// `columns[j]` holds the integer score of every equally-likely choice at
/// column `j`, and `log2_choice` the log2 probability of one choice. The
/// returned `smallest` is the integer score of bin 0; the vector is sized by
/// the cumulative extrema of the columns plus one slack bin per column, so
/// that a floor-based lookup one bin above the attainable maximum still
/// lands in range.
pub(crate) fn convolve_columns(
    columns: &[Vec<i64>],
    log2_choice: f64,
) -> (i64, Vec<Log2Prob>) {
    debug_assert!(!columns.is_empty());
    debug_assert!(columns.iter().all(|c| !c.is_empty()));

    // Range bounds: running cumulative column extrema, tracked over every
    // prefix so intermediate convolution states stay in bounds even when a
    // column is entirely positive or entirely negative.
    let mut min_csum = 0i64;
    let mut max_csum = 0i64;
    let mut smallest = i64::MAX;
    let mut largest = i64::MIN;
    for col in columns {
        min_csum += col.iter().copied().min().unwrap();
        max_csum += col.iter().copied().max().unwrap();
        smallest = smallest.min(min_csum);
        largest = largest.max(max_csum);
    }
    largest += columns.len() as i64;
    let size = (largest - smallest + 1) as usize;

    // Forward convolution over two swap buffers.
    let choice = Log2Prob(log2_choice);
    let mut old = vec![Log2Prob::impossible(); size];
    let mut new = vec![Log2Prob::impossible(); size];
    for &s in &columns[0] {
        let idx = (s - smallest) as usize;
        old[idx] = old[idx].add(choice);
    }
    for col in &columns[1..] {
        for cell in new.iter_mut() {
            *cell = Log2Prob::impossible();
        }
        for k in 0..size {
            let mass = old[k];
            if mass.0 == f64::NEG_INFINITY {
                continue;
            }
            for &s in col {
                let idx = (k as i64 + s) as usize;
                new[idx] = new[idx].add(choice.mul(mass));
            }
        }
        std::mem::swap(&mut old, &mut new);
    }

    // In-place tail accumulation: log-PDF becomes log survival function.
    for i in (0..size - 1).rev() {
        old[i] = old[i].add(old[i + 1]);
    }

    (smallest, old)
}

/// The discretized score distribution of a [`LogPwm`] under the uniform
/// background, stored as a log2 survival function.
#[derive(Debug, Clone)]
pub struct ScoreDistribution {
    smallest: i64,
    bin_size: f64,
    log_pdf: Vec<Log2Prob>,
}

impl ScoreDistribution {
    /// Build the distribution for `log_pwm` with the given bin width.
    ///
    /// # Errors
    ///
    /// A non-positive or non-finite `bin_size` is a programming error and
    /// fails hard with [`VelellaError::InvalidInput`].
    pub fn from_log_pwm(log_pwm: &LogPwm, bin_size: f64) -> Result<Self> {
        if !(bin_size > 0.0) || !bin_size.is_finite() {
            return Err(VelellaError::InvalidInput(format!(
                "ScoreDistribution: bin_size must be positive and finite, got {}",
                bin_size
            )));
        }

        let columns: Vec<Vec<i64>> = log_pwm
            .matrix()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&x| (x / bin_size).round() as i64)
                    .collect()
            })
            .collect();

        let (smallest, log_pdf) = convolve_columns(&columns, LOG2_BACKGROUND);
        Ok(Self {
            smallest,
            bin_size,
            log_pdf,
        })
    }

    /// Integer score (in bin units) of bin 0.
    pub fn smallest(&self) -> i64 {
        self.smallest
    }

    /// Bin width used for discretization.
    pub fn bin_size(&self) -> f64 {
        self.bin_size
    }

    /// The log2 survival function: `log_pdf()[k]` is
    /// `log2 Pr(S >= (k + smallest) * bin_size)`.
    pub fn log_pdf(&self) -> &[Log2Prob] {
        &self.log_pdf
    }

    /// Survival probability of a real-valued window score. The bin lookup
    /// floors the score and clamps into range, so out-of-range scores
    /// saturate at 1 (below) or the top bin's mass (above).
    pub fn p_value(&self, score: f64) -> f64 {
        let k = ((score / self.bin_size).floor() as i64 - self.smallest)
            .clamp(0, self.log_pdf.len() as i64 - 1) as usize;
        self.log_pdf[k].to_prob()
    }

    /// The lowest real score whose survival probability falls below
    /// `threshold`, or positive infinity if no bin does (no window can then
    /// be reported at all).
    pub fn score_threshold(&self, threshold: f64) -> f64 {
        let log_threshold = threshold.log2();
        for (k, p) in self.log_pdf.iter().enumerate() {
            if p.0 < log_threshold {
                return (k as i64 + self.smallest) as f64 * self.bin_size;
            }
        }
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pwm::{Pwm, DEFAULT_EPSILON};

    const TOL: f64 = 1e-9;

    fn dist_for(matrix: Vec<[f64; 4]>) -> ScoreDistribution {
        let pwm = Pwm::new(matrix).unwrap();
        let lp = pwm.log_odds(DEFAULT_EPSILON).unwrap();
        ScoreDistribution::from_log_pwm(&lp, DEFAULT_BIN_SIZE).unwrap()
    }

    #[test]
    fn survival_starts_at_certainty() {
        let dist = dist_for(vec![[0.8, 0.1, 0.05, 0.05], [0.1, 0.7, 0.1, 0.1]]);
        assert!(dist.log_pdf()[0].0.abs() < 1e-9);
    }

    #[test]
    fn survival_is_non_increasing() {
        let dist = dist_for(vec![
            [0.8, 0.1, 0.05, 0.05],
            [0.1, 0.7, 0.1, 0.1],
            [0.1, 0.2, 0.6, 0.1],
        ]);
        for pair in dist.log_pdf().windows(2) {
            assert!(pair[0].0 >= pair[1].0);
        }
    }

    #[test]
    fn constant_log_pwm_masses_one_bin() {
        // Every cell -1: all 64 words share one score, so the survival
        // function is 1 up to that bin and 0 beyond it.
        let lp = LogPwm::new(vec![[-1.0; 4]; 3]).unwrap();
        let dist = ScoreDistribution::from_log_pwm(&lp, 0.1).unwrap();
        assert!(dist.log_pdf().len() >= 4);
        assert!(dist.log_pdf()[0].0.abs() < TOL);
        assert_eq!(dist.smallest(), -30);
        // The whole mass sits at the minimum bin.
        assert!(dist.log_pdf()[1].0 == f64::NEG_INFINITY || dist.log_pdf()[1].0 < -50.0);
    }

    #[test]
    fn one_hot_motif_max_word_p_is_four_to_minus_w() {
        // A perfectly conserved motif: exactly one word attains the max, so
        // its survival probability is (1/4)^w.
        let dist = dist_for(vec![
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ]);
        let pwm = Pwm::new(vec![
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ])
        .unwrap();
        let max = pwm.log_odds(DEFAULT_EPSILON).unwrap().max_score();
        let p = dist.p_value(max);
        assert!((p - 0.25f64.powi(3)).abs() < 1e-12);
    }

    #[test]
    fn max_word_p_at_least_four_to_minus_w() {
        for matrix in [
            vec![[0.8, 0.1, 0.05, 0.05], [0.1, 0.7, 0.1, 0.1]],
            vec![[0.25; 4]; 3],
            vec![[0.4, 0.3, 0.2, 0.1]],
        ] {
            let w = matrix.len() as i32;
            let pwm = Pwm::new(matrix).unwrap();
            let lp = pwm.log_odds(DEFAULT_EPSILON).unwrap();
            let dist = ScoreDistribution::from_log_pwm(&lp, DEFAULT_BIN_SIZE).unwrap();
            let p = dist.p_value(lp.max_score());
            assert!(
                p >= 0.25f64.powi(w) - 1e-12,
                "p {} below 4^-{}",
                p,
                w
            );
        }
    }

    #[test]
    fn minimum_score_has_survival_one() {
        let pwm = Pwm::new(vec![[0.8, 0.1, 0.05, 0.05], [0.1, 0.7, 0.1, 0.1]]).unwrap();
        let lp = pwm.log_odds(DEFAULT_EPSILON).unwrap();
        let dist = ScoreDistribution::from_log_pwm(&lp, DEFAULT_BIN_SIZE).unwrap();
        assert!((dist.p_value(lp.min_score()) - 1.0).abs() < 1e-9);
        assert!((dist.p_value(-1e6) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_column_distribution() {
        // One position: the survival function steps at each distinct cell.
        let dist = dist_for(vec![[0.7, 0.1, 0.1, 0.1]]);
        // Below every cell: certainty.
        assert!((dist.p_value(-10.0) - 1.0).abs() < TOL);
        // Above every cell: the top bin is empty slack.
        assert!(dist.p_value(10.0) < 1e-12);
        // At the consensus cell: exactly one of four symbols.
        let top = ((0.7f64 + DEFAULT_EPSILON) / 0.25).log2();
        assert!((dist.p_value(top) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn score_threshold_walks_the_tail() {
        let dist = dist_for(vec![
            [0.8, 0.1, 0.05, 0.05],
            [0.1, 0.8, 0.05, 0.05],
        ]);
        let t = dist.score_threshold(0.5);
        // Scores above the threshold have survival below 0.5 (one bin of
        // floor/round slack is allowed).
        let p = dist.p_value(t + dist.bin_size());
        assert!(p <= 0.5 + 1e-9, "p {} above threshold", p);
        // Nothing can pass a zero threshold.
        assert_eq!(dist.score_threshold(0.0), f64::INFINITY);
    }

    #[test]
    fn bin_size_must_be_positive() {
        let lp = LogPwm::new(vec![[-1.0; 4]]).unwrap();
        assert!(ScoreDistribution::from_log_pwm(&lp, 0.0).is_err());
        assert!(ScoreDistribution::from_log_pwm(&lp, -0.1).is_err());
        assert!(ScoreDistribution::from_log_pwm(&lp, f64::NAN).is_err());
    }

    #[test]
    fn smaller_bins_refine_the_tail() {
        let pwm = Pwm::new(vec![[0.8, 0.1, 0.05, 0.05], [0.1, 0.7, 0.1, 0.1]]).unwrap();
        let lp = pwm.log_odds(DEFAULT_EPSILON).unwrap();
        let coarse = ScoreDistribution::from_log_pwm(&lp, 0.5).unwrap();
        let fine = ScoreDistribution::from_log_pwm(&lp, 0.01).unwrap();
        assert!(fine.log_pdf().len() > coarse.log_pdf().len());
        // Both agree on certainty at the bottom.
        assert!(coarse.log_pdf()[0].0.abs() < TOL);
        assert!(fine.log_pdf()[0].0.abs() < TOL);
    }
}
