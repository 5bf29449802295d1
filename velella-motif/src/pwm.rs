//! Position weight matrices for DNA motifs.
//!
//! [`Pwm`] holds per-position base probabilities over the fixed ACGT
//! alphabet (A=0, C=1, G=2, T=3) and converts to the log-odds form
//! [`LogPwm`] that the scanners score with.

use velella_core::{Result, VelellaError};

/// Uniform background probability for each of the four bases.
pub const UNIFORM_BACKGROUND: f64 = 0.25;

/// Default additive pseudocount applied before the log-odds transform.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Strand orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

/// A Position Weight Matrix for DNA motifs.
///
/// `matrix[pos] = [p_A, p_C, p_G, p_T]`, one row per motif position, each
/// row summing to approximately 1. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Pwm {
    matrix: Vec<[f64; 4]>,
}

impl Pwm {
    /// Create a PWM from per-position probability rows.
    ///
    /// # Errors
    ///
    /// Returns an error if `matrix` is empty or contains a non-finite cell.
    pub fn new(matrix: Vec<[f64; 4]>) -> Result<Self> {
        if matrix.is_empty() {
            return Err(VelellaError::InvalidInput(
                "Pwm: matrix must have at least one position".into(),
            ));
        }
        for (pos, row) in matrix.iter().enumerate() {
            if row.iter().any(|x| !x.is_finite()) {
                return Err(VelellaError::InvalidInput(format!(
                    "Pwm: non-finite probability at position {}",
                    pos
                )));
            }
        }
        Ok(Self { matrix })
    }

    /// Motif width (number of positions).
    pub fn width(&self) -> usize {
        self.matrix.len()
    }

    /// The probability rows.
    pub fn matrix(&self) -> &[[f64; 4]] {
        &self.matrix
    }

    /// Reverse complement: reverses position order and swaps the A/T and
    /// C/G columns.
    pub fn reverse_complement(&self) -> Self {
        let matrix = self
            .matrix
            .iter()
            .rev()
            .map(|row| [row[3], row[2], row[1], row[0]])
            .collect();
        Self { matrix }
    }

    /// Convert to log-odds over the uniform background:
    /// `log2((p + eps) / 0.25)` per cell.
    ///
    /// # Errors
    ///
    /// Returns an error if `eps` is not positive and finite. A positive
    /// pseudocount is what keeps zero-probability cells out of negative
    /// infinity, which the score distribution cannot discretize.
    pub fn log_odds(&self, eps: f64) -> Result<LogPwm> {
        if !(eps > 0.0) || !eps.is_finite() {
            return Err(VelellaError::InvalidInput(format!(
                "Pwm::log_odds: eps must be positive and finite, got {}",
                eps
            )));
        }
        let matrix = self
            .matrix
            .iter()
            .map(|row| {
                let mut out = [0.0; 4];
                for (j, &p) in row.iter().enumerate() {
                    out[j] = ((p + eps) / UNIFORM_BACKGROUND).log2();
                }
                out
            })
            .collect();
        Ok(LogPwm { matrix })
    }

    /// Information content at each position (in bits).
    ///
    /// IC = 2 - H, where H = -sum(p * log2(p)).
    pub fn information_content(&self) -> Vec<f64> {
        self.matrix
            .iter()
            .map(|row| {
                let entropy: f64 = row
                    .iter()
                    .filter(|&&p| p > 0.0)
                    .map(|&p| -p * p.log2())
                    .sum();
                2.0 - entropy
            })
            .collect()
    }

    /// Total information content of the motif (sum across positions).
    pub fn total_information(&self) -> f64 {
        self.information_content().iter().sum()
    }

    /// Consensus sequence of this PWM. See [`consensus`].
    pub fn consensus(&self, force: bool) -> Result<String> {
        consensus(&self.matrix, force)
    }
}

/// Log-odds matrix: `log2((p + eps) / 0.25)` per cell, same layout as
/// [`Pwm`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogPwm {
    matrix: Vec<[f64; 4]>,
}

impl LogPwm {
    /// Create a log-odds matrix from raw cells.
    ///
    /// # Errors
    ///
    /// Returns an error if `matrix` is empty or contains a non-finite cell.
    pub fn new(matrix: Vec<[f64; 4]>) -> Result<Self> {
        if matrix.is_empty() {
            return Err(VelellaError::InvalidInput(
                "LogPwm: matrix must have at least one position".into(),
            ));
        }
        for (pos, row) in matrix.iter().enumerate() {
            if row.iter().any(|x| !x.is_finite()) {
                return Err(VelellaError::InvalidInput(format!(
                    "LogPwm: non-finite cell at position {}",
                    pos
                )));
            }
        }
        Ok(Self { matrix })
    }

    /// Motif width (number of positions).
    pub fn width(&self) -> usize {
        self.matrix.len()
    }

    /// The log-odds rows.
    pub fn matrix(&self) -> &[[f64; 4]] {
        &self.matrix
    }

    /// The lowest window score this matrix can produce.
    pub fn min_score(&self) -> f64 {
        self.matrix
            .iter()
            .map(|row| row.iter().cloned().fold(f64::INFINITY, f64::min))
            .sum()
    }

    /// The highest window score this matrix can produce.
    pub fn max_score(&self) -> f64 {
        self.matrix
            .iter()
            .map(|row| row.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
            .sum()
    }
}

/// Consensus sequence of a probability (or one-hot) matrix: the argmax base
/// at each position.
///
/// # Errors
///
/// A position where the maximum is shared by more than one base is reported
/// as [`VelellaError::InvalidInput`] unless `force` is set, in which case
/// the first of the tied bases wins.
pub fn consensus(matrix: &[[f64; 4]], force: bool) -> Result<String> {
    const BASES: [char; 4] = ['A', 'C', 'G', 'T'];
    let mut out = String::with_capacity(matrix.len());
    for (pos, row) in matrix.iter().enumerate() {
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let ties = row.iter().filter(|&&x| x == max).count();
        if ties > 1 && !force {
            return Err(VelellaError::InvalidInput(format!(
                "consensus: ambiguous column at position {}",
                pos
            )));
        }
        let idx = row.iter().position(|&x| x == max).unwrap_or(0);
        out.push(BASES[idx]);
    }
    Ok(out)
}
