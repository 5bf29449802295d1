//! Log-space probability arithmetic in base 2.
//!
//! [`Log2Prob`] represents probabilities as base-2 logarithms, preventing
//! underflow in chains of small probabilities. It is the cell type of the
//! discretized score distributions in `velella-motif`, where survival
//! probabilities routinely reach 2^-60 and below.

use crate::{Result, VelellaError};

/// A probability stored as its base-2 logarithm: `log2(p)`.
///
/// Finite values are <= 0, with 0.0 representing certainty (p = 1) and
/// negative infinity representing impossibility (p = 0). Positive infinity
/// is absorbing in [`Log2Prob::add`], so a saturated accumulation stays
/// saturated instead of producing NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Log2Prob(pub f64);

impl Log2Prob {
    /// Create a [`Log2Prob`] from a raw probability in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `p` is not in `(0, 1]`.
    pub fn from_prob(p: f64) -> Result<Self> {
        if p <= 0.0 || p > 1.0 {
            return Err(VelellaError::InvalidInput(
                "Log2Prob::from_prob: p must be in (0, 1]".into(),
            ));
        }
        Ok(Self(p.log2()))
    }

    /// Convert back to a raw probability.
    pub fn to_prob(self) -> f64 {
        self.0.exp2()
    }

    /// Log-sum-exp in base 2: `log2(2^x + 2^y)` without overflow.
    ///
    /// Identity elements: two impossible inputs stay impossible, and an
    /// infinite input is absorbing. For finite inputs the relative error is
    /// bounded by 2^-45 regardless of how far apart `x` and `y` are.
    pub fn add(self, other: Self) -> Self {
        if self.0 == f64::INFINITY || other.0 == f64::INFINITY {
            return Self(f64::INFINITY);
        }
        if self.0 == f64::NEG_INFINITY {
            return other;
        }
        if other.0 == f64::NEG_INFINITY {
            return self;
        }
        let (max, min) = if self.0 >= other.0 {
            (self.0, other.0)
        } else {
            (other.0, self.0)
        };
        Self(max + (min - max).exp2().ln_1p() * core::f64::consts::LOG2_E)
    }

    /// Multiply two probabilities in log-space (addition of log values).
    pub fn mul(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    /// Certain event: `log2(1) = 0`.
    pub const fn certain() -> Self {
        Self(0.0)
    }

    /// Impossible event: `log2(0) = -inf`.
    pub const fn impossible() -> Self {
        Self(f64::NEG_INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn from_prob_one() {
        let lp = Log2Prob::from_prob(1.0).unwrap();
        assert!((lp.0 - 0.0).abs() < TOL);
    }

    #[test]
    fn from_prob_quarter() {
        let lp = Log2Prob::from_prob(0.25).unwrap();
        assert!((lp.0 + 2.0).abs() < TOL);
    }

    #[test]
    fn roundtrip() {
        let p = 0.001;
        let lp = Log2Prob::from_prob(p).unwrap();
        assert!((lp.to_prob() - p).abs() < TOL);
    }

    #[test]
    fn invalid_probabilities() {
        assert!(Log2Prob::from_prob(0.0).is_err());
        assert!(Log2Prob::from_prob(-0.5).is_err());
        assert!(Log2Prob::from_prob(1.5).is_err());
    }

    #[test]
    fn certain_impossible() {
        assert_eq!(Log2Prob::certain().0, 0.0);
        assert_eq!(Log2Prob::certain().to_prob(), 1.0);
        assert_eq!(Log2Prob::impossible().0, f64::NEG_INFINITY);
        assert_eq!(Log2Prob::impossible().to_prob(), 0.0);
    }

    #[test]
    fn mul_is_log_addition() {
        let a = Log2Prob::from_prob(0.5).unwrap();
        let b = Log2Prob::from_prob(0.5).unwrap();
        assert!((a.mul(b).to_prob() - 0.25).abs() < TOL);
    }

    #[test]
    fn add_matches_linear_sum() {
        let a = Log2Prob::from_prob(0.3).unwrap();
        let b = Log2Prob::from_prob(0.2).unwrap();
        assert!((a.add(b).to_prob() - 0.5).abs() < TOL);
    }

    #[test]
    fn add_identity_elements() {
        let a = Log2Prob::from_prob(0.7).unwrap();
        let sum = a.add(Log2Prob::impossible());
        assert!((sum.to_prob() - 0.7).abs() < TOL);
        let sum2 = Log2Prob::impossible().add(a);
        assert!((sum2.to_prob() - 0.7).abs() < TOL);

        let both = Log2Prob::impossible().add(Log2Prob::impossible());
        assert_eq!(both.0, f64::NEG_INFINITY);
    }

    #[test]
    fn add_positive_infinity_absorbs() {
        let a = Log2Prob(f64::INFINITY);
        let b = Log2Prob(-3.0);
        assert_eq!(a.add(b).0, f64::INFINITY);
        assert_eq!(b.add(a).0, f64::INFINITY);
    }

    #[test]
    fn add_no_overflow_for_distant_operands() {
        // 2^(x - y) would overflow a naive evaluation; the result must
        // collapse to the larger operand.
        let a = Log2Prob(0.0);
        let b = Log2Prob(-2000.0);
        let sum = a.add(b);
        assert!((sum.0 - 0.0).abs() < 1e-12);

        let c = Log2Prob(-1e6);
        let d = Log2Prob(-2e6);
        assert!((c.add(d).0 - -1e6).abs() < 1e-6);
    }

    #[test]
    fn add_equal_operands_gains_one_bit() {
        let a = Log2Prob(-10.0);
        let sum = a.add(a);
        assert!((sum.0 + 9.0).abs() < TOL);
    }

    #[test]
    fn add_relative_error_within_bound() {
        // Compare against the naive form where it is still representable.
        for gap in [0.0_f64, 1.0, 5.0, 20.0, 40.0] {
            let x = -3.0;
            let y = x - gap;
            let exact = (x.exp2() + y.exp2()).log2();
            let got = Log2Prob(x).add(Log2Prob(y)).0;
            let rel = ((got - exact) / exact).abs();
            assert!(rel < 2.0_f64.powi(-45), "gap {}: rel err {}", gap, rel);
        }
    }
}
