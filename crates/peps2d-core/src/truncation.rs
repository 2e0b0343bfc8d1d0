//! Truncation controls for bond compression.

/// How aggressively a bond may be truncated.
///
/// Both fields are optional and independent: `rtol` bounds the relative
/// Frobenius error of the discarded singular weight, `max_rank` caps the
/// retained bond dimension. With both unset the compression is exact up to
/// floating point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TruncationParams {
    /// Relative discarded-weight tolerance: keep the smallest rank `r` with
    /// `sum_{i>r} s_i^2 <= rtol^2 * sum_i s_i^2`.
    pub rtol: Option<f64>,
    /// Hard cap on the retained rank.
    pub max_rank: Option<usize>,
}

impl TruncationParams {
    /// No truncation at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relative tolerance.
    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = Some(rtol);
        self
    }

    /// Set the maximum retained rank.
    pub fn with_max_rank(mut self, max_rank: usize) -> Self {
        self.max_rank = Some(max_rank);
        self
    }
}

/// Rank retained by `params` for singular values `s` (descending order).
///
/// Always keeps at least one singular value; discarding below tolerance is
/// the intended lossy step and never an error.
pub fn retained_rank(s: &[f64], params: &TruncationParams) -> usize {
    let mut r = s.len();

    if let Some(rtol) = params.rtol {
        let total: f64 = s.iter().map(|x| x * x).sum();
        if total > 0.0 {
            let threshold = rtol * rtol * total;
            let mut discarded = 0.0;
            // accumulate discarded weight from the tail
            for i in (0..s.len()).rev() {
                let w = s[i] * s[i];
                if discarded + w <= threshold {
                    discarded += w;
                    r = i;
                } else {
                    break;
                }
            }
        }
    }

    if let Some(max_rank) = params.max_rank {
        r = r.min(max_rank);
    }

    r.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_params_keeps_all() {
        let s = [3.0, 2.0, 1.0];
        assert_eq!(retained_rank(&s, &TruncationParams::new()), 3);
    }

    #[test]
    fn max_rank_caps() {
        let s = [3.0, 2.0, 1.0];
        let p = TruncationParams::new().with_max_rank(2);
        assert_eq!(retained_rank(&s, &p), 2);
    }

    #[test]
    fn rtol_drops_tail() {
        let s = [1.0, 1e-9, 1e-10];
        let p = TruncationParams::new().with_rtol(1e-6);
        assert_eq!(retained_rank(&s, &p), 1);
    }

    #[test]
    fn keeps_at_least_one() {
        let s = [0.0, 0.0];
        let p = TruncationParams::new().with_rtol(0.5).with_max_rank(0);
        assert_eq!(retained_rank(&s, &p), 1);
    }
}
