//! Verdict-distribution entropy.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::troolean::Troolean;

use super::count::VerdictCount;

/// Largest bit length converted to `f64` without scaling.
const MAX_EXACT_BITS: u64 = 1000;

/// Shannon entropy (base 2) of the verdict distribution.
///
/// Zero for an empty count; `0 · log2(0)` is taken as 0. Counts too large
/// for `f64` are scaled down together before conversion.
#[must_use]
pub fn entropy(verdicts: &VerdictCount) -> f64 {
    let total = verdicts.total();
    if total.is_zero() {
        return 0.0;
    }
    let shift = total.bits().saturating_sub(MAX_EXACT_BITS);
    let scaled = |n: &BigUint| (n >> shift).to_f64().unwrap_or(0.0);

    let denominator = scaled(&total);
    Troolean::ALL
        .iter()
        .map(|v| scaled(verdicts.get(*v)) / denominator)
        .filter(|p| *p > 0.0)
        .map(|p| -p * p.log2())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_zero_total() {
        assert_eq!(entropy(&VerdictCount::new()), 0.0);
    }

    #[test]
    fn test_decided_distribution_has_no_entropy() {
        assert!(approx(entropy(&VerdictCount::from_counts(7, 0, 0)), 0.0));
    }

    #[test]
    fn test_uniform_distributions() {
        assert!(approx(entropy(&VerdictCount::from_counts(1, 1, 0)), 1.0));
        assert!(approx(entropy(&VerdictCount::from_counts(4, 4, 4)), 3f64.log2()));
    }

    #[test]
    fn test_huge_counts_stay_finite() {
        let huge = BigUint::from(1u32) << 5000u32;
        let mut verdicts = VerdictCount::new();
        verdicts.increment(Troolean::True, &huge);
        verdicts.increment(Troolean::False, &huge);
        let h = entropy(&verdicts);
        assert!(h.is_finite());
        assert!(approx(h, 1.0));
    }
}
