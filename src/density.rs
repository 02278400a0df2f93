//! Weight-adjusted Hardy–Littlewood density predictions.
//!
//! For a residue a mod m the predicted twin count below N is
//!
//!   2 · C2 · N/ln²N · (S(m, a) / φ₂) · (1 + k*(a)/ln N)
//!
//! where S is the singular-series correction over the prime factors of m
//! that divide a(a+2), φ₂ is the number of admissible residues, and k*(a)
//! is the iterated Collatz weight (1 when no weight is recorded). All
//! logarithms are natural, matching the Hardy–Littlewood asymptotic.

use crate::residues::AdmissibleSet;
use crate::weights::WeightMap;
use crate::AnalysisError;

/// Hardy–Littlewood twin prime constant.
pub const C2: f64 = 0.6601618158468696;

/// Distinct prime factors of m by trial division, ascending.
pub fn distinct_prime_factors(m: u64) -> Vec<u64> {
    let mut factors = Vec::new();
    let mut n = m;

    if n % 2 == 0 {
        factors.push(2);
        while n % 2 == 0 {
            n /= 2;
        }
    }

    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            factors.push(d);
            while n % d == 0 {
                n /= d;
            }
        }
        d += 2;
    }
    if n > 1 {
        factors.push(n);
    }

    factors
}

/// Singular-series correction for residue a mod m: the product of
/// 1 + 1/(p-2) over prime factors p of m that divide a(a+2).
///
/// For an admissible residue p = 2 never qualifies (an even m forces a and
/// a+2 odd), so the p-2 denominator is never zero here.
pub fn singular_series(m: u64, a: u64) -> f64 {
    let prod = a as u128 * (a + 2) as u128;
    let mut product = 1.0;
    for p in distinct_prime_factors(m) {
        if prod % p as u128 == 0 {
            debug_assert!(p > 2, "p = 2 cannot divide a(a+2) of an admissible residue");
            product *= 1.0 + 1.0 / (p as f64 - 2.0);
        }
    }
    product
}

/// Predicted twin count below `n` at residue `a` of the admissible set.
///
/// Fails with `InvalidBound` when n ≤ e (the ln²N normalization degenerates)
/// and `EmptyAdmissibleSet` when φ₂ = 0. Otherwise the result is finite and
/// strictly positive.
pub fn predicted_count(
    n: u64,
    set: &AdmissibleSet,
    weights: &WeightMap,
    a: u64,
) -> Result<f64, AnalysisError> {
    // n is integral, so n ≤ e means n ≤ 2.
    if (n as f64) <= std::f64::consts::E {
        return Err(AnalysisError::InvalidBound(n));
    }
    let phi2 = set.len();
    if phi2 == 0 {
        return Err(AnalysisError::EmptyAdmissibleSet(set.modulus()));
    }

    let ln_n = (n as f64).ln();
    let k = weights.iterated(a).unwrap_or(1) as f64;
    let correction = singular_series(set.modulus(), a);

    Ok(2.0 * C2 * (n as f64 / (ln_n * ln_n)) * (correction / phi2 as f64) * (1.0 + k / ln_n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residues::AdmissibleSet;
    use crate::weights::WeightMap;

    #[test]
    fn test_distinct_prime_factors() {
        assert_eq!(distinct_prime_factors(1), Vec::<u64>::new());
        assert_eq!(distinct_prime_factors(16), vec![2]);
        assert_eq!(distinct_prime_factors(30), vec![2, 3, 5]);
        assert_eq!(distinct_prime_factors(60), vec![2, 3, 5]);
        assert_eq!(distinct_prime_factors(210), vec![2, 3, 5, 7]);
        assert_eq!(distinct_prime_factors(97), vec![97]);
    }

    /// The superseded approach scanned the primes below m for divisors of m.
    /// Direct factorization must agree with it, including on composite m
    /// with repeated or large prime factors.
    #[test]
    fn test_factor_scan_equivalence() {
        fn is_prime(n: u64) -> bool {
            n >= 2 && (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0)
        }
        for m in [4u64, 16, 30, 42, 60, 210, 1024, 9699690, 121, 169 * 4] {
            let scanned: Vec<u64> = (2..=m).filter(|&p| is_prime(p) && m % p == 0).collect();
            assert_eq!(distinct_prime_factors(m), scanned, "m = {}", m);
        }
    }

    #[test]
    fn test_singular_series_mod_6() {
        // a = 5: a(a+2) = 35, shares no factor with 6 beyond 1 → product 1.
        assert_eq!(singular_series(6, 5), 1.0);
    }

    #[test]
    fn test_singular_series_mod_30() {
        // a = 13 (hypothetical query): 13·15 shares 3 and 5 with 30:
        // (1 + 1/1)(1 + 1/3) = 8/3.
        let s = singular_series(30, 13);
        assert!((s - 8.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_prediction_positive() {
        for m in [1u64, 6, 16, 30, 42, 60, 210] {
            let set = AdmissibleSet::new(m).unwrap();
            let weights = WeightMap::compute(&set, None);
            for pair in set.pairs() {
                let pred = predicted_count(1_000_000, &set, &weights, pair.a).unwrap();
                assert!(pred > 0.0 && pred.is_finite(), "m = {}, a = {}", m, pair.a);
            }
        }
    }

    #[test]
    fn test_prediction_uses_natural_log() {
        // Hand-computed for N = 1000, m = 6, a = 5: φ₂ = 1, S = 1, k* = 4.
        let set = AdmissibleSet::new(6).unwrap();
        let weights = WeightMap::compute(&set, None);
        let ln = 1000f64.ln();
        let expected = 2.0 * C2 * (1000.0 / (ln * ln)) * (1.0 + 4.0 / ln);
        let got = predicted_count(1000, &set, &weights, 5).unwrap();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn test_prediction_fallback_weight() {
        // Non-convergent residues fall back to k* = 1.
        let set = AdmissibleSet::new(6).unwrap();
        let weights = WeightMap::compute(&set, Some(0));
        assert_eq!(weights.iterated(5), None);
        let ln = 1000f64.ln();
        let expected = 2.0 * C2 * (1000.0 / (ln * ln)) * (1.0 + 1.0 / ln);
        let got = predicted_count(1000, &set, &weights, 5).unwrap();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn test_bound_too_small() {
        let set = AdmissibleSet::new(6).unwrap();
        let weights = WeightMap::compute(&set, None);
        for n in [0u64, 1, 2] {
            assert!(matches!(
                predicted_count(n, &set, &weights, 5),
                Err(AnalysisError::InvalidBound(_))
            ));
        }
        assert!(predicted_count(3, &set, &weights, 5).is_ok());
    }
}
