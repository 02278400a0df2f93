//! Residue weights from the 2-adic structure of the Collatz odd-step map.
//!
//! Two weight variants per admissible residue a:
//! - single-step: ν₂(3a + 1), the 2-adic valuation of the first odd step;
//! - iterated: the sum of ν₂(3r + 1) over every odd step of the collapse
//!   map T(r) = r/2 (r even), (3r+1)/2^{ν₂(3r+1)} (r odd), from r = a to 1.
//!
//! Termination of the iterated walk is the Collatz conjecture. The walk is
//! an explicit state machine with a hard iteration budget; exhausting it
//! yields `WeightNonconvergence` for that residue only.

use serde::Serialize;

use crate::residues::AdmissibleSet;
use crate::AnalysisError;

/// 2-adic valuation of v (v > 0): the exponent of its largest power-of-two
/// divisor.
pub fn nu2(v: u64) -> u32 {
    debug_assert!(v > 0);
    v.trailing_zeros()
}

/// Single-step weight k(a) = ν₂(3a + 1).
pub fn single_step_weight(a: u64) -> u32 {
    nu2(3 * a + 1)
}

/// Default iteration budget for the trajectory of `a`.
///
/// Collatz trajectories of small starts reach 1 within a few hundred steps;
/// the budget scales with the bit length of the start and keeps a generous
/// floor so genuine trajectories never trip it.
pub fn default_cap(a: u64) -> u32 {
    let bits = 64 - a.leading_zeros();
    64 + 8 * bits
}

/// Iterated weight k*(a): total 2-adic valuation accumulated at the odd
/// steps of the collapse trajectory from `a` down to 1.
///
/// Runs at most `cap` iterations. Trajectories that exhaust the budget (or
/// leave u128 range) are reported as non-convergent, never trusted to the
/// conjecture. Note r = 0 halves to itself forever, so residue 0 (admissible
/// only for m = 1) is always non-convergent and downstream consumers fall
/// back to its default weight.
pub fn collatz_weight(a: u64, cap: u32) -> Result<u32, AnalysisError> {
    let nonconvergence = || AnalysisError::WeightNonconvergence { residue: a, cap };

    let mut r = a as u128;
    let mut weight: u32 = 0;

    for _ in 0..cap {
        if r == 1 {
            return Ok(weight);
        }
        if r % 2 == 0 {
            r /= 2;
        } else {
            let step = r.checked_mul(3).and_then(|t| t.checked_add(1)).ok_or_else(nonconvergence)?;
            let v = step.trailing_zeros();
            weight += v;
            r = step >> v;
        }
    }

    if r == 1 {
        Ok(weight)
    } else {
        Err(nonconvergence())
    }
}

/// Both weight variants for one modulus, as fixed residue-indexed arrays
/// (length m, `None` marking inadmissible or non-convergent residues).
/// Computed once from the admissible set and immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct WeightMap {
    single: Vec<Option<u32>>,
    iterated: Vec<Option<u32>>,
    /// Admissible residues whose iterated weight hit the iteration cap.
    pub nonconverged: Vec<u64>,
}

impl WeightMap {
    /// Compute both weight variants over the admissible residues.
    ///
    /// `cap` overrides the per-residue default iteration budget. A residue
    /// whose trajectory fails to converge is recorded in `nonconverged` and
    /// left absent; the other residues are unaffected.
    pub fn compute(set: &AdmissibleSet, cap: Option<u32>) -> WeightMap {
        let m = set.modulus() as usize;
        let mut single = vec![None; m];
        let mut iterated = vec![None; m];
        let mut nonconverged = Vec::new();

        for pair in set.pairs() {
            let a = pair.a;
            single[a as usize] = Some(single_step_weight(a));
            match collatz_weight(a, cap.unwrap_or_else(|| default_cap(a))) {
                Ok(w) => iterated[a as usize] = Some(w),
                Err(AnalysisError::WeightNonconvergence { .. }) => nonconverged.push(a),
                Err(_) => unreachable!("collatz_weight only fails with WeightNonconvergence"),
            }
        }

        WeightMap {
            single,
            iterated,
            nonconverged,
        }
    }

    /// Single-step weight of residue `a`, if admissible.
    pub fn single(&self, a: u64) -> Option<u32> {
        self.single[a as usize]
    }

    /// Iterated weight of residue `a`, if admissible and convergent.
    pub fn iterated(&self, a: u64) -> Option<u32> {
        self.iterated[a as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nu2() {
        assert_eq!(nu2(1), 0);
        assert_eq!(nu2(2), 1);
        assert_eq!(nu2(12), 2);
        assert_eq!(nu2(16), 4);
        assert_eq!(nu2(96), 5);
    }

    #[test]
    fn test_single_step_weight_of_5() {
        // 3·5 + 1 = 16 = 2^4
        assert_eq!(single_step_weight(5), 4);
    }

    #[test]
    fn test_collatz_weight_of_5() {
        // 5 → 16 → 1: one odd step contributing ν₂(16) = 4.
        assert_eq!(collatz_weight(5, default_cap(5)).unwrap(), 4);
    }

    #[test]
    fn test_collatz_weight_of_1_is_zero() {
        assert_eq!(collatz_weight(1, 8).unwrap(), 0);
    }

    #[test]
    fn test_collatz_weight_of_7() {
        // 7 → 22/2=11 → 34/2=17 → 52/4=13 → 40/8=5 → 16/16=1
        // valuations: 1 + 1 + 2 + 3 + 4 = 11
        assert_eq!(collatz_weight(7, default_cap(7)).unwrap(), 11);
    }

    #[test]
    fn test_collatz_weight_matches_power_of_two() {
        // 2^k halves straight down: no odd step, weight 0.
        assert_eq!(collatz_weight(64, default_cap(64)).unwrap(), 0);
    }

    #[test]
    fn test_tiny_cap_surfaces_nonconvergence() {
        // 27 has a famously long trajectory; 5 steps is nowhere near enough.
        match collatz_weight(27, 5) {
            Err(AnalysisError::WeightNonconvergence { residue: 27, cap: 5 }) => {}
            other => panic!("expected WeightNonconvergence, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_never_converges() {
        // 0 is even and halves to itself; the cap must fire.
        assert!(matches!(
            collatz_weight(0, 100),
            Err(AnalysisError::WeightNonconvergence { residue: 0, .. })
        ));
    }

    #[test]
    fn test_weight_map_mod_6() {
        let set = crate::residues::AdmissibleSet::new(6).unwrap();
        let weights = WeightMap::compute(&set, None);
        assert_eq!(weights.single(5), Some(4));
        assert_eq!(weights.iterated(5), Some(4));
        assert_eq!(weights.single(3), None); // inadmissible
        assert!(weights.nonconverged.is_empty());
    }

    #[test]
    fn test_weight_map_isolates_nonconvergence() {
        // Mod 16 admits every odd residue. With a 2-iteration budget the
        // short trajectories (1, 3, 5, 13) still converge while the long
        // ones are recorded as failed, not aborted.
        let set = crate::residues::AdmissibleSet::new(16).unwrap();
        let weights = WeightMap::compute(&set, Some(2));
        assert_eq!(weights.iterated(5), Some(4));
        assert_eq!(weights.iterated(13), Some(7));
        assert_eq!(weights.iterated(7), None);
        assert_eq!(weights.single(7), Some(1)); // single-step unaffected
        assert_eq!(weights.nonconverged, vec![7, 9, 11, 15]);
    }
}
