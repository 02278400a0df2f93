//! Admissible residue classification.
//!
//! A twin prime pair (p, p+2) with p > m can only land on a residue a mod m
//! for which both a and a+2 are coprime to m. The set of such residues is a
//! pure function of m, computed once per modulus and immutable afterwards.

use num_integer::Integer;
use serde::Serialize;

use crate::AnalysisError;

/// A residue pair (a, (a+2) mod m) that can host a twin prime pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdmissiblePair {
    /// Residue of the smaller twin.
    pub a: u64,
    /// Residue of the larger twin: (a + 2) mod m.
    pub b: u64,
}

/// The full admissible residue set for one modulus, with a dense
/// residue-indexed lookup table sized m for O(1) membership tests in the
/// counting loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissibleSet {
    modulus: u64,
    /// Admissible pairs in ascending order of `a`.
    pairs: Vec<AdmissiblePair>,
    /// residue -> index into `pairs`, None for inadmissible residues.
    slots: Vec<Option<usize>>,
}

impl AdmissibleSet {
    /// Classify all residues modulo `m`.
    ///
    /// A residue a is admissible iff gcd(a·(a+2), m) = 1. For m = 1 the
    /// single residue 0 trivially qualifies (gcd(·, 1) = 1).
    pub fn new(m: u64) -> Result<Self, AnalysisError> {
        if m < 1 {
            return Err(AnalysisError::InvalidModulus(m));
        }

        let mut pairs = Vec::new();
        let mut slots = vec![None; m as usize];

        for a in 0..m {
            // u128 product: a(a+2) can exceed u64 for moduli near 2^63.
            let prod = a as u128 * (a + 2) as u128;
            if prod.gcd(&(m as u128)) == 1 {
                slots[a as usize] = Some(pairs.len());
                pairs.push(AdmissiblePair {
                    a,
                    b: (a + 2) % m,
                });
            }
        }

        Ok(AdmissibleSet {
            modulus: m,
            pairs,
            slots,
        })
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Number of admissible residues (φ₂ in the density model).
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Admissible pairs, ascending in `a`.
    pub fn pairs(&self) -> &[AdmissiblePair] {
        &self.pairs
    }

    /// Admissible residues `a`, ascending.
    pub fn residues(&self) -> impl Iterator<Item = u64> + '_ {
        self.pairs.iter().map(|p| p.a)
    }

    /// Slot index of residue `a` into the per-residue vectors, if admissible.
    pub fn slot(&self, a: u64) -> Option<usize> {
        self.slots[a as usize]
    }

    /// O(1) membership test for the counting hot loop.
    pub fn contains(&self, a: u64) -> bool {
        self.slots[a as usize].is_some()
    }
}
