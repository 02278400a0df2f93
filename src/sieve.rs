//! Twin prime enumeration and per-residue counting.
//!
//! A segmented sieve of Eratosthenes streams the primes in (2, N) in
//! bounded memory. Each segment is sieved two numbers past its end, so a
//! twin pair (p, p+2) straddling a segment boundary is seen by the segment
//! that owns p and counted exactly once.
//!
//! Segments are disjoint, so the pass is embarrassingly parallel: each
//! segment accumulates into its own local count vector and the vectors are
//! merged by element-wise summation at the end. The sequential and parallel
//! paths share the per-segment kernel and produce identical counts.

use rayon::prelude::*;

use crate::residues::AdmissibleSet;

/// Fixed segment length for the windowed sieve. Small enough that the
/// window bitmap stays cache-resident, large enough to amortize the base
/// prime scan.
const SEGMENT_LEN: u64 = 1 << 18;

/// Final per-residue twin counts for one modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwinCounts {
    /// Count per residue, indexed 0..m-1; inadmissible residues stay 0.
    pub counts: Vec<u64>,
    /// Grand total over all residues.
    pub total: u64,
}

/// All primes up to `limit` inclusive, by a plain sieve. Used for the base
/// primes of the segmented pass (limit ~ sqrt(N)).
pub fn small_primes(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return Vec::new();
    }
    let size = limit as usize + 1;
    let mut composite = vec![false; size];
    let mut p = 2usize;
    while p * p < size {
        if !composite[p] {
            let mut q = p * p;
            while q < size {
                composite[q] = true;
                q += p;
            }
        }
        p += 1;
    }
    (2..size).filter(|&i| !composite[i]).map(|i| i as u64).collect()
}

/// Count twin pairs (p, p+2) with p in [lo, hi), classified by residue mod
/// the set's modulus. The window [lo, hi+2) is sieved with `base`, which
/// must contain every prime up to sqrt(hi+1).
fn count_segment(lo: u64, hi: u64, base: &[u64], set: &AdmissibleSet, counts: &mut [u64]) -> u64 {
    let window = (hi - lo + 2) as usize;
    let mut composite = vec![false; window];

    for &q in base {
        let q2 = q * q;
        if q2 >= hi + 2 {
            break;
        }
        // First multiple of q in the window that is not q itself.
        let mut mult = if q2 > lo { q2 } else { (lo + q - 1) / q * q };
        while mult < hi + 2 {
            composite[(mult - lo) as usize] = true;
            mult += q;
        }
    }

    let m = set.modulus();
    let mut total = 0u64;

    // Twin pairs with p >= 3 are odd; start at the first odd >= max(lo, 3).
    let mut p = lo.max(3);
    if p % 2 == 0 {
        p += 1;
    }
    while p < hi {
        let i = (p - lo) as usize;
        if !composite[i] && !composite[i + 2] {
            let a = p % m;
            if set.contains(a) {
                counts[a as usize] += 1;
                total += 1;
            }
        }
        p += 2;
    }
    total
}

/// Count all twin pairs (p, p+2) with 2 < p < n, classified by residue.
///
/// `parallel` selects the rayon segment reduction; both paths run the same
/// per-segment kernel and agree exactly. Memory use is O(m) per segment
/// plus the shared base prime table.
pub fn count_twins(n: u64, set: &AdmissibleSet, parallel: bool) -> TwinCounts {
    let m = set.modulus() as usize;
    let zero = || TwinCounts {
        counts: vec![0u64; m],
        total: 0,
    };

    if n <= 3 {
        return zero();
    }

    // Base primes cover the full sieved range, which extends to n + 1
    // because p + 2 for the last p < n must be tested for primality.
    let base = small_primes(isqrt(n + 1) + 1);

    let segments: Vec<(u64, u64)> = (3..n)
        .step_by(SEGMENT_LEN as usize)
        .map(|lo| (lo, (lo + SEGMENT_LEN).min(n)))
        .collect();

    let merge = |mut acc: TwinCounts, part: TwinCounts| {
        for (dst, src) in acc.counts.iter_mut().zip(&part.counts) {
            *dst += src;
        }
        acc.total += part.total;
        acc
    };

    let run_segment = |&(lo, hi): &(u64, u64)| {
        let mut local = vec![0u64; m];
        let total = count_segment(lo, hi, &base, set, &mut local);
        TwinCounts {
            counts: local,
            total,
        }
    };

    if parallel {
        segments.par_iter().map(run_segment).reduce(zero, merge)
    } else {
        segments.iter().map(run_segment).fold(zero(), merge)
    }
}

/// Integer square root: the largest r with r² ≤ n.
fn isqrt(n: u64) -> u64 {
    let mut r = (n as f64).sqrt() as u64;
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r
}
